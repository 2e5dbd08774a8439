//! Vault coordinates: where a value was encrypted.

use crate::{
    error::{Error, Result},
    util::remove_trailing_slash,
};
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    /// mount paths and key names: lowercase alphanumerics, '/' and '_',
    /// not starting with '/' or '_'
    static ref PATH_COMPONENT: Regex =
        Regex::new("^[a-z0-9][a-z0-9/_]*$").expect("static path component pattern");
}

/// Host, transit mount path and key name of a vault transit key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coordinates {
    host: String,
    mount_path: String,
    key_name: String,
}

impl Coordinates {
    /// Validates and constructs coordinates.
    /// A trailing '/' on the host is dropped, so `http://vault:8200/` and
    /// `http://vault:8200` name the same server.
    ///
    /// ```
    /// use gruntr::coordinates::Coordinates;
    /// let c = Coordinates::new("http://127.0.0.1:8200/", "transit", "app").unwrap();
    /// assert_eq!(c.host(), "http://127.0.0.1:8200");
    /// assert!(Coordinates::new("ftp://server", "transit", "app").is_err());
    /// ```
    pub fn new(host: &str, mount_path: &str, key_name: &str) -> Result<Self, Error> {
        check_host(host)?;
        check_path_component(mount_path, "transit path")?;
        check_path_component(key_name, "transit key name")?;
        Ok(Coordinates {
            host: remove_trailing_slash(host.trim()).to_string(),
            mount_path: mount_path.to_string(),
            key_name: key_name.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }
}

/// Checks the vault server address: absolute http(s) url with a host and no query
pub fn check_host(host: &str) -> Result<(), Error> {
    let host = host.trim();
    if host.is_empty() {
        return Err(Error::Configuration("missing vault host".to_string()));
    }
    let url = Url::parse(host).map_err(|e| {
        Error::Configuration(format!("invalid vault host '{}': {}", host, e))
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::Configuration(format!(
            "invalid vault host '{}': only http and https are supported, got {}",
            host, scheme
        )));
    }
    // Url::parse is lenient about "http:/host"; require the authority marker.
    // scheme is ascii, so the byte offset is valid in the original string
    if !host[scheme.len()..].starts_with("://") {
        return Err(Error::Configuration(format!(
            "invalid vault host '{}': expected {}://",
            host, scheme
        )));
    }
    if url.host_str().map(|h| h.is_empty()).unwrap_or(true) {
        return Err(Error::Configuration(format!(
            "invalid vault host '{}': missing host",
            host
        )));
    }
    if url.query().is_some() {
        return Err(Error::Configuration(format!(
            "invalid vault host '{}': query parameters are not supported",
            host
        )));
    }
    Ok(())
}

/// Checks a transit mount path or key name
pub fn check_path_component(value: &str, what: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Configuration(format!("missing {}", what)));
    }
    if !PATH_COMPONENT.is_match(value) {
        return Err(Error::Configuration(format!(
            "invalid {} '{}': must match '{}'",
            what,
            value,
            PATH_COMPONENT.as_str()
        )));
    }
    Ok(())
}
