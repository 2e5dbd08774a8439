// src/vault_client.rs
// async http client for the hashicorp vault transit engine

use crate::action::TransitAction;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use gruntr::{
    coordinates::Coordinates,
    error::{Error, Result},
    properties::PropertySet,
    token::VaultToken,
    transit::Transit,
    util::remove_trailing_slash,
    HOST_KEY, TRANSIT_KEY_KEY, TRANSIT_PATH_KEY,
};
use reqwest::{
    header::{HeaderValue, ACCEPT},
    redirect, StatusCode,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// environment variable holding the vault token
pub const VAULT_TOKEN: &str = "VAULT_TOKEN";
/// environment variable holding the vault server address
pub const VAULT_ADDR: &str = "VAULT_ADDR";
/// header carrying the token on every request
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Body of a successful transit response. Everything but `data` is ignored.
#[derive(Debug, Deserialize)]
struct TransitResponse {
    data: Map<String, Value>,
}

/// Validated coordinates and token for a transit key
#[derive(Debug)]
pub struct TransitConfig {
    coordinates: Coordinates,
    token: VaultToken,
}

impl TransitConfig {
    /// Validates coordinates and token. The token is copied.
    pub fn new(
        host: &str,
        mount_path: &str,
        key_name: &str,
        token: &VaultToken,
    ) -> Result<TransitConfig, Error> {
        let coordinates = Coordinates::new(host, mount_path, key_name)?;
        TransitConfig::from_coordinates(coordinates, token)
    }

    pub fn from_coordinates(
        coordinates: Coordinates,
        token: &VaultToken,
    ) -> Result<TransitConfig, Error> {
        if token.is_invalidated() {
            return Err(Error::Configuration(
                "missing vault token: set --hc-token or VAULT_TOKEN".to_string(),
            ));
        }
        Ok(TransitConfig {
            coordinates,
            token: token.copy_of(),
        })
    }

    /// Coordinates for an already encrypted set.
    ///
    /// A coordinate given by the operator (flag or environment) is used as is,
    /// and must agree with the entry recorded in the set: a disagreement is a
    /// [`Error::Tamper`], raised before any request. Recorded entries are used
    /// only for coordinates the operator did not give. Hosts are compared
    /// without a trailing '/'.
    pub fn resolve(
        set: &PropertySet,
        host: Option<&str>,
        mount_path: Option<&str>,
        key_name: Option<&str>,
        token: &VaultToken,
    ) -> Result<TransitConfig, Error> {
        let host = given_or_recorded(set, HOST_KEY, host, "vault host", |a, b| {
            remove_trailing_slash(a) == remove_trailing_slash(b)
        })?;
        let mount_path =
            given_or_recorded(set, TRANSIT_PATH_KEY, mount_path, "transit path", |a, b| a == b)?;
        let key_name =
            given_or_recorded(set, TRANSIT_KEY_KEY, key_name, "transit key name", |a, b| a == b)?;
        TransitConfig::new(&host, &mount_path, &key_name, token)
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }
}

fn given_or_recorded(
    set: &PropertySet,
    key: &str,
    given: Option<&str>,
    what: &str,
    agree: impl Fn(&str, &str) -> bool,
) -> Result<String, Error> {
    let given = given.map(str::trim).filter(|v| !v.is_empty());
    let recorded = set.get(key).map(str::trim).filter(|v| !v.is_empty());
    match (given, recorded) {
        (Some(g), Some(r)) if !agree(g, r) => {
            warn!(entry = key, given = g, recorded = r, "recorded coordinate differs from the given one");
            Err(Error::Tamper(format!(
                "'{}' records '{}' but {} '{}' was given",
                key, r, what, g
            )))
        }
        (Some(v), _) | (None, Some(v)) => Ok(v.to_string()),
        (None, None) => Err(Error::Configuration(format!(
            "missing {}: no '{}' entry and no flag",
            what, key
        ))),
    }
}

/// Transit client bound to one key. Each call is a single POST; nothing is retried.
pub struct TransitClient {
    config: TransitConfig,
    http: reqwest::Client,
}

impl TransitClient {
    pub fn new(config: TransitConfig) -> Result<TransitClient, Error> {
        let http = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .http1_only()
            .build()
            .map_err(|e| Error::Configuration(format!("cannot create http client: {}", e)))?;
        Ok(TransitClient { config, http })
    }

    /// Send one transit request and return the output field of the response
    async fn request(&self, action: TransitAction, value: &str) -> Result<String, Error> {
        let spec = action.spec();
        let c = self.config.coordinates();
        let url = action.address_for(c.host(), c.mount_path(), c.key_name());

        let mut token = HeaderValue::from_str(self.config.token.expose_secret())
            .map_err(|_| Error::Configuration("invalid token string".to_string()))?;
        token.set_sensitive(true);

        let mut body = Map::new();
        body.insert(spec.input_field.to_string(), Value::String(value.to_string()));

        debug!(action = spec.path_segment, url = %url, "transit request");
        let res = self
            .http
            .post(&url)
            .header(VAULT_TOKEN_HEADER, token)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(action = spec.path_segment, url = %url, "vault unreachable");
                Error::Protocol(format!("unable to communicate with vault: {}", e))
            })?;

        let status = res.status();
        if status != StatusCode::OK {
            warn!(action = spec.path_segment, url = %url, status = status.as_u16(), "vault request failed");
            return Err(Error::Protocol(format!(
                "vault was unable to handle {} request, returned status {}",
                spec.path_segment,
                status.as_u16()
            )));
        }
        let text = res
            .text()
            .await
            .map_err(|e| Error::Protocol(format!("cannot read vault response: {}", e)))?;
        output_field(&text, spec.output_field)
    }
}

/// Extracts `data.<field>` from a response body
fn output_field(body: &str, field: &str) -> Result<String, Error> {
    let res: TransitResponse = serde_json::from_str(body)
        .map_err(|e| Error::Protocol(format!("unexpected vault response: {}", e)))?;
    res.data
        .get(field)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            Error::Protocol(format!(
                "unexpected vault response: no string field 'data.{}'",
                field
            ))
        })
}

#[async_trait]
impl Transit for TransitClient {
    fn coordinates(&self) -> &Coordinates {
        self.config.coordinates()
    }

    /// Returns data as string of the form: vault:v1:<base64-encoded-data>
    async fn encrypt(&self, plaintext: &[u8]) -> Result<String, Error> {
        self.request(TransitAction::Encrypt, &BASE64.encode(plaintext))
            .await
    }

    async fn decrypt(&self, ciphertext: &str) -> Result<Vec<u8>, Error> {
        let encoded = self.request(TransitAction::Decrypt, ciphertext).await?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(|_| Error::Protocol("response had invalid base64".to_string()))
    }

    async fn rewrap(&self, ciphertext: &str) -> Result<String, Error> {
        self.request(TransitAction::Rewrap, ciphertext).await
    }
}
