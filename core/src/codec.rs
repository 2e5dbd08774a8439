//! Encrypt, decrypt and rewrap property sets through a transit engine.
//!
//! Each remote call is awaited before the next one is issued, and any error
//! aborts the whole operation: a property set is either transformed completely
//! or not at all.

use crate::{
    error::{Error, Result},
    integrity::{digest_for, verify},
    policy::KeySelectionPolicy,
    properties::PropertySet,
    transit::Transit,
    util::{is_encrypted_value, is_reserved_key},
    HOST_KEY, SHA3_KEY, TRANSIT_KEY_KEY, TRANSIT_PATH_KEY,
};
use tracing::info;

/// Applies a [`Transit`] to every eligible entry of a property set
pub struct PropertySetCodec<'c> {
    transit: &'c dyn Transit,
    policy: &'c KeySelectionPolicy,
}

impl<'c> PropertySetCodec<'c> {
    pub fn new(transit: &'c dyn Transit, policy: &'c KeySelectionPolicy) -> Self {
        PropertySetCodec { transit, policy }
    }

    /// Encrypts the values of all non-reserved keys selected by the policy,
    /// then appends the reserved coordinate entries and the encrypted digest.
    /// Reserved entries already in `input` are replaced.
    pub async fn encrypt(&self, input: &PropertySet) -> Result<PropertySet, Error> {
        let mut output = PropertySet::new();
        let mut encrypted = 0usize;

        for (key, value) in input.iter() {
            if is_reserved_key(key) {
                continue;
            }
            if self.policy.matches(key) {
                output.put(key, self.transit.encrypt(value.as_bytes()).await?);
                encrypted += 1;
            } else {
                output.put(key, value);
            }
        }

        let coordinates = self.transit.coordinates();
        let digest = self.transit.encrypt(digest_for(coordinates).as_bytes()).await?;
        output.put(HOST_KEY, coordinates.host());
        output.put(TRANSIT_PATH_KEY, coordinates.mount_path());
        output.put(TRANSIT_KEY_KEY, coordinates.key_name());
        output.put(SHA3_KEY, digest);

        info!(
            entries = input.len(),
            encrypted,
            "encrypted property set"
        );
        Ok(output)
    }

    /// Verifies the digest, then decrypts every encrypted non-reserved value.
    /// Reserved entries are not part of the result.
    pub async fn decrypt(&self, input: &PropertySet) -> Result<PropertySet, Error> {
        verify(input, self.transit).await?;

        let mut output = PropertySet::new();
        let mut decrypted = 0usize;

        for (key, value) in input.iter() {
            if is_reserved_key(key) {
                continue;
            }
            if is_encrypted_value(value) {
                let plain = self.transit.decrypt(value.trim()).await?;
                let plain = String::from_utf8(plain).map_err(|_| {
                    Error::Protocol(format!("decrypted value of '{}' is not valid utf-8", key))
                })?;
                output.put(key, plain);
                decrypted += 1;
            } else {
                output.put(key, value);
            }
        }

        info!(entries = input.len(), decrypted, "decrypted property set");
        Ok(output)
    }

    /// Verifies the digest, then rewraps every encrypted non-reserved value
    /// with the latest key version. All other entries, reserved ones included,
    /// are kept unchanged.
    pub async fn rewrap(&self, input: &PropertySet) -> Result<PropertySet, Error> {
        verify(input, self.transit).await?;

        let mut output = PropertySet::new();
        let mut rewrapped = 0usize;

        for (key, value) in input.iter() {
            if !is_reserved_key(key) && is_encrypted_value(value) {
                output.put(key, self.transit.rewrap(value.trim()).await?);
                rewrapped += 1;
            } else {
                output.put(key, value);
            }
        }

        info!(entries = input.len(), rewrapped, "rewrapped property set");
        Ok(output)
    }
}
