//! Integrity digest binding an encrypted property set to its coordinates.
//!
//! The digest is SHA3-256 over host, mount path and key name, hex encoded.
//! It is stored encrypted under [`SHA3_KEY`](crate::SHA3_KEY), so changing any
//! coordinate entry in a file is detected on the next decrypt or rewrap.

use crate::{
    coordinates::Coordinates,
    error::{Error, Result},
    properties::PropertySet,
    transit::Transit,
    HOST_KEY, SHA3_KEY, TRANSIT_KEY_KEY, TRANSIT_PATH_KEY,
};
use sha3::{Digest, Sha3_256};
use tracing::{debug, warn};

/// SHA3-256 over the concatenated values, as lowercase hex.
/// Every value must be non-blank.
/// ```
/// use gruntr::integrity::sha3_digest;
/// assert_eq!(
///     sha3_digest(&["test"]).unwrap(),
///     "36f028580bb02cc8272a9a020f4200e346e276ae664e45ee80745574e2f5ab80"
/// );
/// ```
pub fn sha3_digest(values: &[&str]) -> Result<String, Error> {
    if values.is_empty() {
        return Err(Error::Configuration(
            "nothing to digest: no values provided".to_string(),
        ));
    }
    let mut hasher = Sha3_256::new();
    for v in values {
        if v.trim().is_empty() {
            return Err(Error::Configuration(
                "cannot digest an empty value".to_string(),
            ));
        }
        hasher.update(v.as_bytes());
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Digest of the coordinates. Validated coordinates are never blank, so this
/// cannot fail.
pub fn digest_for(coordinates: &Coordinates) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(coordinates.host().as_bytes());
    hasher.update(coordinates.mount_path().as_bytes());
    hasher.update(coordinates.key_name().as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns the value of a reserved entry, or a configuration error naming it
fn required<'s>(set: &'s PropertySet, key: &str) -> Result<&'s str, Error> {
    set.get(key).ok_or_else(|| {
        Error::Configuration(format!("cannot validate digest, missing '{}'", key))
    })
}

/// Verifies the stored digest against the stored coordinates.
///
/// All four reserved entries must be present. The stored digest is decrypted
/// with `transit` and compared with the digest recomputed from the stored
/// host, mount path and key name. A mismatch is a [`Error::Tamper`].
pub async fn verify(set: &PropertySet, transit: &dyn Transit) -> Result<(), Error> {
    let host = required(set, HOST_KEY)?;
    let mount_path = required(set, TRANSIT_PATH_KEY)?;
    let key_name = required(set, TRANSIT_KEY_KEY)?;
    let stored = required(set, SHA3_KEY)?;

    let expected = sha3_digest(&[host, mount_path, key_name])?;
    let actual = transit.decrypt(stored.trim()).await?;

    if actual != expected.as_bytes() {
        warn!(host, mount_path, key_name, "integrity digest mismatch");
        return Err(Error::Tamper(
            "digest validation failed, gruntr__ values were modified outside of gruntr".to_string(),
        ));
    }
    debug!(host, mount_path, key_name, "integrity digest verified");
    Ok(())
}
