//! # gruntr
//!
//! Protects secret values in flat property files by delegating encryption,
//! decryption and key rotation ("rewrap") to the transit engine of a
//! HashiCorp Vault server. Key material never leaves the vault; this crate
//! only decides which values to send, and records where they were encrypted.
//!
//! An encrypted property set carries four reserved entries:
//!
//! - `gruntr__vault_host` - vault server address
//! - `gruntr__vault_transit_path` - transit mount path
//! - `gruntr__vault_transit_key` - transit key name
//! - `gruntr__sha3` - SHA3-256 of the three values above, itself encrypted
//!
//! Decrypt and rewrap verify the digest before touching any value, so a file
//! whose coordinates were edited is rejected with [`Error::Tamper`](error::Error::Tamper).
//!
//! ## Crates
//!
//! - `gruntr` (this crate): property sets, key selection, integrity digest and
//!   the [`PropertySetCodec`](codec::PropertySetCodec), written against the
//!   [`Transit`](transit::Transit) trait.
//! - `gruntr-vault`: the HTTP transit client.
//! - `gruntr-cli`: the `gruntr` command.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run(transit: &dyn gruntr::transit::Transit) -> Result<(), gruntr::error::Error> {
//! use gruntr::{codec::PropertySetCodec, policy::KeySelectionPolicy, properties::PropertySet};
//!
//! let input = PropertySet::read_file("application.properties").await?;
//! let policy = KeySelectionPolicy::from_option(":secrets")?;
//! let encrypted = PropertySetCodec::new(transit, &policy).encrypt(&input).await?;
//! encrypted.write_file("application.encrypted.properties").await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod coordinates;
pub mod error;
pub mod integrity;
pub mod policy;
pub mod properties;
pub mod token;
pub mod transit;
pub mod util;

/// Prefix of all reserved metadata keys
pub const RESERVED_KEY_PREFIX: &str = "gruntr__";
/// Reserved key holding the vault server address
pub const HOST_KEY: &str = "gruntr__vault_host";
/// Reserved key holding the transit mount path
pub const TRANSIT_PATH_KEY: &str = "gruntr__vault_transit_path";
/// Reserved key holding the transit key name
pub const TRANSIT_KEY_KEY: &str = "gruntr__vault_transit_key";
/// Reserved key holding the encrypted integrity digest
pub const SHA3_KEY: &str = "gruntr__sha3";

/// Values starting with this prefix are transit ciphertext tokens
pub const ENCRYPTED_VALUE_PREFIX: &str = "vault:";
