//! Transit trait: the operations the codec needs from a vault transit engine.
//!
//! The HTTP implementation lives in the `gruntr-vault` crate. Implementations
//! must perform one remote call per method invocation and must not retry.

use crate::{
    coordinates::Coordinates,
    error::{Error, Result},
};
use async_trait::async_trait;

#[async_trait]
pub trait Transit: Send + Sync {
    /// The coordinates values are encrypted with
    fn coordinates(&self) -> &Coordinates;

    /// Encrypts plaintext, returning a ciphertext token (`vault:v<n>:...`)
    async fn encrypt(&self, plaintext: &[u8]) -> Result<String, Error>;

    /// Decrypts a ciphertext token
    async fn decrypt(&self, ciphertext: &str) -> Result<Vec<u8>, Error>;

    /// Re-encrypts a ciphertext token with the latest key version, without
    /// exposing the plaintext
    async fn rewrap(&self, ciphertext: &str) -> Result<String, Error>;
}
