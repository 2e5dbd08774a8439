//! # gruntr-vault
//!
//! HTTP client for the transit secrets engine of a HashiCorp Vault server.
//! [`TransitClient`] implements [`gruntr::transit::Transit`], so it plugs
//! directly into [`gruntr::codec::PropertySetCodec`].
//!
//! ```no_run
//! # async fn run() -> Result<(), gruntr::error::Error> {
//! use gruntr::token::VaultToken;
//! use gruntr::transit::Transit;
//! use gruntr_vault::{TransitClient, TransitConfig};
//!
//! let token = VaultToken::of("s.xxxxxxxx");
//! let config = TransitConfig::new("http://127.0.0.1:8200", "transit", "app", &token)?;
//! let client = TransitClient::new(config)?;
//! let ciphertext = client.encrypt(b"hunter2").await?;
//! assert!(ciphertext.starts_with("vault:"));
//! # Ok(())
//! # }
//! ```

mod action;
mod vault_client;

pub use action::{ActionSpec, TransitAction, TRANSIT_ACTIONS};
pub use vault_client::{TransitClient, TransitConfig, VAULT_ADDR, VAULT_TOKEN, VAULT_TOKEN_HEADER};
