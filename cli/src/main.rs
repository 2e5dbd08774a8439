//!
//! Property file encryption with HashiCorp Vault transit
//!
//! # Syntax:
//!
//! ```text
//!  # Encrypt values (all keys, or those matching -k)
//!  $ gruntr encrypt -i FILE [ -o OUT ] -h VAULT_ADDR -t TOKEN \
//!        --hc-transit-path PATH --hc-transit-key KEY [ -k PATTERNS ]
//!
//!  # Decrypt values (coordinates are read from the file; any given
//!  # coordinate must match it)
//!  $ gruntr decrypt -i FILE [ -o OUT ] -t TOKEN
//!
//!  # Re-encrypt values with the latest key version
//!  $ gruntr rewrap -i FILE [ -o OUT ] -t TOKEN
//! ```
//!
//! The token and server default to the environment variables `VAULT_TOKEN`
//! and `VAULT_ADDR`. Without `-o` the result is written to stdout; if `-o`
//! names a directory, the result is written to `encrypted.properties` in it.
//!

use clap::Parser;
mod options;
use gruntr::{
    codec::PropertySetCodec, policy::KeySelectionPolicy, properties::PropertySet,
    token::VaultToken, util::format::format_properties,
};
use gruntr_vault::{TransitClient, TransitConfig};
use options::{Command, DecryptOptions, EncryptOptions, Main, VaultOptions};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tokio::io::AsyncWriteExt;
use tracing::info;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroize;

/// file name used when the output path is a directory
const DEFAULT_OUTPUT_FILE: &str = "encrypted.properties";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Main::parse();
    init_tracing(args.verbose);
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. RUST_LOG, when set, overrides the -v level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Main) -> Result<(), Error> {
    match args.command {
        Command::Encrypt(opt) => encrypt_file(opt).await,
        Command::Decrypt(opt) => decrypt_file(opt).await,
        Command::Rewrap(opt) => rewrap_file(opt).await,
    }
}

#[derive(Debug, ThisError)]
pub(crate) enum Error {
    #[error("IO error: {0}")]
    IOError(std::io::Error),

    #[error("{0}")]
    LibError(#[from] gruntr::error::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IOError(e)
    }
}

/// Moves the token out of the parsed options, wiping the option's copy
fn take_token(opt: &mut VaultOptions) -> VaultToken {
    let mut secret = opt.token.take().unwrap_or_default();
    let token = VaultToken::of(&secret);
    secret.zeroize();
    token
}

fn required<'o>(value: &'o Option<String>, flag: &str) -> Result<&'o str, Error> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            gruntr::error::Error::Configuration(format!("missing required option {}", flag)).into()
        })
}

/// Encrypt property file
pub(crate) async fn encrypt_file(mut opt: EncryptOptions) -> Result<(), Error> {
    let token = take_token(&mut opt.vault);
    let config = TransitConfig::new(
        required(&opt.vault.server, "--hc-vault-server")?,
        required(&opt.vault.transit_path, "--hc-transit-path")?,
        required(&opt.vault.transit_key, "--hc-transit-key")?,
        &token,
    )?;
    let client = TransitClient::new(config)?;
    let policy = match &opt.keys {
        Some(keys) => KeySelectionPolicy::from_option(keys)?,
        None => KeySelectionPolicy::all(),
    };

    let input = PropertySet::read_file(&opt.files.input).await?;
    let output = PropertySetCodec::new(&client, &policy).encrypt(&input).await?;
    write_output(&output, opt.files.output.as_deref()).await
}

/// Client for an encrypted set: given coordinates must match the recorded ones
fn client_for(set: &PropertySet, opt: &mut VaultOptions) -> Result<TransitClient, Error> {
    let token = take_token(opt);
    let config = TransitConfig::resolve(
        set,
        opt.server.as_deref(),
        opt.transit_path.as_deref(),
        opt.transit_key.as_deref(),
        &token,
    )?;
    Ok(TransitClient::new(config)?)
}

/// Decrypt property file
pub(crate) async fn decrypt_file(mut opt: DecryptOptions) -> Result<(), Error> {
    let input = PropertySet::read_file(&opt.files.input).await?;
    let client = client_for(&input, &mut opt.vault)?;
    let policy = KeySelectionPolicy::default();
    let output = PropertySetCodec::new(&client, &policy).decrypt(&input).await?;
    write_output(&output, opt.files.output.as_deref()).await
}

/// Rewrap property file
pub(crate) async fn rewrap_file(mut opt: DecryptOptions) -> Result<(), Error> {
    let input = PropertySet::read_file(&opt.files.input).await?;
    let client = client_for(&input, &mut opt.vault)?;
    let policy = KeySelectionPolicy::default();
    let output = PropertySetCodec::new(&client, &policy).rewrap(&input).await?;
    write_output(&output, opt.files.output.as_deref()).await
}

/// Where the result goes: stdout, a file, or encrypted.properties in a directory
async fn output_path(output: &Path) -> PathBuf {
    match tokio::fs::metadata(output).await {
        Ok(m) if m.is_dir() => output.join(DEFAULT_OUTPUT_FILE),
        _ => output.to_path_buf(),
    }
}

async fn write_output(set: &PropertySet, output: Option<&Path>) -> Result<(), Error> {
    match output {
        Some(output) => {
            let path = output_path(output).await;
            set.write_file(&path).await?;
            info!(path = %path.display(), entries = set.len(), "wrote property file");
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(format_properties(set).as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test;
