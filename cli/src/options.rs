use clap::{ArgAction, Args, Parser, Subcommand};
use gruntr_vault::{VAULT_ADDR, VAULT_TOKEN};
use std::path::PathBuf;

#[derive(Parser, Clone, Debug)]
#[command(name = "gruntr", version, about)]
// derive version from Cargo.toml
pub struct Main {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

// -h is the vault server flag, so subcommands only get the long --help
#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Encrypt selected values of a property file
    #[command(disable_help_flag = true)]
    Encrypt(EncryptOptions),

    /// Decrypt all encrypted values of a property file
    #[command(disable_help_flag = true)]
    Decrypt(DecryptOptions),

    /// Re-encrypt all encrypted values with the latest key version
    #[command(disable_help_flag = true)]
    Rewrap(DecryptOptions),
}

#[derive(Args, Clone, Debug)]
pub struct FileOptions {
    /// Property file to read
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output file, or directory for encrypted.properties. Defaults to stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct VaultOptions {
    /// Vault token
    #[arg(
        short = 't',
        long = "hc-token",
        visible_alias = "token",
        env = VAULT_TOKEN,
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// Vault server, e.g. https://vault.example.com:8200
    #[arg(short = 'h', long = "hc-vault-server", env = VAULT_ADDR, value_name = "URL")]
    pub server: Option<String>,

    /// Transit engine mount path
    #[arg(long = "hc-transit-path", value_name = "PATH")]
    pub transit_path: Option<String>,

    /// Transit key name
    #[arg(long = "hc-transit-key", value_name = "NAME")]
    pub transit_key: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct EncryptOptions {
    #[command(flatten)]
    pub files: FileOptions,

    #[command(flatten)]
    pub vault: VaultOptions,

    /// Comma-separated key patterns to encrypt (":secrets" for secret|token|password).
    /// Defaults to all keys
    #[arg(short, long, value_name = "PATTERNS")]
    pub keys: Option<String>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

#[derive(Args, Clone, Debug)]
pub struct DecryptOptions {
    #[command(flatten)]
    pub files: FileOptions,

    // given coordinates must match the file, missing ones come from it
    #[command(flatten)]
    pub vault: VaultOptions,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}
