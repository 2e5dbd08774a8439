pub mod format;

mod util;
pub use util::{is_encrypted_value, is_reserved_key, remove_trailing_slash};
