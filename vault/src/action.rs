//! Routing table for the three transit operations

/// Transit operation. The discriminant is the row index in [`TRANSIT_ACTIONS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitAction {
    Encrypt = 0,
    Decrypt = 1,
    Rewrap = 2,
}

/// Request routing for one action
#[derive(Debug)]
pub struct ActionSpec {
    pub action: TransitAction,
    /// url path segment after the mount path
    pub path_segment: &'static str,
    /// name of the json request field
    pub input_field: &'static str,
    /// name of the response field under `data`
    pub output_field: &'static str,
}

pub static TRANSIT_ACTIONS: [ActionSpec; 3] = [
    ActionSpec {
        action: TransitAction::Encrypt,
        path_segment: "encrypt",
        input_field: "plaintext",
        output_field: "ciphertext",
    },
    ActionSpec {
        action: TransitAction::Decrypt,
        path_segment: "decrypt",
        input_field: "ciphertext",
        output_field: "plaintext",
    },
    ActionSpec {
        action: TransitAction::Rewrap,
        path_segment: "rewrap",
        input_field: "ciphertext",
        output_field: "ciphertext",
    },
];

impl TransitAction {
    pub fn spec(self) -> &'static ActionSpec {
        &TRANSIT_ACTIONS[self as usize]
    }

    /// Url of this action for a transit key
    /// ```
    /// use gruntr_vault::TransitAction;
    /// assert_eq!(
    ///     TransitAction::Rewrap.address_for("http://127.0.0.1:8200", "transit/prod", "app"),
    ///     "http://127.0.0.1:8200/v1/transit/prod/rewrap/app"
    /// );
    /// ```
    pub fn address_for(self, host: &str, mount_path: &str, key_name: &str) -> String {
        format!(
            "{}/v1/{}/{}/{}",
            host,
            mount_path,
            self.spec().path_segment,
            key_name
        )
    }
}
