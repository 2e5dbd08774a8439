//! Key selection: which property keys have values that must be encrypted.
//!
//! Patterns are regular-expression fragments. A key is selected when it
//! *contains* a match for any fragment, compared case-insensitively.
//! The compiled policy is an immutable value; build it once and pass it by
//! reference to the codec.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};

/// Fragment matching every key
pub const ALL: &str = ".*";

/// Fragment matching the usual secret-bearing key names
pub const SECRETS: &str = "(secret|token|password)";

/// Alias for [`SECRETS`] accepted by [`KeySelectionPolicy::from_option`]
pub const SECRETS_ALIAS: &str = ":secrets";

/// Accumulates pattern fragments before compiling them into a policy
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    fragments: Vec<String>,
}

impl PatternSet {
    pub fn new() -> Self {
        PatternSet {
            fragments: Vec::new(),
        }
    }

    /// Adds one or more fragments. Each fragment must be a valid regular
    /// expression on its own; nothing is added if any of them is invalid.
    pub fn register(&mut self, pattern: &str, more: &[&str]) -> Result<(), Error> {
        let mut added = Vec::with_capacity(1 + more.len());
        for p in std::iter::once(&pattern).chain(more.iter()) {
            let _ = Regex::new(p)?;
            added.push(p.to_string());
        }
        self.fragments.extend(added);
        Ok(())
    }

    /// Removes all registered fragments
    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Compiles the fragments into `^.*(f1|f2|...).*$`, case-insensitive.
    /// With no fragments registered, the policy selects every key.
    pub fn compile(&self) -> Result<KeySelectionPolicy, Error> {
        let joined = if self.fragments.is_empty() {
            ALL.to_string()
        } else {
            self.fragments.join("|")
        };
        KeySelectionPolicy::with_alternation(&joined)
    }
}

/// Compiled, immutable key selection policy
#[derive(Clone, Debug)]
pub struct KeySelectionPolicy {
    matcher: Regex,
}

impl KeySelectionPolicy {
    fn with_alternation(alternation: &str) -> Result<Self, Error> {
        let matcher = RegexBuilder::new(&format!("^.*({}).*$", alternation))
            .case_insensitive(true)
            .build()?;
        Ok(KeySelectionPolicy { matcher })
    }

    /// Policy that selects every key
    pub fn all() -> Self {
        KeySelectionPolicy {
            matcher: RegexBuilder::new("^.*(.*).*$")
                .case_insensitive(true)
                .build()
                .expect("static match-all pattern"),
        }
    }

    /// Compiles a policy from fragments
    /// ```
    /// use gruntr::policy::{KeySelectionPolicy, SECRETS};
    /// let policy = KeySelectionPolicy::from_patterns(&[SECRETS]).unwrap();
    /// assert!(policy.matches("db.Password"));
    /// assert!(!policy.matches("db.user"));
    /// ```
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, Error> {
        let mut set = PatternSet::new();
        for p in patterns {
            set.register(p.as_ref(), &[])?;
        }
        set.compile()
    }

    /// Parses the command-line form: comma-separated fragments, where
    /// `:secrets` stands for [`SECRETS`]. Blank items are ignored.
    /// ```
    /// use gruntr::policy::KeySelectionPolicy;
    /// let policy = KeySelectionPolicy::from_option(":secrets, api_key").unwrap();
    /// assert!(policy.matches("service.api_key"));
    /// assert!(policy.matches("my.token"));
    /// assert!(!policy.matches("service.url"));
    /// ```
    pub fn from_option(option: &str) -> Result<Self, Error> {
        let mut set = PatternSet::new();
        for item in option.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item.eq_ignore_ascii_case(SECRETS_ALIAS) {
                set.register(SECRETS, &[])?;
            } else {
                set.register(item, &[])?;
            }
        }
        set.compile()
    }

    /// True if the value stored under `key` must be encrypted
    pub fn matches(&self, key: &str) -> bool {
        self.matcher.is_match(key)
    }

    /// The compiled expression, for diagnostics
    pub fn as_str(&self) -> &str {
        self.matcher.as_str()
    }
}

impl Default for KeySelectionPolicy {
    fn default() -> Self {
        Self::all()
    }
}
