//! Reply shapes for the requests that have a meaningful answer.
//!
//! Unknown fields are ignored so newer engines keep working.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which model produced a completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// Classic (non deep-learning) completion.
    Vanilla,
    /// Local deep model.
    Local,
    /// Cloud deep model.
    Cloud,
    /// Language server.
    Lsp,
    /// Origins this crate does not know about.
    #[serde(untagged)]
    Other(String),
}

impl Origin {
    pub fn as_str(&self) -> &str {
        match self {
            Origin::Vanilla => "VANILLA",
            Origin::Local => "LOCAL",
            Origin::Cloud => "CLOUD",
            Origin::Lsp => "LSP",
            Origin::Other(s) => s,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Origin {
    fn from(s: &str) -> Self {
        match s {
            "VANILLA" => Origin::Vanilla,
            "LOCAL" => Origin::Local,
            "CLOUD" => Origin::Cloud,
            "LSP" => Origin::Lsp,
            _ => Origin::Other(s.to_string()),
        }
    }
}

/// One suggestion from an autocomplete reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCandidate {
    /// Text that replaces the typed prefix.
    pub new_prefix: String,
    /// Text after the cursor to be replaced.
    #[serde(default)]
    pub old_suffix: String,
    /// Replacement for `old_suffix`.
    #[serde(default)]
    pub new_suffix: String,
    /// Strength label shown next to the suggestion (e.g. `"32%"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl CompletionCandidate {
    pub fn new(new_prefix: impl Into<String>) -> Self {
        Self {
            new_prefix: new_prefix.into(),
            ..Default::default()
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Strength label, or `""`.
    pub fn strength(&self) -> &str {
        self.detail.as_deref().unwrap_or("")
    }

    /// Origin label, or `""`.
    pub fn origin_label(&self) -> &str {
        self.origin.as_ref().map(Origin::as_str).unwrap_or("")
    }
}

/// Reply to an `Autocomplete` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    /// The prefix the engine decided to replace.
    #[serde(default)]
    pub old_prefix: String,
    #[serde(default)]
    pub results: Vec<CompletionCandidate>,
    /// Messages the engine wants shown to the user.
    #[serde(default)]
    pub user_message: Vec<String>,
}

/// Reply to a `Features` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub enabled_features: Vec<String>,
}

impl Capabilities {
    /// Check whether the engine enabled a feature flag.
    pub fn is_enabled(&self, feature: &str) -> bool {
        self.enabled_features.iter().any(|f| f == feature)
    }
}
