//! Request payloads.
//!
//! Each variant serializes to the externally tagged shape the engine expects,
//! e.g. `{"Prefetch": {"filename": "main.rs"}}`. The envelope is added by
//! [`encode_request`](super::encode_request).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::selection::SelectionRequest;

/// Default `max_num_results` for autocomplete.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Payload with no fields, serialized as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// A logical request to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Capability query.
    Features(Empty),
    Autocomplete(AutocompleteRequest),
    /// Warm the engine's index for a file.
    Prefetch(PrefetchRequest),
    /// Ask the engine to open its configuration page.
    Configuration(Empty),
    /// Tell the engine the plugin is being removed.
    Uninstalling(Empty),
    SetState(SetStateRequest),
}

impl Request {
    pub fn capabilities() -> Self {
        Request::Features(Empty {})
    }

    pub fn autocomplete(request: AutocompleteRequest) -> Self {
        Request::Autocomplete(request)
    }

    pub fn prefetch(filename: impl Into<String>) -> Self {
        Request::Prefetch(PrefetchRequest {
            filename: filename.into(),
        })
    }

    pub fn configuration() -> Self {
        Request::Configuration(Empty {})
    }

    pub fn uninstalling() -> Self {
        Request::Uninstalling(Empty {})
    }

    pub fn set_state(state_type: StateType) -> Self {
        Request::SetState(SetStateRequest { state_type })
    }

    /// Completion-accepted notification.
    pub fn selection(selection: SelectionRequest) -> Self {
        Self::set_state(StateType::Selection(selection))
    }

    /// Wire name of the request kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Features(_) => "Features",
            Request::Autocomplete(_) => "Autocomplete",
            Request::Prefetch(_) => "Prefetch",
            Request::Configuration(_) => "Configuration",
            Request::Uninstalling(_) => "Uninstalling",
            Request::SetState(_) => "SetState",
        }
    }
}

/// Text around the cursor plus result limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteRequest {
    pub before: String,
    pub after: String,
    /// `None` for unsaved buffers.
    pub filename: Option<String>,
    /// `before` starts at the beginning of the buffer.
    pub region_includes_beginning: bool,
    /// `after` runs to the end of the buffer.
    pub region_includes_end: bool,
    #[serde(default = "default_max_results")]
    pub max_num_results: usize,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl AutocompleteRequest {
    /// Neither region flag set, [`DEFAULT_MAX_RESULTS`] results.
    pub fn new(
        before: impl Into<String>,
        after: impl Into<String>,
        filename: Option<impl Into<String>>,
    ) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            filename: filename.map(Into::into),
            region_includes_beginning: false,
            region_includes_end: false,
            max_num_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn region_includes_beginning(mut self, value: bool) -> Self {
        self.region_includes_beginning = value;
        self
    }

    pub fn region_includes_end(mut self, value: bool) -> Self {
        self.region_includes_end = value;
        self
    }

    pub fn max_num_results(mut self, value: usize) -> Self {
        self.max_num_results = value;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchRequest {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetStateRequest {
    pub state_type: StateType,
}

/// Body of a `SetState` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateType {
    Selection(SelectionRequest),
    /// Any other state notification, passed through verbatim.
    #[serde(untagged)]
    Custom(Value),
}

impl StateType {
    pub fn custom(value: Value) -> Self {
        StateType::Custom(value)
    }
}
