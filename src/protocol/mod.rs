//! JSON protocol types for engine communication.
//!
//! Every request is one line: an [`Envelope`] holding a version tag and a
//! [`Request`] payload. Every reply is one line holding a JSON document whose
//! shape depends on the request.
//!
//! # Request Types
//!
//! - [`Request::Features`]: capability query, answered with [`Capabilities`]
//! - [`Request::Autocomplete`]: completion query, answered with [`AutocompleteResponse`]
//! - [`Request::Prefetch`], [`Request::Configuration`], [`Request::Uninstalling`]:
//!   notifications whose reply is ignored
//! - [`Request::SetState`]: state updates, including [`SelectionRequest`] telemetry
//!
//! # Example
//!
//! ```
//! use libtabnine::protocol::{encode_request, AutocompleteRequest, Request};
//!
//! let request = Request::autocomplete(AutocompleteRequest::new("let x = ", "", Some("main.rs")));
//! let line = encode_request(&request).unwrap();
//! assert!(line.starts_with(br#"{"version":"2.0.0","request":{"Autocomplete":"#));
//! assert!(line.ends_with(b"\n"));
//! ```

mod envelope;
mod requests;
mod responses;
mod selection;

pub use envelope::{decode_response, encode_request, Envelope, PROTOCOL_VERSION};
pub use requests::{
    AutocompleteRequest, Empty, PrefetchRequest, Request, SetStateRequest, StateType,
    DEFAULT_MAX_RESULTS,
};
pub use responses::{AutocompleteResponse, Capabilities, CompletionCandidate, Origin};
pub use selection::{LineBounds, SelectionContext, SelectionRequest, SuggestionSummary};
