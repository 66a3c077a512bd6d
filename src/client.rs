//! High-level engine client.
//!
//! This module provides [`EngineClient`], the entry point editors use to talk
//! to the completion engine. Every method returns `Option`: `None` means the
//! engine gave no usable answer, and the reason has already been logged.
//!
//! # Example
//!
//! ```ignore
//! use libtabnine::protocol::AutocompleteRequest;
//! use libtabnine::EngineClient;
//!
//! let client = EngineClient::builder()
//!     .binaries_dir("/opt/tabnine/binaries")
//!     .client_version("4.0")
//!     .plugin_version("1.2.0")
//!     .build()?;
//!
//! if let Some(reply) = client.autocomplete(AutocompleteRequest::new("let x = ", ";", Some("main.rs"))) {
//!     for candidate in reply.results {
//!         println!("{}", candidate.new_prefix);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{EngineConfig, EngineConfigBuilder, EngineSettings};
use crate::process::{EngineLauncher, Launcher};
use crate::protocol::{
    encode_request, AutocompleteRequest, AutocompleteResponse, Capabilities, Request,
    SelectionContext, SelectionRequest, StateType,
};
use crate::supervisor::Supervisor;
use crate::Result;

/// A client for the completion engine.
///
/// Holds a shared [`Supervisor`]; clones talk to the same engine process.
///
/// # Thread Safety
///
/// `EngineClient` is `Send + Sync`. Calls from several threads are
/// serialized by the supervisor, one request/reply exchange at a time.
pub struct EngineClient<L: Launcher = EngineLauncher> {
    supervisor: Arc<Supervisor<L>>,
}

impl<L: Launcher> Clone for EngineClient<L> {
    fn clone(&self) -> Self {
        Self {
            supervisor: Arc::clone(&self.supervisor),
        }
    }
}

impl EngineClient<EngineLauncher> {
    /// Create a client for the given configuration.
    ///
    /// The engine is started lazily on the first request.
    pub fn new(config: EngineConfig) -> Self {
        Self::from_supervisor(Arc::new(Supervisor::new(config)))
    }

    /// Create a builder for configuring a new client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Apply changed settings and restart the engine with a fresh budget.
    pub fn reconfigure_with_config(&self, config: EngineConfig) -> Result<()> {
        self.supervisor.reconfigure_with_config(config)
    }
}

impl<L: Launcher> EngineClient<L> {
    /// Wrap an existing supervisor.
    pub fn from_supervisor(supervisor: Arc<Supervisor<L>>) -> Self {
        Self { supervisor }
    }

    pub fn supervisor(&self) -> &Supervisor<L> {
        &self.supervisor
    }

    /// Send a request and return the raw reply.
    pub fn send(&self, request: &Request) -> Option<Value> {
        tracing::trace!(kind = request.kind(), "sending request");
        self.send_payload(request)
    }

    /// Send any serializable payload inside the protocol envelope.
    ///
    /// For request kinds this crate has no type for.
    pub fn send_payload<T: serde::Serialize>(&self, payload: &T) -> Option<Value> {
        let line = match encode_request(payload) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode request");
                return None;
            }
        };
        self.supervisor.interact(&line)
    }

    /// Ask the engine which features it has enabled.
    pub fn capabilities(&self) -> Option<Capabilities> {
        let reply = self.send(&Request::capabilities())?;
        decode_reply(reply, "Features")
    }

    pub fn autocomplete(&self, request: AutocompleteRequest) -> Option<AutocompleteResponse> {
        let reply = self.send(&Request::autocomplete(request))?;
        decode_reply(reply, "Autocomplete")
    }

    /// Let the engine index a file ahead of completion requests.
    pub fn prefetch(&self, filename: impl Into<String>) -> Option<Value> {
        self.send(&Request::prefetch(filename))
    }

    /// Ask the engine to open its configuration page.
    pub fn open_config(&self) -> Option<Value> {
        self.send(&Request::configuration())
    }

    /// Notify the engine that the plugin is being uninstalled.
    pub fn uninstalling(&self) -> Option<Value> {
        self.send(&Request::uninstalling())
    }

    pub fn set_state(&self, state: StateType) -> Option<Value> {
        self.send(&Request::set_state(state))
    }

    /// Report an accepted completion.
    ///
    /// A context whose selected candidate is not in the list is logged and
    /// nothing is sent.
    pub fn set_completion_state(&self, ctx: &SelectionContext<'_>) -> Option<Value> {
        match SelectionRequest::from_context(ctx) {
            Ok(selection) => self.send(&Request::selection(selection)),
            Err(e) => {
                tracing::warn!(error = %e, "dropping selection notification");
                None
            }
        }
    }

    /// Reset the restart budget and restart the engine.
    pub fn reconfigure(&self) -> Result<()> {
        self.supervisor.reconfigure()
    }

    /// Stop the engine. The next request starts a new one.
    pub fn shutdown(&self) {
        self.supervisor.shutdown();
    }
}

/// A reply of the wrong shape is logged and dropped; the engine itself is healthy.
fn decode_reply<T: DeserializeOwned>(reply: Value, kind: &str) -> Option<T> {
    match serde_json::from_value(reply) {
        Ok(typed) => Some(typed),
        Err(e) => {
            tracing::warn!(kind, error = %e, "unexpected reply shape");
            None
        }
    }
}

/// Builder for [`EngineClient`].
///
/// Delegates to [`EngineConfigBuilder`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    inner: EngineConfigBuilder,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and create the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) if the
    /// configuration is incomplete.
    pub fn build(self) -> Result<EngineClient> {
        Ok(EngineClient::new(self.inner.build()?))
    }

    // -------------------------------------------------------------------------
    // Binary location
    // -------------------------------------------------------------------------

    /// Directory holding `<version>/<platform>/<executable>` trees.
    pub fn binaries_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner = self.inner.binaries_dir(dir);
        self
    }

    /// Use this executable instead of resolving one.
    pub fn binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner = self.inner.binary_path(path);
        self
    }

    // -------------------------------------------------------------------------
    // Client metadata
    // -------------------------------------------------------------------------

    /// Client identifier passed as `--client`.
    pub fn client(mut self, client: impl Into<String>) -> Self {
        self.inner = self.inner.client(client);
        self
    }

    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.inner = self.inner.client_version(version);
        self
    }

    pub fn client_api_version(mut self, version: impl Into<String>) -> Self {
        self.inner = self.inner.client_api_version(version);
        self
    }

    pub fn plugin_version(mut self, version: impl Into<String>) -> Self {
        self.inner = self.inner.plugin_version(version);
        self
    }

    // -------------------------------------------------------------------------
    // Process options
    // -------------------------------------------------------------------------

    pub fn log_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner = self.inner.log_file_path(path);
        self
    }

    pub fn extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.inner = self.inner.extra_args(args);
        self
    }

    /// Add/override environment variable for the engine.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner = self.inner.env(key, value);
        self
    }

    /// Overlay host settings (binary override, log file, extra args).
    pub fn apply_settings(mut self, settings: &EngineSettings) -> Self {
        self.inner = self.inner.apply_settings(settings);
        self
    }

    // -------------------------------------------------------------------------
    // Supervision
    // -------------------------------------------------------------------------

    pub fn max_restarts(mut self, max: u32) -> Self {
        self.inner = self.inner.max_restarts(max);
        self
    }

    /// Give up on a reply after this long and restart the engine.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.read_timeout(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::EngineHandle;
    use crate::protocol::{CompletionCandidate, LineBounds, Origin};
    use crate::supervisor::SupervisorState;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Engine that answers each request with the next canned line.
    struct Canned {
        replies: Arc<Mutex<VecDeque<Vec<u8>>>>,
        written: Arc<Mutex<Vec<Value>>>,
    }

    impl Launcher for Canned {
        type Handle = CannedHandle;

        fn launch(&mut self) -> Result<CannedHandle> {
            Ok(CannedHandle {
                replies: Arc::clone(&self.replies),
                written: Arc::clone(&self.written),
            })
        }
    }

    struct CannedHandle {
        replies: Arc<Mutex<VecDeque<Vec<u8>>>>,
        written: Arc<Mutex<Vec<Value>>>,
    }

    impl EngineHandle for CannedHandle {
        fn id(&self) -> Option<u32> {
            None
        }

        fn has_exited(&mut self) -> bool {
            false
        }

        fn write_line(&mut self, line: &[u8]) -> Result<()> {
            assert_eq!(line.last(), Some(&b'\n'));
            let value = serde_json::from_slice(line).unwrap();
            self.written.lock().unwrap().push(value);
            Ok(())
        }

        fn read_line(&mut self) -> Result<Vec<u8>> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(Error::StreamClosed)
        }

        fn terminate(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn client(replies: &[&str]) -> (EngineClient<Canned>, Arc<Mutex<Vec<Value>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let launcher = Canned {
            replies: Arc::new(Mutex::new(
                replies.iter().map(|r| format!("{r}\n").into_bytes()).collect(),
            )),
            written: Arc::clone(&written),
        };
        let supervisor = Arc::new(Supervisor::with_launcher(launcher, 10));
        (EngineClient::from_supervisor(supervisor), written)
    }

    fn last_written(written: &Arc<Mutex<Vec<Value>>>) -> Value {
        written.lock().unwrap().last().cloned().unwrap()
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineClient>();
        assert_send_sync::<ClientBuilder>();
    }

    #[test]
    fn client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<EngineClient>();
    }

    #[test]
    fn requests_are_enveloped() {
        let (client, written) = client(&["{}"]);
        client.prefetch("/src/lib.rs").unwrap();
        assert_eq!(
            last_written(&written),
            json!({"version": "2.0.0", "request": {"Prefetch": {"filename": "/src/lib.rs"}}})
        );
    }

    #[test]
    fn capabilities_are_typed() {
        let (client, written) = client(&[r#"{"enabled_features": ["hover"]}"#]);
        let caps = client.capabilities().unwrap();
        assert!(caps.is_enabled("hover"));
        assert_eq!(last_written(&written)["request"], json!({"Features": {}}));
    }

    #[test]
    fn autocomplete_is_typed() {
        let (client, written) = client(&[
            r#"{"old_prefix": "pr", "results": [{"new_prefix": "print", "origin": "LSP"}], "user_message": []}"#,
        ]);
        let reply = client
            .autocomplete(AutocompleteRequest::new("pr", "", Some("a.py")).max_num_results(3))
            .unwrap();

        assert_eq!(reply.old_prefix, "pr");
        assert_eq!(reply.results[0].origin, Some(Origin::Lsp));
        assert_eq!(
            last_written(&written)["request"]["Autocomplete"]["max_num_results"],
            json!(3)
        );
    }

    #[test]
    fn wrong_reply_shape_is_not_penalised() {
        let (client, _) = client(&[r#"{"results": "not a list"}"#, r#"{"results": []}"#]);
        assert!(client.autocomplete(AutocompleteRequest::new("", "", None::<String>)).is_none());
        assert_eq!(client.supervisor().restart_count(), 0);
        assert_eq!(client.supervisor().state(), SupervisorState::Running);

        let reply = client
            .autocomplete(AutocompleteRequest::new("", "", None::<String>))
            .unwrap();
        assert!(reply.results.is_empty());
    }

    #[test]
    fn notifications_use_their_tags() {
        let (client, written) = client(&["{}", "{}", "{}"]);
        client.open_config().unwrap();
        assert_eq!(last_written(&written)["request"], json!({"Configuration": {}}));
        client.uninstalling().unwrap();
        assert_eq!(last_written(&written)["request"], json!({"Uninstalling": {}}));
        client
            .set_state(StateType::custom(json!({"Pause": {}})))
            .unwrap();
        assert_eq!(
            last_written(&written)["request"],
            json!({"SetState": {"state_type": {"Pause": {}}}})
        );
    }

    #[test]
    fn completion_state_is_sent_as_selection() {
        let (client, written) = client(&["{}"]);
        let completions = vec![
            CompletionCandidate::new("foo").with_origin(Origin::Vanilla),
            CompletionCandidate::new("foobar").with_origin(Origin::Cloud),
        ];
        let ctx = SelectionContext {
            file_name: "x.ts",
            current_location: 6,
            before_prefix_location: 0,
            current_line: LineBounds::new(0, 6),
            substitution: "foobar",
            selected: &completions[1],
            completions: &completions,
        };
        client.set_completion_state(&ctx).unwrap();

        let selection = &last_written(&written)["request"]["SetState"]["state_type"]["Selection"];
        assert_eq!(selection["language"], "ts");
        assert_eq!(selection["index"], 1);
        assert_eq!(selection["num_of_deep_cloud_suggestions"], 1);
    }

    #[test]
    fn invalid_selection_sends_nothing() {
        let (client, written) = client(&[]);
        let completions = vec![CompletionCandidate::new("a")];
        let stray = CompletionCandidate::new("b");
        let ctx = SelectionContext {
            file_name: "x.rs",
            current_location: 0,
            before_prefix_location: 0,
            current_line: LineBounds::new(0, 0),
            substitution: "",
            selected: &stray,
            completions: &completions,
        };
        assert!(client.set_completion_state(&ctx).is_none());
        assert!(written.lock().unwrap().is_empty());
        assert_eq!(client.supervisor().spawn_count(), 0);
    }

    #[test]
    fn clones_share_the_engine() {
        let (client, _) = client(&["{}", "{}"]);
        let other = client.clone();
        client.open_config().unwrap();
        other.open_config().unwrap();
        assert_eq!(client.supervisor().spawn_count(), 1);
    }

    #[test]
    fn builder_requires_binary_location() {
        assert!(matches!(
            EngineClient::builder().build(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn builder_chains_options() {
        let client = EngineClient::builder()
            .binaries_dir("/opt/engine")
            .client("vim")
            .client_version("9.1")
            .client_api_version("9")
            .plugin_version("0.3.0")
            .log_file_path("/tmp/engine.log")
            .extra_args(["--no-lsp"])
            .env("ENGINE_DEBUG", "1")
            .max_restarts(3)
            .read_timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        assert_eq!(client.supervisor().state(), SupervisorState::NoProcess);
        assert_eq!(client.supervisor().spawn_count(), 0);
    }

    #[test]
    fn builder_applies_settings() {
        let settings = EngineSettings::from_json_str(
            r#"{"custom_binary_path": "/usr/local/bin/engine", "extra_args": ["--debug"]}"#,
        )
        .unwrap();
        assert!(EngineClient::builder().apply_settings(&settings).build().is_ok());
    }
}
