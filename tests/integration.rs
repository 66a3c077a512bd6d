//! Integration tests for libtabnine using mock engine scripts.

#![cfg(unix)]

mod common;

use std::fs;
use std::thread;
use std::time::Duration;

use libtabnine::process::EngineLauncher;
use libtabnine::protocol::{encode_request, AutocompleteRequest, Request};
use libtabnine::{EngineClient, EngineConfig, Error, Supervisor, SupervisorState};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{
    config_for, MockEngines, CRASH_AFTER_ONE_ENGINE, ECHO_ENGINE, GARBAGE_ENGINE,
    SILENT_ENGINE, STDERR_ENGINE,
};

#[test]
fn echo_round_trip() {
    let engines = MockEngines::new();
    let client = EngineClient::new(config_for(&engines.script("echo", ECHO_ENGINE)));

    let reply = client
        .send(&Request::prefetch("/src/main.rs"))
        .expect("echo engine replies");
    assert_eq!(
        reply,
        json!({"version": "2.0.0", "request": {"Prefetch": {"filename": "/src/main.rs"}}})
    );
    assert_eq!(client.supervisor().state(), SupervisorState::Running);
    assert!(client.supervisor().pid().is_some());
}

#[test]
fn multiline_text_stays_one_line() {
    let engines = MockEngines::new();
    let client = EngineClient::new(config_for(&engines.script("echo", ECHO_ENGINE)));

    let request = Request::autocomplete(AutocompleteRequest::new(
        "fn main() {\n\tlet s = \"a\\nb\";\n",
        "\n}\n",
        Some("main.rs"),
    ));
    let reply = client.send(&request).expect("echo engine replies");
    assert_eq!(
        reply["request"]["Autocomplete"]["before"],
        "fn main() {\n\tlet s = \"a\\nb\";\n"
    );

    // The engine is still in sync for the next request.
    let reply = client.send(&Request::capabilities()).expect("second reply");
    assert_eq!(reply["request"], json!({"Features": {}}));
}

#[test]
fn engine_arguments() {
    let engines = MockEngines::new();
    let args_file = engines.path().join("args.txt");
    let binary = engines.recording_script("engine", &args_file);
    let config = EngineConfig::builder()
        .binary_path(&binary)
        .client("sublime")
        .client_version("4169")
        .plugin_version("1.2.3")
        .log_file_path("/tmp/tabnine.log")
        .extra_args(["--no_bootstrap"])
        .build()
        .unwrap();
    let client = EngineClient::new(config);

    client.send(&Request::capabilities()).expect("reply");
    let args = fs::read_to_string(&args_file).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(
        args,
        vec![
            "--client",
            "sublime",
            "--log-file-path",
            "/tmp/tabnine.log",
            "--no_bootstrap",
            "--client-metadata",
            "clientVersion=4169",
            "clientApiVersion=4169",
            "pluginVersion=1.2.3",
        ]
    );
}

#[test]
fn garbage_engine_exhausts_budget_until_reconfigured() {
    let engines = MockEngines::new();
    let config = EngineConfig::builder()
        .binary_path(engines.script("garbage", GARBAGE_ENGINE))
        .max_restarts(3)
        .build()
        .unwrap();
    let client = EngineClient::new(config);

    for _ in 0..4 {
        assert!(client.send(&Request::capabilities()).is_none());
    }
    assert_eq!(client.supervisor().state(), SupervisorState::Exhausted);
    assert_eq!(client.supervisor().restart_count(), 3);
    let spawns = client.supervisor().spawn_count();
    assert_eq!(spawns, 4);

    // No further spawns while exhausted.
    for _ in 0..5 {
        assert!(client.send(&Request::capabilities()).is_none());
    }
    assert_eq!(client.supervisor().spawn_count(), spawns);
    assert_eq!(client.supervisor().pid(), None);

    client
        .reconfigure_with_config(config_for(&engines.script("echo", ECHO_ENGINE)))
        .unwrap();
    assert_eq!(client.supervisor().restart_count(), 0);
    assert_eq!(client.supervisor().state(), SupervisorState::Running);
    assert!(client.send(&Request::capabilities()).is_some());
}

#[test]
fn exit_between_calls_restarts_once() {
    let engines = MockEngines::new();
    let client = EngineClient::new(config_for(
        &engines.script("crash", CRASH_AFTER_ONE_ENGINE),
    ));

    assert!(client.send(&Request::capabilities()).is_some());
    thread::sleep(Duration::from_millis(200));

    // The engine is gone: this call replaces it and yields nothing.
    assert!(client.send(&Request::capabilities()).is_none());
    assert_eq!(client.supervisor().restart_count(), 1);

    // The replacement answers.
    assert!(client.send(&Request::capabilities()).is_some());
    assert_eq!(client.supervisor().restart_count(), 1);
    assert_eq!(client.supervisor().spawn_count(), 2);
}

#[test]
fn stderr_is_merged_into_replies() {
    let engines = MockEngines::new();
    let client = EngineClient::new(config_for(&engines.script("stderr", STDERR_ENGINE)));

    let reply = client.send(&Request::uninstalling()).expect("reply on stderr");
    assert_eq!(reply["request"], json!({"Uninstalling": {}}));
}

#[test]
fn read_timeout_counts_as_failure() {
    let engines = MockEngines::new();
    let config = EngineConfig::builder()
        .binary_path(engines.script("silent", SILENT_ENGINE))
        .read_timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let supervisor = Supervisor::new(config);
    let line = encode_request(&Request::capabilities()).unwrap();

    let err = supervisor.try_interact(&line).unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "got {err:?}");
    assert_eq!(supervisor.restart_count(), 1);
    assert_eq!(supervisor.state(), SupervisorState::Running);
}

#[test]
fn missing_binary_is_swallowed() {
    let engines = MockEngines::new();
    let client = EngineClient::new(config_for(&engines.path().join("does-not-exist")));

    assert!(client.send(&Request::capabilities()).is_none());
    assert_eq!(client.supervisor().state(), SupervisorState::Dead);
}

#[test]
fn resolves_newest_installed_version() {
    let engines = MockEngines::new();
    let root = engines.path().join("binaries");
    let Some(_) = engines.install(&root, "3.1.0", GARBAGE_ENGINE) else {
        return;
    };
    engines.install(&root, "3.10.2", ECHO_ENGINE);
    engines.install(&root, "not-a-version", GARBAGE_ENGINE);

    let config = EngineConfig::builder().binaries_dir(&root).build().unwrap();
    let client = EngineClient::new(config);

    // Only the 3.10.2 echo engine can answer.
    assert!(client.send(&Request::capabilities()).is_some());
    assert_eq!(client.supervisor().restart_count(), 0);
}

#[test]
fn shutdown_then_request_starts_fresh_engine() {
    let engines = MockEngines::new();
    let client = EngineClient::new(config_for(&engines.script("echo", ECHO_ENGINE)));

    assert!(client.send(&Request::capabilities()).is_some());
    client.shutdown();
    assert_eq!(client.supervisor().state(), SupervisorState::NoProcess);
    assert_eq!(client.supervisor().pid(), None);

    assert!(client.send(&Request::capabilities()).is_some());
    assert_eq!(client.supervisor().spawn_count(), 2);
    assert_eq!(client.supervisor().restart_count(), 0);
}

#[test]
fn concurrent_clients_share_one_engine() {
    let engines = MockEngines::new();
    let client = EngineClient::new(config_for(&engines.script("echo", ECHO_ENGINE)));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                let file = format!("/src/file{i}.rs");
                let reply = client.send(&Request::prefetch(file.clone())).unwrap();
                assert_eq!(reply["request"]["Prefetch"]["filename"], file);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(client.supervisor().spawn_count(), 1);
}

#[test]
fn run_inherited_passes_additional_args() {
    let engines = MockEngines::new();
    let args_file = engines.path().join("args.txt");
    let body = format!("printf '%s\\n' \"$@\" > '{}'\nexit 3\n", args_file.display());
    let launcher = EngineLauncher::new(config_for(&engines.script("engine", &body)));

    let mut child = launcher.run_inherited(&["--update".to_string()]).unwrap();
    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(3));

    let args = fs::read_to_string(&args_file).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(&args[..3], &["--client", "sublime", "--update"]);
    assert_eq!(args[3], "--client-metadata");
}
