mod common;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use common::{eventually, orchestrator_with};
use service_orchestrator::components::{Heartbeat, StatusListener, StatusLine};
use service_orchestrator::config::Settings;
use service_orchestrator::framework::{ComponentError, ComponentState, OrchestratorError};
use service_orchestrator::lifecycle::NO_DEPS;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

/// Test: heartbeat then listener start, the listener serves a status line, shutdown is clean.
#[tokio::test]
async fn test_demo_components_end_to_end() {
    let settings = Settings::isolated()
        .with(Heartbeat::INTERVAL_KEY, "10")
        .with(StatusListener::ADDR_KEY, "127.0.0.1:0");
    let mut orch = orchestrator_with(settings);

    let beats = Arc::new(AtomicU64::new(0));
    let listener = StatusListener::new(beats.clone());
    let bound = listener.bound_addr();
    orch.register_component(Heartbeat::new(beats.clone()), NO_DEPS)
        .unwrap();
    orch.register_component(listener, NO_DEPS).unwrap();
    assert_eq!(
        orch.bootstrap_sequence().unwrap().as_slice(),
        ["heartbeat", "status-listener"]
    );

    let handle = orch.shutdown_handle();
    let status = orch.status();
    let run = tokio::spawn(orch.run());

    eventually(|| status.get("status-listener") == Some(ComponentState::Running)).await;
    eventually(|| beats.load(Ordering::Relaxed) >= 2).await;

    let addr = *bound.get().unwrap();
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    let line: StatusLine = serde_json::from_str(raw.trim_end()).unwrap();

    assert_eq!(line.service, "demo");
    assert_eq!(line.version, "0.1.0");
    assert!(line.heartbeats >= 2);

    handle.request_shutdown();
    run.await.unwrap().unwrap();
    assert_eq!(status.get("heartbeat"), Some(ComponentState::Stopped));
    assert_eq!(status.get("status-listener"), Some(ComponentState::Stopped));
}

/// Test: an address already in use fails startup and stops the heartbeat.
#[tokio::test]
async fn test_bind_conflict_is_startup_error() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap();
    let settings = Settings::isolated().with(StatusListener::ADDR_KEY, addr.to_string());
    let mut orch = orchestrator_with(settings);

    let beats = Arc::new(AtomicU64::new(0));
    orch.register_component(Heartbeat::new(beats.clone()), NO_DEPS)
        .unwrap();
    orch.register_component(StatusListener::new(beats), NO_DEPS)
        .unwrap();
    let status = orch.status();

    let err = orch.run().await.unwrap_err();

    match err {
        OrchestratorError::Startup { component, source } => {
            assert_eq!(component, "status-listener");
            assert!(matches!(source, ComponentError::Io(_)));
        }
        other => panic!("expected startup error, got {other:?}"),
    }
    assert_eq!(status.get("heartbeat"), Some(ComponentState::Stopped));
    assert_eq!(status.get("status-listener"), Some(ComponentState::Failed));
}

/// Test: bad settings of both components are reported together, in sequence order.
#[tokio::test]
async fn test_bad_settings_are_reported_together() {
    let settings = Settings::isolated()
        .with(Heartbeat::INTERVAL_KEY, "0")
        .with(StatusListener::ADDR_KEY, "not-an-address");
    let mut orch = orchestrator_with(settings);

    let beats = Arc::new(AtomicU64::new(0));
    orch.register_component(StatusListener::new(beats.clone()), NO_DEPS)
        .unwrap();
    orch.register_component(Heartbeat::new(beats), NO_DEPS)
        .unwrap();

    let err = orch.run().await.unwrap_err();

    let OrchestratorError::Configuration(errors) = err else {
        panic!("expected configuration error");
    };
    assert_eq!(errors.components(), ["heartbeat", "status-listener"]);
    assert_eq!(errors.len(), 2);
    let rendered = errors.to_string();
    assert!(rendered.starts_with("2 component(s) failed to configure:"));
}
