#![allow(dead_code)]

use std::time::Duration;

use service_orchestrator::config::{OrchestratorConfig, ServiceInfo, Settings};
use service_orchestrator::lifecycle::Orchestrator;

pub fn orchestrator() -> Orchestrator {
    orchestrator_with(Settings::isolated())
}

pub fn orchestrator_with(settings: Settings) -> Orchestrator {
    Orchestrator::new(
        ServiceInfo::new("demo", "0.1.0", "test"),
        OrchestratorConfig {
            debug: false,
            settings,
            handle_os_signals: false,
        },
    )
}

/// Polls `cond` until it holds; panics after five seconds.
pub async fn eventually(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
