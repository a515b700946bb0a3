use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::framework::{
    Component, ComponentError, ConfigureContext, ErrorReporter, ReadySignal, ShutdownSignal,
};

/// Periodic worker: increments a shared counter every interval until shutdown.
///
/// Settings:
/// - `heartbeat.interval-ms` (`HEARTBEAT_INTERVAL_MS`), default `1000`, must be positive
#[derive(Debug)]
pub struct Heartbeat {
    interval: Duration,
    beats: Arc<AtomicU64>,
}

impl Heartbeat {
    pub const ID: &'static str = "heartbeat";
    pub const INTERVAL_KEY: &'static str = "heartbeat.interval-ms";
    const DEFAULT_INTERVAL_MS: u64 = 1000;

    pub fn new(beats: Arc<AtomicU64>) -> Self {
        Self {
            interval: Duration::from_millis(Self::DEFAULT_INTERVAL_MS),
            beats,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Component for Heartbeat {
    fn id(&self) -> &str {
        Self::ID
    }

    async fn configure(&mut self, ctx: &ConfigureContext<'_>) -> Result<(), ComponentError> {
        let millis = ctx
            .settings()
            .parse::<u64>(Self::INTERVAL_KEY)?
            .unwrap_or(Self::DEFAULT_INTERVAL_MS);
        if millis == 0 {
            return Err(ComponentError::InvalidSetting {
                key: Self::INTERVAL_KEY.to_string(),
                reason: "interval must be positive".to_string(),
            });
        }
        self.interval = Duration::from_millis(millis);
        Ok(())
    }

    async fn run(&self, ready: ReadySignal, shutdown: ShutdownSignal, _errors: ErrorReporter) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_ms = self.interval.as_millis() as u64, "heartbeat ready");
        ready.ready();

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = ticker.tick() => {
                    let n = self.beats.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(beats = n, "tick");
                }
            }
        }
        info!(beats = self.beats.load(Ordering::Relaxed), "heartbeat stopped");
    }
}
