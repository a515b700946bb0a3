use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::components::Heartbeat;
use crate::config::ServiceInfo;
use crate::framework::{
    Component, ComponentError, ConfigureContext, ErrorReporter, ReadySignal, ShutdownSignal,
};

/// One line written to every accepted connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    pub service: String,
    pub version: String,
    pub build: String,
    pub heartbeats: u64,
}

/// TCP listener reporting service identity and heartbeat count.
///
/// Settings:
/// - `status-listener.addr` (`STATUS_LISTENER_ADDR`), default `127.0.0.1:8080`
///
/// Readiness is signalled once the socket is bound; a bind failure is a startup error.
#[derive(Debug)]
pub struct StatusListener {
    addr: SocketAddr,
    service: Option<ServiceInfo>,
    beats: Arc<AtomicU64>,
    bound: Arc<OnceLock<SocketAddr>>,
}

impl StatusListener {
    pub const ID: &'static str = "status-listener";
    pub const ADDR_KEY: &'static str = "status-listener.addr";
    const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 8080);

    /// `beats` is the counter shared with [`Heartbeat`].
    pub fn new(beats: Arc<AtomicU64>) -> Self {
        Self {
            addr: SocketAddr::from(Self::DEFAULT_ADDR),
            service: None,
            beats,
            bound: Arc::new(OnceLock::new()),
        }
    }

    /// Configured address (port `0` until bound means "any").
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Cell filled with the actually bound address once the listener is ready.
    pub fn bound_addr(&self) -> Arc<OnceLock<SocketAddr>> {
        self.bound.clone()
    }

    fn status_line(&self) -> StatusLine {
        let (service, version, build) = match &self.service {
            Some(info) => (info.name.clone(), info.version.clone(), info.build.clone()),
            None => Default::default(),
        };
        StatusLine {
            service,
            version,
            build,
            heartbeats: self.beats.load(Ordering::Relaxed),
        }
    }

    async fn answer(&self, mut stream: TcpStream, peer: SocketAddr) {
        let mut line = match serde_json::to_vec(&self.status_line()) {
            Ok(line) => line,
            Err(e) => {
                warn!(%peer, error = %e, "unable to encode status");
                return;
            }
        };
        line.push(b'\n');
        if let Err(e) = stream.write_all(&line).await {
            warn!(%peer, error = %e, "unable to write status");
            return;
        }
        let _ = stream.shutdown().await;
        debug!(%peer, "status served");
    }
}

#[async_trait]
impl Component for StatusListener {
    fn id(&self) -> &str {
        Self::ID
    }

    fn depends_on(&self) -> Vec<String> {
        vec![Heartbeat::ID.to_string()]
    }

    async fn configure(&mut self, ctx: &ConfigureContext<'_>) -> Result<(), ComponentError> {
        if let Some(addr) = ctx.settings().parse::<SocketAddr>(Self::ADDR_KEY)? {
            self.addr = addr;
        }
        self.service = Some(ctx.service().clone());
        Ok(())
    }

    async fn run(&self, ready: ReadySignal, shutdown: ShutdownSignal, errors: ErrorReporter) {
        let listener = match TcpListener::bind(self.addr).await {
            Ok(listener) => listener,
            Err(e) => {
                errors.report(e);
                return;
            }
        };
        let local = match listener.local_addr() {
            Ok(local) => local,
            Err(e) => {
                errors.report(e);
                return;
            }
        };
        let _ = self.bound.set(local);

        info!(addr = %local, "listening");
        ready.ready();

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.answer(stream, peer).await,
                    Err(e) => {
                        errors.report(e);
                        shutdown.wait().await;
                        break;
                    }
                },
            }
        }
        info!(addr = %local, "listener closed");
    }
}
