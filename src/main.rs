use std::process::ExitCode;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use service_orchestrator::components::{Heartbeat, StatusListener};
use service_orchestrator::config::{OrchestratorConfig, ServiceArgs, ServiceInfo};
use service_orchestrator::framework::OrchestratorError;
use service_orchestrator::lifecycle::{setup_tracing, Orchestrator, NO_DEPS};

fn service_info() -> ServiceInfo {
    ServiceInfo::new(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_COMMIT").unwrap_or("dev"),
    )
}

async fn serve(args: &ServiceArgs) -> Result<(), OrchestratorError> {
    let mut orchestrator = Orchestrator::new(service_info(), OrchestratorConfig::from(args));

    match orchestrator.info().to_json() {
        Ok(json) => info!(service = %json, "starting service"),
        Err(e) => error!(error = %e, "unable to render service info"),
    }

    let beats = Arc::new(AtomicU64::new(0));
    orchestrator.register_component(Heartbeat::new(beats.clone()), NO_DEPS)?;
    orchestrator.register_component(StatusListener::new(beats), NO_DEPS)?;

    orchestrator.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = ServiceArgs::parse();

    if args.version {
        return match service_info().to_json() {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("unable to render service info: {e}");
                ExitCode::FAILURE
            }
        };
    }

    setup_tracing(args.log_format, args.debug);

    match serve(&args).await {
        Ok(()) => {
            info!("service stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, label = e.as_label(), "service failed");
            ExitCode::FAILURE
        }
    }
}
