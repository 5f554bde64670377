use mimalloc::MiMalloc;
use service_relay::{ServerBuilder, config::RelayConfig, error::RelayResult};
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    ServerBuilder::init_tracing();

    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "relay stopped");
            ExitCode::FAILURE
        }
    }
}

async fn start() -> RelayResult<()> {
    let config = RelayConfig::from_env()?;
    ServerBuilder::new(&config).await?.run().await
}
