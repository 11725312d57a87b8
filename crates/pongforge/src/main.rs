//! Pongforge server binary.
//!
//! Listens on `0.0.0.0:$PORT` (default 4000). Log verbosity comes from
//! `RUST_LOG` and defaults to `info`.

use pongforge::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), PongforgeError> {
    init_tracing("info");

    let config = ServerConfig::from_env()?;
    let server = PongServer::bind(config).await?;
    if let Ok(addr) = server.local_addr() {
        info!(%addr, "Pongforge listening");
    }

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
