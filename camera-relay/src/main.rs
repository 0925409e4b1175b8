//! Camera Relay - run gphoto2 commands over HTTP
//!
//! Configuration comes from flags or their environment variables
//! (`BASE_DIR`, `PORT`, `GPHOTO2_BIN`, `CAMERA_PORT`, ...). See `--help`.

use anyhow::Result;
use clap::Parser;

use camera_relay::{init::init_tracing, server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    init_tracing()?;

    tracing::info!("Starting camera relay");
    tracing::info!("gphoto2 executable: {}", config.gphoto2_bin.display());
    match &config.base_dir {
        Some(dir) => tracing::info!("Filenames confined to {}", dir.display()),
        None => tracing::info!("No base directory, filenames passed through"),
    }
    if let Some(port) = &config.camera_port {
        tracing::info!("Camera port: {}", port);
    }
    if config.serialize_invocations {
        tracing::info!("Camera commands run one at a time");
    } else {
        tracing::warn!("Concurrent requests may run camera commands simultaneously");
    }

    server::serve(config).await?;

    tracing::info!("Server shutting down");
    Ok(())
}
