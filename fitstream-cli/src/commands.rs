//! CLI command definitions and dispatch.

use std::path::PathBuf;

use clap::Subcommand;
use fitstream_core::FitstreamConfig;

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a media directory and serve it over HTTP
    Serve {
        /// Directory containing workout videos
        #[arg(long, default_value = "media")]
        media_dir: PathBuf,

        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { media_dir, port } => {
            let mut config = FitstreamConfig::default();
            config.server.port = port;
            config.library.media_dir = media_dir.clone();

            fitstream_web::run_server(config, &media_dir)
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))
        }
    }
}
