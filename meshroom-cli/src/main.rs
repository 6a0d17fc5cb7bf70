use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use meshroom_core::IceServerConfig;
use meshroom_server::ServerConfig;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshroom")]
#[command(about = "Signaling relay for full-mesh audio/video sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the relay.
    Serve {
        /// Address to listen on. Flags override the `MESHROOM_*` and `TURN_*`
        /// environment variables.
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Single origin allowed by CORS.
        #[arg(long)]
        allowed_origin: Option<String>,

        /// TURN server advertised to clients next to the default STUN servers.
        #[arg(long)]
        turn_url: Option<String>,

        #[arg(long, requires = "turn_url")]
        turn_username: Option<String>,

        #[arg(long, requires = "turn_url")]
        turn_credential: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve {
            bind,
            allowed_origin,
            turn_url,
            turn_username,
            turn_credential,
        } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if allowed_origin.is_some() {
                config.allowed_origin = allowed_origin;
            }
            if let Some(url) = turn_url {
                config.ice_servers.push(IceServerConfig {
                    urls: vec![url],
                    username: turn_username,
                    credential: turn_credential,
                });
            }

            println!("{}", "Starting meshroom relay...".green().bold());
            info!(
                bind = %config.bind_addr,
                ice_servers = config.ice_servers.len(),
                session_capacity = config.session_capacity,
                "Relay configuration"
            );
            match &config.allowed_origin {
                Some(origin) => info!("Allowed origin: {}", origin.cyan()),
                None => info!("Allowing any origin"),
            }

            meshroom_server::serve(config).await
        }
    }
}
