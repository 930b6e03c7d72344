use clap::{Parser, Subcommand};
use student_management::config::Config;
use student_management::error::AppResult;
use student_management::{rest, server};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// student-management - REST gateway for the student-management application
#[derive(Parser, Debug)]
#[command(name = "student-management")]
#[command(version)]
#[command(about = "REST gateway for the student-management application", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to (overrides SERVER_HOST env var)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides SERVER_PORT env var)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the effective base path and CORS mapping as JSON
    ShowConfig,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
        )
        .init();

    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { host, port } => {
            // Override config with CLI args if provided
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            server::run_server(config).await
        }
        Commands::ShowConfig => {
            let settings = rest::configure(&config.rest, &config.cors)?;
            println!("{}", serde_json::to_string_pretty(&settings.describe())?);
            Ok(())
        }
    }
}
