use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use snaplink::config::{StaticConfig, get_config, init_config, init_config_from};
use snaplink::runtime::run_server;
use snaplink::system::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "snaplink", version, about = "Expiring short links with click accounting")]
struct Cli {
    /// Path to a TOML config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Print a sample config, or write it to PATH
    GenerateConfig { path: Option<String> },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::GenerateConfig { path } => match path {
            Some(path) => {
                StaticConfig::default()
                    .save_to_file(&path)
                    .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;
                println!("Sample configuration written to {}", path);
            }
            None => println!("{}", StaticConfig::generate_sample_config()),
        },
        Command::Serve => {
            match cli.config {
                Some(ref path) => init_config_from(path).map_err(|e| {
                    eprintln!("{}", e.format_colored());
                    anyhow::anyhow!(e)
                })?,
                None => init_config(),
            }
            let config: Arc<StaticConfig> = get_config();

            let _guard = init_logging(&config.logging)?;
            info!("snaplink {} starting", env!("CARGO_PKG_VERSION"));

            run_server(config).await?;
        }
    }

    Ok(())
}
