use alert_webhook::{router, AppState};
use clap::Parser;
use hawkeye_common::{logging, ConfigError, HawkeyeConfig};

#[derive(Parser)]
#[command(name = "alert-webhook")]
#[command(about = "Receive Alertmanager webhooks and ask Hawkeye to investigate firing alerts")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "WEBHOOK_ADDR", default_value = "0.0.0.0:8000")]
    addr: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging();

    if let Err(e) = run(cli).await {
        eprintln!("[alert-webhook] Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = HawkeyeConfig::from_env()?;
    let project = config
        .project
        .clone()
        .ok_or(ConfigError::Missing("HAWKEYE_PROJECT"))?;

    let listener = tokio::net::TcpListener::bind(&cli.addr).await?;
    tracing::info!(addr = %cli.addr, %project, "alert webhook listening");
    eprintln!("[alert-webhook] listening on {}", cli.addr);

    axum::serve(listener, router(AppState::new(config, &project))).await?;
    Ok(())
}
