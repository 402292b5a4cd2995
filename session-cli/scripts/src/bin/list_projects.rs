use clap::Parser;
use hawkeye_common::projects::list_projects;
use hawkeye_common::{display, events, logging, HawkeyeConfig};

#[derive(Parser)]
#[command(name = "list-projects")]
#[command(about = "List the Hawkeye projects available to the authenticated user")]
struct Cli {
    /// Print the raw project list as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = HawkeyeConfig::from_env()?;
    let client = hawkeye_common::connect(&config).await?;

    events::log_stderr("Getting projects list...");
    let projects = list_projects(&client).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else {
        display::print_projects(&projects, true);
    }
    Ok(())
}
