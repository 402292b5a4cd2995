use clap::Parser;
use hawkeye_common::display::{self, CycleView};
use hawkeye_common::projects::list_projects;
use hawkeye_common::sessions::{inspect_session, list_sessions};
use hawkeye_common::{events, logging, HawkeyeConfig};
use session_cli::select;

#[derive(Parser)]
#[command(name = "list-sessions")]
#[command(about = "List the sessions of a project and inspect one of them")]
struct Cli {
    /// Project number from the printed list (asked interactively if omitted)
    #[arg(long)]
    project: Option<usize>,

    /// Session number from the printed list (asked interactively if omitted)
    #[arg(long)]
    session: Option<usize>,

    /// Organization UUID (defaults to ORGANIZATION_UUID or ORGANIZATION_NAME_ROOT)
    #[arg(long)]
    organization: Option<String>,
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
    let organization_uuid = cli.organization.unwrap_or_else(|| config.organization_uuid.clone());
    let client = hawkeye_common::connect(&config).await?;

    events::log_stderr("Getting projects list...");
    let projects = list_projects(&client).await?;
    display::print_projects(&projects, false);
    if projects.is_empty() {
        return Ok(());
    }

    let project = select::choose(&projects, cli.project, "project")?;
    println!("\nSelected project: {} ({})", project.name, project.uuid);

    events::log_stderr(&format!("Getting sessions for project {}...", project.name));
    let sessions = list_sessions(&client, &project.uuid, &organization_uuid).await?;
    display::print_sessions(&sessions);
    if sessions.is_empty() {
        return Ok(());
    }

    let session = select::choose(&sessions, cli.session, "session to inspect")?;
    println!(
        "\nSelected session: {} ({})",
        session.name.as_deref().unwrap_or("Unnamed"),
        session.session_uuid
    );

    events::log_stderr("Inspecting session...");
    let details = inspect_session(&client, &session.session_uuid, &project.uuid, &organization_uuid).await?;
    display::print_cycles(&details.prompt_cycles, None, CycleView::Full);
    Ok(())
}
