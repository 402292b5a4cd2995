use clap::Parser;
use hawkeye_common::display::{self, CycleView};
use hawkeye_common::events::{self, ConsoleProgress};
use hawkeye_common::poll::sleep_or_cancel;
use hawkeye_common::projects::list_projects;
use hawkeye_common::sessions::{
    create_session, inspect_session, poll_for_completion, send_prompt, stream_prompt,
};
use hawkeye_common::sse::streaming::DecodeOptions;
use hawkeye_common::{logging, HawkeyeConfig};
use session_cli::select;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const DEFAULT_PROMPT: &str = "Analyze my EKS cluster for security best practices";

/// Wait before the single inspect used when no cycle id came back.
const FALLBACK_WAIT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "create-session")]
#[command(about = "Create a Hawkeye session in a project and send it a prompt")]
struct Cli {
    /// Project number from the printed list (asked interactively if omitted)
    #[arg(long)]
    project: Option<usize>,

    /// Prompt text (asked interactively if omitted)
    #[arg(long)]
    prompt: Option<String>,

    /// Stream the response instead of polling (also enabled by STREAM_RESPONSE=true)
    #[arg(long)]
    stream: bool,

    /// Maximum polling attempts
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Delay between polling attempts in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,
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
    let mut config = HawkeyeConfig::from_env()?;
    if let Some(max_attempts) = cli.max_attempts {
        config.poll_max_attempts = max_attempts;
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.poll_interval = Duration::from_millis(interval_ms);
    }
    let client = hawkeye_common::connect(&config).await?;
    let organization_uuid = &config.organization_uuid;

    events::log_stderr("Getting projects list...");
    let projects = list_projects(&client).await?;
    display::print_projects(&projects, false);
    if projects.is_empty() {
        return Ok(());
    }

    let project = select::choose(&projects, cli.project, "project")?;
    println!("\nSelected project: {} ({})", project.name, project.uuid);

    events::log_stderr(&format!("Creating new session in project {}...", project.name));
    let session = create_session(&client, &project.uuid, organization_uuid).await?;
    events::emit_session_created(&session.session_uuid);

    let prompt = match cli.prompt {
        Some(prompt) => prompt,
        None => {
            let answer = select::ask(&format!(
                "\nEnter your prompt (or press Enter for default: \"{}\"): ",
                DEFAULT_PROMPT
            ))?;
            if answer.is_empty() { DEFAULT_PROMPT.to_string() } else { answer }
        }
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let streaming = cli.stream || config.stream_response;
    events::emit_prompt_sending(&prompt, streaming);

    if streaming {
        let started = Instant::now();
        let options = DecodeOptions {
            cancel: Some(cancel),
            ..DecodeOptions::default()
        };
        let result = stream_prompt(
            &client,
            &session.session_uuid,
            &project.uuid,
            &prompt,
            ConsoleProgress::new(),
            &options,
        )
        .await?;
        events::emit_stream_finished(started.elapsed().as_millis() as u64);
        println!("Prompt sent successfully.");
        if let Some(id) = &result.message_id {
            println!("Message ID: {}", id);
        }
    } else {
        let result = send_prompt(&client, &session.session_uuid, &project.uuid, &prompt).await?;
        println!("Prompt sent successfully.");

        match &result.message_id {
            Some(cycle_id) => {
                println!("Message ID: {}", cycle_id);
                let poller = config.poller().with_cancellation(cancel);
                let cycle = poll_for_completion(
                    &client,
                    &session.session_uuid,
                    cycle_id,
                    &project.uuid,
                    organization_uuid,
                    &poller,
                )
                .await?;
                display::print_cycles(&[cycle], Some(&prompt), CycleView::Summary);
            }
            None => {
                events::log_stderr("Waiting for processing to complete...");
                sleep_or_cancel(FALLBACK_WAIT, Some(&cancel)).await?;
                let details =
                    inspect_session(&client, &session.session_uuid, &project.uuid, organization_uuid)
                        .await?;
                display::print_cycles(&details.prompt_cycles, Some(&prompt), CycleView::Summary);
            }
        }
    }

    println!("\nNext Steps:");
    println!("  - To view this session again, run: list-sessions");
    println!("  - Session UUID: {}", session.session_uuid);
    Ok(())
}
