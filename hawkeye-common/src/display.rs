//! Console rendering of projects, sessions and prompt cycles.

use regex::Regex;
use std::sync::OnceLock;

use crate::events::preview_str;
use crate::projects::Project;
use crate::sessions::{CycleStatus, PromptCycle, SessionSummary};

/// API dates look like `04/04/25 02:22:51.047412` (DD/MM/YY).
/// Anything else is returned unchanged.
pub fn format_api_date(date: Option<&str>) -> String {
    let Some(date) = date.filter(|d| !d.is_empty()) else {
        return "N/A".to_string();
    };
    let Some((day_part, time_part)) = date.split_once(' ') else {
        return date.to_string();
    };
    if time_part.contains(' ') {
        return date.to_string();
    }
    let fields: Vec<&str> = day_part.split('/').collect();
    let [day, month, year] = fields.as_slice() else {
        return date.to_string();
    };
    format!("20{}-{}-{} {}", year, month, day, time_part)
}

/// Turn `<br>` into newlines and strip remaining HTML tags.
pub fn clean_answer(answer: &str) -> String {
    static BR: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();
    let br = BR.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
    let tag = TAG.get_or_init(|| Regex::new(r"</?[^>]+(>|$)").expect("valid regex"));
    let with_breaks = br.replace_all(answer, "\n");
    tag.replace_all(&with_breaks, "").into_owned()
}

/// The answer from its `**Analysis:**` heading on, or the whole answer.
pub fn analysis_section(answer: &str) -> &str {
    match answer.find("**Analysis:**") {
        Some(idx) => &answer[idx..],
        None => answer,
    }
}

pub fn print_projects(projects: &[Project], detailed: bool) {
    println!("\nProjects:");
    println!("=========");
    if projects.is_empty() {
        println!("No projects found.");
        return;
    }
    for (index, project) in projects.iter().enumerate() {
        println!("{}. {} ({})", index + 1, project.name, project.uuid);
        println!("   Description: {}", project.description.as_deref().unwrap_or("N/A"));
        if detailed {
            println!("   Created: {}", format_api_date(project.create_time.as_deref()));
            println!("   Updated: {}", format_api_date(project.update_time.as_deref()));
            println!("   State: {}", project.project_state.as_deref().unwrap_or("N/A"));
            println!("   Sync State: {}", project.sync_state.as_deref().unwrap_or("N/A"));
            println!("   Training State: {}", project.training_state.as_deref().unwrap_or("N/A"));
        }
        println!("---");
    }
}

pub fn print_sessions(sessions: &[SessionSummary]) {
    println!("\nSessions:");
    println!("=========");
    if sessions.is_empty() {
        println!("No sessions found for this project.");
        return;
    }
    for (index, session) in sessions.iter().enumerate() {
        println!(
            "{}. {} ({})",
            index + 1,
            session.name.as_deref().unwrap_or("Unnamed"),
            session.session_uuid
        );
        println!("   Created: {}", session.create_time.as_deref().unwrap_or("N/A"));
        println!("   Last Updated: {}", session.last_update.as_deref().unwrap_or("N/A"));
        println!("   Prompt Cycles: {}", session.prompt_cycle_ids.len());
        println!("---");
    }
}

/// How much of each cycle to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleView {
    /// Right after sending a prompt: cleaned answer, shortened investigations, status.
    Summary,
    /// Inspecting an existing session: analysis section, sources and follow-ups.
    Full,
}

pub fn print_cycles(cycles: &[PromptCycle], fallback_question: Option<&str>, view: CycleView) {
    println!("\nSession Details:");
    println!("===============");
    if cycles.is_empty() {
        println!("No prompt cycles found in this session yet.");
        return;
    }

    for (index, cycle) in cycles.iter().enumerate() {
        println!("\nPrompt Cycle #{}:", index + 1);
        println!("----------------");
        let question = cycle.question().or(fallback_question).unwrap_or("N/A");
        println!("Question: {}", question);

        match (view, cycle.final_answer.as_deref()) {
            (CycleView::Summary, Some(answer)) => println!("\nAnswer: {}", clean_answer(answer)),
            (CycleView::Summary, None) => println!("\nAnswer: Processing..."),
            (CycleView::Full, answer) => {
                println!("\nAnswer: {}", analysis_section(answer.unwrap_or("N/A")))
            }
        }

        if !cycle.chain_of_thoughts.is_empty() {
            println!("\nAnalysis Steps:");
            for (step_index, step) in cycle.chain_of_thoughts.iter().enumerate() {
                println!("  {}. {}", step_index + 1, step.description.as_deref().unwrap_or("N/A"));
                if let Some(investigation) = &step.investigation {
                    let shown = match view {
                        CycleView::Summary => preview_str(investigation, 150, true),
                        CycleView::Full => investigation.clone(),
                    };
                    println!("     Investigation: {}", shown);
                }
            }
        }

        if view == CycleView::Full {
            if !cycle.sources.is_empty() {
                println!("\nSources Used:");
                for (source_index, source) in cycle.sources.iter().enumerate() {
                    let label = source
                        .title
                        .as_deref()
                        .or(source.id.as_deref())
                        .unwrap_or("Unnamed Source");
                    println!("  {}. {}", source_index + 1, label);
                }
            }
            if !cycle.follow_up_suggestions.is_empty() {
                println!("\nFollow-up Suggestions:");
                for (i, suggestion) in cycle.follow_up_suggestions.iter().enumerate() {
                    println!("  {}. {}", i + 1, suggestion);
                }
            }
        } else {
            let status = cycle.status.as_ref().map_or("Unknown", CycleStatus::as_str);
            println!("\nStatus: {}", status);
        }

        println!("---");
    }
}
