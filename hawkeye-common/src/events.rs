//! Progress messages on stderr for real-time user feedback.
//! Stdout is kept for the data the scripts print.

use std::io::Write;

use crate::sse::streaming::StreamObserver;

pub fn log_stderr(msg: &str) {
    eprintln!("[hawkeye] {}", msg);
}

pub fn emit_authenticating() {
    eprintln!("[hawkeye] \u{1f511} Authenticating...");
}

pub fn emit_session_created(session_uuid: &str) {
    eprintln!("[hawkeye] \u{2705} Session created: {}", session_uuid);
}

pub fn emit_prompt_sending(prompt: &str, streaming: bool) {
    let mode = if streaming { "streaming" } else { "polling" };
    eprintln!("[hawkeye] \u{1f4e8} Sending prompt ({}): {}", mode, preview_str(prompt, 80, true));
}

pub fn emit_poll_waiting(attempt: u32, max_attempts: u32) {
    eprintln!("[hawkeye]   \u{2502} waiting for completion... (attempt {}/{})", attempt, max_attempts);
}

pub fn emit_poll_completed(attempts: u32) {
    eprintln!(
        "[hawkeye]   \u{2514}\u{2500} prompt cycle completed after {} polling attempt{}",
        attempts,
        if attempts == 1 { "" } else { "s" }
    );
}

pub fn emit_stream_finished(elapsed_ms: u64) {
    eprintln!("\n[hawkeye] Stream finished ({:.1}s)", elapsed_ms as f64 / 1000.0);
}

/// Console observer: progress overwrites a single line, chat previews are
/// printed as they arrive.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    last_progress: Option<String>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_progress(&self) -> Option<&str> {
        self.last_progress.as_deref()
    }
}

impl StreamObserver for ConsoleProgress {
    fn on_progress(&mut self, status: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "Progress: {}\r", status);
        let _ = stderr.flush();
        self.last_progress = Some(status.to_string());
    }

    fn on_chat_response(&mut self, preview: &str) {
        eprintln!("\nReceived partial answer:");
        eprintln!("------------------------");
        eprintln!("{}...", preview);
    }
}

/// First `max_chars` characters of `s`, with `...` appended when cut and `ellipsis` is set.
pub fn preview_str(s: &str, max_chars: usize, ellipsis: bool) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) if ellipsis => format!("{}...", &s[..idx]),
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
