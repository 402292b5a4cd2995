//! Interactive 1-based selection for the session scripts.

use std::io::{self, BufRead, Write};

#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("failed to read selection: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid {label} selection: {input:?}")]
    Invalid { label: &'static str, input: String },
}

/// Parse a 1-based choice into an index below `len`.
pub fn parse_choice(input: &str, len: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

/// Print `question` and read one trimmed line from stdin.
pub fn ask(question: &str) -> io::Result<String> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", question)?;
    stdout.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Pick an item by preset 1-based number, or ask for one.
pub fn choose<'a, T>(
    items: &'a [T],
    preset: Option<usize>,
    label: &'static str,
) -> Result<&'a T, SelectError> {
    let input = match preset {
        Some(n) => n.to_string(),
        None => ask(&format!("\nSelect a {} (enter number): ", label))?,
    };
    parse_choice(&input, items.len())
        .map(|i| &items[i])
        .ok_or(SelectError::Invalid { label, input })
}
