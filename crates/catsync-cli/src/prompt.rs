use std::io::{self, BufRead, Write};
use std::sync::Arc;

use catsync_gate::{ChannelGate, ConfirmationGate, GateConfig, PendingConfirmation};
use colored::Colorize;

/// A gate that asks on the terminal.
///
/// Questions are answered on a blocking thread so the sync pass stays on
/// the runtime. End of input dismisses the question.
pub fn terminal_gate(config: GateConfig) -> Arc<dyn ConfirmationGate> {
    let (gate, mut requests) = ChannelGate::new(config);
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            let pending = request.pending.clone();
            match tokio::task::spawn_blocking(move || ask(&pending)).await {
                Ok(Ok(Some(accepted))) => request.respond(accepted),
                Ok(Ok(None)) => drop(request),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "could not read answer");
                    drop(request);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "prompt task failed");
                    drop(request);
                }
            }
        }
    });
    Arc::new(gate)
}

fn ask(pending: &PendingConfirmation) -> io::Result<Option<bool>> {
    let mut out = io::stdout().lock();
    writeln!(out, "{} {}", "?".yellow().bold(), pending.question())?;
    if let Some(category) = &pending.target_category {
        writeln!(out, "  target category: {}", category.cyan())?;
    }
    write!(out, "  update this entry? [y/N] ")?;
    out.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(parse_answer(&line)))
}

fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
