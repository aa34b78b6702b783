//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use aether_core::{Notice, NotificationSink};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Shows client notices on stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, notice: Notice) {
        error(&notice.user_message());

        if let Notice::RequestFailed {
            fields, trace_id, ..
        } = &notice
        {
            for field in fields {
                eprintln!("  {} {}", "-".dimmed(), field);
            }
            if let Some(trace_id) = trace_id {
                eprintln!("  {}", format!("trace id: {trace_id}").dimmed());
            }
        }
    }
}
