//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use sdbridge_service::debug_log::DebugLog;
use sdbridge_service::notice::{Notice, NoticeLevel};
use sdbridge_service::transfer::TransferView;
use sdbridge_service::tree::TreeRow;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                let table = Table::new(items).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{:#?}", item);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

/// Print a notice with the marker of its level
pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => print_success(&notice.message),
        NoticeLevel::Warning => print_warning(&notice.message),
        NoticeLevel::Error => print_error(&notice.message),
    }
}

/// Draw tree rows as an indented listing
pub fn print_tree(rows: &[TreeRow], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            for row in rows {
                println!("{}", tree_line(row));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// One terminal line for a tree row; 20 indent units map to two spaces
pub fn tree_line(row: &TreeRow) -> String {
    match row {
        TreeRow::Node(node) => {
            let pad = " ".repeat(node.indent / 10);
            match node.toggle {
                Some(glyph) => format!("{}{} {}/  [{}]", pad, glyph.symbol(), node.name, node.size_label),
                None => format!("{}  {}  [{}]", pad, node.name, node.size_label),
            }
        }
        TreeRow::Placeholder {
            indent,
            placeholder,
            ..
        } => format!("{}  ({})", " ".repeat(indent / 10), placeholder.text()),
    }
}

/// Print the debug panel, if it has any lines
pub fn print_debug_panel(log: &DebugLog) {
    match log.render_panel() {
        Some(panel) => {
            println!("── Debug log ──────────────────────────────");
            println!("{}", panel);
        }
        None => println!("Debug log is empty."),
    }
}

/// Progress line for a transfer in flight
pub fn progress_line(label: &str, view: &TransferView) -> Option<String> {
    if !view.progress_visible {
        return None;
    }
    let progress = view.progress;
    let line = match progress.percent() {
        Some(percent) => format!(
            "{} {:>5.1}%  ({} / {} bytes)",
            label,
            percent,
            progress.transferred,
            progress.total.unwrap_or_default()
        ),
        None => format!("{} ...", label),
    };
    Some(line)
}
