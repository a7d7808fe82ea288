//! Terminal styling utilities

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
    __  __  ___  ____ _____ ___ ____
   |  \/  |/ _ \|  _ \_   _|_ _/ ___|
   | |\/| | | | | |_) || |  | |\___ \
   | |  | | |_| |  _ < | |  | | ___) |
   |_|  |_|\___/|_| \_\|_| |___|____/
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Mortality reports from spreadsheet inputs").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Settings shown in the configuration card
pub struct ConfigCard<'a> {
    pub data_dir: &'a Path,
    pub year: i32,
    pub output: Option<&'a Path>,
    pub export_dir: Option<&'a Path>,
    pub server: Option<&'a str>,
}

/// Print configuration card
pub fn print_config(card: &ConfigCard<'_>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Data:   {:<39}│",
        FOLDER,
        truncate_path(card.data_dir, 38)
    );
    println!(
        "    │  {} Year:   {:<39}│",
        CALENDAR,
        style(card.year).yellow()
    );
    if let Some(output) = card.output {
        println!("    │  {} Page:   {:<39}│", SAVE, truncate_path(output, 38));
    }
    if let Some(dir) = card.export_dir {
        println!("    │  {} Export: {:<39}│", SAVE, truncate_path(dir, 38));
    }
    if let Some(server) = card.server {
        println!(
            "    │  {} Serve:  {:<39}│",
            GLOBE,
            truncate_string(&format!("http://{}", server), 38)
        );
    }
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print elapsed time for a step
pub fn print_step_time(elapsed: std::time::Duration) {
    println!(
        "      {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion(message: &str) {
    println!();
    println!("    {} {}", ROCKET, style(message).green().bold());
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - max_len + 3).collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_string("data", 10), "data");
    }

    #[test]
    fn test_truncate_keeps_tail() {
        let truncated = truncate_string("/very/long/path/to/data", 10);
        assert_eq!(truncated.chars().count(), 10);
        assert!(truncated.starts_with("..."));
        assert!(truncated.ends_with("data"));
    }

    #[test]
    fn test_truncate_multibyte() {
        let truncated = truncate_string("ÁÉÍÓÚÁÉÍÓÚÁÉÍÓÚ", 8);
        assert_eq!(truncated, "...ÁÉÍÓÚ");
    }
}
