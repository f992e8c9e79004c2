//! Colored output helpers for CLI
//!
//! Terminal output for `crag-server ask` and `crag-server config`.

use crate::crag::{Stage, StageRecord};
use crate::types::{Passage, PassageSource};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the startup banner
    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "CRAG".bright_cyan().bold(),
                version.dimmed(),
                "Corrective Retrieval Augmented Generation".bright_white()
            );
        } else {
            println!(
                "\n   CRAG {}\n   Corrective Retrieval Augmented Generation\n",
                version
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print the generated answer
    pub fn answer(&self, answer: &str) {
        if self.colored {
            println!("\n  {}\n", answer.bright_white().bold());
        } else {
            println!("\n  {}\n", answer);
        }
    }

    /// Print one entry of the stage path
    pub fn stage(&self, index: usize, record: &StageRecord) {
        let label = format!("{:>2}. {:<10}", index, record.stage.to_string());
        let timing = format!("{} ms", record.duration_ms);
        if self.colored {
            let label = match record.stage {
                Stage::Rewritten | Stage::Augmented => label.yellow().to_string(),
                Stage::Answered => label.green().to_string(),
                _ => label.cyan().to_string(),
            };
            println!("    {} {}", label, timing.dimmed());
        } else {
            println!("    {} {}", label, timing);
        }
    }

    /// Print a one-line summary of a passage
    pub fn passage(&self, passage: &Passage) {
        let source = match passage.source {
            PassageSource::Indexed => "indexed",
            PassageSource::Web => "web",
        };
        let reference = passage.reference.as_deref().unwrap_or("-");
        let preview: String = passage.content.chars().take(80).collect();
        if self.colored {
            println!(
                "    {} {} {}",
                format!("[{}]", source).dimmed(),
                reference.cyan(),
                preview.dimmed()
            );
        } else {
            println!("    [{}] {} {}", source, reference, preview);
        }
    }

    /// Print an empty line
    pub fn newline(&self) {
        println!();
    }
}
