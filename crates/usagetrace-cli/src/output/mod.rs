mod summary;
mod tables;

pub use summary::{render_banner, render_progress, render_result, render_summary};
pub use tables::{SourceRow, render_file_states, render_sources};

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Applies color only when stdout is a terminal and `NO_COLOR` is unset
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn detect() -> Self {
        Self {
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.color { text.bold().to_string() } else { text.to_string() }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color { text.dimmed().to_string() } else { text.to_string() }
    }

    pub fn green(&self, text: &str) -> String {
        if self.color { text.green().to_string() } else { text.to_string() }
    }

    pub fn yellow(&self, text: &str) -> String {
        if self.color { text.yellow().to_string() } else { text.to_string() }
    }

    pub fn red(&self, text: &str) -> String {
        if self.color { text.red().to_string() } else { text.to_string() }
    }
}
