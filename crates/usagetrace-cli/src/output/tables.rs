use std::path::PathBuf;
use usagetrace_runtime::FileState;

use super::Palette;

pub fn render_file_states(states: &[FileState], palette: &Palette) -> String {
    if states.is_empty() {
        return "No imported files.\n".to_string();
    }

    let mut lines = vec![palette.bold(&format!(
        "{:<12} {:>8}  {:<19}  {}",
        "SOURCE", "RECORDS", "LAST IMPORTED", "PATH"
    ))];
    for state in states {
        lines.push(format!(
            "{:<12} {:>8}  {:<19}  {}",
            state.source.as_str(),
            state.record_count,
            state.last_imported.format("%Y-%m-%d %H:%M:%S"),
            state.file_path.display()
        ));
    }
    lines.push(palette.dim(&format!("{} file(s)", states.len())));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// One source as reported by `usagetrace sources`
pub struct SourceRow {
    pub name: &'static str,
    pub description: &'static str,
    pub env_var: &'static str,
    pub root: PathBuf,
    pub enabled: bool,
}

pub fn render_sources(rows: &[SourceRow], palette: &Palette) -> String {
    let mut lines = Vec::new();
    for row in rows {
        let status = if !row.enabled {
            palette.dim("disabled")
        } else if row.root.exists() {
            palette.green("found")
        } else {
            palette.yellow("missing")
        };
        lines.push(format!("{} ({})", palette.bold(row.name), row.description));
        lines.push(format!("  root:   {} [{}]", row.root.display(), status));
        lines.push(format!("  env:    {}", row.env_var));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use usagetrace_types::{Fingerprint, SourceType};

    #[test]
    fn test_empty_state_table() {
        assert_eq!(render_file_states(&[], &Palette::plain()), "No imported files.\n");
    }

    #[test]
    fn test_state_rows() {
        let states = vec![FileState {
            source: SourceType::Codex,
            file_path: PathBuf::from("/s/rollout-a.jsonl"),
            fingerprint: Fingerprint::new("ab"),
            last_imported: Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap(),
            record_count: 7,
        }];
        let out = render_file_states(&states, &Palette::plain());
        assert!(out.contains("codex"));
        assert!(out.contains("2025-06-01 09:30:00"));
        assert!(out.contains("/s/rollout-a.jsonl"));
        assert!(out.ends_with("1 file(s)\n"));
    }

    #[test]
    fn test_sources_status() {
        let rows = vec![SourceRow {
            name: "gemini",
            description: "Gemini CLI",
            env_var: "GEMINI_HOME",
            root: PathBuf::from("/definitely/not/here"),
            enabled: true,
        }];
        let out = render_sources(&rows, &Palette::plain());
        assert!(out.contains("gemini (Gemini CLI)"));
        assert!(out.contains("[missing]"));
    }
}
