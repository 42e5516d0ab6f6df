//! TestWorld pattern for declarative integration test setup.

use anyhow::Result;
use assert_cmd::Command;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use usagetrace_providers::SourceRoots;

/// Environment variables that would point the CLI at the real user's logs
const ISOLATED_VARS: &[&str] = &["CLAUDE_CONFIG_DIR", "CODEX_HOME", "GEMINI_HOME", "USAGETRACE_PATH", "RUST_LOG"];

/// An isolated home directory with default log-root layout.
///
/// # Example
/// ```no_run
/// use usagetrace_testing::TestWorld;
/// use usagetrace_testing::fixtures;
///
/// let world = TestWorld::new();
/// world.write_claude_session("app", "s1", &fixtures::claude_two_line_session()).unwrap();
///
/// let result = world.run(&["import", "--yes"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    home: PathBuf,
    data_dir: PathBuf,
    roots: SourceRoots,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let home = temp_dir.path().join("home");
        let data_dir = temp_dir.path().join(".usagetrace");
        std::fs::create_dir_all(&home).expect("Failed to create home dir");

        Self {
            roots: SourceRoots::under(&home),
            temp_dir,
            home,
            data_dir,
            env_vars: HashMap::new(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Default roots under this world's home directory
    pub fn roots(&self) -> &SourceRoots {
        &self.roots
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write `<claude root>/<project>/<session_id>.jsonl`
    pub fn write_claude_session(&self, project: &str, session_id: &str, lines: &[String]) -> Result<PathBuf> {
        let path = self
            .roots
            .claude_code
            .join(project)
            .join(format!("{}.jsonl", session_id));
        write_lines(&path, lines)?;
        Ok(path)
    }

    /// Write `<codex root>/<day>/rollout-<stem>.jsonl`; `day` is `YYYY/MM/DD`
    pub fn write_codex_rollout(&self, day: &str, stem: &str, lines: &[String]) -> Result<PathBuf> {
        let path = self.roots.codex.join(day).join(format!("rollout-{}.jsonl", stem));
        write_lines(&path, lines)?;
        Ok(path)
    }

    /// Write `<gemini root>/<project_hash>/chats/session-<name>.json`
    pub fn write_gemini_session(&self, project_hash: &str, name: &str, session: &Value) -> Result<PathBuf> {
        let path = self
            .roots
            .gemini
            .join(project_hash)
            .join("chats")
            .join(format!("session-{}.json", name));
        write_file(&path, &serde_json::to_string_pretty(session)?)?;
        Ok(path)
    }

    /// Append lines to an existing session file
    pub fn append_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().append(true).open(path)?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    /// Point a CLI command at this world: data dir, home and a clean environment
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(self.data_dir());
        cmd.current_dir(self.temp_dir.path());
        cmd.env("HOME", &self.home);
        cmd.env("NO_COLOR", "1");
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run the `usagetrace` binary with `args` in this world
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        self.run_with_stdin(args, "")
    }

    /// Like `run`, feeding `stdin` to the process (e.g. a prompt answer)
    #[allow(deprecated)]
    pub fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("usagetrace")
            .map_err(|e| anyhow::anyhow!("Failed to find usagetrace binary: {}", e))?;
        self.configure_command(&mut cmd);
        cmd.args(args);
        cmd.write_stdin(stdin.to_string());

        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut content = lines.join("\n");
    content.push('\n');
    write_file(path, &content)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}
