//! Shell Timer
//!
//! Times snippets by running them in a shell process. The setup runs first,
//! then the script prints a ready marker on stdout and loops the executable
//! snippet. The clock starts when the marker arrives and stops when the
//! process exits, so neither process start-up nor setup is counted.

use benchgrid_core::{Timer, TimerError};
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::debug;

const READY_MARKER: &str = "__benchgrid_ready__";

/// Timer that runs snippets with `<shell> -c <script>`
#[derive(Debug, Clone)]
pub struct ShellTimer {
    shell: String,
}

impl Default for ShellTimer {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl ShellTimer {
    /// Timer using the given shell binary
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// The shell binary
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Build the script for one timing.
    ///
    /// Each block starts with `:` so an empty snippet is still valid shell.
    pub fn script(setup: &str, snippet: &str, loops: u64) -> String {
        format!(
            "{{\n:\n{setup}\n}} >/dev/null || exit $?\n\
             printf '%s\\n' '{marker}'\n\
             __benchgrid_n=0\n\
             while [ \"$__benchgrid_n\" -lt {loops} ]; do\n\
             {{\n:\n{snippet}\n}} || exit $?\n\
             __benchgrid_n=$((__benchgrid_n + 1))\n\
             done >/dev/null\n",
            setup = setup,
            snippet = snippet,
            loops = loops,
            marker = READY_MARKER,
        )
    }
}

impl Timer for ShellTimer {
    fn time(&self, setup: &str, snippet: &str, loops: u64) -> Result<f64, TimerError> {
        let script = Self::script(setup, snippet, loops);

        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(&script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TimerError::SnippetFailed("shell stdout was not captured".into()))?;
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        reader.read_line(&mut line)?;

        let start = Instant::now();
        if line.trim_end() != READY_MARKER {
            let status = child.wait()?;
            return Err(TimerError::SnippetFailed(format!(
                "setup did not complete ({})",
                status
            )));
        }

        let status = child.wait()?;
        let elapsed = start.elapsed().as_secs_f64();
        if !status.success() {
            return Err(TimerError::SnippetFailed(format!(
                "snippet exited with {}",
                status
            )));
        }

        debug!(loops, elapsed, "shell timing");
        Ok(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_layout() {
        let script = ShellTimer::script("x=1", "x=$((x + 1))", 16);
        assert!(script.starts_with("{\n:\nx=1\n}"));
        assert!(script.contains(READY_MARKER));
        assert!(script.contains("-lt 16 ]"));
        assert!(script.contains("{\n:\nx=$((x + 1))\n} || exit $?"));
    }

    #[cfg(unix)]
    #[test]
    fn test_times_a_loop() {
        let timer = ShellTimer::default();
        let t = timer.time("x=0", "x=$((x + 1))", 10).unwrap();
        assert!(t >= 0.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_loop_count_and_setup_functions() {
        let path = std::env::temp_dir().join(format!("benchgrid-shell-{}", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let timer = ShellTimer::default();
        let setup = format!("mark() {{ printf x >> '{}'; }}", path.display());
        timer.time(&setup, "mark", 7).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(written, "xxxxxxx");
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_snippets_are_valid() {
        let timer = ShellTimer::default();
        assert!(timer.time("", "", 3).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_failures_are_errors() {
        let timer = ShellTimer::default();
        let err = timer.time("", "exit 3", 2).unwrap_err();
        assert!(matches!(err, TimerError::SnippetFailed(_)));

        let err = timer.time("false", "true", 2).unwrap_err();
        assert!(matches!(err, TimerError::SnippetFailed(ref m) if m.contains("setup")));
    }

    #[test]
    fn test_missing_shell() {
        let timer = ShellTimer::new("/nonexistent/benchgrid-shell");
        assert!(matches!(timer.time("", "", 1), Err(TimerError::Io(_))));
    }
}
