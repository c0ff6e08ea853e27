//! Running helper scripts under the plugin's Python interpreter
//!
//! Plugin code is only ever executed in a child process. The child gets the
//! source directory as its working directory so the build process itself
//! never changes directory or environment.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonRunner {
    interpreter: PathBuf,
}

impl PythonRunner {
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Run `python -c <script> <args..>` inside `cwd`
    pub fn run_script(
        &self,
        label: &str,
        script: &str,
        args: &[&str],
        cwd: &Path,
        envs: &[(&str, &str)],
    ) -> io::Result<Output> {
        debug!(
            "Running {} with {} in {}",
            label,
            self.interpreter.display(),
            cwd.display()
        );
        let output = Command::new(&self.interpreter)
            .arg("-c")
            .arg(script)
            .args(args)
            .current_dir(cwd)
            .envs(envs.iter().copied())
            .output()?;
        log_output(label, &output);
        Ok(output)
    }
}

/// Combined stdout and stderr of a child, for error messages
pub fn output_text(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    [stdout.trim(), stderr.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

fn log_output(label: &str, output: &Output) {
    debug!("{} exited with {}", label, output.status);
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!("{} stdout: {}", label, line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        debug!("{} stderr: {}", label, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn fake_output(stdout: &str, stderr: &str) -> Output {
        use std::os::unix::process::ExitStatusExt;
        Output {
            status: std::process::ExitStatus::from_raw(0),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_output_text_joins_streams() {
        let output = fake_output("compiled\n", "  SyntaxError: bad\n");
        assert_eq!(output_text(&output), "compiled\nSyntaxError: bad");
        assert_eq!(output_text(&fake_output("", "")), "");
    }

    #[test]
    fn test_missing_interpreter_is_spawn_error() {
        let runner = PythonRunner::new("/nonexistent/dvp/python");
        let result = runner.run_script("probe", "pass", &[], Path::new("."), &[]);
        assert!(result.is_err());
    }
}
