//! Subprocess execution for installer and build steps.
//!
//! Strategies run external commands (the official installer, tar,
//! configure/make) through [`run_step`], which captures output and maps
//! spawn failures into [`PyvmError::InstallationFailed`]. A non-zero exit
//! status is not an error at this layer; strategies decide whether it
//! ends the attempt, so diagnostics can carry the captured output.

use crate::core::PyvmError;
use crate::install::InstallOutcome;
use crate::version::VersionString;
use anyhow::Result;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one external step.
#[derive(Debug)]
pub(crate) struct StepOutput {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl StepOutput {
    /// The most useful diagnostic text: stderr if present, else stdout,
    /// trimmed to the last few lines.
    pub fn diagnostic(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        tail_lines(text, 20)
    }
}

/// Keep only the last `n` lines of `text`.
///
/// Build logs run to thousands of lines; the tail is where the actual
/// failure lives.
fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// Run an external command, capturing its output.
///
/// # Errors
///
/// Returns [`PyvmError::InstallationFailed`] only if the process cannot
/// be spawned at all; a non-zero exit is reported through the returned
/// [`StepOutput`].
pub(crate) async fn run_step(
    step: &str,
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
) -> Result<StepOutput> {
    debug!("[{step}] Executing: {program} {}", args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().await.map_err(|err| PyvmError::InstallationFailed {
        step: step.to_string(),
        detail: format!("failed to execute {program}: {err}"),
    })?;

    let result = StepOutput {
        code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    debug!(
        "[{step}] Completed with {}",
        result
            .code
            .map_or_else(|| "signal termination".to_string(), |c| format!("exit code {c}"))
    );

    Ok(result)
}

/// Map an installer step result onto an [`InstallOutcome`].
///
/// Exit status zero is the success signal; anything else yields a failed
/// outcome carrying the exit code and the captured output.
pub(crate) fn outcome_from_step(
    target: &VersionString,
    step: &str,
    result: &StepOutput,
) -> InstallOutcome {
    if result.success {
        InstallOutcome::success(target, format!("Python {target} installed successfully"))
    } else {
        let code = result
            .code
            .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"));
        let diagnostic = result.diagnostic();
        let message = if diagnostic.is_empty() {
            format!("{step} failed with {code}")
        } else {
            format!("{step} failed with {code}: {diagnostic}")
        };
        InstallOutcome::failure(target, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> VersionString {
        VersionString::parse("3.12.4").unwrap()
    }

    fn step_output(code: i32, stdout: &str, stderr: &str) -> StepOutput {
        StepOutput {
            code: Some(code),
            success: code == 0,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn zero_exit_maps_to_success_with_requested_version() {
        let outcome = outcome_from_step(&target(), "installer", &step_output(0, "", ""));
        assert!(outcome.succeeded);
        assert_eq!(outcome.installed_version.as_str(), "3.12.4");
    }

    #[test]
    fn nonzero_exit_maps_to_failure_with_code_captured() {
        let outcome =
            outcome_from_step(&target(), "installer", &step_output(1, "", "access denied"));
        assert!(!outcome.succeeded);
        assert!(outcome.message.contains("exit code 1"));
        assert!(outcome.message.contains("access denied"));
    }

    #[test]
    fn diagnostic_prefers_stderr_and_keeps_the_tail() {
        let long_log: String =
            (0..100).map(|i| format!("line {i}\n")).collect();
        let out = step_output(2, &long_log, "");
        let diag = out.diagnostic();
        assert!(diag.contains("line 99"));
        assert!(!diag.contains("line 0\n"));

        let out = step_output(2, "stdout noise", "stderr detail");
        assert_eq!(out.diagnostic(), "stderr detail");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn run_step_captures_exit_status_and_output() {
        let ok = run_step("probe", "sh", &["-c", "echo hi"], None).await.unwrap();
        assert!(ok.success);
        assert_eq!(ok.stdout.trim(), "hi");

        let bad = run_step("probe", "sh", &["-c", "echo oops >&2; exit 1"], None)
            .await
            .unwrap();
        assert!(!bad.success);
        assert_eq!(bad.code, Some(1));
        assert_eq!(bad.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn run_step_reports_unspawnable_program() {
        let err = run_step("probe", "definitely-not-a-real-binary-4761", &[], None)
            .await
            .unwrap_err();
        let err = err.downcast::<PyvmError>().unwrap();
        assert!(matches!(err, PyvmError::InstallationFailed { .. }));
    }
}
