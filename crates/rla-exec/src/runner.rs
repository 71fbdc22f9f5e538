use std::path::Path;
use std::process::Command;

use crate::contracts::ExecError;
use crate::contracts::ExecRequest;
use crate::contracts::ExitReport;

pub trait ProcessRunner {
    fn run(&self, request: &ExecRequest) -> Result<ExitReport, ExecError>;
}

/// Spawns the real process with inherited stdio and waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, request: &ExecRequest) -> Result<ExitReport, ExecError> {
        tracing::info!(cwd = %request.cwd.display(), command = %request, "running");
        let status = Command::new(&request.program)
            .current_dir(&request.cwd)
            .args(&request.args)
            .status()
            .map_err(|source| ExecError::Spawn {
                program: request.program.clone(),
                source,
            })?;
        let report = ExitReport::from(status);
        if !report.success() {
            tracing::warn!(program = %request.program, code = ?report.code, "process exited unsuccessfully");
        }
        Ok(report)
    }
}

/// Wraps a full command line in `sh -c` so shell syntax in it is evaluated.
pub fn shell_request(cwd: &Path, command: &str) -> ExecRequest {
    ExecRequest::new(cwd, "sh", vec!["-c".to_string(), command.to_string()])
}
