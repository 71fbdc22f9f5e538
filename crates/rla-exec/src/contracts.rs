use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    pub cwd: PathBuf,
    pub program: String,
    pub args: Vec<String>,
}

impl ExecRequest {
    pub fn new(cwd: impl Into<PathBuf>, program: &str, args: Vec<String>) -> Self {
        Self {
            cwd: cwd.into(),
            program: program.to_string(),
            args,
        }
    }
}

/// Renders the request the way it would be typed at a prompt, without quoting.
impl fmt::Display for ExecRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit code of a finished child. `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub code: Option<i32>,
}

impl ExitReport {
    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
