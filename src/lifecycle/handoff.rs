//! Server handoff.
//!
//! # Responsibilities
//! - Build the application server command line from config
//! - Replace the bootstrap process with it
//!
//! # Design Decisions
//! - On Unix the server is exec'd so it becomes the container's main process
//!   and receives signals directly
//! - Elsewhere the server runs in the foreground and its exit status is
//!   propagated

use std::fmt;
use std::io;
use std::process::Command;

use thiserror::Error;

use crate::config::ServerConfig;

/// Errors raised when the server cannot be started.
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("failed to exec `{program}`: {source}")]
    Exec { program: String, source: io::Error },

    #[error("`{program}` exited with status {code:?}")]
    Exited { program: String, code: Option<i32> },
}

/// Fully resolved server command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ServerCommand {
    pub fn from_config(config: &ServerConfig) -> Self {
        let mut args = config.args.clone();
        args.extend([
            "--host".to_string(),
            config.host.clone(),
            "--port".to_string(),
            config.port.to_string(),
            "--workers".to_string(),
            config.workers.to_string(),
        ]);

        Self {
            program: config.program.clone(),
            args,
        }
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ServerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Starts the application server. Called exactly once per bootstrap.
pub trait Launcher {
    fn launch(&self, command: &ServerCommand) -> Result<(), HandoffError>;
}

/// Replaces the current process with the server.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecLauncher;

impl Launcher for ExecLauncher {
    #[cfg(unix)]
    fn launch(&self, command: &ServerCommand) -> Result<(), HandoffError> {
        use std::os::unix::process::CommandExt;

        tracing::info!(command = %command, "Handing off to application server");
        // Only returns on failure.
        let source = command.to_command().exec();
        Err(HandoffError::Exec {
            program: command.program.clone(),
            source,
        })
    }

    #[cfg(not(unix))]
    fn launch(&self, command: &ServerCommand) -> Result<(), HandoffError> {
        tracing::info!(command = %command, "Starting application server in foreground");
        let status = command
            .to_command()
            .status()
            .map_err(|source| HandoffError::Exec {
                program: command.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(HandoffError::Exited {
                program: command.program.clone(),
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_line() {
        let cmd = ServerCommand::from_config(&ServerConfig::default());
        assert_eq!(
            cmd.to_string(),
            "uvicorn app:app --host 0.0.0.0 --port 7860 --workers 1"
        );
    }

    #[test]
    fn test_custom_command_line() {
        let config = ServerConfig {
            program: "/usr/local/bin/gunicorn".into(),
            args: vec!["-k".into(), "uvicorn.workers.UvicornWorker".into(), "app:app".into()],
            host: "::".into(),
            port: 8080,
            workers: 4,
        };
        let cmd = ServerCommand::from_config(&config);
        assert_eq!(cmd.program, "/usr/local/bin/gunicorn");
        assert_eq!(&cmd.args[3..], &["--host", "::", "--port", "8080", "--workers", "4"]);
    }

    #[test]
    fn test_exec_missing_program_returns_error() {
        let cmd = ServerCommand {
            program: "/nonexistent/server-binary".into(),
            args: vec![],
        };
        match ExecLauncher.launch(&cmd) {
            Err(HandoffError::Exec { program, source }) => {
                assert_eq!(program, "/nonexistent/server-binary");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected exec error, got {:?}", other),
        }
    }
}
