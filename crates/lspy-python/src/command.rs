//! Running the environment managers (`pipenv`, `poetry`, `pyenv`).
//!
//! [`CommandRunner`] is the single seam through which resolution touches
//! external processes: run a tool in a directory, capture its stdout, and
//! never pop up a console window.

use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;

use camino::Utf8Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("`{program}` not found")]
    NotFound { program: String },

    #[error("`{command}` exited with {status}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("failed to run `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` in `cwd` and return its stdout.
    fn run(&self, program: &str, args: &[&str], cwd: &Utf8Path) -> Result<String, CommandError>;
}

/// Runs commands as real child processes.
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Utf8Path) -> Result<String, CommandError> {
        let executable = which::which(program).map_err(|_| CommandError::NotFound {
            program: program.to_string(),
        })?;

        let mut command = Command::new(executable);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_console_window(&mut command);

        tracing::debug!("Running `{}` in {}", display_command(program, args), cwd);

        let output = command.output().map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => CommandError::NotFound {
                program: program.to_string(),
            },
            _ => CommandError::Io {
                command: display_command(program, args),
                source,
            },
        })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: display_command(program, args),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(windows)]
fn hide_console_window(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console_window(_command: &mut Command) {}

/// Render a command line for log messages, quoting arguments with spaces.
#[must_use]
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .map(|part| {
            if part.is_empty() || part.contains(char::is_whitespace) {
                format!("'{part}'")
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;

    fn cwd() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_display_command_quotes_spaces() {
        assert_eq!(
            display_command("poetry", &["env", "info", "-p"]),
            "poetry env info -p"
        );
        assert_eq!(display_command("tool", &["a b", ""]), "tool 'a b' ''");
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let (_dir, cwd) = cwd();
        let err = SystemCommandRunner
            .run("lspy-definitely-not-a-real-binary", &[], &cwd)
            .unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;

        #[test]
        fn test_captures_stdout_in_cwd() {
            let (_dir, cwd) = cwd();
            std::fs::write(cwd.join("marker.txt"), "").unwrap();
            let stdout = SystemCommandRunner.run("ls", &[], &cwd).unwrap();
            assert_eq!(stdout.trim(), "marker.txt");
        }

        #[test]
        fn test_non_zero_exit_is_failed() {
            let (_dir, cwd) = cwd();
            let err = SystemCommandRunner.run("false", &[], &cwd).unwrap_err();
            assert!(matches!(err, CommandError::Failed { .. }));
        }
    }
}
