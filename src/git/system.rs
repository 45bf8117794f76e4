use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::GitConfig;
use crate::error::{Result, VersionError};
use crate::git::{command_line, into_stdout, CommandOutput, CommandRunner};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs the system git executable in a working directory
pub struct SystemGit {
    program: String,
    work_dir: PathBuf,
    timeout: Duration,
}

impl SystemGit {
    pub fn new(work_dir: impl Into<PathBuf>, config: &GitConfig) -> Self {
        SystemGit {
            program: config.program.clone(),
            work_dir: work_dir.into(),
            timeout: config.timeout(),
        }
    }

    /// Spawns git and waits for it, killing it once the timeout elapses.
    fn execute(&self, args: &[&str]) -> Result<CommandOutput> {
        let command = command_line(&self.program, args);
        log::debug!("running `{}` in {}", command, self.work_dir.display());

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| VersionError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Drain both pipes off-thread so a chatty child cannot block on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let deadline = Instant::now() + self.timeout;

        let code = match wait_until(&mut child, deadline)? {
            Some(code) => code,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                log::debug!("`{}` killed after {:?}", command, self.timeout);
                return Err(self.timed_out(command));
            }
        };

        // A grandchild can inherit the pipes and keep them open after git exits,
        // so collecting the output shares the same deadline.
        let (stdout, stderr) = match (collect(&stdout, deadline), collect(&stderr, deadline)) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                log::debug!("`{}` exited but its output stayed open", command);
                return Err(self.timed_out(command));
            }
        };

        let output = CommandOutput {
            code,
            stdout,
            stderr,
        };
        log::debug!("`{}` exited with {:?}", command, output.code);

        Ok(output)
    }

    fn timed_out(&self, command: String) -> VersionError {
        VersionError::Timeout {
            command,
            after: self.timeout,
        }
    }
}

impl CommandRunner for SystemGit {
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.execute(args)?;
        into_stdout(command_line(&self.program, args), output)
    }
}

/// Polls the child until it exits or `deadline` passes.
///
/// Returns `Ok(None)` on timeout, otherwise the exit code (itself `None`
/// when the child died from a signal).
fn wait_until(child: &mut Child, deadline: Instant) -> Result<Option<Option<i32>>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status.code()));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Reads a pipe to EOF on a helper thread and sends the bytes back once done.
///
/// The thread is detached; if the pipe never closes it is left blocked and
/// dies with the process.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(buf);
    });
    rx
}

/// Waits for a drained pipe, giving up at `deadline`.
fn collect(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Option<String> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    rx.recv_timeout(remaining)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(program: &str, timeout_secs: u64) -> GitConfig {
        GitConfig {
            program: program.to_string(),
            timeout_secs,
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let git = SystemGit::new(dir.path(), &config("definitely-not-a-real-git-binary", 5));

        let err = git.run(&["status"]).unwrap_err();
        assert!(matches!(err, VersionError::Spawn { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-git-binary status"));
    }

    #[test]
    fn test_git_outside_repository_is_command_error() {
        let dir = TempDir::new().unwrap();
        let git = SystemGit::new(dir.path(), &GitConfig::default());

        let err = git.run(&["--git-dir", "does-not-exist", "status"]).unwrap_err();
        match err {
            VersionError::Command { command, stderr } => {
                assert!(command.starts_with("git --git-dir"));
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_status_in_fresh_repository_is_empty() {
        let dir = TempDir::new().unwrap();
        let git = SystemGit::new(dir.path(), &GitConfig::default());

        git.run(&["init", "--quiet"]).unwrap();
        assert_eq!(git.run(&["status", "--porcelain"]).unwrap().trim(), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_command_times_out() {
        let dir = TempDir::new().unwrap();
        let runner = SystemGit::new(dir.path(), &config("sleep", 1));

        let started = Instant::now();
        let err = runner.run(&["5"]).unwrap_err();

        assert!(matches!(err, VersionError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_background_child_holding_output_times_out() {
        let dir = TempDir::new().unwrap();
        let runner = SystemGit::new(dir.path(), &config("sh", 1));

        let started = Instant::now();
        let err = runner.run(&["-c", "sleep 6 & exit 0"]).unwrap_err();

        match err {
            VersionError::Timeout { command, after } => {
                assert_eq!(command, "sh -c sleep 6 & exit 0");
                assert_eq!(after, Duration::from_secs(1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
