//! Client side of the `goto_build` output contract
//!
//! Editors run the resolver as a blocking subprocess. This module does that
//! and turns stdout into a [`Lookup`], keeping "nothing owns this file" apart
//! from genuine failures.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::types::BuildLocation;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What the resolver reported for one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(BuildLocation),
    NotFound,
}

/// Runs `<program> -i <source>` from the source file's directory
#[derive(Debug, Clone)]
pub struct ResolverClient {
    program: PathBuf,
    timeout: Duration,
}

impl ResolverClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn lookup(&self, source: &Path) -> Result<Lookup> {
        let program = self.program.display().to_string();
        let mut command = Command::new(&self.program);
        command
            .arg("-i")
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = source.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        tracing::debug!("Running {:?}", command);
        let mut child = command.spawn().map_err(|source| Error::SpawnError {
            program: program.clone(),
            source,
        })?;

        // Drain both pipes while waiting so a chatty child cannot block on write
        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let status = self.wait(&mut child, &program)?;
        let stdout = join(stdout_reader)?;
        let stderr = join(stderr_reader)?;

        if !status.success() {
            return Err(Error::ToolFailed {
                program,
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        parse_output(&stdout)
    }

    /// Block until the child exits, killing it once the timeout elapses
    fn wait(&self, child: &mut Child, program: &str) -> Result<ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                tracing::debug!("{} timed out, killing it", program);
                // The child may have exited between the poll and the kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Timeout {
                    program: program.to_string(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Interpret resolver stdout: blank means not found, otherwise `path:line`
pub fn parse_output(stdout: &str) -> Result<Lookup> {
    let Some(first_line) = stdout.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return Ok(Lookup::NotFound);
    };
    first_line.parse().map(Lookup::Found)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_string(&mut buffer)?;
        }
        Ok(buffer)
    })
}

fn join(reader: JoinHandle<io::Result<String>>) -> Result<String> {
    let output = reader
        .join()
        .map_err(|_| io::Error::other("pipe reader panicked"))??;
    Ok(output)
}
