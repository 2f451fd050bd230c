use std::collections::BTreeMap;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("external tool `{binary}` is not installed or not on PATH")]
    MissingBinary { binary: String },
    #[error("external tool `{binary}` timed out after {timeout_ms}ms")]
    Timeout { binary: String, timeout_ms: u64 },
    #[error("failed to run `{binary}` in {cwd}: {source}")]
    Io {
        binary: String,
        cwd: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub binary: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
    pub env: BTreeMap<String, String>,
}

impl ProcessRequest {
    pub fn new(binary: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args,
            cwd: cwd.into(),
            timeout: DEFAULT_STAGE_TIMEOUT,
            env: BTreeMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command_form(&self) -> String {
        if self.args.is_empty() {
            return self.binary.clone();
        }
        format!("{} {}", self.binary, self.args.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

pub fn run_process(request: &ProcessRequest) -> Result<ProcessOutput, ProcessError> {
    let mut command = Command::new(&request.binary);
    command
        .current_dir(&request.cwd)
        .args(&request.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    for (key, value) in &request.env {
        command.env(key, value);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProcessError::MissingBinary {
                binary: request.binary.clone(),
            })
        }
        Err(err) => return Err(io_error(request, err)),
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io_error(request, std::io::Error::other("missing stdout pipe")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io_error(request, std::io::Error::other("missing stderr pipe")))?;

    let stdout_reader = thread::spawn(move || read_stream(stdout));
    let stderr_reader = thread::spawn(move || read_stream(stderr));

    let start = Instant::now();
    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > request.timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_reader.join();
                    let _ = stderr_reader.join();
                    return Err(ProcessError::Timeout {
                        binary: request.binary.clone(),
                        timeout_ms: request.timeout.as_millis() as u64,
                    });
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(err) => return Err(io_error(request, err)),
        }
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    Ok(ProcessOutput {
        exit_code: exit_status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}

fn read_stream(stream: impl Read) -> String {
    let mut buf = String::new();
    let mut reader = BufReader::new(stream);
    let _ = reader.read_to_string(&mut buf);
    buf
}

fn io_error(request: &ProcessRequest, source: std::io::Error) -> ProcessError {
    ProcessError::Io {
        binary: request.binary.clone(),
        cwd: request.cwd.display().to_string(),
        source,
    }
}
