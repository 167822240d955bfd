//! Running child processes and capturing their output.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::core::value::Value;
use crate::error::{EvalError, EvalResult};

/// Field names of an exec result record, in positional order.
pub const EXIT_VALUE: &str = "exitValue";
pub const STDOUT: &str = "stdout";
pub const STDERR: &str = "stderr";

/// An argv-style invocation. Tokens reach the child verbatim; no shell is
/// involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables layered over the inherited environment.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Split `argv` into program and arguments. `None` when empty.
    pub fn from_argv(argv: Vec<String>) -> Option<Self> {
        let mut tokens = argv.into_iter();
        let program = tokens.next()?;
        Some(Self {
            program,
            args: tokens.collect(),
            env: Vec::new(),
        })
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Captured child process output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i64,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Package as `[exitValue |-> .., stdout |-> .., stderr |-> ..]`.
    ///
    /// All three fields are always present. Output is decoded as UTF-8,
    /// replacing invalid sequences.
    pub fn into_value(self) -> Value {
        Value::record([
            (EXIT_VALUE, Value::Int(self.exit_code)),
            (
                STDOUT,
                Value::String(String::from_utf8_lossy(&self.stdout).into_owned()),
            ),
            (
                STDERR,
                Value::String(String::from_utf8_lossy(&self.stderr).into_owned()),
            ),
        ])
    }
}

/// Run `spec` to completion and capture stdout/stderr in full.
///
/// Without a timeout this blocks until the child exits, however long that
/// takes. With a timeout the child is killed once it elapses and the call
/// fails with [`EvalError::Timeout`].
#[instrument(skip_all, fields(program = %spec.program, args = spec.args.len(), env_overrides = spec.env.len()))]
pub fn run_command(spec: &CommandSpec, timeout: Option<Duration>) -> EvalResult<CommandOutput> {
    match timeout {
        None => run_to_completion(spec),
        Some(timeout) => run_with_timeout(spec, timeout),
    }
}

fn run_to_completion(spec: &CommandSpec) -> EvalResult<CommandOutput> {
    debug!("spawning child process");
    let output = match spec.command().output() {
        Ok(output) => output,
        Err(e) => {
            error!(err = %e, "failed to run command");
            return Err(EvalError::io(format!("run {}", spec.program), e));
        }
    };

    let exit_code = exit_code(output.status);
    debug!(exit_code, "command finished");
    Ok(CommandOutput {
        exit_code,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Output is drained on reader threads while the child runs, so a chatty
/// child cannot block on a full pipe while we wait on it.
fn run_with_timeout(spec: &CommandSpec, timeout: Duration) -> EvalResult<CommandOutput> {
    debug!(timeout_secs = timeout.as_secs(), "spawning child process");
    let mut child = match spec.command().spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(EvalError::io(format!("spawn {}", spec.program), e));
        }
    };

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = match child
        .wait_timeout(timeout)
        .map_err(|e| EvalError::io(format!("wait for {}", spec.program), e))?
    {
        Some(status) => status,
        None => {
            warn!(timeout_secs = timeout.as_secs(), "command timed out, killing");
            kill(&mut child, &spec.program)?;
            join_output(stdout)?;
            join_output(stderr)?;
            return Err(EvalError::Timeout {
                command: spec.program.clone(),
                timeout,
            });
        }
    };

    let stdout = join_output(stdout)?;
    let stderr = join_output(stderr)?;
    let exit_code = exit_code(status);
    debug!(exit_code, "command finished");
    Ok(CommandOutput {
        exit_code,
        stdout,
        stderr,
    })
}

fn kill(child: &mut Child, program: &str) -> EvalResult<()> {
    child
        .kill()
        .map_err(|e| EvalError::io(format!("kill {program}"), e))?;
    child
        .wait()
        .map_err(|e| EvalError::io(format!("wait for {program} after kill"), e))?;
    Ok(())
}

type Reader = thread::JoinHandle<std::io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(mut stream: R) -> Reader {
    thread::spawn(move || {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join_output(handle: Option<Reader>) -> EvalResult<Vec<u8>> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    match handle.join() {
        Ok(result) => result.map_err(|e| EvalError::io("read child output", e)),
        Err(_) => Err(EvalError::io(
            "read child output",
            std::io::Error::other("output reader thread panicked"),
        )),
    }
}

/// Exit code as reported by the OS; `128 + signal` for a signalled child.
fn exit_code(status: ExitStatus) -> i64 {
    if let Some(code) = status.code() {
        return i64::from(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + i64::from(signal);
        }
    }
    -1
}
