//! Spawns toolchain commands under a shared wall-clock budget.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

/// How long to wait for pipe readers once the process group is gone.
const READER_GRACE: Duration = Duration::from_millis(500);

/// A program invocation: no shell, just a program and its argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Run,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Compile => f.write_str("compile"),
            Stage::Run => f.write_str("run"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub stage: Stage,
    pub command: CommandSpec,
}

impl Step {
    pub fn compile(command: CommandSpec) -> Self {
        Self {
            stage: Stage::Compile,
            command,
        }
    }

    pub fn run(command: CommandSpec) -> Self {
        Self {
            stage: Stage::Run,
            command,
        }
    }
}

/// Classified result of a whole step sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every step exited zero; output of the last step.
    Success { stdout: String, stderr: String },
    CompileFailure { message: String },
    RuntimeFailure { message: String },
    Timeout { stage: Stage },
    LaunchFailure { program: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutcome {
    pub outcome: Outcome,
    pub elapsed: Duration,
    /// Some captured stream of some step hit the byte cap
    pub truncated: bool,
}

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

enum StepResult {
    Exited {
        status: ExitStatus,
        stdout: Captured,
        stderr: Captured,
    },
    TimedOut,
    LaunchFailed {
        program: String,
        reason: String,
    },
}

/// Runs step sequences with a timeout and an output cap.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
    max_output_bytes: usize,
}

impl ProcessRunner {
    pub fn new(timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            timeout,
            max_output_bytes,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `steps` in order. A non-zero exit stops the sequence; `stdin` is
    /// only fed to run-stage steps. The timeout covers the whole sequence.
    pub async fn run(&self, steps: &[Step], stdin: &str) -> RawOutcome {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let mut truncated = false;

        let finish = |outcome: Outcome, truncated: bool| RawOutcome {
            outcome,
            elapsed: start.elapsed(),
            truncated,
        };

        let Some(last) = steps.len().checked_sub(1) else {
            return finish(
                Outcome::Success {
                    stdout: String::new(),
                    stderr: String::new(),
                },
                false,
            );
        };

        for (index, step) in steps.iter().enumerate() {
            let input = (step.stage == Stage::Run).then_some(stdin);
            debug!(stage = %step.stage, command = %step.command, "Running step");

            match self.run_step(&step.command, input, deadline).await {
                StepResult::LaunchFailed { program, reason } => {
                    return finish(Outcome::LaunchFailure { program, reason }, truncated);
                }
                StepResult::TimedOut => {
                    warn!(stage = %step.stage, timeout = ?self.timeout, "Step timed out");
                    return finish(Outcome::Timeout { stage: step.stage }, truncated);
                }
                StepResult::Exited {
                    status,
                    stdout,
                    stderr,
                } => {
                    truncated |= stdout.truncated || stderr.truncated;
                    debug!(stage = %step.stage, %status, "Step exited");

                    if !status.success() {
                        let message = failure_message(status, &stderr.text());
                        let outcome = match step.stage {
                            Stage::Compile => Outcome::CompileFailure { message },
                            Stage::Run => Outcome::RuntimeFailure { message },
                        };
                        return finish(outcome, truncated);
                    }

                    if index == last {
                        return finish(
                            Outcome::Success {
                                stdout: stdout.text(),
                                stderr: stderr.text(),
                            },
                            truncated,
                        );
                    }
                }
            }
        }

        unreachable!("the last step always returns")
    }

    async fn run_step(
        &self,
        spec: &CommandSpec,
        input: Option<&str>,
        deadline: Instant,
    ) -> StepResult {
        let program = match resolve_program(&spec.program) {
            Ok(path) => path,
            Err(reason) => {
                return StepResult::LaunchFailed {
                    program: spec.program.clone(),
                    reason,
                }
            }
        };

        let mut command = Command::new(&program);
        command
            .args(&spec.args)
            .env_clear()
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }
        if let Some(lang) = std::env::var_os("LANG") {
            command.env("LANG", lang);
        }
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir).env("HOME", dir);
        }

        // Own session, so the whole tree can be killed with one killpg
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()?;
                Ok(())
            });
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return StepResult::LaunchFailed {
                    program: spec.program.clone(),
                    reason: e.to_string(),
                }
            }
        };
        // Armed until the step settles; dropping the future mid-step still
        // takes the whole group down.
        let group = GroupGuard(child.id().map(|pid| Pid::from_raw(pid as i32)));

        if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
            let input = input.to_owned();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    // The program may exit without reading its input
                    if e.kind() != io::ErrorKind::BrokenPipe {
                        debug!("Failed to write stdin: {}", e);
                    }
                }
                // dropping stdin closes the pipe and signals EOF
            });
        }

        let stdout = spawn_reader(child.stdout.take(), self.max_output_bytes);
        let stderr = spawn_reader(child.stderr.take(), self.max_output_bytes);

        match time::timeout_at(deadline, child.wait()).await {
            Ok(Ok(status)) => {
                // Reap anything the program left running in the background
                group.kill();
                StepResult::Exited {
                    status,
                    stdout: collect(stdout).await,
                    stderr: collect(stderr).await,
                }
            }
            Ok(Err(e)) => {
                group.kill();
                if let Err(kill_err) = child.kill().await {
                    debug!("Failed to kill child after wait error: {}", kill_err);
                }
                StepResult::LaunchFailed {
                    program: spec.program.clone(),
                    reason: format!("Process error: {}", e),
                }
            }
            Err(_) => {
                group.kill();
                if let Err(e) = child.kill().await {
                    debug!("Failed to kill timed out child: {}", e);
                }
                let _ = collect(stdout).await;
                let _ = collect(stderr).await;
                StepResult::TimedOut
            }
        }
    }
}

fn resolve_program(program: &str) -> Result<PathBuf, String> {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Ok(PathBuf::from(program));
    }
    which::which(program).map_err(|_| format!("Command not found: {}", program))
}

/// Owns a child's process group; SIGKILLs it at the latest on drop.
struct GroupGuard(Option<Pid>);

impl GroupGuard {
    fn kill(mut self) {
        kill_group(self.0.take());
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        kill_group(self.0.take());
    }
}

fn kill_group(group: Option<Pid>) {
    if let Some(pgid) = group {
        match killpg(pgid, Signal::SIGKILL) {
            Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
            Err(e) => warn!(pgid = %pgid, "Failed to kill process group: {}", e),
        }
    }
}

fn spawn_reader<R>(reader: Option<R>, cap: usize) -> Option<JoinHandle<io::Result<Captured>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    reader.map(|reader| tokio::spawn(read_capped(reader, cap)))
}

async fn collect(handle: Option<JoinHandle<io::Result<Captured>>>) -> Captured {
    let Some(mut handle) = handle else {
        return Captured::default();
    };
    match time::timeout(READER_GRACE, &mut handle).await {
        Ok(Ok(Ok(captured))) => captured,
        Ok(Ok(Err(e))) => {
            debug!("Failed to read child output: {}", e);
            Captured::default()
        }
        Ok(Err(e)) => {
            debug!("Output reader task failed: {}", e);
            Captured::default()
        }
        Err(_) => {
            // A detached descendant is still holding the pipe open
            handle.abort();
            warn!("Output pipe still open after process exit, giving up on it");
            Captured::default()
        }
    }
}

/// Read to EOF keeping at most `cap` bytes. The rest is drained so the
/// writer never blocks on a full pipe.
async fn read_capped<R: AsyncRead + Unpin>(mut reader: R, cap: usize) -> io::Result<Captured> {
    let mut captured = Captured::default();
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        if captured.truncated {
            continue;
        }

        let remaining = cap.saturating_sub(captured.bytes.len());
        if n <= remaining {
            captured.bytes.extend_from_slice(&chunk[..n]);
        } else {
            captured.bytes.extend_from_slice(&chunk[..remaining]);
            captured.truncated = true;
        }
    }

    Ok(captured)
}

fn failure_message(status: ExitStatus, stderr: &str) -> String {
    if !stderr.trim().is_empty() {
        return stderr.to_string();
    }

    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => {
            let name = Signal::try_from(signal)
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|_| signal.to_string());
            format!("Process terminated by signal {}", name)
        }
        None => format!("Process exited with status: {}", status),
    }
}
