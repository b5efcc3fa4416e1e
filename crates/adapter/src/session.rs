//! Async engine session.
//!
//! One child process, one request/response stream: write an action id line,
//! read exactly one turn back. Every read is bounded by
//! [`EngineConfig::read_timeout`].

use std::fmt;
use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

use crate::config::EngineConfig;
use crate::core::{action_codec, decode_turn, Turn};
use crate::error::EngineError;
use crate::types::ActionId;
use crate::wire_log::{WireLog, WireRecord};

/// How long a dead or killed engine gets to be reaped.
const REAP_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Spawned, initial turn not read yet.
    NotStarted,
    Running,
    Closed,
    /// The engine exited or was killed after a fatal error.
    Crashed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::NotStarted => "not started",
            SessionState::Running => "running",
            SessionState::Closed => "closed",
            SessionState::Crashed => "crashed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Turn(Turn),
    /// The engine offered no legal action.
    Terminal(Turn),
}

impl StepOutcome {
    fn from_turn(turn: Turn) -> Self {
        if turn.is_terminal() {
            StepOutcome::Terminal(turn)
        } else {
            StepOutcome::Turn(turn)
        }
    }

    pub fn turn(&self) -> &Turn {
        match self {
            StepOutcome::Turn(turn) | StepOutcome::Terminal(turn) => turn,
        }
    }

    pub fn into_turn(self) -> Turn {
        match self {
            StepOutcome::Turn(turn) | StepOutcome::Terminal(turn) => turn,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StepOutcome::Terminal(_))
    }
}

pub struct EngineSession {
    config: EngineConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
    state: SessionState,
    last_turn: Option<Turn>,
    steps: u64,
    exit_code: Option<i32>,
    wire: Option<WireLog>,
}

impl EngineSession {
    /// Verify the action codec and spawn the engine.
    ///
    /// Nothing is read yet; call [`EngineSession::initial_turn`] next.
    pub async fn start(config: EngineConfig) -> Result<Self, EngineError> {
        action_codec::ensure_self_check().map_err(EngineError::SelfCheck)?;

        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: config.program.display().to_string(),
                source,
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(BufReader::new);
        let wire = config.wire_log.clone().map(WireLog::spawn);

        eprintln!(
            "[Engine] started {} (pid {}, layout {})",
            config.program.display(),
            child.id().map_or_else(|| "?".to_string(), |pid| pid.to_string()),
            config.layout.as_str()
        );

        let session = Self {
            config,
            child,
            stdin,
            stdout,
            state: SessionState::NotStarted,
            last_turn: None,
            steps: 0,
            exit_code: None,
            wire,
        };
        session.note(format!("start {}", session.config.program.display()));
        Ok(session)
    }

    pub async fn start_from_env() -> Result<Self, EngineError> {
        Self::start(EngineConfig::from_env()).await
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.last_turn.as_ref()
    }

    /// Action ids written so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Last known exit code of the engine, once it is gone.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Read the turn the engine prints on launch.
    pub async fn initial_turn(&mut self) -> Result<Turn, EngineError> {
        if self.state != SessionState::NotStarted {
            return Err(self.invalid("initial_turn"));
        }

        let turn = self.read_next_turn().await?;
        self.state = SessionState::Running;
        self.last_turn = Some(turn.clone());
        Ok(turn)
    }

    /// Like [`EngineSession::step`], for ids that have not been range checked yet.
    pub async fn step_raw(&mut self, raw: u32) -> Result<StepOutcome, EngineError> {
        let id = action_codec::action_id(raw).map_err(|_| EngineError::ActionIdOutOfRange(raw))?;
        self.step(id).await
    }

    /// Send one action and read the resulting turn.
    pub async fn step(&mut self, id: ActionId) -> Result<StepOutcome, EngineError> {
        match self.state {
            SessionState::Running => {}
            SessionState::Crashed => {
                return Err(EngineError::ProcessExited {
                    code: self.exit_code,
                })
            }
            SessionState::NotStarted | SessionState::Closed => return Err(self.invalid("step")),
        }

        if self.config.enforce_legal {
            if let Some(turn) = &self.last_turn {
                if !turn.legal.contains(id) {
                    return Err(EngineError::IllegalAction(id));
                }
            }
        }

        if let Ok(Some(status)) = self.child.try_wait() {
            return Err(self.exited(status.code()));
        }

        let line = format!("{}\n", id);
        let written = match self.stdin.as_mut() {
            Some(stdin) => write_line(stdin, &line).await,
            None => Err(io::Error::from(io::ErrorKind::BrokenPipe)),
        };
        if let Err(e) = written {
            if e.kind() == io::ErrorKind::BrokenPipe {
                let code = self.reap().await;
                return Err(self.exited(code));
            }
            self.fail(&format!("write failed: {}", e)).await;
            return Err(EngineError::Io(e));
        }
        if let Some(wire) = &self.wire {
            wire.record(WireRecord::Sent(id));
        }
        self.steps += 1;

        let turn = self.read_next_turn().await?;
        self.last_turn = Some(turn.clone());
        Ok(StepOutcome::from_turn(turn))
    }

    /// Kill the engine and release its pipes. Safe to call more than once.
    pub async fn close(&mut self) -> Option<i32> {
        if self.state == SessionState::Closed {
            return self.exit_code;
        }

        self.release_pipes();
        let _ = self.child.start_kill();
        let code = self.reap().await;
        if self.state != SessionState::Crashed {
            self.exit_code = code;
        }
        self.state = SessionState::Closed;

        if let Some(wire) = self.wire.take() {
            wire.record(WireRecord::Note(format!("close after {} steps", self.steps)));
            wire.close().await;
        }
        eprintln!("[Engine] session closed after {} steps", self.steps);
        self.exit_code
    }

    async fn read_next_turn(&mut self) -> Result<Turn, EngineError> {
        let layout = self.config.layout;
        let limit = self.config.read_timeout;

        let Some(stdout) = self.stdout.as_mut() else {
            let code = self.reap().await;
            return Err(self.exited(code));
        };
        let read = timeout(
            limit,
            read_lines(stdout, layout.line_count(), self.wire.as_ref()),
        )
        .await;

        let lines = match read {
            Err(_) => {
                self.fail(&format!("no turn within {:?}", limit)).await;
                return Err(EngineError::Timeout(limit));
            }
            Ok(Err(e)) => {
                self.fail(&format!("read failed: {}", e)).await;
                return Err(EngineError::Io(e));
            }
            Ok(Ok(lines)) => lines,
        };

        if lines.is_empty() {
            let code = self.reap().await;
            return Err(self.exited(code));
        }

        match decode_turn(layout, &lines) {
            Ok(turn) => Ok(turn),
            Err(e) => {
                self.fail(&e.to_string()).await;
                Err(e.into())
            }
        }
    }

    /// Wait briefly for the child to exit, killing it if it will not.
    async fn reap(&mut self) -> Option<i32> {
        match timeout(REAP_TIMEOUT, self.child.wait()).await {
            Ok(Ok(status)) => status.code(),
            Ok(Err(_)) => None,
            Err(_) => {
                let _ = self.child.kill().await;
                None
            }
        }
    }

    /// Fatal protocol failure: kill the engine and refuse further steps.
    async fn fail(&mut self, reason: &str) {
        let _ = self.child.start_kill();
        self.exit_code = self.reap().await;
        self.state = SessionState::Crashed;
        self.release_pipes();
        self.note(format!("crashed: {}", reason));
        eprintln!("[Engine] session crashed: {}", reason);
    }

    fn exited(&mut self, code: Option<i32>) -> EngineError {
        self.exit_code = code;
        self.state = SessionState::Crashed;
        self.release_pipes();
        self.note(format!("engine exited: {:?}", code));
        eprintln!("[Engine] process exited ({:?}) after {} steps", code, self.steps);
        EngineError::ProcessExited { code }
    }

    fn release_pipes(&mut self) {
        self.stdin = None;
        self.stdout = None;
    }

    fn invalid(&self, op: &'static str) -> EngineError {
        EngineError::InvalidState {
            op,
            state: self.state,
        }
    }

    fn note(&self, note: String) {
        if let Some(wire) = &self.wire {
            wire.record(WireRecord::Note(note));
        }
    }
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> io::Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.flush().await
}

/// Read up to `expected` lines; fewer means the stream ended.
async fn read_lines(
    reader: &mut BufReader<ChildStdout>,
    expected: usize,
    wire: Option<&WireLog>,
) -> io::Result<Vec<String>> {
    let mut lines = Vec::with_capacity(expected);
    let mut buf = String::new();

    while lines.len() < expected {
        buf.clear();
        if reader.read_line(&mut buf).await? == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\r', '\n']).to_string();
        if let Some(wire) = wire {
            wire.record(WireRecord::Received(line.clone()));
        }
        lines.push(line);
    }

    Ok(lines)
}
