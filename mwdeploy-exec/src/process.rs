//! External process invocation.
//!
//! Every step reduces to one or more [`Invocation`]s handed to a
//! [`CommandRunner`]. The runner is the only place that touches
//! `std::process`; swapping it out gives dry runs and test fakes.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::InvocationError;

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// A program, its arguments, and an optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path argument, rendered lossily.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Human-readable command line; arguments containing whitespace are quoted.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())?;
        if let Some(cwd) = &self.cwd {
            write!(f, " (in {})", cwd.display())?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

/// Runs one invocation to completion and reports success or failure.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), InvocationError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &Invocation) -> Result<(), InvocationError> {
        (**self).run(invocation)
    }
}

/// What happens to a child's standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Forward stdout and stderr to the operator's terminal.
    #[default]
    Inherit,
    /// Discard stdout (keeps our own stdout clean for `--json`); stderr is
    /// still forwarded.
    Quiet,
}

/// Spawns real processes and blocks until they exit.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    output: OutputMode,
}

impl SystemRunner {
    pub fn new(output: OutputMode) -> Self {
        Self { output }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), InvocationError> {
        tracing::debug!(command = %invocation, "running");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }
        match self.output {
            OutputMode::Inherit => cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit()),
            OutputMode::Quiet => cmd.stdout(Stdio::null()).stderr(Stdio::inherit()),
        };

        let status = cmd.status().map_err(|source| InvocationError::Spawn {
            command: invocation.command_line(),
            source,
        })?;

        if !status.success() {
            return Err(InvocationError::Failed {
                command: invocation.command_line(),
                code: status.code(),
            });
        }
        Ok(())
    }
}

/// Records invocations instead of running them. Every call succeeds.
#[derive(Debug, Default)]
pub struct DryRunRunner {
    recorded: RefCell<Vec<Invocation>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything that would have run, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.recorded.borrow().clone()
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), InvocationError> {
        tracing::info!("[dry-run] would run: {invocation}");
        self.recorded.borrow_mut().push(invocation.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
