//! External tool invocation
//!
//! Gradle and the F-Droid server tools are black boxes. Every invocation goes
//! through [`ToolRunner`] as a discrete argument vector; nothing is ever
//! handed to a shell.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

/// Placeholder printed in place of secret values
const REDACTED: &str = "***";

#[derive(Clone)]
struct Value {
    text: String,
    secret: bool,
}

impl Value {
    fn shown(&self) -> &str {
        if self.secret {
            REDACTED
        } else {
            &self.text
        }
    }
}

/// A fully described external command
#[derive(Clone)]
pub struct ToolInvocation {
    program: PathBuf,
    args: Vec<Value>,
    current_dir: PathBuf,
    env: Vec<(String, Value)>,
}

impl ToolInvocation {
    /// Create an invocation of `program` running in `current_dir`
    pub fn new(program: impl Into<PathBuf>, current_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: current_dir.into(),
            env: Vec::new(),
        }
    }

    /// Append a plain argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Value {
            text: arg.into(),
            secret: false,
        });
        self
    }

    /// Append plain arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Append an argument that is redacted from logs
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Value {
            text: arg.into(),
            secret: true,
        });
        self
    }

    /// Set an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((
            key.into(),
            Value {
                text: value.into(),
                secret: false,
            },
        ));
        self
    }

    /// Set an environment variable that is redacted from logs
    pub fn secret_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((
            key.into(),
            Value {
                text: value.into(),
                secret: true,
            },
        ));
        self
    }

    /// Program to execute
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Working directory
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Raw argument values
    pub fn arg_values(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.text.as_str()).collect()
    }

    /// Raw value of an environment variable set on this invocation
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.text.as_str())
    }

    /// Command line with secret values redacted
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| a.shown().to_string()));
        parts.join(" ")
    }
}

impl fmt::Debug for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env: Vec<String> = self
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.shown()))
            .collect();
        f.debug_struct("ToolInvocation")
            .field("command", &self.display_command())
            .field("current_dir", &self.current_dir)
            .field("env", &env)
            .finish()
    }
}

/// Exit information from a finished tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOutcome {
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
}

impl ToolOutcome {
    /// Outcome for a clean exit
    pub fn success() -> Self {
        Self { exit_code: Some(0) }
    }

    /// Outcome for a given exit code
    pub fn exited(code: i32) -> Self {
        Self {
            exit_code: Some(code),
        }
    }

    /// Whether the tool exited with status zero
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external tools to completion
pub trait ToolRunner {
    /// Run the invocation and wait for it to exit.
    ///
    /// Returns `Err` only when the process could not be started.
    fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolOutcome>;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolOutcome> {
        (**self).run(invocation)
    }
}

/// Runs tools as child processes.
///
/// The child's stdout is joined to our stderr so tool progress stays visible
/// without mixing into machine-readable output on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> std::io::Result<ToolOutcome> {
        debug!(command = %invocation.display_command(), cwd = %invocation.current_dir.display(), "spawning tool");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(invocation.args.iter().map(|a| &a.text))
            .current_dir(&invocation.current_dir)
            .envs(invocation.env.iter().map(|(k, v)| (k, &v.text)))
            .stdin(Stdio::null())
            .stdout(Stdio::from(std::io::stderr()))
            .stderr(Stdio::inherit());

        let status = cmd.status()?;
        Ok(ToolOutcome {
            exit_code: status.code(),
        })
    }
}
