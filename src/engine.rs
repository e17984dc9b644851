//! Utility-CSS generation engine boundary.
//!
//! The engine is an external, deterministic collaborator: given every
//! candidate utility token and a stylesheet skeleton, it returns one CSS
//! ruleset. It runs exactly once per compilation. [`CommandEngine`] drives a
//! command-line engine over stdin/stdout; [`crate::testing::FixtureEngine`]
//! answers from an in-memory table.

use std::fmt::Write as _;
use std::future::Future;
use std::io;
use std::process::Stdio;
use std::string::FromUtf8Error;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Errors raised by a generation engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine process: {0}")]
    Spawn(#[source] io::Error),
    #[error("engine i/o failed: {0}")]
    Io(#[source] io::Error),
    #[error("engine exited with {}: {stderr}", describe_status(.status))]
    Failed { status: Option<i32>, stderr: String },
    #[error("engine output is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("engine rejected the request: {0}")]
    Rejected(String),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Everything the engine needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Every distinct candidate utility token, first-seen order.
    pub candidates: Vec<String>,
    /// Theme overrides (custom property, value), in caller order.
    pub theme: Vec<(String, String)>,
    /// The stylesheet skeleton: import, inline source, theme overrides.
    pub stylesheet: String,
}

impl GenerationRequest {
    /// Build a request for the given candidates and theme overrides.
    pub fn new(candidates: Vec<String>, theme: &[(String, String)]) -> Self {
        let stylesheet = skeleton(&candidates, theme);
        Self {
            candidates,
            theme: theme.to_vec(),
            stylesheet,
        }
    }
}

/// Build the minimal input stylesheet that makes the engine emit a rule for
/// every candidate and nothing else.
pub fn skeleton(candidates: &[String], theme: &[(String, String)]) -> String {
    let mut out = String::from("@import \"tailwindcss\" source(none);\n");

    let inline = candidates
        .iter()
        .map(|c| c.replace('\\', "\\\\").replace('"', "\\\""))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "@source inline(\"{inline}\");");

    if !theme.is_empty() {
        out.push_str("@theme {\n");
        for (name, value) in theme {
            let _ = writeln!(out, "  {name}: {value};");
        }
        out.push_str("}\n");
    }

    out
}

/// A utility-CSS generation engine.
pub trait GenerationEngine {
    /// Generate CSS text for the request.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, EngineError>> + Send;
}

impl<E: GenerationEngine + Sync + ?Sized> GenerationEngine for &E {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, EngineError>> + Send {
        (**self).generate(request)
    }
}

/// An engine that runs a command, writes the skeleton to its stdin and reads
/// the generated CSS from its stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    /// Create an engine running `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// The Tailwind CSS v4 command-line engine, reading from stdin.
    pub fn tailwind_cli() -> Self {
        Self::new("npx").args(["@tailwindcss/cli", "--input", "-", "--output", "-"])
    }

    /// Append an argument (builder).
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments (builder).
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program this engine runs.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl GenerationEngine for CommandEngine {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, EngineError> {
        tracing::debug!(program = %self.program, candidates = request.candidates.len(), "running engine");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stdin = child.stdin.take();
        let input = request.stylesheet.as_bytes();
        let write = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), io::Error>(())
        };

        // Feed stdin while draining stdout so neither pipe can fill up.
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(EngineError::Io)?;
        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written.map_err(EngineError::Io)?;

        Ok(String::from_utf8(output.stdout)?)
    }
}
