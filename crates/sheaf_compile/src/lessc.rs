//! Out-of-process backend that pipes each bundle through `lessc`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::adapter::{BoxError, StylesheetCompiler};

/// Program run when none is configured.
pub const DEFAULT_LESSC: &str = "lessc";

/// Runs an external LESS compiler, source on stdin and CSS on stdout.
///
/// A non-zero exit status is a failure carrying the compiler's stderr.
#[derive(Debug, Clone)]
pub struct LesscCompiler {
    program: PathBuf,
    args: Vec<String>,
}

impl Default for LesscCompiler {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_LESSC),
            args: vec!["-".to_string()],
        }
    }
}

impl LesscCompiler {
    /// Creates a backend running `lessc -`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the program to run. Bare names are looked up on `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Replaces the arguments passed to the program.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The configured program, as given.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments passed to the program.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Resolves the program to the binary that would run, or `None` if it
    /// cannot be found.
    pub fn resolve_program(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }
}

impl StylesheetCompiler for LesscCompiler {
    fn name(&self) -> &str {
        "lessc"
    }

    fn compile(&self, source: &str) -> Result<String, BoxError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to run {}: {e}", self.program.display()))?;

        let mut stdin = child.stdin.take().ok_or("compiler stdin was not captured")?;
        // Stdin is fed from its own thread; writing inline blocks once the
        // compiler fills its stdout pipe.
        let (written, output) = std::thread::scope(|s| {
            let writer = s.spawn(move || stdin.write_all(source.as_bytes()));
            let output = child.wait_with_output();
            (writer.join(), output)
        });
        let output = output
            .map_err(|e| format!("failed to wait for {}: {e}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(if stderr.is_empty() {
                format!("{} exited with {}", self.program.display(), output.status).into()
            } else {
                stderr.to_string().into()
            });
        }

        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(format!("failed to write to {}: {e}", self.program.display()).into())
            }
            Err(_) => return Err("compiler stdin writer panicked".into()),
        }

        String::from_utf8(output.stdout).map_err(|e| {
            format!("{} produced invalid UTF-8: {e}", self.program.display()).into()
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> LesscCompiler {
        LesscCompiler::new().with_program("sh").with_args(["-c", script])
    }

    #[test]
    fn defaults_read_stdin() {
        let compiler = LesscCompiler::new();
        assert_eq!(compiler.program(), Path::new("lessc"));
        assert_eq!(compiler.args(), ["-"]);
    }

    #[test]
    fn stdout_is_the_compiled_output() {
        let compiler = LesscCompiler::new()
            .with_program("cat")
            .with_args(Vec::<String>::new());
        assert_eq!(compiler.compile("a { color: red; }").unwrap(), "a { color: red; }");
    }

    #[test]
    fn large_input_does_not_block() {
        let compiler = LesscCompiler::new()
            .with_program("cat")
            .with_args(Vec::<String>::new());
        let source = "a { color: red; }\n".repeat(100_000);
        assert_eq!(compiler.compile(&source).unwrap().len(), source.len());
    }

    #[test]
    fn nonzero_exit_reports_stderr() {
        let compiler =
            shell("cat >/dev/null; echo 'ParseError: Unrecognised input in - on line 1' >&2; exit 1");
        let err = compiler.compile("@x: ;;;").unwrap_err();
        assert_eq!(err.to_string(), "ParseError: Unrecognised input in - on line 1");
    }

    #[test]
    fn nonzero_exit_without_stderr_reports_status() {
        let err = shell("cat >/dev/null; exit 3").compile("a {}").unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[test]
    fn missing_program_is_an_error() {
        let compiler = LesscCompiler::new().with_program("/nonexistent/bin/lessc");
        let err = compiler.compile("a {}").unwrap_err();
        assert!(err.to_string().starts_with("failed to run /nonexistent/bin/lessc"));
        assert!(compiler.resolve_program().is_none());
    }

    #[test]
    fn resolves_program_on_path() {
        let resolved = LesscCompiler::new().with_program("sh").resolve_program().unwrap();
        assert!(resolved.is_absolute());
    }
}
