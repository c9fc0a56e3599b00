//! Source concatenation and compiler invocation.

use sheaf_cache::SourceList;

use crate::error::CompileError;

/// Boxed error returned by compiler backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Appended after every source file's contents before compiling.
pub const SOURCE_SEPARATOR: &str = "\n\n";

/// An external stylesheet compiler.
///
/// Sheaf treats the compiler as a black box: text in, text out, or an error.
/// Implementations must report failures through the returned `Result`.
pub trait StylesheetCompiler: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Compiles a complete stylesheet buffer.
    fn compile(&self, source: &str) -> Result<String, BoxError>;
}

/// Reads `sources` in order, concatenates them and compiles the result.
///
/// Read failures are returned as [`CompileError::MissingSource`] rather than
/// skipped, since compiling an incomplete bundle would cache wrong output.
/// Compiler failures are logged and returned as [`CompileError::Backend`].
pub fn compile_sources(
    compiler: &dyn StylesheetCompiler,
    sources: &SourceList,
) -> Result<String, CompileError> {
    if sources.is_empty() {
        return Err(CompileError::EmptySourceList);
    }

    let mut buffer = String::new();
    for path in sources {
        let text = std::fs::read_to_string(path).map_err(|e| CompileError::MissingSource {
            path: path.clone(),
            source: e,
        })?;
        buffer.push_str(&text);
        buffer.push_str(SOURCE_SEPARATOR);
    }

    tracing::debug!(
        compiler = compiler.name(),
        sources = sources.len(),
        bytes = buffer.len(),
        "compiling bundle"
    );

    compiler.compile(&buffer).map_err(|e| {
        tracing::error!(compiler = compiler.name(), error = %e, "stylesheet compilation failed");
        CompileError::Backend {
            compiler: compiler.name().to_string(),
            reason: e.to_string(),
        }
    })
}
