//! Shared helpers for CLI commands: locating and loading `sheaf.toml`,
//! choosing watched paths, and building the compiler backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sheaf_compile::{LesscCompiler, LightningCompiler, StylesheetCompiler};
use sheaf_config::{find_config, load_config, CompilerBackend, SheafConfig, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// A loaded configuration and where it came from.
pub struct Project {
    /// The parsed configuration.
    pub config: SheafConfig,
    /// Path of the `sheaf.toml` that was loaded.
    pub config_path: PathBuf,
    /// Directory relative paths in the configuration resolve against.
    pub base_dir: PathBuf,
}

impl Project {
    /// Paths every bundle watches in addition to its own `watch` list: the
    /// running executable, the external compiler binary when there is one,
    /// and the config file.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut watched = Vec::new();
        match std::env::current_exe() {
            Ok(exe) => watched.push(exe),
            Err(e) => tracing::warn!(error = %e, "cannot locate running executable; not watching it"),
        }
        if self.config.compiler.backend == CompilerBackend::Lessc {
            let lessc = self.lessc();
            match lessc.resolve_program() {
                Some(program) => watched.push(program),
                None => tracing::warn!(
                    program = %lessc.program().display(),
                    "compiler not found; compiles will fail until it is installed"
                ),
            }
        }
        watched.push(self.config_path.clone());
        watched
    }

    /// Builds the compiler backend described by `[compiler]`.
    pub fn compiler(&self) -> Arc<dyn StylesheetCompiler> {
        match self.config.compiler.backend {
            CompilerBackend::Lessc => Arc::new(self.lessc()),
            CompilerBackend::Lightningcss => {
                Arc::new(LightningCompiler::new().minify(self.config.compiler.minify))
            }
        }
    }

    /// The external compiler from `[compiler]`. A relative `command` with a
    /// directory part resolves against the config file's directory; a bare
    /// name is looked up on `PATH`.
    fn lessc(&self) -> LesscCompiler {
        let mut lessc = LesscCompiler::new();
        if let Some(ref command) = self.config.compiler.command {
            let command = Path::new(command);
            let program = if command.is_relative() && command.components().count() > 1 {
                self.base_dir.join(command)
            } else {
                command.to_path_buf()
            };
            lessc = lessc.with_program(program);
        }
        if let Some(ref args) = self.config.compiler.args {
            lessc = lessc.with_args(args.iter().cloned());
        }
        lessc
    }
}

/// Resolves the configuration path from global CLI args.
///
/// If `--config` names a directory, `sheaf.toml` inside it is used.
/// Otherwise walks up from the current directory looking for `sheaf.toml`.
pub fn resolve_config_path(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_dir() {
            Ok(p.join(CONFIG_FILE_NAME))
        } else {
            Ok(p)
        }
    } else {
        let cwd = std::env::current_dir()?;
        find_config(&cwd).ok_or_else(|| {
            format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                cwd.display()
            )
            .into()
        })
    }
}

/// Loads the project configuration selected by the global CLI args.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    let config_path = resolve_config_path(global)?;
    load_project_at(&config_path)
}

/// Loads the configuration at `config_path`.
pub fn load_project_at(config_path: &Path) -> Result<Project, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    tracing::debug!(path = %config_path.display(), bundles = config.bundles.len(), "loaded configuration");
    Ok(Project {
        config,
        config_path: config_path.to_path_buf(),
        base_dir,
    })
}
