//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{CompilerBackend, SheafConfig};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The configuration file name searched for by [`find_config`].
pub const CONFIG_FILE_NAME: &str = "sheaf.toml";

/// Loads and validates a configuration file.
pub fn load_config(path: &Path) -> Result<SheafConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<SheafConfig, ConfigError> {
    let config: SheafConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Walks up from `start` looking for the nearest `sheaf.toml`.
///
/// Returns the path of the file itself, or `None` if no ancestor has one.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Validates that every bundle is servable and routes do not collide.
fn validate_config(config: &SheafConfig) -> Result<(), ConfigError> {
    if config.compiler.backend == CompilerBackend::Lightningcss
        && (config.compiler.command.is_some() || config.compiler.args.is_some())
    {
        return Err(ConfigError::ValidationError(
            "compiler.command and compiler.args only apply to the lessc backend".to_string(),
        ));
    }
    if config.compiler.command.as_deref() == Some("") {
        return Err(ConfigError::ValidationError(
            "compiler.command must not be empty".to_string(),
        ));
    }

    if config.bundles.is_empty() {
        return Err(ConfigError::MissingField("bundles".to_string()));
    }

    let mut routes = BTreeSet::new();
    for (name, bundle) in &config.bundles {
        if bundle.route.is_empty() {
            return Err(ConfigError::MissingField(format!("bundles.{name}.route")));
        }
        if !bundle.route.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "route '{}' of bundle '{name}' must start with '/'",
                bundle.route
            )));
        }
        if !routes.insert(bundle.route.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate route {}",
                bundle.route
            )));
        }
        if bundle.files.is_empty() && bundle.dirs.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "bundles.{name}.files or bundles.{name}.dirs"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[bundles.main]
route = "/css/main.css"
files = ["main.less"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.bundles.len(), 1);
        assert_eq!(config.bundles["main"].route, "/css/main.css");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[server]
bind = "127.0.0.1:3000"
compile_timeout_ms = 10000

[cache]
dir = "/tmp/css-cache"

[compiler]
minify = true

[bundles.main]
route = "/css/main.css"
files = ["main.less"]
dirs = ["less/"]
watch = ["build/driver.rs"]

[bundles.admin]
route = "/css/admin.css"
files = ["admin.less"]
debug = false
cache_dir = ""
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.cache.dir.as_deref(), Some("/tmp/css-cache"));
        assert_eq!(config.bundles.len(), 2);
        assert_eq!(config.bundles["main"].dirs, vec!["less/"]);
        assert_eq!(config.bundles["main"].watch, vec!["build/driver.rs"]);
        assert!(!config.bundles["admin"].debug);
        assert_eq!(config.bundles["admin"].cache_dir.as_deref(), Some(""));
    }

    #[test]
    fn no_bundles_errors() {
        let err = load_config_from_str("[cache]\ndir = \"/tmp\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn missing_route_errors() {
        let toml = r#"
[bundles.main]
files = ["main.less"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "bundles.main.route"));
    }

    #[test]
    fn relative_route_errors() {
        let toml = r#"
[bundles.main]
route = "main.css"
files = ["main.less"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn duplicate_route_errors() {
        let toml = r#"
[bundles.a]
route = "/site.css"
files = ["a.less"]

[bundles.b]
route = "/site.css"
files = ["b.less"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn bundle_without_sources_errors() {
        let toml = r#"
[bundles.main]
route = "/main.css"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn command_with_lightningcss_errors() {
        let toml = r#"
[compiler]
backend = "lightningcss"
command = "lessc"

[bundles.main]
route = "/main.css"
files = ["main.css"]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("lessc backend")));
    }

    #[test]
    fn empty_command_errors() {
        let toml = r#"
[compiler]
command = ""

[bundles.main]
route = "/main.css"
files = ["main.less"]
"#;
        assert!(matches!(
            load_config_from_str(toml).unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn io_error_from_nonexistent_file() {
        let err = load_config(Path::new("/nonexistent/dir/sheaf.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&config_path, "").unwrap();
        let nested = dir.path().join("web").join("styles");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn find_config_none_without_file() {
        let dir = tempfile::tempdir().unwrap();
        // An ancestor of the temp dir could in principle hold a sheaf.toml,
        // so only check that any hit lies outside the temp dir.
        if let Some(found) = find_config(dir.path()) {
            assert!(!found.starts_with(dir.path()));
        }
    }
}
