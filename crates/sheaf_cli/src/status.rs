//! `sheaf status`: fingerprint, artifact path and staleness per bundle.

use serde::Serialize;
use sheaf_cache::{Fingerprint, Staleness};
use sheaf_config::resolve_bundle;

use crate::pipeline::{load_project, Project};
use crate::{GlobalArgs, ReportFormat, StatusArgs};

/// Status of one configured bundle.
#[derive(Debug, Serialize)]
pub struct BundleStatus {
    /// Bundle name.
    pub name: String,
    /// Route the bundle is served at.
    pub route: String,
    /// Number of resolved source files.
    pub sources: usize,
    /// Cache fingerprint, when the bundle resolved.
    pub fingerprint: Option<Fingerprint>,
    /// Artifact path, when caching is enabled.
    pub artifact: Option<String>,
    /// Staleness of the artifact, when caching is enabled.
    pub staleness: Option<Staleness>,
    /// Why the bundle could not be inspected.
    pub error: Option<String>,
}

/// Runs the `sheaf status` command. Returns 1 if any bundle is broken.
pub fn run(args: &StatusArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let report = collect(&project);

    match args.format {
        ReportFormat::Text => {
            for status in &report {
                println!("{}", render_text(status));
            }
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(if report.iter().any(|s| s.error.is_some()) { 1 } else { 0 })
}

/// Inspects every bundle without compiling anything.
pub fn collect(project: &Project) -> Vec<BundleStatus> {
    let watched = project.watched_paths();
    project
        .config
        .bundles
        .iter()
        .map(|(name, bundle_config)| {
            let mut status = BundleStatus {
                name: name.clone(),
                route: bundle_config.route.clone(),
                sources: 0,
                fingerprint: None,
                artifact: None,
                staleness: None,
                error: None,
            };
            let bundle = match resolve_bundle(&project.config, name, &project.base_dir, &watched) {
                Ok(bundle) => bundle,
                Err(e) => {
                    status.error = Some(e.to_string());
                    return status;
                }
            };
            status.sources = bundle.sources().len();
            status.fingerprint = Some(bundle.fingerprint());
            status.artifact = bundle.artifact_path().map(|p| p.display().to_string());
            if status.artifact.is_some() {
                match bundle.staleness() {
                    Ok(staleness) => status.staleness = Some(staleness),
                    Err(e) => status.error = Some(e.to_string()),
                }
            }
            status
        })
        .collect()
}

fn render_text(status: &BundleStatus) -> String {
    let state = match (&status.error, &status.staleness) {
        (Some(e), _) => format!("error: {e}"),
        (None, None) => "uncached".to_string(),
        (None, Some(Staleness::Fresh)) => "fresh".to_string(),
        (None, Some(Staleness::MissingArtifact)) => "not built".to_string(),
        (None, Some(Staleness::SourceChanged(p))) => format!("stale ({} changed)", p.display()),
        (None, Some(Staleness::WatchedChanged(p))) => format!("stale ({} changed)", p.display()),
    };
    let mut line = format!("{:<16} {:<24} {state}", status.name, status.route);
    if let Some(ref artifact) = status.artifact {
        line.push_str(&format!("\n{:<16} {artifact}", ""));
    }
    line
}
