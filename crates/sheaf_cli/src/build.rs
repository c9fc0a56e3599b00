//! `sheaf build`: compile one bundle through the cache and write it out.

use std::io::Write;

use sheaf_config::resolve_bundle;
use sheaf_http::{Outcome, Responder, ValidationContext};

use crate::pipeline::load_project;
use crate::{BuildArgs, GlobalArgs};

/// Runs the `sheaf build` command.
///
/// Uses the cached artifact when it is fresh, otherwise compiles and stores
/// a new one. Returns exit code 1 if compilation fails.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let watched = project.watched_paths();
    let bundle = resolve_bundle(&project.config, &args.bundle, &project.base_dir, &watched)?;
    let compiler = project.compiler();

    if !global.quiet {
        eprintln!(
            "   Building {} ({} sources)",
            args.bundle,
            bundle.sources().len()
        );
    }

    let outcome = Responder::new(&bundle, compiler.as_ref()).respond(&ValidationContext::default());
    let (body, label) = match outcome {
        Outcome::Compiled { body, .. } => (body.into_bytes(), "Compiled"),
        Outcome::Cached { body, .. } => (body, "Fresh"),
        Outcome::NotModified { .. } => {
            return Err("artifact reported as not modified without validators".into())
        }
        Outcome::Failed(e) => {
            eprintln!("error: {e}");
            return Ok(1);
        }
    };

    match args.output {
        Some(ref output) => {
            std::fs::write(output, &body)?;
            if !global.quiet {
                eprintln!("   {label} {} -> {output}", args.bundle);
            }
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&body)?;
            stdout.flush()?;
            if !global.quiet {
                eprintln!("   {label} {}", args.bundle);
            }
        }
    }

    Ok(0)
}
