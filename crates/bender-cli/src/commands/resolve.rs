use anyhow::{Context, Result};
use bender_config::BenderConfig;
use bender_core::{Resolver, Value};
use std::path::Path;

use super::site;
use crate::cli::OutputFormat;
use crate::{library, render};

pub fn execute(
    config: &BenderConfig,
    path: &Path,
    component: &str,
    set: Vec<(String, Value)>,
    format: OutputFormat,
) -> Result<()> {
    let library = library::load(path)?;
    let resolver = Resolver::new(&library, config.resolver.clone());
    let resolved = resolver
        .resolve(component, &site(set))
        .with_context(|| format!("failed to resolve `{component}`"))?;

    match format {
        OutputFormat::Outline => print!("{}", render::component_outline(&resolved)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&render::component_json(&resolved)?)?
        ),
    }
    Ok(())
}
