use anyhow::{Context, Result};
use bender_config::BenderConfig;
use bender_core::{Resolver, Value};
use std::path::Path;

use super::site;
use crate::{library, render};

pub fn execute(
    config: &BenderConfig,
    path: &Path,
    component: &str,
    set: Vec<(String, Value)>,
    writes: Vec<(String, Value)>,
) -> Result<()> {
    let library = library::load(path)?;
    let resolver = Resolver::new(&library, config.resolver.clone());
    let mut resolved = resolver
        .resolve(component, &site(set))
        .with_context(|| format!("failed to resolve `{component}`"))?;

    for (property, value) in writes {
        let report = resolved
            .set_property(&property, value.clone())
            .with_context(|| format!("failed to write `{property}`"))?;
        print!("{}", render::update_report(&resolved, &report, &value));
    }
    println!();
    print!("{}", render::component_outline(&resolved));
    Ok(())
}
