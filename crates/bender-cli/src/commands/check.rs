use anyhow::{bail, Result};
use bender_config::BenderConfig;
use bender_core::Resolver;
use std::path::Path;
use tracing::info;

use crate::library;

pub fn execute(config: &BenderConfig, path: &Path) -> Result<()> {
    let library = library::load(path)?;
    let resolver = Resolver::new(&library, config.resolver.clone());

    let results = resolver.resolve_all();
    let total = results.len();
    let mut failed = 0;
    for (name, result) in results {
        match result {
            Ok(component) => match component.binding_error() {
                Some(err) => println!("warn  {name}: watches disabled: {err}"),
                None => println!("ok    {name}"),
            },
            Err(err) => {
                failed += 1;
                println!("FAIL  {name}: {err}");
            }
        }
    }
    info!(total, failed, "Library checked");

    if failed > 0 {
        bail!("{failed} of {total} components failed to resolve");
    }
    Ok(())
}
