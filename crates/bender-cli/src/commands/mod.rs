pub mod check;
pub mod resolve;
pub mod update;

use bender_core::{Site, Value};

/// Instantiation site from `--set` assignments
fn site(assignments: Vec<(String, Value)>) -> Site {
    assignments
        .into_iter()
        .fold(Site::new(), |site, (key, value)| site.with_property(key, value))
}
