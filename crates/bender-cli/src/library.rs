//! Library document loading

use anyhow::{Context, Result};
use bender_core::{ComponentLibrary, LibraryDocument};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a `.toml` or `.json` library document and build its components
///
/// Anything without a `.toml` extension is parsed as JSON.
pub fn load(path: &Path) -> Result<ComponentLibrary> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read library {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let document = if is_toml {
        LibraryDocument::from_toml_str(&contents)
    } else {
        LibraryDocument::from_json_str(&contents)
    }
    .with_context(|| format!("failed to parse library {}", path.display()))?;

    debug!(path = %path.display(), components = document.components.len(), "Loaded library");
    document
        .into_library()
        .with_context(|| format!("invalid library {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bender_core::Registry;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn loads_by_extension() {
        let mut toml = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(toml, "[[components]]\nname = \"A\"").unwrap();
        assert!(load(toml.path()).unwrap().contains("A"));

        let mut json = Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(json, r#"{{"components": [{{"name": "B"}}]}}"#).unwrap();
        assert!(load(json.path()).unwrap().contains("B"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load(Path::new("/nonexistent/lib.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/lib.json"));
    }
}
