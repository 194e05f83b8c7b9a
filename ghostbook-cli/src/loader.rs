use anyhow::{Result, anyhow, bail};
use ghostbook_engine::{CatalogError, CatalogLoader, CatalogState, GhostCatalog, Ghostbook};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads the catalog from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogLoader for FileLoader {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<GhostCatalog, Self::Error> {
        let json = fs::read_to_string(&self.path)?;
        GhostCatalog::from_json(&json)
    }
}

/// The catalog at `path`, or the bundled one when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<GhostCatalog> {
    let (state, source) = match path {
        Some(path) => (
            Ghostbook::new(FileLoader::new(path)).load(),
            path.display().to_string(),
        ),
        None => (Ghostbook::default().load(), "bundled catalog".to_string()),
    };
    match state {
        CatalogState::Ready(catalog) => {
            log::debug!("using {source} ({} ghosts)", catalog.len());
            Ok(catalog)
        }
        CatalogState::Failed(message) => {
            Err(anyhow!(message).context(format!("failed to load {source}")))
        }
        CatalogState::Loading => bail!("{source} did not finish loading"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "ghostbook-loader-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn reads_catalog_from_disk() {
        let path = temp_path("ok");
        fs::write(&path, r#"{"ghosts":[{"ghost":"Shade","evidence":["EMF 5"]}]}"#).unwrap();
        let catalog = load_catalog(Some(&path)).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn missing_file_reports_source() {
        let path = temp_path("missing");
        let err = load_catalog(Some(&path)).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("failed to load"));
        assert!(chain.contains("could not be read"));
    }

    #[test]
    fn falls_back_to_bundled() {
        assert_eq!(load_catalog(None).unwrap().len(), 24);
    }
}
