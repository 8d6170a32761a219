//! Configuration file loading and bootstrapping
//!
//! The configuration is a flat XML list of `(name, enabled)` pairs stored in
//! a fixed file relative to the working directory. When the file is missing,
//! [`ConfigStore::create_default`] writes one enabled entry per catalog
//! template so the operator has something to edit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hashbrown::HashSet;
use serde::Serialize;
use vehicle_remover_types::{ConfigEntry, VehicleList};

use crate::host::{TemplateCatalog, catalog_names};

/// File name used when no explicit path is configured
pub const DEFAULT_CONFIG_FILE: &str = "VehicleRemover.xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Errors that can occur while loading or writing the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No file yet; the caller should generate a default one
    #[error("configuration file {path:?} not found")]
    Absent { path: PathBuf },

    #[error("configuration file {path:?} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        source: quick_xml::DeError,
    },

    /// The file parsed but listed no vehicles
    #[error("configuration file {path:?} contains no vehicles")]
    EmptyResult { path: PathBuf },

    #[error("IO error reading {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("catalog empty, no configuration written")]
    EmptyCatalog,

    #[error("couldn't create configuration file at \"{}\": {source}", .dir.display())]
    WriteFailure {
        path: PathBuf,
        dir: PathBuf,
        source: io::Error,
    },

    #[error("failed to serialize configuration: {source}")]
    Serialize { source: quick_xml::SeError },
}

impl ConfigError {
    /// Missing file is a branch into bootstrapping, not a failure
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent { .. })
    }
}

/// Reads and writes the vehicle list at a fixed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute directory the file lives in, for operator messages
    pub fn directory(&self) -> PathBuf {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);

        match (parent, std::env::current_dir()) {
            (Some(dir), Ok(cwd)) => cwd.join(dir),
            (Some(dir), Err(_)) => dir,
            (None, Ok(cwd)) => cwd,
            (None, Err(_)) => PathBuf::from("."),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the vehicle list.
    ///
    /// A parse failure is returned as-is: no partial list is ever produced.
    pub fn load(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::Absent {
                    path: self.path.clone(),
                });
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        // Undecodable text is a parse failure, not an I/O one
        let contents = String::from_utf8(bytes).map_err(|e| ConfigError::Malformed {
            path: self.path.clone(),
            source: quick_xml::DeError::Custom(format!("invalid UTF-8: {}", e)),
        })?;

        let list: VehicleList =
            quick_xml::de::from_str(&contents).map_err(|e| ConfigError::Malformed {
                path: self.path.clone(),
                source: e,
            })?;

        if list.is_empty() {
            return Err(ConfigError::EmptyResult {
                path: self.path.clone(),
            });
        }

        tracing::debug!(
            "[CONFIG] Loaded {} entries from {:?} ({} disabled)",
            list.len(),
            self.path,
            list.disabled().count()
        );

        Ok(list.into_entries())
    }

    /// Write an all-enabled list built from `names`.
    ///
    /// Empty names are skipped and duplicates keep their first position.
    /// Returns the number of entries written.
    pub fn create_default<I, S>(&self, names: I) -> Result<usize, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let entries: Vec<ConfigEntry> = names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref();
                (!name.is_empty() && seen.insert(name.to_string()))
                    .then(|| ConfigEntry::enabled(name))
            })
            .collect();

        if entries.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        self.save(&entries)?;

        tracing::info!(
            "[CONFIG] Created default configuration with {} vehicles at {:?}",
            entries.len(),
            self.path
        );

        Ok(entries.len())
    }

    /// [`Self::create_default`] fed from every template the catalog knows
    pub fn create_default_from_catalog<C: TemplateCatalog + ?Sized>(
        &self,
        catalog: &C,
    ) -> Result<usize, ConfigError> {
        self.create_default(catalog_names(catalog))
    }

    /// Serialize `entries` to the configuration path, replacing any old file
    pub fn save(&self, entries: &[ConfigEntry]) -> Result<(), ConfigError> {
        let contents = to_xml(entries)?;

        let write = || -> io::Result<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&self.path, contents)
        };

        write().map_err(|e| ConfigError::WriteFailure {
            path: self.path.clone(),
            dir: self.directory(),
            source: e,
        })
    }
}

/// Render entries in the on-disk format (declaration + indented list)
pub fn to_xml(entries: &[ConfigEntry]) -> Result<String, ConfigError> {
    let list = VehicleList::new(entries.to_vec());

    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    list.serialize(serializer)
        .map_err(|e| ConfigError::Serialize { source: e })?;

    Ok(format!("{}\n{}\n", XML_DECLARATION, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join(DEFAULT_CONFIG_FILE))
    }

    #[test]
    fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let err = store.load().unwrap_err();
        assert!(err.is_absent(), "unexpected error: {err}");
        assert!(!store.exists());
    }

    #[test]
    fn test_default_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let written = store
            .create_default(["Bus", "Hearse", "", "Bus", "Garbage Truck"])
            .unwrap();
        assert_eq!(written, 3);

        let entries = store.load().unwrap();
        assert_eq!(
            entries,
            vec![
                ConfigEntry::enabled("Bus"),
                ConfigEntry::enabled("Hearse"),
                ConfigEntry::enabled("Garbage Truck"),
            ]
        );
    }

    #[test]
    fn test_written_file_has_declaration() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.create_default(["Bus"]).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with(XML_DECLARATION));
        assert!(raw.contains("<ArrayOfVehicle>"));
        assert!(raw.contains(r#"<Vehicle name="Bus">"#));
    }

    #[test]
    fn test_empty_catalog_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let err = store.create_default(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCatalog));
        assert!(!store.exists());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"<ArrayOfVehicle><Vehicle name="Bus"><enabled>maybe</enabled></Vehicle></ArrayOfVehicle>"#,
        )
        .unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }), "got {err}");
    }

    #[test]
    fn test_truncated_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"<ArrayOfVehicle><Vehicle name="Bus"><enab"#).unwrap();

        assert!(matches!(
            store.load().unwrap_err(),
            ConfigError::Malformed { .. }
        ));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut raw = br#"<ArrayOfVehicle><Vehicle name=""#.to_vec();
        raw.extend_from_slice(&[0xff, 0xfe, 0x80]);
        raw.extend_from_slice(br#""><enabled>false</enabled></Vehicle></ArrayOfVehicle>"#);
        fs::write(store.path(), raw).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }), "got {err}");
        assert!(err.to_string().contains("invalid UTF-8"));
    }

    #[test]
    fn test_empty_list_is_soft_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "<ArrayOfVehicle></ArrayOfVehicle>").unwrap();

        assert!(matches!(
            store.load().unwrap_err(),
            ConfigError::EmptyResult { .. }
        ));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join("VehicleRemover.xml"));

        store.save(&[ConfigEntry::disabled("Tram")]).unwrap();
        assert_eq!(store.load().unwrap(), vec![ConfigEntry::disabled("Tram")]);
    }

    #[test]
    fn test_write_failure_reports_directory() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the file name makes the write fail
        let target = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::create_dir(&target).unwrap();
        let store = ConfigStore::new(&target);

        let err = store.create_default(["Bus"]).unwrap_err();
        match &err {
            ConfigError::WriteFailure { dir: reported, .. } => {
                assert_eq!(reported, dir.path());
            }
            other => panic!("expected WriteFailure, got {other}"),
        }
        assert!(err.to_string().contains("couldn't create configuration file at"));
    }

    #[test]
    fn test_default_path_is_working_directory() {
        let store = ConfigStore::default();
        assert_eq!(store.path(), Path::new(DEFAULT_CONFIG_FILE));
        assert_eq!(store.directory(), std::env::current_dir().unwrap());
    }
}
