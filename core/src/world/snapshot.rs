//! TOML world snapshots
//!
//! ```toml
//! active_size = 16
//!
//! [[template]]
//! name = "Bus"
//! service = "public_transport"
//! sub_service = "public_transport_bus"
//! level = "level1"
//!
//! [[template]]
//! name = "Hearse"
//! loaded = false
//!
//! [[vehicle]]
//! slot = 3
//! template = "Bus"
//!
//! [[parked]]
//! template = "Hearse"
//! ```
//!
//! A template with an empty name stands for an empty catalog slot. Vehicles
//! without a `slot` go into the first free one. Slot indices and subset sizes
//! are bounded by [`MAX_SLOTS`], the game's 16-bit instance index space.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vehicle_remover_types::{ItemClass, Level, Service, SubService};

use super::{Catalog, Template, World};
use crate::host::{InstanceSubset, TemplateCatalog, TemplateId};

/// Largest subset size a snapshot may describe
pub const MAX_SLOTS: usize = u16::MAX as usize + 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Serialize error: {source}")]
    Serialize { source: toml::ser::Error },

    #[error("{subset} vehicle references unknown template \"{name}\"")]
    UnknownTemplate {
        subset: InstanceSubset,
        name: String,
    },

    #[error("{subset} slot {slot} is listed twice")]
    DuplicateSlot { subset: InstanceSubset, slot: usize },

    #[error("{subset} slot {slot} is out of range (at most {max} slots)")]
    SlotOutOfRange {
        subset: InstanceSubset,
        slot: usize,
        max: usize,
    },
}

/// Root of a snapshot file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Minimum size of the active subset (free slots included)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_size: Option<usize>,

    /// Minimum size of the parked subset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parked_size: Option<usize>,

    #[serde(default, rename = "template")]
    pub templates: Vec<TemplateSpec>,

    #[serde(default, rename = "vehicle")]
    pub vehicles: Vec<InstanceSpec>,

    #[serde(default)]
    pub parked: Vec<InstanceSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: String,

    #[serde(default = "default_true")]
    pub loaded: bool,

    #[serde(default)]
    pub service: Service,

    #[serde(default)]
    pub sub_service: SubService,

    #[serde(default)]
    pub level: Level,
}

impl TemplateSpec {
    pub fn class(&self) -> ItemClass {
        ItemClass::new(self.service, self.sub_service, self.level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
    pub template: String,
}

fn default_true() -> bool {
    true
}

impl WorldSnapshot {
    /// Read a snapshot from a TOML file
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = fs::read_to_string(path).map_err(|e| SnapshotError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| SnapshotError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write a snapshot to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| SnapshotError::Serialize { source: e })?;

        fs::write(path, contents).map_err(|e| SnapshotError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl World {
    /// Build a world from a snapshot, resolving vehicle templates by name
    pub fn from_snapshot(snapshot: &WorldSnapshot) -> Result<Self, SnapshotError> {
        let mut world = World::new();

        for spec in &snapshot.templates {
            if spec.name.is_empty() {
                world.catalog.add_hole();
            } else if spec.loaded {
                world.catalog.add_template(spec.name.as_str(), spec.class());
            } else {
                world
                    .catalog
                    .add_unloaded_template(spec.name.as_str(), spec.class());
            }
        }

        let subsets = [
            (InstanceSubset::Active, &snapshot.vehicles, snapshot.active_size),
            (InstanceSubset::Parked, &snapshot.parked, snapshot.parked_size),
        ];

        for (subset, specs, size) in subsets {
            let size = size.unwrap_or(0);
            if size > MAX_SLOTS {
                return Err(SnapshotError::SlotOutOfRange {
                    subset,
                    slot: size - 1,
                    max: MAX_SLOTS,
                });
            }
            world.registry.reserve_slots(subset, size);

            // Pinned slots first so unpinned vehicles can't take them
            for spec in specs {
                let Some(slot) = spec.slot else { continue };
                check_slot(subset, slot)?;
                let template = resolve(&world.catalog, subset, &spec.template)?;
                if world.registry.vehicles(subset).get(slot).copied().flatten().is_some() {
                    return Err(SnapshotError::DuplicateSlot { subset, slot });
                }
                world.registry.place(subset, slot, template);
            }

            for spec in specs.iter().filter(|s| s.slot.is_none()) {
                let template = resolve(&world.catalog, subset, &spec.template)?;
                let slot = world.registry.spawn(subset, template);
                check_slot(subset, slot)?;
            }
        }

        Ok(world)
    }

    /// Read and build a world from a TOML snapshot file
    pub fn load_snapshot(path: &Path) -> Result<Self, SnapshotError> {
        Self::from_snapshot(&WorldSnapshot::load(path)?)
    }

    /// Export the current state, classifications and releases included
    pub fn to_snapshot(&self) -> WorldSnapshot {
        let templates = self
            .catalog
            .templates
            .iter()
            .map(|slot| match slot {
                Some(Template {
                    name,
                    loaded,
                    class,
                }) => TemplateSpec {
                    name: name.clone(),
                    loaded: *loaded,
                    service: class.service,
                    sub_service: class.sub_service,
                    level: class.level,
                },
                None => TemplateSpec {
                    name: String::new(),
                    loaded: false,
                    service: Service::None,
                    sub_service: SubService::None,
                    level: Level::None,
                },
            })
            .collect();

        let export = |subset: InstanceSubset| -> Vec<InstanceSpec> {
            self.registry
                .vehicles(subset)
                .iter()
                .enumerate()
                .filter_map(|(slot, template)| {
                    let template = self.catalog.template((*template)?)?;
                    Some(InstanceSpec {
                        slot: Some(slot),
                        template: template.name.clone(),
                    })
                })
                .collect()
        };

        WorldSnapshot {
            active_size: Some(self.registry.active.len()),
            parked_size: Some(self.registry.parked.len()),
            templates,
            vehicles: export(InstanceSubset::Active),
            parked: export(InstanceSubset::Parked),
        }
    }
}

fn check_slot(subset: InstanceSubset, slot: usize) -> Result<(), SnapshotError> {
    if slot >= MAX_SLOTS {
        return Err(SnapshotError::SlotOutOfRange {
            subset,
            slot,
            max: MAX_SLOTS,
        });
    }
    Ok(())
}

fn resolve(catalog: &Catalog, subset: InstanceSubset, name: &str) -> Result<TemplateId, SnapshotError> {
    catalog
        .find_any(name)
        .ok_or_else(|| SnapshotError::UnknownTemplate {
            subset,
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InstanceRegistry;

    const SNAPSHOT: &str = r#"
active_size = 8

[[template]]
name = "Bus"
service = "public_transport"
sub_service = "public_transport_bus"
level = "level1"

[[template]]
name = ""

[[template]]
name = "Hearse"
loaded = false
service = "health_care"

[[vehicle]]
slot = 0
template = "Bus"

[[vehicle]]
template = "Hearse"

[[parked]]
slot = 2
template = "Bus"
"#;

    #[test]
    fn test_parse_snapshot() {
        let snapshot: WorldSnapshot = toml::from_str(SNAPSHOT).unwrap();
        assert_eq!(snapshot.templates.len(), 3);
        assert_eq!(snapshot.vehicles.len(), 2);
        assert_eq!(snapshot.parked.len(), 1);
        assert!(!snapshot.templates[2].loaded);
        assert_eq!(snapshot.templates[2].service, Service::HealthCare);
    }

    #[test]
    fn test_world_from_snapshot() {
        let snapshot: WorldSnapshot = toml::from_str(SNAPSHOT).unwrap();
        let world = World::from_snapshot(&snapshot).unwrap();

        let bus = world.catalog.find_loaded("Bus").unwrap();
        let hearse = world.catalog.find_any("Hearse").unwrap();
        assert_eq!(world.catalog.find_loaded("Hearse"), None);
        assert_eq!(world.catalog.prefab_name(1), None);

        let registry = &world.registry;
        assert_eq!(registry.len(InstanceSubset::Active), 8);
        assert_eq!(registry.template_at(InstanceSubset::Active, 0), Some(bus));
        // Unpinned vehicle takes the first free slot after pinned ones
        assert_eq!(registry.template_at(InstanceSubset::Active, 1), Some(hearse));
        assert_eq!(registry.len(InstanceSubset::Parked), 3);
        assert_eq!(registry.template_at(InstanceSubset::Parked, 2), Some(bus));
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let snapshot: WorldSnapshot = toml::from_str(
            r#"
[[template]]
name = "Bus"

[[parked]]
template = "Tram"
"#,
        )
        .unwrap();

        let err = World::from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnknownTemplate {
                subset: InstanceSubset::Parked,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_slot_is_rejected() {
        let snapshot: WorldSnapshot = toml::from_str(
            r#"
[[template]]
name = "Bus"

[[vehicle]]
slot = 1
template = "Bus"

[[vehicle]]
slot = 1
template = "Bus"
"#,
        )
        .unwrap();

        assert!(matches!(
            World::from_snapshot(&snapshot).unwrap_err(),
            SnapshotError::DuplicateSlot { slot: 1, .. }
        ));
    }

    #[test]
    fn test_out_of_range_slot_is_rejected() {
        let snapshot = WorldSnapshot {
            templates: vec![TemplateSpec {
                name: "Bus".to_string(),
                loaded: true,
                service: Service::None,
                sub_service: SubService::None,
                level: Level::None,
            }],
            vehicles: vec![InstanceSpec {
                slot: Some(usize::MAX),
                template: "Bus".to_string(),
            }],
            ..Default::default()
        };

        assert!(matches!(
            World::from_snapshot(&snapshot).unwrap_err(),
            SnapshotError::SlotOutOfRange {
                subset: InstanceSubset::Active,
                slot: usize::MAX,
                ..
            }
        ));
    }

    #[test]
    fn test_last_slot_is_accepted() {
        let snapshot: WorldSnapshot = toml::from_str(
            r#"
[[template]]
name = "Bus"

[[parked]]
slot = 65535
template = "Bus"
"#,
        )
        .unwrap();

        let world = World::from_snapshot(&snapshot).unwrap();
        assert_eq!(world.registry.len(InstanceSubset::Parked), MAX_SLOTS);
    }

    #[test]
    fn test_oversized_subset_is_rejected() {
        let snapshot: WorldSnapshot = toml::from_str(
            r#"
active_size = 1000000000000
"#,
        )
        .unwrap();

        assert!(matches!(
            World::from_snapshot(&snapshot).unwrap_err(),
            SnapshotError::SlotOutOfRange {
                subset: InstanceSubset::Active,
                ..
            }
        ));
    }

    #[test]
    fn test_export_reflects_releases() {
        let snapshot: WorldSnapshot = toml::from_str(SNAPSHOT).unwrap();
        let mut world = World::from_snapshot(&snapshot).unwrap();
        world.registry.release(InstanceSubset::Active, 0).unwrap();

        let exported = world.to_snapshot();
        assert_eq!(exported.active_size, Some(8));
        assert_eq!(
            exported.vehicles,
            vec![InstanceSpec {
                slot: Some(1),
                template: "Hearse".to_string(),
            }]
        );

        let rebuilt = World::from_snapshot(&exported).unwrap();
        assert_eq!(rebuilt.registry.live_count(InstanceSubset::Active), 1);
        assert_eq!(rebuilt.registry.live_count(InstanceSubset::Parked), 1);
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.toml");

        let snapshot: WorldSnapshot = toml::from_str(SNAPSHOT).unwrap();
        let world = World::from_snapshot(&snapshot).unwrap();
        world.to_snapshot().save(&path).unwrap();

        let reloaded = World::load_snapshot(&path).unwrap();
        assert_eq!(reloaded.to_snapshot(), world.to_snapshot());
    }
}
