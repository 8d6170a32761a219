//! Persisted vehicle list.
//!
//! The on-disk shape is an XML document rooted at `<ArrayOfVehicle>` holding
//! one `<Vehicle name="...">` element per template, each with a required
//! `<enabled>` child:
//!
//! ```xml
//! <ArrayOfVehicle>
//!   <Vehicle name="basic_bus">
//!     <enabled>true</enabled>
//!   </Vehicle>
//! </ArrayOfVehicle>
//! ```

use serde::{Deserialize, Serialize};

/// One line of the configuration: a template name and whether its vehicles
/// are allowed to exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename = "Vehicle")]
pub struct ConfigEntry {
    /// Template identifier as reported by the host catalog
    #[serde(rename = "@name")]
    pub name: String,

    pub enabled: bool,
}

impl ConfigEntry {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
        }
    }

    /// Entry for a freshly discovered template. Nothing is filtered until
    /// the operator edits the file.
    pub fn enabled(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    pub fn disabled(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }
}

/// Root element of the configuration file.
///
/// A root with no `<Vehicle>` children (or one marked nil) deserializes to an
/// empty list; callers decide what an empty list means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "ArrayOfVehicle")]
pub struct VehicleList {
    #[serde(rename = "Vehicle", default)]
    pub vehicles: Vec<ConfigEntry>,
}

impl VehicleList {
    pub fn new(vehicles: Vec<ConfigEntry>) -> Self {
        Self { vehicles }
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Entries whose vehicles should be removed
    pub fn disabled(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.vehicles.iter().filter(|entry| !entry.enabled)
    }

    pub fn into_entries(self) -> Vec<ConfigEntry> {
        self.vehicles
    }
}

impl From<Vec<ConfigEntry>> for VehicleList {
    fn from(vehicles: Vec<ConfigEntry>) -> Self {
        Self { vehicles }
    }
}
