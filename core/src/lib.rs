//! Vehicle Remover core
//!
//! Loads a list of vehicle templates with enabled flags and, for every
//! disabled template, makes the template inert and releases its live
//! vehicles from the host registry.
//!
//! # Architecture
//!
//! ```text
//! host level load ──► VehicleRemover::on_level_loaded(mode)
//!                              │
//!                              ▼
//!                ConfigStore::load()  ── Absent ──► create_default(catalog names)
//!                              │
//!                              ▼
//!                FilterApplier::apply(entries)
//!                   │                      │
//!                   ▼                      ▼
//!          TemplateCatalog          InstanceRegistry
//!        (classes → INERT)    (release active + parked)
//! ```

pub mod check;
pub mod config;
pub mod filter;
pub mod host;
pub mod notify;
pub mod session;
pub mod world;


// Re-exports for convenience
pub use check::{CheckReport, check_entries};
pub use config::{ConfigError, ConfigStore, DEFAULT_CONFIG_FILE};
pub use filter::{FilterApplier, FilterReport};
pub use host::{InstanceRegistry, InstanceSubset, RegistryError, TemplateCatalog, TemplateId};
pub use notify::{MessageLog, Notifier, Severity, TracingNotifier};
pub use session::{LoadMode, MOD_DESCRIPTION, MOD_NAME, SessionOutcome, VehicleRemover};
pub use vehicle_remover_types::{ConfigEntry, ItemClass};
pub use world::{World, WorldSnapshot};
