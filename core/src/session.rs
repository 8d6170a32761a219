//! Level-load entry point
//!
//! The host calls [`VehicleRemover::on_level_loaded`] once per level load.
//! Only gameplay sessions go further: the configuration is loaded (or
//! generated when missing) and applied in one synchronous pass.

use serde::Serialize;

use crate::config::{ConfigError, ConfigStore};
use crate::filter::{FilterApplier, FilterReport};
use crate::host::{InstanceRegistry, TemplateCatalog};
use crate::notify::Notifier;

/// Display name shown in the host's mod list
pub const MOD_NAME: &str = "Vehicle Remover";
pub const MOD_DESCRIPTION: &str = "Disable specific vehicles";

/// What kind of level the host just loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    NewGame,
    LoadGame,
    NewGameFromScenario,
    NewMap,
    LoadMap,
    NewAsset,
    LoadAsset,
    NewTheme,
    LoadTheme,
    NewScenario,
    LoadScenario,
}

impl LoadMode {
    /// True for modes that start an actual game session (not an editor)
    pub fn is_gameplay(&self) -> bool {
        matches!(self, Self::NewGame | Self::LoadGame)
    }
}

/// Result of one level-load trigger
#[derive(Debug)]
pub enum SessionOutcome {
    /// Editor or other non-game mode; nothing was read or touched
    Skipped(LoadMode),
    /// No configuration existed; a default one was written
    Bootstrapped { written: usize },
    Applied(FilterReport),
    /// The pass stopped before mutating anything
    Aborted(ConfigError),
}

impl SessionOutcome {
    pub fn report(&self) -> Option<&FilterReport> {
        match self {
            Self::Applied(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

/// Glue between the host lifecycle and the config/filter pair
#[derive(Debug, Clone, Default)]
pub struct VehicleRemover {
    store: ConfigStore,
}

impl VehicleRemover {
    pub fn new(store: ConfigStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn on_level_loaded<C, R>(
        &self,
        mode: LoadMode,
        catalog: &mut C,
        registry: &mut R,
        notifier: &mut dyn Notifier,
    ) -> SessionOutcome
    where
        C: TemplateCatalog + ?Sized,
        R: InstanceRegistry + ?Sized,
    {
        if !mode.is_gameplay() {
            tracing::debug!("[SESSION] Ignoring level load in {:?} mode", mode);
            return SessionOutcome::Skipped(mode);
        }

        self.load_and_apply(catalog, registry, notifier)
    }

    /// Load the configuration and apply it, bootstrapping a default file when
    /// there is none yet
    pub fn load_and_apply<C, R>(
        &self,
        catalog: &mut C,
        registry: &mut R,
        notifier: &mut dyn Notifier,
    ) -> SessionOutcome
    where
        C: TemplateCatalog + ?Sized,
        R: InstanceRegistry + ?Sized,
    {
        let entries = match self.store.load() {
            Ok(entries) => entries,
            Err(ConfigError::Absent { .. }) => {
                tracing::info!(
                    "[SESSION] Configuration file not found. Creating new configuration file."
                );
                return self.bootstrap(catalog, notifier);
            }
            Err(e) => {
                tracing::warn!("[SESSION] {}", e);
                notifier.warning(&e.to_string());
                return SessionOutcome::Aborted(e);
            }
        };

        let disabled = entries.iter().filter(|e| !e.enabled).count();
        notifier.info(&format!("configuration loaded, {} disabled", disabled));

        let report = FilterApplier::new(notifier).apply(&entries, catalog, registry);
        SessionOutcome::Applied(report)
    }

    fn bootstrap<C: TemplateCatalog + ?Sized>(
        &self,
        catalog: &C,
        notifier: &mut dyn Notifier,
    ) -> SessionOutcome {
        match self.store.create_default_from_catalog(catalog) {
            Ok(written) => {
                notifier.info(&format!(
                    "created configuration with {} vehicles at \"{}\"",
                    written,
                    self.store.directory().display()
                ));
                SessionOutcome::Bootstrapped { written }
            }
            Err(e) => {
                tracing::warn!("[SESSION] {}", e);
                notifier.warning(&e.to_string());
                SessionOutcome::Aborted(e)
            }
        }
    }
}
