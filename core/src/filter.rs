//! Applying the configuration to a live session
//!
//! Disabled templates are made inert so the host stops picking them, then
//! every vehicle already spawned from them is released. The registry scan is
//! the expensive part and is skipped entirely when no template was resolved.

use hashbrown::HashSet;
use serde::Serialize;
use vehicle_remover_types::{ConfigEntry, ItemClass};

use crate::host::{InstanceRegistry, InstanceSubset, TemplateCatalog, TemplateId};
use crate::notify::Notifier;

/// Outcome of one [`FilterApplier::apply`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    /// Distinct loaded templates named by a disabled entry
    pub templates_disabled: usize,
    /// Templates whose class was rewritten this pass (the rest were already inert)
    pub newly_inert: usize,
    pub released_active: usize,
    pub released_parked: usize,
    /// Releases the registry refused
    pub release_failures: usize,
    /// Disabled names with no loaded template, in entry order
    pub not_found: Vec<String>,
    /// Whether the registry was scanned at all
    pub scanned: bool,
}

impl FilterReport {
    pub fn released(&self, subset: InstanceSubset) -> usize {
        match subset {
            InstanceSubset::Active => self.released_active,
            InstanceSubset::Parked => self.released_parked,
        }
    }

    pub fn total_released(&self) -> usize {
        self.released_active + self.released_parked
    }

    fn add_released(&mut self, subset: InstanceSubset, count: usize) {
        match subset {
            InstanceSubset::Active => self.released_active += count,
            InstanceSubset::Parked => self.released_parked += count,
        }
    }
}

/// Applies a loaded vehicle list against the host catalog and registry.
pub struct FilterApplier<'n> {
    notifier: &'n mut dyn Notifier,
}

impl<'n> FilterApplier<'n> {
    pub fn new(notifier: &'n mut dyn Notifier) -> Self {
        Self { notifier }
    }

    pub fn apply<C, R>(
        &mut self,
        entries: &[ConfigEntry],
        catalog: &mut C,
        registry: &mut R,
    ) -> FilterReport
    where
        C: TemplateCatalog + ?Sized,
        R: InstanceRegistry + ?Sized,
    {
        let mut report = FilterReport::default();

        let disabled = self.disable_templates(entries, catalog, &mut report);
        report.templates_disabled = disabled.len();

        if disabled.is_empty() {
            tracing::debug!("[FILTER] No templates disabled, skipping registry scan");
            return report;
        }

        // Transfer eligibility depends on template classes we just rewrote
        registry.mark_transfer_cache_dirty();
        report.scanned = true;

        for subset in InstanceSubset::ALL {
            let released = self.release_matching(registry, subset, &disabled, &mut report);
            report.add_released(subset, released);
        }

        tracing::info!(
            "[FILTER] Disabled {} templates ({} newly), released {} active and {} parked vehicles",
            report.templates_disabled,
            report.newly_inert,
            report.released_active,
            report.released_parked
        );

        report
    }

    /// Resolve disabled entries and rewrite their classes.
    /// Returns the set of resolved templates.
    fn disable_templates<C: TemplateCatalog + ?Sized>(
        &mut self,
        entries: &[ConfigEntry],
        catalog: &mut C,
        report: &mut FilterReport,
    ) -> HashSet<TemplateId> {
        let mut disabled = HashSet::new();

        for entry in entries.iter().filter(|e| !e.enabled) {
            let Some(id) = catalog.find_loaded(&entry.name) else {
                tracing::warn!("[FILTER] Vehicle '{}' not found among loaded templates", entry.name);
                self.notifier
                    .warning(&format!("vehicle \"{}\" not found", entry.name));
                report.not_found.push(entry.name.clone());
                continue;
            };

            if !disabled.insert(id) {
                continue;
            }

            if catalog.classification(id).is_some_and(|class| class.is_inert()) {
                tracing::debug!("[FILTER] '{}' ({}) already inert", entry.name, id);
                continue;
            }

            catalog.set_classification(id, ItemClass::INERT);
            report.newly_inert += 1;
            tracing::debug!("[FILTER] '{}' ({}) made inert", entry.name, id);
        }

        disabled
    }

    /// Release every vehicle in `subset` built from a disabled template
    fn release_matching<R: InstanceRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        subset: InstanceSubset,
        disabled: &HashSet<TemplateId>,
        report: &mut FilterReport,
    ) -> usize {
        let mut released = 0;

        // Size is re-read every step, the registry owns it
        let mut index = 0;
        while index < registry.len(subset) {
            let matches = registry
                .template_at(subset, index)
                .is_some_and(|template| disabled.contains(&template));

            if matches {
                match registry.release(subset, index) {
                    Ok(()) => released += 1,
                    Err(e) => {
                        tracing::warn!("[FILTER] {}", e);
                        self.notifier.warning(&e.to_string());
                        report.release_failures += 1;
                    }
                }
            }
            index += 1;
        }

        released
    }
}
