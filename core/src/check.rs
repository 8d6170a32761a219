//! Catalog existence checks
//!
//! Read-only comparison of a vehicle list against a catalog. Nothing here
//! mutates the catalog; it only tells the operator which entries will be
//! skipped when the filter runs.

use hashbrown::HashSet;
use serde::Serialize;
use vehicle_remover_types::ConfigEntry;

use crate::host::{TemplateCatalog, catalog_names};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub total: usize,
    pub disabled: usize,
    /// Entries naming no template at all
    pub unknown: Vec<String>,
    /// Disabled entries whose template exists but isn't loaded this session
    pub not_loaded: Vec<String>,
    /// Names listed more than once (first repeat only)
    pub duplicates: Vec<String>,
    /// Catalog templates the list doesn't mention (left untouched)
    pub unlisted: Vec<String>,
}

impl CheckReport {
    /// True when every entry will be honored as written
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.not_loaded.is_empty() && self.duplicates.is_empty()
    }
}

pub fn check_entries<C: TemplateCatalog + ?Sized>(
    entries: &[ConfigEntry],
    catalog: &C,
) -> CheckReport {
    let mut report = CheckReport {
        total: entries.len(),
        disabled: entries.iter().filter(|e| !e.enabled).count(),
        ..Default::default()
    };

    let names = catalog_names(catalog);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut repeated: HashSet<&str> = HashSet::new();

    for entry in entries {
        if !seen.insert(entry.name.as_str()) {
            if repeated.insert(entry.name.as_str()) {
                report.duplicates.push(entry.name.clone());
            }
            continue;
        }

        if catalog.find_any(&entry.name).is_none() {
            report.unknown.push(entry.name.clone());
        } else if !entry.enabled && catalog.find_loaded(&entry.name).is_none() {
            report.not_loaded.push(entry.name.clone());
        }
    }

    for name in &names {
        if seen.insert(name.as_str()) {
            report.unlisted.push(name.clone());
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Catalog;
    use vehicle_remover_types::ItemClass;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.add_template("Bus", ItemClass::default());
        catalog.add_template("Hearse", ItemClass::default());
        catalog.add_unloaded_template("Monorail", ItemClass::default());
        catalog.add_template("Ambulance", ItemClass::default());
        catalog
    }

    #[test]
    fn test_clean_list() {
        let entries = vec![
            ConfigEntry::enabled("Bus"),
            ConfigEntry::disabled("Hearse"),
            ConfigEntry::enabled("Monorail"),
            ConfigEntry::enabled("Ambulance"),
        ];

        let report = check_entries(&entries, &catalog());
        assert!(report.is_clean());
        assert_eq!(report.total, 4);
        assert_eq!(report.disabled, 1);
        assert!(report.unlisted.is_empty());
    }

    #[test]
    fn test_reports_each_problem() {
        let entries = vec![
            ConfigEntry::disabled("Bus"),
            ConfigEntry::disabled("Zeppelin"),
            ConfigEntry::disabled("Monorail"),
            ConfigEntry::enabled("Bus"),
            ConfigEntry::enabled("Bus"),
        ];

        let report = check_entries(&entries, &catalog());
        assert!(!report.is_clean());
        assert_eq!(report.unknown, vec!["Zeppelin".to_string()]);
        assert_eq!(report.not_loaded, vec!["Monorail".to_string()]);
        assert_eq!(report.duplicates, vec!["Bus".to_string()]);
        assert_eq!(
            report.unlisted,
            vec!["Hearse".to_string(), "Ambulance".to_string()]
        );
    }

    #[test]
    fn test_enabled_unloaded_template_is_fine() {
        let report = check_entries(&[ConfigEntry::enabled("Monorail")], &catalog());
        assert!(report.not_loaded.is_empty());
        assert!(report.is_clean());
    }
}
