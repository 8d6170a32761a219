use std::path::Path;

use serde::Serialize;
use vehicle_remover_core::{
    ConfigStore, FilterReport, InstanceSubset, LoadMode, MessageLog, SessionOutcome,
    VehicleRemover, World, check_entries,
};

pub const EXIT_OK: u8 = 0;
/// Bad input, unreadable files or an aborted pass
pub const EXIT_FAILED: u8 = 1;
/// `check` found entries that won't be honored
pub const EXIT_UNCLEAN: u8 = 2;

fn load_world(path: &Path) -> Result<World, String> {
    World::load_snapshot(path).map_err(|e| e.to_string())
}

pub fn init(store: &ConfigStore, world: &Path, force: bool) -> Result<u8, String> {
    if store.exists() && !force {
        return Err(format!(
            "{} already exists, pass --force to replace it",
            store.path().display()
        ));
    }

    let world = load_world(world)?;
    let written = store
        .create_default_from_catalog(&world.catalog)
        .map_err(|e| e.to_string())?;

    println!("Wrote {} vehicles to {}", written, store.path().display());
    Ok(EXIT_OK)
}

pub fn check(store: &ConfigStore, world: &Path, json: bool) -> Result<u8, String> {
    let world = load_world(world)?;
    let entries = store.load().map_err(|e| e.to_string())?;
    let report = check_entries(&entries, &world.catalog);

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", out);
    } else {
        println!(
            "{}: {} entries, {} disabled",
            store.path().display(),
            report.total,
            report.disabled
        );
        print_names("Unknown templates", &report.unknown);
        print_names("Disabled but not loaded", &report.not_loaded);
        print_names("Duplicate entries", &report.duplicates);
        print_names("Not listed (left untouched)", &report.unlisted);
        if report.is_clean() {
            println!("OK");
        }
    }

    Ok(if report.is_clean() {
        EXIT_OK
    } else {
        EXIT_UNCLEAN
    })
}

fn print_names(heading: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    println!("{} ({}):", heading, names.len());
    for name in names {
        println!("  {}", name);
    }
}

/// JSON shape of an `apply` run
#[derive(Serialize)]
struct ApplyOutput<'a> {
    mode: LoadMode,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    written: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a FilterReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    messages: Vec<&'a str>,
}

pub fn apply(
    store: &ConfigStore,
    world_path: &Path,
    mode: LoadMode,
    out: Option<&Path>,
    json: bool,
) -> Result<u8, String> {
    let mut world = load_world(world_path)?;
    let remover = VehicleRemover::new(store.clone());
    let mut log = if json {
        MessageLog::new()
    } else {
        MessageLog::echoing()
    };

    let outcome =
        remover.on_level_loaded(mode, &mut world.catalog, &mut world.registry, &mut log);

    if let Some(out) = out {
        world.to_snapshot().save(out).map_err(|e| e.to_string())?;
        tracing::info!(path = %out.display(), "Wrote resulting world");
    }

    if json {
        let output = ApplyOutput {
            mode,
            outcome: outcome_label(&outcome),
            written: match &outcome {
                SessionOutcome::Bootstrapped { written } => Some(*written),
                _ => None,
            },
            report: outcome.report(),
            error: match &outcome {
                SessionOutcome::Aborted(e) => Some(e.to_string()),
                _ => None,
            },
            messages: log.messages().iter().map(|m| m.text.as_str()).collect(),
        };
        let out = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
        println!("{}", out);
    } else {
        print_outcome(&outcome);
    }

    Ok(if outcome.is_aborted() {
        EXIT_FAILED
    } else {
        EXIT_OK
    })
}

fn outcome_label(outcome: &SessionOutcome) -> &'static str {
    match outcome {
        SessionOutcome::Skipped(_) => "skipped",
        SessionOutcome::Bootstrapped { .. } => "bootstrapped",
        SessionOutcome::Applied(_) => "applied",
        SessionOutcome::Aborted(_) => "aborted",
    }
}

fn print_outcome(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Skipped(mode) => println!("Skipped: {:?} is not a game session", mode),
        SessionOutcome::Bootstrapped { written } => {
            println!("No configuration found, wrote {} vehicles", written)
        }
        SessionOutcome::Applied(report) => {
            println!("Templates disabled: {}", report.templates_disabled);
            println!("  newly inert:      {}", report.newly_inert);
            for subset in InstanceSubset::ALL {
                println!("Released ({}): {}", subset, report.released(subset));
            }
            if report.release_failures > 0 {
                println!("Release failures:   {}", report.release_failures);
            }
            print_names("Not found", &report.not_found);
        }
        SessionOutcome::Aborted(e) => println!("Aborted: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use vehicle_remover_core::{ConfigEntry, ItemClass, TemplateCatalog};

    const CITY: &str = r#"
[[template]]
name = "Bus"
service = "public_transport"
sub_service = "public_transport_bus"
level = "level1"

[[template]]
name = "Truck"
service = "industrial"
sub_service = "industrial_generic"

[[vehicle]]
template = "Bus"

[[vehicle]]
template = "Truck"

[[parked]]
template = "Truck"
"#;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        world: PathBuf,
        store: ConfigStore,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let world = root.join("city.toml");
        fs::write(&world, CITY).unwrap();
        let store = ConfigStore::new(root.join("VehicleRemover.xml"));
        Fixture {
            _dir: dir,
            root,
            world,
            store,
        }
    }

    #[test]
    fn test_init_writes_catalog() {
        let fx = fixture();

        assert_eq!(init(&fx.store, &fx.world, false), Ok(EXIT_OK));
        assert_eq!(
            fx.store.load().unwrap(),
            vec![ConfigEntry::enabled("Bus"), ConfigEntry::enabled("Truck")]
        );
    }

    #[test]
    fn test_init_keeps_existing_file_without_force() {
        let fx = fixture();
        let edited = vec![ConfigEntry::disabled("Truck")];
        fx.store.save(&edited).unwrap();

        let err = init(&fx.store, &fx.world, false).unwrap_err();
        assert!(err.contains("--force"), "unexpected error: {err}");
        assert_eq!(fx.store.load().unwrap(), edited);

        assert_eq!(init(&fx.store, &fx.world, true), Ok(EXIT_OK));
        assert_eq!(fx.store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_check_exit_codes() {
        let fx = fixture();

        // Nothing to load yet
        assert!(check(&fx.store, &fx.world, true).is_err());

        fx.store
            .save(&[ConfigEntry::enabled("Bus"), ConfigEntry::disabled("Truck")])
            .unwrap();
        assert_eq!(check(&fx.store, &fx.world, true), Ok(EXIT_OK));

        fx.store
            .save(&[ConfigEntry::disabled("Truck"), ConfigEntry::disabled("Zeppelin")])
            .unwrap();
        assert_eq!(check(&fx.store, &fx.world, true), Ok(EXIT_UNCLEAN));
    }

    #[test]
    fn test_apply_writes_resulting_world() {
        let fx = fixture();
        let out = fx.root.join("after.toml");
        fx.store.save(&[ConfigEntry::disabled("Truck")]).unwrap();

        let code = apply(&fx.store, &fx.world, LoadMode::LoadGame, Some(&out), true);
        assert_eq!(code, Ok(EXIT_OK));

        let after = World::load_snapshot(&out).unwrap();
        let bus = after.catalog.find_any("Bus").unwrap();
        let truck = after.catalog.find_any("Truck").unwrap();
        assert_eq!(after.catalog.classification(truck), Some(ItemClass::INERT));
        assert_eq!(after.registry.count_of(InstanceSubset::Active, truck), 0);
        assert_eq!(after.registry.count_of(InstanceSubset::Parked, truck), 0);
        assert_eq!(after.registry.count_of(InstanceSubset::Active, bus), 1);
    }

    #[test]
    fn test_apply_in_editor_mode_leaves_world_alone() {
        let fx = fixture();
        let out = fx.root.join("after.toml");
        fx.store.save(&[ConfigEntry::disabled("Truck")]).unwrap();

        let code = apply(&fx.store, &fx.world, LoadMode::LoadMap, Some(&out), true);
        assert_eq!(code, Ok(EXIT_OK));

        let before = World::load_snapshot(&fx.world).unwrap();
        let after = World::load_snapshot(&out).unwrap();
        assert_eq!(after.to_snapshot(), before.to_snapshot());
    }

    #[test]
    fn test_apply_malformed_config_fails() {
        let fx = fixture();
        fs::write(fx.store.path(), "<ArrayOfVehicle><Vehicle").unwrap();

        let code = apply(&fx.store, &fx.world, LoadMode::NewGame, None, true);
        assert_eq!(code, Ok(EXIT_FAILED));
    }
}
