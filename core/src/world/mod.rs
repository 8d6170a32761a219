//! In-memory host
//!
//! A [`World`] pairs a [`Catalog`] and a [`Registry`], plain-vector
//! implementations of the two collaborator traits. The validate tool runs
//! against one loaded from a TOML [`WorldSnapshot`], and the tests use it in
//! place of a running game. The halves are separate fields so both can be
//! borrowed mutably for one pass.
//!
//! # Layout
//!
//! ```text
//! catalog:  [ Some(Bus) | None | Some(Hearse) | ... ]   <- TemplateId = index
//! active:   [ None | Some(#0) | Some(#2) | ... ]        <- vehicle slots
//! parked:   [ Some(#2) | None | ... ]                   <- parked vehicle slots
//! ```

mod snapshot;

pub use snapshot::{InstanceSpec, MAX_SLOTS, SnapshotError, TemplateSpec, WorldSnapshot};

use vehicle_remover_types::ItemClass;

use crate::host::{InstanceRegistry, InstanceSubset, RegistryError, TemplateCatalog, TemplateId};

/// A vehicle template known to the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    /// Whether the template is available in the current session
    pub loaded: bool,
    pub class: ItemClass,
}

#[derive(Debug, Clone, Default)]
pub struct World {
    pub catalog: Catalog,
    pub registry: Registry,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Catalog
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: Vec<Option<Template>>,
}

impl Catalog {
    /// Register a template that is loaded in this session
    pub fn add_template(&mut self, name: impl Into<String>, class: ItemClass) -> TemplateId {
        self.push(Template {
            name: name.into(),
            loaded: true,
            class,
        })
    }

    /// Register a template that exists in the catalog but isn't loaded
    pub fn add_unloaded_template(
        &mut self,
        name: impl Into<String>,
        class: ItemClass,
    ) -> TemplateId {
        self.push(Template {
            name: name.into(),
            loaded: false,
            class,
        })
    }

    /// Add an empty catalog slot
    pub fn add_hole(&mut self) {
        self.templates.push(None);
    }

    fn push(&mut self, template: Template) -> TemplateId {
        let id = TemplateId(self.templates.len());
        self.templates.push(Some(template));
        id
    }

    pub fn template(&self, id: TemplateId) -> Option<&Template> {
        self.templates.get(id.0).and_then(Option::as_ref)
    }

    pub fn templates(&self) -> impl Iterator<Item = (TemplateId, &Template)> {
        self.templates
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|t| (TemplateId(i), t)))
    }

    fn find(&self, name: &str, loaded_only: bool) -> Option<TemplateId> {
        self.templates()
            .find(|(_, t)| t.name == name && (t.loaded || !loaded_only))
            .map(|(id, _)| id)
    }
}

impl TemplateCatalog for Catalog {
    fn prefab_count(&self) -> usize {
        self.templates.len()
    }

    fn prefab_name(&self, index: usize) -> Option<String> {
        self.templates
            .get(index)
            .and_then(Option::as_ref)
            .map(|t| t.name.clone())
    }

    fn find_loaded(&self, name: &str) -> Option<TemplateId> {
        self.find(name, true)
    }

    fn find_any(&self, name: &str) -> Option<TemplateId> {
        self.find(name, false)
    }

    fn classification(&self, id: TemplateId) -> Option<ItemClass> {
        self.template(id).map(|t| t.class)
    }

    fn set_classification(&mut self, id: TemplateId, class: ItemClass) {
        if let Some(Some(template)) = self.templates.get_mut(id.0) {
            template.class = class;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct Registry {
    active: Vec<Option<TemplateId>>,
    parked: Vec<Option<TemplateId>>,
    transfer_cache_dirty: bool,
    /// Every release that freed a vehicle, in call order
    released: Vec<(InstanceSubset, usize)>,
}

impl Registry {
    fn slots(&self, subset: InstanceSubset) -> &Vec<Option<TemplateId>> {
        match subset {
            InstanceSubset::Active => &self.active,
            InstanceSubset::Parked => &self.parked,
        }
    }

    fn slots_mut(&mut self, subset: InstanceSubset) -> &mut Vec<Option<TemplateId>> {
        match subset {
            InstanceSubset::Active => &mut self.active,
            InstanceSubset::Parked => &mut self.parked,
        }
    }

    /// Put a vehicle in the first free slot, growing the subset if needed.
    /// Returns the slot index.
    pub fn spawn(&mut self, subset: InstanceSubset, template: TemplateId) -> usize {
        let slots = self.slots_mut(subset);
        match slots.iter().position(Option::is_none) {
            Some(index) => {
                slots[index] = Some(template);
                index
            }
            None => {
                slots.push(Some(template));
                slots.len() - 1
            }
        }
    }

    /// Put a vehicle at a specific slot, growing the subset if needed.
    /// Snapshot loading bounds `index` by [`MAX_SLOTS`] before calling this.
    pub fn place(&mut self, subset: InstanceSubset, index: usize, template: TemplateId) {
        let slots = self.slots_mut(subset);
        if slots.len() <= index {
            slots.resize(index + 1, None);
        }
        slots[index] = Some(template);
    }

    /// Grow a subset to at least `size` slots
    pub fn reserve_slots(&mut self, subset: InstanceSubset, size: usize) {
        let slots = self.slots_mut(subset);
        if slots.len() < size {
            slots.resize(size, None);
        }
    }

    pub fn vehicles(&self, subset: InstanceSubset) -> &[Option<TemplateId>] {
        self.slots(subset)
    }

    /// Number of occupied slots in a subset
    pub fn live_count(&self, subset: InstanceSubset) -> usize {
        self.slots(subset).iter().flatten().count()
    }

    /// Number of vehicles of one template in a subset
    pub fn count_of(&self, subset: InstanceSubset, template: TemplateId) -> usize {
        self.slots(subset)
            .iter()
            .filter(|slot| **slot == Some(template))
            .count()
    }

    pub fn is_transfer_cache_dirty(&self) -> bool {
        self.transfer_cache_dirty
    }

    pub fn release_log(&self) -> &[(InstanceSubset, usize)] {
        &self.released
    }
}

impl InstanceRegistry for Registry {
    fn len(&self, subset: InstanceSubset) -> usize {
        self.slots(subset).len()
    }

    fn template_at(&self, subset: InstanceSubset, index: usize) -> Option<TemplateId> {
        self.slots(subset).get(index).copied().flatten()
    }

    fn release(&mut self, subset: InstanceSubset, index: usize) -> Result<(), RegistryError> {
        let slots = self.slots_mut(subset);
        let len = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(RegistryError::OutOfRange { subset, index, len })?;

        if slot.take().is_some() {
            self.released.push((subset, index));
        }
        Ok(())
    }

    fn mark_transfer_cache_dirty(&mut self) {
        self.transfer_cache_dirty = true;
    }
}
