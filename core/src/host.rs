//! Host collaborator interfaces
//!
//! The remover never owns templates or vehicles. It reaches the host's
//! template catalog and vehicle registry through these traits, which lets the
//! same code run against the game or against an in-memory [`crate::World`].

use std::fmt;

use vehicle_remover_types::ItemClass;

/// Opaque handle to a template owned by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub usize);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two vehicle collections kept by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceSubset {
    /// Vehicles currently driving around
    Active,
    /// Vehicles sitting in parking spaces
    Parked,
}

impl InstanceSubset {
    pub const ALL: [InstanceSubset; 2] = [InstanceSubset::Active, InstanceSubset::Parked];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Parked => "parked",
        }
    }
}

impl fmt::Display for InstanceSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure to release a single registry slot
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{subset} slot {index} is out of range (size {len})")]
    OutOfRange {
        subset: InstanceSubset,
        index: usize,
        len: usize,
    },

    #[error("{subset} slot {index} could not be released: {reason}")]
    Rejected {
        subset: InstanceSubset,
        index: usize,
        reason: String,
    },
}

/// The host's authoritative set of vehicle templates.
pub trait TemplateCatalog {
    /// Number of catalog slots, including empty ones
    fn prefab_count(&self) -> usize;

    /// Name of the template in slot `index`, or `None` for an empty or
    /// unresolvable slot
    fn prefab_name(&self, index: usize) -> Option<String>;

    /// Look up a template that is loaded in the current session
    fn find_loaded(&self, name: &str) -> Option<TemplateId>;

    /// Look up a template anywhere in the static catalog, loaded or not
    fn find_any(&self, name: &str) -> Option<TemplateId>;

    fn classification(&self, id: TemplateId) -> Option<ItemClass>;

    fn set_classification(&mut self, id: TemplateId, class: ItemClass);
}

/// The host's live vehicle collections, indexed by slot.
pub trait InstanceRegistry {
    /// Current size of a subset (highest slot in use + 1)
    fn len(&self, subset: InstanceSubset) -> usize;

    /// Template of the vehicle in a slot, `None` for a free slot
    fn template_at(&self, subset: InstanceSubset, index: usize) -> Option<TemplateId>;

    /// Despawn the vehicle in a slot. Releasing a free slot is allowed.
    fn release(&mut self, subset: InstanceSubset, index: usize) -> Result<(), RegistryError>;

    /// Tell the registry its cached transfer-eligibility data is stale
    fn mark_transfer_cache_dirty(&mut self);
}

/// Every non-empty template name in catalog order
pub fn catalog_names<C: TemplateCatalog + ?Sized>(catalog: &C) -> Vec<String> {
    (0..catalog.prefab_count())
        .filter_map(|index| catalog.prefab_name(index))
        .filter(|name| !name.is_empty())
        .collect()
}
