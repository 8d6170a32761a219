//! Shared configuration types for Vehicle Remover.
//!
//! Everything here is plain serde data: the persisted vehicle list and the
//! classification values written onto vehicle templates.

pub mod classification;
pub mod entry;

pub use classification::{ItemClass, Level, Service, SubService};
pub use entry::{ConfigEntry, VehicleList};
