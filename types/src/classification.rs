//! Template classification.
//!
//! The host decides which templates it may pick when spawning vehicles by
//! looking at their class. A template whose class is [`ItemClass::INERT`]
//! matches no service, sub-service or level, so nothing selects it again.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Classification axes
// ═══════════════════════════════════════════════════════════════════════════

/// City service a template belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    #[default]
    None,
    Residential,
    Commercial,
    Industrial,
    Office,
    Citizen,
    Tourism,
    Road,
    Electricity,
    Water,
    Garbage,
    HealthCare,
    PoliceDepartment,
    FireDepartment,
    Education,
    PublicTransport,
    Disaster,
    Fishing,
}

/// Finer split inside a [`Service`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubService {
    #[default]
    None,
    ResidentialLow,
    ResidentialHigh,
    CommercialLow,
    CommercialHigh,
    CommercialLeisure,
    CommercialTourist,
    IndustrialGeneric,
    IndustrialForestry,
    IndustrialFarming,
    IndustrialOil,
    IndustrialOre,
    PublicTransportBus,
    PublicTransportMetro,
    PublicTransportTrain,
    PublicTransportShip,
    PublicTransportPlane,
    PublicTransportTaxi,
    PublicTransportTram,
    PublicTransportMonorail,
    PublicTransportCableCar,
    PublicTransportPost,
}

/// Service level (upgrade tier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    None,
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
}

// ═══════════════════════════════════════════════════════════════════════════
// ItemClass
// ═══════════════════════════════════════════════════════════════════════════

/// Classification metadata carried by every template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ItemClass {
    #[serde(default)]
    pub service: Service,
    #[serde(default)]
    pub sub_service: SubService,
    #[serde(default)]
    pub level: Level,
}

impl ItemClass {
    /// Shared class assigned to disabled templates
    pub const INERT: ItemClass = ItemClass {
        service: Service::None,
        sub_service: SubService::None,
        level: Level::None,
    };

    pub const fn new(service: Service, sub_service: SubService, level: Level) -> Self {
        Self {
            service,
            sub_service,
            level,
        }
    }

    pub fn is_inert(&self) -> bool {
        *self == Self::INERT
    }
}
