//! Buyer-selectable options.
//!
//! Every option is a closed enum so rate tables can be keyed by type
//! instead of by free-form strings. `from_str_flexible` accepts the labels a
//! web form or CLI user is likely to type and fails with a configuration
//! error for anything else.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '-', '_'], "")
}

/// Foundation system under the suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoundationType {
    /// Poured concrete slab, priced per square foot
    Slab,
    /// Helical piles, priced per pile
    Piles,
}

impl FoundationType {
    pub const ALL: [FoundationType; 2] = [FoundationType::Slab, FoundationType::Piles];

    pub fn code(&self) -> &'static str {
        match self {
            FoundationType::Slab => "slab",
            FoundationType::Piles => "piles",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FoundationType::Slab => "Concrete Slab",
            FoundationType::Piles => "Helical Piles",
        }
    }

    pub fn from_str_flexible(s: &str) -> EstimateResult<Self> {
        match normalize(s).as_str() {
            "slab" | "concreteslab" | "concrete" => Ok(FoundationType::Slab),
            "piles" | "pile" | "helicalpiles" | "helical" => Ok(FoundationType::Piles),
            _ => Err(EstimateError::configuration(
                "foundation",
                format!("Unknown foundation type '{}'", s),
            )),
        }
    }
}

impl fmt::Display for FoundationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Interior finish package
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumTier {
    Standard,
    DesignerCurated,
    UltimateBespoke,
}

impl PremiumTier {
    pub const ALL: [PremiumTier; 3] = [
        PremiumTier::Standard,
        PremiumTier::DesignerCurated,
        PremiumTier::UltimateBespoke,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PremiumTier::Standard => "standard",
            PremiumTier::DesignerCurated => "designer_curated",
            PremiumTier::UltimateBespoke => "ultimate_bespoke",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PremiumTier::Standard => "Standard Luxury",
            PremiumTier::DesignerCurated => "Designer Curated",
            PremiumTier::UltimateBespoke => "Ultimate Bespoke",
        }
    }

    pub fn from_str_flexible(s: &str) -> EstimateResult<Self> {
        match normalize(s).as_str() {
            "standard" | "standardluxury" | "standardluxuryincluded" => Ok(PremiumTier::Standard),
            "designer" | "designercurated" => Ok(PremiumTier::DesignerCurated),
            "ultimate" | "bespoke" | "ultimatebespoke" => Ok(PremiumTier::UltimateBespoke),
            _ => Err(EstimateError::configuration(
                "premium_tier",
                format!("Unknown premium tier '{}'", s),
            )),
        }
    }
}

impl fmt::Display for PremiumTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Architectural base model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStyle {
    UrbanStudio,
    GardenLoft,
    EstateSuite,
}

impl ModelStyle {
    pub const ALL: [ModelStyle; 3] = [
        ModelStyle::UrbanStudio,
        ModelStyle::GardenLoft,
        ModelStyle::EstateSuite,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ModelStyle::UrbanStudio => "urban_studio",
            ModelStyle::GardenLoft => "garden_loft",
            ModelStyle::EstateSuite => "estate_suite",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelStyle::UrbanStudio => "The Urban Studio",
            ModelStyle::GardenLoft => "The Garden Loft",
            ModelStyle::EstateSuite => "The Estate Suite",
        }
    }

    pub fn from_str_flexible(s: &str) -> EstimateResult<Self> {
        let key = normalize(s);
        match key.trim_start_matches("the") {
            "urbanstudio" | "studio" => Ok(ModelStyle::UrbanStudio),
            "gardenloft" | "loft" => Ok(ModelStyle::GardenLoft),
            "estatesuite" | "estate" => Ok(ModelStyle::EstateSuite),
            _ => Err(EstimateError::configuration(
                "model_style",
                format!("Unknown model style '{}'", s),
            )),
        }
    }
}

impl fmt::Display for ModelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Storey count. Serializes as the integer 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Floors {
    One,
    Two,
}

impl Floors {
    pub fn count(&self) -> u32 {
        match self {
            Floors::One => 1,
            Floors::Two => 2,
        }
    }
}

impl TryFrom<u8> for Floors {
    type Error = EstimateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Floors::One),
            2 => Ok(Floors::Two),
            _ => Err(EstimateError::invalid_input(
                "floors",
                value.to_string(),
                "Suites have 1 or 2 floors",
            )),
        }
    }
}

impl From<Floors> for u8 {
    fn from(floors: Floors) -> u8 {
        floors.count() as u8
    }
}

/// Bedroom or bathroom count. Serializes as the integer 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RoomCount {
    One,
    Two,
}

impl RoomCount {
    pub fn count(&self) -> u32 {
        match self {
            RoomCount::One => 1,
            RoomCount::Two => 2,
        }
    }

    /// Whether the second room (and its add-on line) is selected
    pub fn has_additional(&self) -> bool {
        matches!(self, RoomCount::Two)
    }
}

impl TryFrom<u8> for RoomCount {
    type Error = EstimateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RoomCount::One),
            2 => Ok(RoomCount::Two),
            _ => Err(EstimateError::invalid_input(
                "room_count",
                value.to_string(),
                "Suites have 1 or 2 bedrooms and 1 or 2 bathrooms",
            )),
        }
    }
}

impl From<RoomCount> for u8 {
    fn from(rooms: RoomCount) -> u8 {
        rooms.count() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foundation_parsing() {
        let parse = FoundationType::from_str_flexible;
        assert_eq!(parse("Concrete Slab").unwrap(), FoundationType::Slab);
        assert_eq!(parse("helical-piles").unwrap(), FoundationType::Piles);
        let err = FoundationType::from_str_flexible("basement").unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_premium_parsing() {
        assert_eq!(
            PremiumTier::from_str_flexible("Designer Curated").unwrap(),
            PremiumTier::DesignerCurated
        );
        assert_eq!(PremiumTier::from_str_flexible("standard").unwrap(), PremiumTier::Standard);
        assert!(PremiumTier::from_str_flexible("gold").is_err());
    }

    #[test]
    fn test_model_parsing() {
        assert_eq!(
            ModelStyle::from_str_flexible("The Garden Loft").unwrap(),
            ModelStyle::GardenLoft
        );
        assert_eq!(ModelStyle::from_str_flexible("estate_suite").unwrap(), ModelStyle::EstateSuite);
        assert!(ModelStyle::from_str_flexible("castle").is_err());
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(
            serde_json::to_string(&PremiumTier::DesignerCurated).unwrap(),
            "\"designer_curated\""
        );
        assert_eq!(serde_json::to_string(&FoundationType::Piles).unwrap(), "\"piles\"");
        assert_eq!(serde_json::to_string(&Floors::Two).unwrap(), "2");

        let floors: Floors = serde_json::from_str("1").unwrap();
        assert_eq!(floors, Floors::One);
        assert!(serde_json::from_str::<Floors>("3").is_err());
        assert!(serde_json::from_str::<RoomCount>("0").is_err());
    }

    #[test]
    fn test_counts() {
        assert_eq!(Floors::Two.count(), 2);
        assert!(RoomCount::Two.has_additional());
        assert!(!RoomCount::One.has_additional());
    }
}
