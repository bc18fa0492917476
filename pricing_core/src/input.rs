//! # Project Input
//!
//! The buyer's configuration for one estimate. Built fresh per request and
//! never mutated by the engine.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "area_sqft": 600,
//!   "floors": 1,
//!   "foundation": "slab",
//!   "bedrooms": 1,
//!   "bathrooms": 1,
//!   "premium_tier": "designer_curated",
//!   "model_style": "garden_loft"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};
use crate::options::{Floors, FoundationType, ModelStyle, PremiumTier, RoomCount};
use crate::rates::RateConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    /// Total interior area across all floors
    pub area_sqft: u32,

    pub floors: Floors,

    pub foundation: FoundationType,

    pub bedrooms: RoomCount,

    pub bathrooms: RoomCount,

    pub premium_tier: PremiumTier,

    /// Base model; `None` prices the plain module rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_style: Option<ModelStyle>,

    /// Lot size, used only for the coverage advisory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_area_sqft: Option<u32>,
}

impl ProjectInput {
    /// One bedroom, one bathroom, no model style.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pricing_core::input::ProjectInput;
    /// use pricing_core::options::{Floors, FoundationType, PremiumTier, RoomCount};
    ///
    /// let input = ProjectInput::new(600, Floors::One, FoundationType::Slab, PremiumTier::Standard)
    ///     .with_bedrooms(RoomCount::Two);
    /// assert_eq!(input.bedrooms, RoomCount::Two);
    /// assert_eq!(input.bathrooms, RoomCount::One);
    /// ```
    pub fn new(
        area_sqft: u32,
        floors: Floors,
        foundation: FoundationType,
        premium_tier: PremiumTier,
    ) -> Self {
        ProjectInput {
            area_sqft,
            floors,
            foundation,
            bedrooms: RoomCount::One,
            bathrooms: RoomCount::One,
            premium_tier,
            model_style: None,
            lot_area_sqft: None,
        }
    }

    /// Start from a model's suggested area.
    pub fn for_model(style: ModelStyle, rates: &RateConfig) -> EstimateResult<Self> {
        let spec = rates.model_style(style)?;
        Ok(ProjectInput::new(
            spec.suggested_area_sqft,
            Floors::One,
            FoundationType::Slab,
            PremiumTier::Standard,
        )
        .with_model_style(style))
    }

    pub fn with_bedrooms(mut self, bedrooms: RoomCount) -> Self {
        self.bedrooms = bedrooms;
        self
    }

    pub fn with_bathrooms(mut self, bathrooms: RoomCount) -> Self {
        self.bathrooms = bathrooms;
        self
    }

    pub fn with_model_style(mut self, style: ModelStyle) -> Self {
        self.model_style = Some(style);
        self
    }

    pub fn with_lot_area(mut self, lot_area_sqft: u32) -> Self {
        self.lot_area_sqft = Some(lot_area_sqft);
        self
    }

    /// Check the input against a profile's accepted ranges.
    pub fn validate(&self, rates: &RateConfig) -> EstimateResult<()> {
        if !rates.area.contains(self.area_sqft) {
            return Err(EstimateError::invalid_input(
                "area_sqft",
                self.area_sqft.to_string(),
                format!(
                    "Area must be between {} and {} sqft",
                    rates.area.min_sqft, rates.area.max_sqft
                ),
            ));
        }
        if let Some(lot) = self.lot_area_sqft {
            if lot == 0 {
                return Err(EstimateError::invalid_input(
                    "lot_area_sqft",
                    lot.to_string(),
                    "Lot area must be positive",
                ));
            }
        }
        Ok(())
    }

    /// Area of one floor, as the buyer sees it
    pub fn area_per_floor_sqft(&self) -> u32 {
        self.area_sqft / self.floors.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateProfile;

    fn base_input() -> ProjectInput {
        ProjectInput::new(600, Floors::One, FoundationType::Slab, PremiumTier::Standard)
    }

    #[test]
    fn test_validate_area_bounds() {
        let rates = RateProfile::Standard.rates();
        assert!(base_input().validate(rates).is_ok());

        let mut input = base_input();
        input.area_sqft = 349;
        let err = input.validate(rates).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        input.area_sqft = 1200;
        assert!(input.validate(rates).is_ok());

        // Same area is out of range for a profile with a lower ceiling
        assert!(input.validate(RateProfile::SplitMarkup.rates()).is_err());
    }

    #[test]
    fn test_validate_lot_area() {
        let rates = RateProfile::Standard.rates();
        assert!(base_input().with_lot_area(0).validate(rates).is_err());
        assert!(base_input().with_lot_area(8_000).validate(rates).is_ok());
    }

    #[test]
    fn test_for_model_uses_suggested_area() {
        let rates = RateProfile::Standard.rates();
        let input = ProjectInput::for_model(ModelStyle::EstateSuite, rates).unwrap();
        assert_eq!(input.area_sqft, 850);
        assert_eq!(input.model_style, Some(ModelStyle::EstateSuite));

        let split = RateProfile::SplitMarkup.rates();
        assert!(ProjectInput::for_model(ModelStyle::EstateSuite, split).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let input = base_input().with_model_style(ModelStyle::GardenLoft);
        let json = serde_json::to_string(&input).unwrap();
        assert!(json.contains("\"floors\":1"));
        assert!(!json.contains("lot_area_sqft"));
        let roundtrip: ProjectInput = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, input);
    }

    #[test]
    fn test_rejects_three_floors_in_json() {
        let json = r#"{
            "area_sqft": 600,
            "floors": 3,
            "foundation": "slab",
            "bedrooms": 1,
            "bathrooms": 1,
            "premium_tier": "standard"
        }"#;
        assert!(serde_json::from_str::<ProjectInput>(json).is_err());
    }

    #[test]
    fn test_area_per_floor() {
        let mut input = base_input();
        input.floors = Floors::Two;
        assert_eq!(input.area_per_floor_sqft(), 300);
    }
}
