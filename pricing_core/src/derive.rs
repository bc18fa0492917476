//! # Derivation Functions
//!
//! Pure functions that turn a project's size and options into the
//! intermediate quantities the breakdown needs: module count, footprint,
//! module rate, foundation cost, crane days and duty.
//!
//! Functions that divide or multiply money return [`EstimateResult`] and
//! report a computation error on a zero divisor or an amount past the
//! [`Money`] range rather than panicking.

use serde::{Deserialize, Serialize};

use crate::errors::{EstimateError, EstimateResult};
use crate::options::{Floors, FoundationType};
use crate::rates::{FoundationRate, RateConfig};
use crate::units::Money;

/// Number of factory modules for a suite.
///
/// `ceil(area / effective module size)`, plus one module for stair and
/// structural overhead on a two-storey suite.
///
/// # Example
///
/// ```rust
/// use pricing_core::derive::module_count;
/// use pricing_core::options::Floors;
/// use pricing_core::rates::RateProfile;
///
/// let rates = RateProfile::Standard.rates();
/// assert_eq!(module_count(600, Floors::One, rates).unwrap(), 3);
/// assert_eq!(module_count(600, Floors::Two, rates).unwrap(), 4);
/// ```
pub fn module_count(area_sqft: u32, floors: Floors, rates: &RateConfig) -> EstimateResult<u32> {
    let size = rates.modules.effective_size_sqft;
    if size == 0 {
        return Err(EstimateError::computation(
            "module_count",
            "effective module size is zero",
        ));
    }
    let base = area_sqft.div_ceil(size).max(1);
    let stair_module = match floors {
        Floors::One => 0,
        Floors::Two => 1,
    };
    Ok(base + stair_module)
}

/// Approximate rectangular footprint of one floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width_ft: f64,
    pub length_ft: f64,
    /// Area attributable to one floor
    pub floor_area_sqft: f64,
}

/// Footprint from module count: modules sit side by side, so the width is
/// `modules × module width` and the length is whatever carries one floor's
/// share of the area.
pub fn footprint(
    area_sqft: u32,
    modules: u32,
    floors: Floors,
    rates: &RateConfig,
) -> EstimateResult<Footprint> {
    let width_ft = modules as f64 * rates.modules.width_ft as f64;
    if width_ft == 0.0 {
        return Err(EstimateError::computation(
            "footprint",
            format!("zero width from {} modules of {} ft", modules, rates.modules.width_ft),
        ));
    }
    let floor_area_sqft = area_sqft as f64 / floors.count() as f64;
    Ok(Footprint {
        width_ft,
        length_ft: floor_area_sqft / width_ft,
        floor_area_sqft,
    })
}

/// Module $/sqft for a suite size.
///
/// Step function over the profile's tiers: a tier applies from its
/// breakpoint (inclusive) to the next tier's breakpoint (exclusive).
pub fn module_unit_rate(area_sqft: u32, rates: &RateConfig) -> EstimateResult<Money> {
    rates
        .modules
        .rate_tiers
        .iter()
        .take_while(|tier| tier.min_area_sqft <= area_sqft)
        .last()
        .map(|tier| tier.rate_per_sqft)
        .ok_or_else(|| {
            EstimateError::configuration(
                "modules.rate_tiers",
                format!("No module rate tier covers {} sqft", area_sqft),
            )
        })
}

/// Number of helical piles for an area.
pub fn pile_count(area_sqft: u32, sqft_per_pile: u32) -> EstimateResult<u32> {
    if sqft_per_pile == 0 {
        return Err(EstimateError::computation("pile_count", "sqft_per_pile is zero"));
    }
    Ok(area_sqft.div_ceil(sqft_per_pile))
}

/// Foundation base cost.
///
/// Slab: `area × rate`. Piles: `ceil(area / sqft_per_pile) × cost_per_pile`,
/// which steps with the pile count instead of growing linearly.
pub fn foundation_cost(
    area_sqft: u32,
    foundation: FoundationType,
    rates: &RateConfig,
) -> EstimateResult<Money> {
    let cost = match (foundation, rates.foundation(foundation)?) {
        (FoundationType::Slab, FoundationRate::PerSquareFoot { rate_per_sqft }) => {
            rate_per_sqft.checked_mul(area_sqft)
        }
        (FoundationType::Piles, FoundationRate::Piles { sqft_per_pile, cost_per_pile }) => {
            cost_per_pile.checked_mul(pile_count(area_sqft, *sqft_per_pile)?)
        }
        _ => {
            return Err(EstimateError::configuration(
                format!("foundations.{}", foundation.code()),
                format!("{} cannot use this pricing method", foundation),
            ))
        }
    };
    cost.ok_or_else(|| EstimateError::overflow("foundation_cost"))
}

/// Crane rental days.
///
/// One day by default; two when the module count exceeds the profile's
/// threshold or the suite has two floors; three for a two-storey suite
/// larger than the large-area threshold.
pub fn crane_days(modules: u32, area_sqft: u32, floors: Floors, rates: &RateConfig) -> u32 {
    let two_storey = floors == Floors::Two;
    if two_storey && area_sqft > rates.crane.large_area_sqft {
        3
    } else if two_storey || modules > rates.crane.module_threshold {
        2
    } else {
        1
    }
}

/// Duty on imported material plus the flat customs brokerage fee.
///
/// Only `dutiable_premium_fraction` of the premium upgrade cost is treated
/// as imported.
pub fn duty_and_brokerage(
    modular_base: Money,
    premium_base: Money,
    rates: &RateConfig,
) -> EstimateResult<Money> {
    let duty = &rates.duty;
    premium_base
        .apply_bps(duty.dutiable_premium_fraction)
        .and_then(|imported| modular_base.checked_add(imported))
        .and_then(|dutiable| dutiable.apply_bps(duty.rate))
        .and_then(|charged| charged.checked_add(duty.brokerage_fee))
        .ok_or_else(|| EstimateError::overflow("duty_and_brokerage"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateProfile;
    use crate::units::Bps;

    fn rates() -> &'static RateConfig {
        RateProfile::Standard.rates()
    }

    #[test]
    fn test_module_count_rounds_up() {
        assert_eq!(module_count(350, Floors::One, rates()).unwrap(), 2);
        assert_eq!(module_count(560, Floors::One, rates()).unwrap(), 2);
        assert_eq!(module_count(561, Floors::One, rates()).unwrap(), 3);
        assert_eq!(module_count(1200, Floors::One, rates()).unwrap(), 5);
    }

    #[test]
    fn test_module_count_adds_stair_module() {
        for area in [350, 600, 900, 1200] {
            let one = module_count(area, Floors::One, rates()).unwrap();
            let two = module_count(area, Floors::Two, rates()).unwrap();
            assert_eq!(two, one + 1);
        }
    }

    #[test]
    fn test_module_count_zero_size_is_computation_error() {
        let mut custom = rates().clone();
        custom.modules.effective_size_sqft = 0;
        let err = module_count(600, Floors::One, &custom).unwrap_err();
        assert_eq!(err.error_code(), "COMPUTATION_ERROR");
    }

    #[test]
    fn test_footprint() {
        // 600 sqft, 3 modules, one floor: 24 ft wide, 25 ft long
        let fp = footprint(600, 3, Floors::One, rates()).unwrap();
        assert_eq!(fp.width_ft, 24.0);
        assert_eq!(fp.length_ft, 25.0);

        // Two floors split the area
        let fp = footprint(800, 4, Floors::Two, rates()).unwrap();
        assert_eq!(fp.floor_area_sqft, 400.0);
        assert!((fp.length_ft - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_footprint_zero_modules_is_computation_error() {
        assert!(footprint(600, 0, Floors::One, rates()).is_err());
    }

    #[test]
    fn test_module_rate_tiers() {
        assert_eq!(module_unit_rate(350, rates()).unwrap(), Money::from_dollars(180));
        assert_eq!(module_unit_rate(499, rates()).unwrap(), Money::from_dollars(180));
        assert_eq!(module_unit_rate(600, rates()).unwrap(), Money::from_dollars(160));
        assert_eq!(module_unit_rate(799, rates()).unwrap(), Money::from_dollars(160));
        assert_eq!(module_unit_rate(1200, rates()).unwrap(), Money::from_dollars(145));
    }

    #[test]
    fn test_module_rate_breakpoint_is_inclusive_lower() {
        assert_eq!(module_unit_rate(500, rates()).unwrap(), Money::from_dollars(160));
        assert_eq!(module_unit_rate(800, rates()).unwrap(), Money::from_dollars(145));
    }

    #[test]
    fn test_module_rate_below_first_tier() {
        let mut custom = rates().clone();
        custom.modules.rate_tiers[0].min_area_sqft = 400;
        let err = module_unit_rate(350, &custom).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_slab_foundation() {
        assert_eq!(
            foundation_cost(600, FoundationType::Slab, rates()).unwrap(),
            Money::from_dollars(24_000)
        );
    }

    #[test]
    fn test_pile_foundation_steps_with_pile_count() {
        // ceil(600 / 50) = 12 piles
        assert_eq!(
            foundation_cost(600, FoundationType::Piles, rates()).unwrap(),
            Money::from_dollars(12_000)
        );
        // ceil(601 / 50) = 13 piles
        assert_eq!(
            foundation_cost(601, FoundationType::Piles, rates()).unwrap(),
            Money::from_dollars(13_000)
        );
        // Same pile count, same cost
        assert_eq!(
            foundation_cost(649, FoundationType::Piles, rates()).unwrap(),
            foundation_cost(601, FoundationType::Piles, rates()).unwrap()
        );
    }

    #[test]
    fn test_pile_count_zero_spacing() {
        assert!(pile_count(600, 0).is_err());
    }

    #[test]
    fn test_crane_days() {
        // Small single storey
        assert_eq!(crane_days(3, 600, Floors::One, rates()), 1);
        // Module threshold is 5: six modules need a second day
        assert_eq!(crane_days(5, 1200, Floors::One, rates()), 1);
        assert_eq!(crane_days(6, 1200, Floors::One, rates()), 2);
        // Any two-storey suite
        assert_eq!(crane_days(3, 500, Floors::Two, rates()), 2);
        assert_eq!(crane_days(4, 800, Floors::Two, rates()), 2);
        // Large two-storey suite
        assert_eq!(crane_days(5, 900, Floors::Two, rates()), 3);
    }

    #[test]
    fn test_crane_days_idempotent() {
        let first = crane_days(5, 900, Floors::Two, rates());
        let second = crane_days(5, 900, Floors::Two, rates());
        assert_eq!(first, second);
    }

    #[test]
    fn test_duty_and_brokerage() {
        // 7% × (96,000 + 0.7 × 12,000) + 1,000 = 8,308
        let duty =
            duty_and_brokerage(Money::from_dollars(96_000), Money::from_dollars(12_000), rates())
                .unwrap();
        assert_eq!(duty, Money::from_dollars(8_308));
    }

    #[test]
    fn test_duty_full_premium_fraction() {
        let mut custom = rates().clone();
        custom.duty.dutiable_premium_fraction = Bps::WHOLE;
        // 7% × 108,000 + 1,000 = 8,560
        let duty =
            duty_and_brokerage(Money::from_dollars(96_000), Money::from_dollars(12_000), &custom)
                .unwrap();
        assert_eq!(duty, Money::from_dollars(8_560));
    }

    #[test]
    fn test_oversized_amounts_are_computation_errors() {
        let mut custom = rates().clone();
        custom.foundations.insert(
            FoundationType::Slab,
            FoundationRate::PerSquareFoot { rate_per_sqft: Money::from_dollars(20_000_000) },
        );
        let err = foundation_cost(600, FoundationType::Slab, &custom).unwrap_err();
        assert_eq!(err.error_code(), "COMPUTATION_ERROR");

        // 70% of the premium pushes the dutiable amount past the range
        let err = duty_and_brokerage(
            Money::from_units(i64::MAX - 1),
            Money::from_dollars(100_000),
            &custom,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duty_and_brokerage"));
    }
}
