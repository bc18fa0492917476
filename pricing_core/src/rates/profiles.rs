//! Built-in rate profiles.
//!
//! Three pricing profiles ship with the engine. `standard` is the canonical
//! one; the others are kept so older quotes can be reproduced and compared.
//!
//! | Profile        | $/sqft        | Markup    | CSA cert          | Dutiable premium |
//! |----------------|---------------|-----------|-------------------|------------------|
//! | `standard`     | 180/160/145   | 30% / 5%  | separate, $25,000 | 70%              |
//! | `split_markup` | 180/160/145   | 50% / 5%  | bundled, $25,000  | 100%             |
//! | `flat_rate`    | 165 flat      | 30% / 30% | separate, $30,000 | 70%              |
//!
//! Markup is given as modular / other.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{
    AddOnCosts, AdvisoryThresholds, AreaBounds, CraneRates, CsaCertification, CsaPlacement,
    DutyRates, FixedCosts, FoundationRate, MarkupRates, ModelSpec, ModuleRates, PremiumPackage,
    RateConfig, RateTier, SiteRates, RATE_SCHEMA_VERSION,
};
use crate::errors::{EstimateError, EstimateResult};
use crate::options::{FoundationType, ModelStyle, PremiumTier};
use crate::units::{Bps, Money};

static STANDARD: Lazy<RateConfig> = Lazy::new(standard);
static SPLIT_MARKUP: Lazy<RateConfig> = Lazy::new(split_markup);
static FLAT_RATE: Lazy<RateConfig> = Lazy::new(flat_rate);

/// Named built-in profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateProfile {
    Standard,
    SplitMarkup,
    FlatRate,
}

impl RateProfile {
    pub const ALL: [RateProfile; 3] = [
        RateProfile::Standard,
        RateProfile::SplitMarkup,
        RateProfile::FlatRate,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RateProfile::Standard => "standard",
            RateProfile::SplitMarkup => "split_markup",
            RateProfile::FlatRate => "flat_rate",
        }
    }

    /// Shared, read-only rate table for this profile
    pub fn rates(&self) -> &'static RateConfig {
        match self {
            RateProfile::Standard => &STANDARD,
            RateProfile::SplitMarkup => &SPLIT_MARKUP,
            RateProfile::FlatRate => &FLAT_RATE,
        }
    }

    pub fn from_str_flexible(s: &str) -> EstimateResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "standard" | "default" => Ok(RateProfile::Standard),
            "split_markup" | "split" => Ok(RateProfile::SplitMarkup),
            "flat_rate" | "flat" => Ok(RateProfile::FlatRate),
            _ => Err(EstimateError::configuration(
                "profile",
                format!("Unknown rate profile '{}'", s),
            )),
        }
    }
}

impl fmt::Display for RateProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

fn dollars(amount: i64) -> Money {
    Money::from_dollars(amount)
}

fn tiered_module_rates() -> Vec<RateTier> {
    vec![
        RateTier { min_area_sqft: 0, rate_per_sqft: dollars(180) },
        RateTier { min_area_sqft: 500, rate_per_sqft: dollars(160) },
        RateTier { min_area_sqft: 800, rate_per_sqft: dollars(145) },
    ]
}

fn standard_foundations() -> BTreeMap<FoundationType, FoundationRate> {
    BTreeMap::from([
        (FoundationType::Slab, FoundationRate::PerSquareFoot { rate_per_sqft: dollars(40) }),
        (
            FoundationType::Piles,
            FoundationRate::Piles { sqft_per_pile: 50, cost_per_pile: dollars(1_000) },
        ),
    ])
}

fn premium_packages(
    standard: i64,
    designer: i64,
    ultimate: i64,
) -> BTreeMap<PremiumTier, PremiumPackage> {
    BTreeMap::from([
        (
            PremiumTier::Standard,
            PremiumPackage {
                cost_per_sqft: dollars(standard),
                description: "High-quality essentials for a modern, premium living space."
                    .to_string(),
            },
        ),
        (
            PremiumTier::DesignerCurated,
            PremiumPackage {
                cost_per_sqft: dollars(designer),
                description: "Upgraded fixtures, flooring, and cabinetry with designer touches."
                    .to_string(),
            },
        ),
        (
            PremiumTier::UltimateBespoke,
            PremiumPackage {
                cost_per_sqft: dollars(ultimate),
                description: "Security, smart home features, and exterior detailing.".to_string(),
            },
        ),
    ])
}

fn model_styles() -> BTreeMap<ModelStyle, ModelSpec> {
    BTreeMap::from([
        (
            ModelStyle::UrbanStudio,
            ModelSpec {
                rate_modifier_per_sqft: Money::ZERO,
                suggested_area_sqft: 400,
                description: "Open-plan studio for a compact lot.".to_string(),
            },
        ),
        (
            ModelStyle::GardenLoft,
            ModelSpec {
                rate_modifier_per_sqft: dollars(5),
                suggested_area_sqft: 600,
                description: "One-bedroom loft with vaulted ceilings.".to_string(),
            },
        ),
        (
            ModelStyle::EstateSuite,
            ModelSpec {
                rate_modifier_per_sqft: dollars(10),
                suggested_area_sqft: 850,
                description: "Two-bedroom suite with the most features.".to_string(),
            },
        ),
    ])
}

/// Canonical profile.
pub fn standard() -> RateConfig {
    RateConfig {
        version: RATE_SCHEMA_VERSION.to_string(),
        name: RateProfile::Standard.code().to_string(),
        description: "Tiered module rates, 30% modular / 5% site markup".to_string(),
        area: AreaBounds { min_sqft: 350, max_sqft: 1200 },
        modules: ModuleRates {
            effective_size_sqft: 280,
            width_ft: 8,
            rate_tiers: tiered_module_rates(),
            shipping_per_module: dollars(8_000),
            assembly_per_module: dollars(3_000),
        },
        markup: MarkupRates {
            modular: Bps::from_percent(30),
            other: Bps::from_percent(5),
            low_band: Bps::from_percent(95),
            high_band: Bps::from_percent(105),
        },
        site: SiteRates {
            prep_per_sqft: dollars(10),
            completion_per_sqft: dollars(10),
        },
        fixed: FixedCosts {
            permits_and_drawings: dollars(14_000),
            utility_connections: dollars(11_000),
            landscaping_restoration: dollars(5_000),
        },
        add_ons: AddOnCosts {
            additional_bedroom: dollars(2_500),
            additional_bathroom: dollars(5_000),
        },
        csa_certification: CsaCertification {
            cost: dollars(25_000),
            placement: CsaPlacement::Separate,
        },
        crane: CraneRates {
            day_cost: dollars(10_000),
            module_threshold: 5,
            large_area_sqft: 800,
        },
        duty: DutyRates {
            rate: Bps::from_percent(7),
            dutiable_premium_fraction: Bps::from_percent(70),
            brokerage_fee: dollars(1_000),
        },
        foundations: standard_foundations(),
        premium_packages: premium_packages(0, 20, 40),
        model_styles: model_styles(),
        advisories: AdvisoryThresholds::default(),
    }
}

/// Heavier modular margin with certification folded into the module price.
/// Sells no named model styles.
pub fn split_markup() -> RateConfig {
    let mut rates = standard();
    rates.name = RateProfile::SplitMarkup.code().to_string();
    rates.description = "50% modular / 5% site markup, CSA certification bundled".to_string();
    rates.area = AreaBounds { min_sqft: 350, max_sqft: 1000 };
    rates.markup.modular = Bps::from_percent(50);
    rates.csa_certification.placement = CsaPlacement::Bundled;
    rates.duty.dutiable_premium_fraction = Bps::WHOLE;
    rates.model_styles.clear();
    rates
}

/// Single module rate with larger effective modules and uniform markup.
pub fn flat_rate() -> RateConfig {
    let mut rates = standard();
    rates.name = RateProfile::FlatRate.code().to_string();
    rates.description = "Flat $165/sqft module rate, 30% uniform markup".to_string();
    rates.modules.effective_size_sqft = 400;
    rates.modules.rate_tiers = vec![RateTier { min_area_sqft: 0, rate_per_sqft: dollars(165) }];
    rates.markup.other = Bps::from_percent(30);
    rates.csa_certification.cost = dollars(30_000);
    rates.crane.module_threshold = 4;
    rates.duty.rate = Bps::from_percent(6);
    rates.premium_packages = premium_packages(20, 40, 70);
    rates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_lookup() {
        assert_eq!(
            RateProfile::from_str_flexible("Split-Markup").unwrap(),
            RateProfile::SplitMarkup
        );
        assert_eq!(RateProfile::from_str_flexible("default").unwrap(), RateProfile::Standard);
        assert!(RateProfile::from_str_flexible("legacy").is_err());
    }

    #[test]
    fn test_profile_names_match_codes() {
        for profile in RateProfile::ALL {
            assert_eq!(profile.rates().name, profile.code());
        }
    }

    #[test]
    fn test_statics_are_shared() {
        let a = RateProfile::Standard.rates() as *const RateConfig;
        let b = RateProfile::Standard.rates() as *const RateConfig;
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_markup_has_no_models() {
        let rates = RateProfile::SplitMarkup.rates();
        assert!(rates.model_style(ModelStyle::GardenLoft).is_err());
        assert_eq!(rates.csa_certification.placement, CsaPlacement::Bundled);
    }

    #[test]
    fn test_profile_toml_roundtrip() {
        let rates = RateProfile::FlatRate.rates();
        let text = toml::to_string_pretty(rates).unwrap();
        assert!(text.contains("flat_rate"));
        let parsed: RateConfig = toml::from_str(&text).unwrap();
        assert_eq!(&parsed, rates);
    }
}
