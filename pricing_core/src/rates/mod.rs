//! # Rate Table
//!
//! Every number the pricing engine uses lives in a [`RateConfig`]. A config
//! is plain data: it is built once (from a built-in profile or a TOML/JSON
//! file), validated, and then passed by reference into every estimate.
//! Nothing in the engine reads ambient constants, so several profiles can
//! be priced side by side.
//!
//! ## Keyed tables
//!
//! Foundation rates, premium packages and model styles are maps keyed by
//! closed enums. A profile may omit an entry (a profile that does not sell
//! a given model, for example); looking it up then fails with
//! [`EstimateError::Configuration`] instead of pricing it at zero.
//!
//! ## Example
//!
//! ```rust
//! use pricing_core::options::PremiumTier;
//! use pricing_core::rates::RateProfile;
//!
//! let rates = RateProfile::Standard.rates();
//! let package = rates.premium_package(PremiumTier::DesignerCurated).unwrap();
//! assert_eq!(package.cost_per_sqft.to_string(), "$20.00");
//! ```

pub mod profiles;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::breakdown::CostGroup;
use crate::errors::{EstimateError, EstimateResult};
use crate::options::{FoundationType, ModelStyle, PremiumTier};
use crate::units::{Bps, Money};

pub use profiles::RateProfile;

/// Current schema version for rate profile files
pub const RATE_SCHEMA_VERSION: &str = "0.1.0";

/// Complete pricing profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    /// Schema version (for file compatibility)
    pub version: String,

    /// Short profile name (e.g., "standard")
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Accepted floor-area range
    pub area: AreaBounds,

    pub modules: ModuleRates,
    pub markup: MarkupRates,
    pub site: SiteRates,
    pub fixed: FixedCosts,
    pub add_ons: AddOnCosts,
    pub csa_certification: CsaCertification,
    pub crane: CraneRates,
    pub duty: DutyRates,

    pub foundations: BTreeMap<FoundationType, FoundationRate>,
    pub premium_packages: BTreeMap<PremiumTier, PremiumPackage>,

    #[serde(default)]
    pub model_styles: BTreeMap<ModelStyle, ModelSpec>,

    #[serde(default)]
    pub advisories: AdvisoryThresholds,
}

/// Inclusive floor-area bounds in square feet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaBounds {
    pub min_sqft: u32,
    pub max_sqft: u32,
}

impl AreaBounds {
    pub fn contains(&self, area_sqft: u32) -> bool {
        (self.min_sqft..=self.max_sqft).contains(&area_sqft)
    }
}

/// Factory module sizing and per-module logistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRates {
    /// Floor area one module contributes; drives the module count
    pub effective_size_sqft: u32,

    /// Shipping width of one module in feet
    pub width_ft: u32,

    /// $/sqft by suite size, sorted by `min_area_sqft`
    pub rate_tiers: Vec<RateTier>,

    pub shipping_per_module: Money,
    pub assembly_per_module: Money,
}

/// One step of the module-rate function. Applies from `min_area_sqft`
/// (inclusive) up to the next tier's `min_area_sqft` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    pub min_area_sqft: u32,
    pub rate_per_sqft: Money,
}

/// Markup per category group and the symmetric display band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkupRates {
    pub modular: Bps,
    pub other: Bps,
    /// Low end of the range as a fraction of the marked-up price (e.g. 95 %)
    pub low_band: Bps,
    /// High end of the range as a fraction of the marked-up price (e.g. 105 %)
    pub high_band: Bps,
}

/// Area-driven site work
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteRates {
    pub prep_per_sqft: Money,
    pub completion_per_sqft: Money,
}

/// Lump sums charged on every project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedCosts {
    pub permits_and_drawings: Money,
    pub utility_connections: Money,
    pub landscaping_restoration: Money,
}

/// Optional room add-ons
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddOnCosts {
    pub additional_bedroom: Money,
    pub additional_bathroom: Money,
}

/// Factory certification cost and where it is shown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CsaCertification {
    pub cost: Money,
    pub placement: CsaPlacement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsaPlacement {
    /// Added to the modular units' base cost
    Bundled,
    /// Its own line in the other-project-costs group
    Separate,
}

/// Crane rental and the day-count escalation thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CraneRates {
    pub day_cost: Money,
    /// More modules than this needs a second day
    pub module_threshold: u32,
    /// Two-storey suites larger than this need a third day
    pub large_area_sqft: u32,
}

/// Import duty and customs brokerage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DutyRates {
    pub rate: Bps,
    /// Share of premium upgrade cost that is imported (and so dutiable)
    pub dutiable_premium_fraction: Bps,
    pub brokerage_fee: Money,
}

/// How a foundation type is priced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FoundationRate {
    /// `area × rate_per_sqft`
    PerSquareFoot { rate_per_sqft: Money },
    /// `ceil(area / sqft_per_pile) × cost_per_pile`
    Piles { sqft_per_pile: u32, cost_per_pile: Money },
}

impl FoundationRate {
    /// The pricing method a foundation type must use
    fn matches(&self, foundation: FoundationType) -> bool {
        matches!(
            (foundation, self),
            (FoundationType::Slab, FoundationRate::PerSquareFoot { .. })
                | (FoundationType::Piles, FoundationRate::Piles { .. })
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumPackage {
    pub cost_per_sqft: Money,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Added to the module unit rate
    pub rate_modifier_per_sqft: Money,
    /// Starting area offered when the model is picked
    pub suggested_area_sqft: u32,
    #[serde(default)]
    pub description: String,
}

/// Thresholds for non-fatal advisories on a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryThresholds {
    /// Suite area over lot area above which zoning review is flagged
    pub max_lot_coverage: Bps,
    /// Two bedrooms below this area are flagged as cramped
    pub min_two_bedroom_area_sqft: u32,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        AdvisoryThresholds {
            max_lot_coverage: Bps::from_percent(10),
            min_two_bedroom_area_sqft: 450,
        }
    }
}

impl RateConfig {
    /// Look up the foundation pricing for a foundation type.
    pub fn foundation(&self, foundation: FoundationType) -> EstimateResult<&FoundationRate> {
        self.foundations.get(&foundation).ok_or_else(|| {
            EstimateError::configuration(
                format!("foundations.{}", foundation.code()),
                format!("Profile '{}' has no rate for {}", self.name, foundation),
            )
        })
    }

    /// Look up a premium package.
    pub fn premium_package(&self, tier: PremiumTier) -> EstimateResult<&PremiumPackage> {
        self.premium_packages.get(&tier).ok_or_else(|| {
            EstimateError::configuration(
                format!("premium_packages.{}", tier.code()),
                format!("Profile '{}' does not offer the {} package", self.name, tier),
            )
        })
    }

    /// Look up a model style.
    pub fn model_style(&self, style: ModelStyle) -> EstimateResult<&ModelSpec> {
        self.model_styles.get(&style).ok_or_else(|| {
            EstimateError::configuration(
                format!("model_styles.{}", style.code()),
                format!("Profile '{}' does not offer {}", self.name, style),
            )
        })
    }

    /// Markup applied to every line in a category group
    pub fn markup_for(&self, group: CostGroup) -> Bps {
        match group {
            CostGroup::Modular => self.markup.modular,
            CostGroup::Other => self.markup.other,
        }
    }

    /// Every money amount in the profile, keyed by its config path
    fn amounts(&self) -> Vec<(String, Money)> {
        let mut amounts = vec![
            ("modules.shipping_per_module".to_string(), self.modules.shipping_per_module),
            ("modules.assembly_per_module".to_string(), self.modules.assembly_per_module),
            ("site.prep_per_sqft".to_string(), self.site.prep_per_sqft),
            ("site.completion_per_sqft".to_string(), self.site.completion_per_sqft),
            ("fixed.permits_and_drawings".to_string(), self.fixed.permits_and_drawings),
            ("fixed.utility_connections".to_string(), self.fixed.utility_connections),
            ("fixed.landscaping_restoration".to_string(), self.fixed.landscaping_restoration),
            ("add_ons.additional_bedroom".to_string(), self.add_ons.additional_bedroom),
            ("add_ons.additional_bathroom".to_string(), self.add_ons.additional_bathroom),
            ("csa_certification.cost".to_string(), self.csa_certification.cost),
            ("crane.day_cost".to_string(), self.crane.day_cost),
            ("duty.brokerage_fee".to_string(), self.duty.brokerage_fee),
        ];
        for (i, tier) in self.modules.rate_tiers.iter().enumerate() {
            amounts.push((format!("modules.rate_tiers[{}].rate_per_sqft", i), tier.rate_per_sqft));
        }
        for (foundation, rate) in &self.foundations {
            let (field, amount) = match rate {
                FoundationRate::PerSquareFoot { rate_per_sqft } => {
                    ("rate_per_sqft", *rate_per_sqft)
                }
                FoundationRate::Piles { cost_per_pile, .. } => ("cost_per_pile", *cost_per_pile),
            };
            amounts.push((format!("foundations.{}.{}", foundation.code(), field), amount));
        }
        for (tier, package) in &self.premium_packages {
            amounts.push((
                format!("premium_packages.{}.cost_per_sqft", tier.code()),
                package.cost_per_sqft,
            ));
        }
        for (style, spec) in &self.model_styles {
            amounts.push((
                format!("model_styles.{}.rate_modifier_per_sqft", style.code()),
                spec.rate_modifier_per_sqft,
            ));
        }
        amounts
    }

    /// Reject profiles the engine cannot price with.
    ///
    /// Missing keyed entries are allowed here; they fail at lookup time
    /// only for the inputs that need them. Amounts must not be negative, so
    /// every line's high end stays at or above its low end.
    pub fn validate(&self) -> EstimateResult<()> {
        let fail = |key: &str, reason: String| Err(EstimateError::configuration(key, reason));

        if self.area.min_sqft == 0 || self.area.min_sqft > self.area.max_sqft {
            return fail(
                "area",
                format!(
                    "Area bounds {}..={} must be positive and ordered",
                    self.area.min_sqft, self.area.max_sqft
                ),
            );
        }
        if self.modules.effective_size_sqft == 0 {
            return fail(
                "modules.effective_size_sqft",
                "Module size must be positive".to_string(),
            );
        }
        if self.modules.width_ft == 0 {
            return fail("modules.width_ft", "Module width must be positive".to_string());
        }

        let tiers = &self.modules.rate_tiers;
        match tiers.first() {
            None => {
                return fail(
                    "modules.rate_tiers",
                    "At least one rate tier is required".to_string(),
                )
            }
            Some(first) if first.min_area_sqft > self.area.min_sqft => {
                return fail(
                    "modules.rate_tiers",
                    format!(
                        "First tier starts at {} sqft, above the minimum area {}",
                        first.min_area_sqft, self.area.min_sqft
                    ),
                );
            }
            Some(_) => {}
        }
        if tiers.windows(2).any(|w| w[0].min_area_sqft >= w[1].min_area_sqft) {
            return fail(
                "modules.rate_tiers",
                "Tier breakpoints must be strictly increasing".to_string(),
            );
        }

        let band = &self.markup;
        if band.low_band.0 == 0 || band.low_band >= Bps::WHOLE || band.high_band <= Bps::WHOLE {
            return fail(
                "markup",
                format!("Band {}..{} must bracket 100%", band.low_band, band.high_band),
            );
        }

        for (foundation, rate) in &self.foundations {
            if !rate.matches(*foundation) {
                return fail(
                    &format!("foundations.{}", foundation.code()),
                    format!("{} cannot use this pricing method", foundation),
                );
            }
            if let FoundationRate::Piles { sqft_per_pile: 0, .. } = rate {
                return fail(
                    &format!("foundations.{}", foundation.code()),
                    "sqft_per_pile must be positive".to_string(),
                );
            }
        }

        let negative = self.amounts().into_iter().find(|(_, amount)| *amount < Money::ZERO);
        if let Some((key, amount)) = negative {
            return fail(&key, format!("Amount {} must not be negative", amount));
        }

        Ok(())
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        RateProfile::Standard.rates().clone()
    }
}
