//! # Breakdown Assembler
//!
//! Turns a [`ProjectInput`] and a [`RateConfig`] into an ordered list of
//! priced line items with modular, other-project and grand subtotals.
//!
//! ## Margin transform
//!
//! Every line starts from an exact base cost. The markup for the line's
//! group is applied, then the marked-up price is scaled by the profile's
//! low/high band:
//!
//! ```text
//! marked_up = base × (1 + markup)
//! low       = round(marked_up × low_band)
//! high      = round(marked_up × high_band)
//! ```
//!
//! `low` and `high` are computed straight from the exact base in 128-bit
//! integers and rounded half-to-even once, at whole dollars. Subtotals sum
//! the already-rounded lows and highs, so the lines always add up to the
//! totals exactly. Any amount that leaves the [`Money`] range along the way
//! fails the estimate with a computation error.
//!
//! ## Example
//!
//! ```rust
//! use pricing_core::breakdown::assemble;
//! use pricing_core::input::ProjectInput;
//! use pricing_core::options::{Floors, FoundationType, PremiumTier};
//! use pricing_core::rates::RateProfile;
//!
//! let input = ProjectInput::new(600, Floors::One, FoundationType::Slab, PremiumTier::Standard);
//! let breakdown = assemble(&input, RateProfile::Standard.rates()).unwrap();
//!
//! assert_eq!(breakdown.items[0].label, "CSA Approved Modular Units");
//! assert_eq!(breakdown.items[0].low, 118_560);
//! assert_eq!(breakdown.items[0].high, 131_040);
//! ```

use serde::{Deserialize, Serialize};

use crate::derive::{self, Footprint};
use crate::errors::{EstimateError, EstimateResult};
use crate::input::ProjectInput;
use crate::options::{FoundationType, PremiumTier};
use crate::rates::{CsaPlacement, MarkupRates, RateConfig};
use crate::units::{div_round_half_even, Bps, Money};

/// Which subtotal a line rolls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostGroup {
    /// The factory-built structure and its finishes
    Modular,
    /// Site work, permits, logistics
    Other,
}

impl CostGroup {
    pub fn display_name(&self) -> &'static str {
        match self {
            CostGroup::Modular => "Modular Building Costs",
            CostGroup::Other => "Other Project Costs",
        }
    }
}

/// Every kind of line an estimate can contain.
///
/// Variants carry whatever their label needs to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Category {
    ModularUnits,
    PremiumPackage { tier: PremiumTier },
    AdditionalBedroom,
    AdditionalBathroom,
    PermitsAndDrawings,
    SitePreparation,
    Foundation { foundation: FoundationType },
    CsaCertification,
    DutyAndImportation,
    Shipping { modules: u32 },
    Assembly { modules: u32 },
    Crane { days: u32 },
    UtilityConnections,
    ProjectFinishing,
    LandscapingRestoration,
}

impl Category {
    /// Display position. Lines are shown in ascending priority.
    pub fn priority(&self) -> u8 {
        match self {
            Category::ModularUnits => 1,
            Category::PremiumPackage { .. } => 2,
            Category::AdditionalBedroom => 3,
            Category::AdditionalBathroom => 4,
            Category::PermitsAndDrawings => 5,
            Category::SitePreparation => 6,
            Category::Foundation { .. } => 7,
            Category::CsaCertification => 8,
            Category::DutyAndImportation => 9,
            Category::Shipping { .. } => 10,
            Category::Assembly { .. } => 11,
            Category::Crane { .. } => 12,
            Category::UtilityConnections => 13,
            Category::ProjectFinishing => 14,
            Category::LandscapingRestoration => 15,
        }
    }

    /// Group membership is fixed per category, never inferred from labels
    pub fn group(&self) -> CostGroup {
        match self {
            Category::ModularUnits
            | Category::PremiumPackage { .. }
            | Category::AdditionalBedroom
            | Category::AdditionalBathroom => CostGroup::Modular,
            Category::PermitsAndDrawings
            | Category::SitePreparation
            | Category::Foundation { .. }
            | Category::CsaCertification
            | Category::DutyAndImportation
            | Category::Shipping { .. }
            | Category::Assembly { .. }
            | Category::Crane { .. }
            | Category::UtilityConnections
            | Category::ProjectFinishing
            | Category::LandscapingRestoration => CostGroup::Other,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Category::ModularUnits => "CSA Approved Modular Units".to_string(),
            Category::PremiumPackage { tier } => format!("Premium: {}", tier),
            Category::AdditionalBedroom => "Additional Bedroom".to_string(),
            Category::AdditionalBathroom => "Additional Bathroom".to_string(),
            Category::PermitsAndDrawings => "Permits & Drawings".to_string(),
            Category::SitePreparation => "Site Preparation".to_string(),
            Category::Foundation { foundation } => format!("Foundation ({})", foundation),
            Category::CsaCertification => "CSA Certification & QA".to_string(),
            Category::DutyAndImportation => "Duty & Importation".to_string(),
            Category::Shipping { modules } => format!("Shipping to Site ({} mod.)", modules),
            Category::Assembly { modules } => format!("Module Assembly ({} mod.)", modules),
            Category::Crane { days: 1 } => "Crane Services (1 day)".to_string(),
            Category::Crane { days } => format!("Crane Services ({} days)", days),
            Category::UtilityConnections => "Utility Connections".to_string(),
            Category::ProjectFinishing => "Project Finishing & On-Site Work".to_string(),
            Category::LandscapingRestoration => "Landscaping Restoration".to_string(),
        }
    }
}

/// Marked-up price and its display band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginBand {
    pub marked_up: Money,
    pub low: i64,
    pub high: i64,
}

/// Apply a markup and the profile's low/high band to a base cost.
pub fn apply_margin(base: Money, markup: Bps, band: &MarkupRates) -> EstimateResult<MarginBand> {
    let whole = Bps::WHOLE.0 as i128;
    let marked_numerator = base.units() as i128 * (whole + markup.0 as i128);
    let dollar_denominator = whole * whole * Money::UNITS_PER_DOLLAR as i128;

    let narrow =
        |value: i128| i64::try_from(value).map_err(|_| EstimateError::overflow("apply_margin"));
    let banded = |fraction: Bps| {
        marked_numerator
            .checked_mul(fraction.0 as i128)
            .ok_or_else(|| EstimateError::overflow("apply_margin"))
            .and_then(|scaled| narrow(div_round_half_even(scaled, dollar_denominator)))
    };

    Ok(MarginBand {
        marked_up: Money::from_units(narrow(div_round_half_even(marked_numerator, whole))?),
        low: banded(band.low_band)?,
        high: banded(band.high_band)?,
    })
}

/// One priced row of the breakdown.
///
/// ## JSON Example
///
/// ```json
/// {
///   "category": { "kind": "shipping", "modules": 3 },
///   "label": "Shipping to Site (3 mod.)",
///   "group": "other",
///   "base": 24000.0,
///   "marked_up": 25200.0,
///   "low": 23940,
///   "high": 26460
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub category: Category,
    pub label: String,
    pub group: CostGroup,
    /// Pre-markup cost
    pub base: Money,
    /// `base × (1 + markup)`, before the band
    pub marked_up: Money,
    /// Low end of the range, whole dollars
    pub low: i64,
    /// High end of the range, whole dollars
    pub high: i64,
}

impl LineItem {
    /// Price a category from its base cost using the profile's markup for
    /// the category's group.
    pub fn priced(category: Category, base: Money, rates: &RateConfig) -> EstimateResult<Self> {
        let group = category.group();
        let band = apply_margin(base, rates.markup_for(group), &rates.markup)?;
        Ok(LineItem {
            category,
            label: category.label(),
            group,
            base,
            marked_up: band.marked_up,
            low: band.low,
            high: band.high,
        })
    }

    /// Midpoint of the range, rounded down
    pub fn mid(&self) -> i64 {
        (self.low + self.high).div_euclid(2)
    }
}

/// Sums over a set of lines
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Subtotal {
    pub low: i64,
    pub high: i64,
    pub base: Money,
    pub marked_up: Money,
    /// `marked_up - base`
    pub profit: Money,
}

impl Subtotal {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> EstimateResult<Self> {
        let overflow = || EstimateError::overflow("subtotal");
        let mut subtotal = Subtotal::default();
        for item in items {
            subtotal.low = subtotal.low.checked_add(item.low).ok_or_else(overflow)?;
            subtotal.high = subtotal.high.checked_add(item.high).ok_or_else(overflow)?;
            subtotal.base = subtotal.base.checked_add(item.base).ok_or_else(overflow)?;
            subtotal.marked_up =
                subtotal.marked_up.checked_add(item.marked_up).ok_or_else(overflow)?;
        }
        subtotal.profit = subtotal.marked_up.checked_sub(subtotal.base).ok_or_else(overflow)?;
        Ok(subtotal)
    }

    /// Midpoint of the range, rounded down
    pub fn mid(&self) -> i64 {
        (self.low + self.high).div_euclid(2)
    }
}

/// Complete priced estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Name of the rate profile that produced this breakdown
    pub profile: String,

    pub area_sqft: u32,

    /// Lines in display order
    pub items: Vec<LineItem>,

    pub modular: Subtotal,
    pub other: Subtotal,
    pub total: Subtotal,

    pub module_count: u32,
    pub crane_days: u32,
    pub footprint: Footprint,

    /// Module $/sqft after tier lookup and any model-style modifier
    pub module_unit_rate: Money,
}

impl Breakdown {
    /// Lines belonging to one group, in display order
    pub fn items_in(&self, group: CostGroup) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(move |item| item.group == group)
    }

    pub fn item(&self, category: Category) -> Option<&LineItem> {
        self.items.iter().find(|item| item.category == category)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.label.as_str()).collect()
    }

    pub fn subtotal(&self, group: CostGroup) -> &Subtotal {
        match group {
            CostGroup::Modular => &self.modular,
            CostGroup::Other => &self.other,
        }
    }

    /// Modular midpoint per square foot, rounded down
    pub fn modular_mid_per_sqft(&self) -> i64 {
        self.modular.mid() / self.area_sqft.max(1) as i64
    }
}

/// Price a project.
///
/// Fails with a configuration error when the input selects a foundation,
/// premium tier or model style the profile has no entry for, and with an
/// invalid-input error when the area is outside the profile's bounds.
pub fn assemble(input: &ProjectInput, rates: &RateConfig) -> EstimateResult<Breakdown> {
    input.validate(rates)?;

    let area = input.area_sqft;
    let module_count = derive::module_count(area, input.floors, rates)?;
    let footprint = derive::footprint(area, module_count, input.floors, rates)?;
    let crane_days = derive::crane_days(module_count, area, input.floors, rates);

    let style_modifier = match input.model_style {
        Some(style) => rates.model_style(style)?.rate_modifier_per_sqft,
        None => Money::ZERO,
    };
    let module_unit_rate = derive::module_unit_rate(area, rates)?
        .checked_add(style_modifier)
        .ok_or_else(|| EstimateError::overflow("module_unit_rate"))?;
    let modular_base = times(module_unit_rate, area, "modular_units")?;
    let premium_rate = rates.premium_package(input.premium_tier)?.cost_per_sqft;
    let premium_base = times(premium_rate, area, "premium_package")?;
    let foundation_base = derive::foundation_cost(area, input.foundation, rates)?;
    let duty_base = derive::duty_and_brokerage(modular_base, premium_base, rates)?;

    tracing::debug!(
        profile = %rates.name,
        area,
        module_count,
        crane_days,
        module_unit_rate = %module_unit_rate,
        "derived estimate quantities"
    );

    let csa = &rates.csa_certification;
    let units_base = match csa.placement {
        CsaPlacement::Bundled => modular_base
            .checked_add(csa.cost)
            .ok_or_else(|| EstimateError::overflow("modular_units"))?,
        CsaPlacement::Separate => modular_base,
    };

    let mut rows: Vec<(Category, Money)> = vec![(Category::ModularUnits, units_base)];
    if !premium_base.is_zero() {
        rows.push((Category::PremiumPackage { tier: input.premium_tier }, premium_base));
    }
    if input.bedrooms.has_additional() {
        rows.push((Category::AdditionalBedroom, rates.add_ons.additional_bedroom));
    }
    if input.bathrooms.has_additional() {
        rows.push((Category::AdditionalBathroom, rates.add_ons.additional_bathroom));
    }

    let fixed = &rates.fixed;
    rows.push((Category::PermitsAndDrawings, fixed.permits_and_drawings));
    rows.push((Category::UtilityConnections, fixed.utility_connections));
    rows.push((Category::LandscapingRestoration, fixed.landscaping_restoration));
    rows.push((
        Category::SitePreparation,
        times(rates.site.prep_per_sqft, area, "site_preparation")?,
    ));
    rows.push((Category::Foundation { foundation: input.foundation }, foundation_base));
    if csa.placement == CsaPlacement::Separate && !csa.cost.is_zero() {
        rows.push((Category::CsaCertification, csa.cost));
    }
    rows.push((Category::DutyAndImportation, duty_base));
    rows.push((
        Category::Shipping { modules: module_count },
        times(rates.modules.shipping_per_module, module_count, "shipping")?,
    ));
    rows.push((
        Category::Assembly { modules: module_count },
        times(rates.modules.assembly_per_module, module_count, "assembly")?,
    ));
    rows.push((
        Category::Crane { days: crane_days },
        times(rates.crane.day_cost, crane_days, "crane")?,
    ));
    rows.push((
        Category::ProjectFinishing,
        times(rates.site.completion_per_sqft, area, "project_finishing")?,
    ));

    let mut items = rows
        .into_iter()
        .map(|(category, base)| LineItem::priced(category, base, rates))
        .collect::<EstimateResult<Vec<LineItem>>>()?;
    items.sort_by_key(|item| item.category.priority());

    let in_group = |group: CostGroup| items.iter().filter(move |item| item.group == group);
    let modular = Subtotal::from_items(in_group(CostGroup::Modular))?;
    let other = Subtotal::from_items(in_group(CostGroup::Other))?;
    let total = Subtotal::from_items(&items)?;

    Ok(Breakdown {
        profile: rates.name.clone(),
        area_sqft: area,
        items,
        modular,
        other,
        total,
        module_count,
        crane_days,
        footprint,
        module_unit_rate,
    })
}

fn times(rate: Money, quantity: u32, operation: &str) -> EstimateResult<Money> {
    rate.checked_mul(quantity).ok_or_else(|| EstimateError::overflow(operation))
}
