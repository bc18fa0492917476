//! End-to-end pricing scenarios.
//!
//! Each test prices one buyer configuration through the public API and
//! checks the figures a salesperson would quote.

use pricing_core::breakdown::{Category, CostGroup};
use pricing_core::derive::module_unit_rate;
use pricing_core::estimate::{Advisory, EstimateReport};
use pricing_core::input::ProjectInput;
use pricing_core::options::{Floors, FoundationType, PremiumTier, RoomCount};
use pricing_core::rates::RateProfile;
use pricing_core::units::Money;
use pricing_core::{estimate, EstimateError};

fn suite(area: u32) -> ProjectInput {
    ProjectInput::new(area, Floors::One, FoundationType::Slab, PremiumTier::Standard)
}

// =============================================================================
// Canonical profile
// =============================================================================

#[test]
fn test_600_sqft_single_storey_on_slab() {
    let breakdown = estimate(&suite(600), RateProfile::Standard.rates()).unwrap();

    // 600 × $160 × 1.30 × 0.95 / 1.05
    let units = &breakdown.items[0];
    assert_eq!(units.label, "CSA Approved Modular Units");
    assert_eq!(units.low, 118_560);
    assert_eq!(units.high, 131_040);

    assert_eq!(breakdown.modular.low, 118_560);
    assert_eq!(breakdown.modular.high, 131_040);
    assert_eq!(breakdown.modular_mid_per_sqft(), 208);
}

#[test]
fn test_600_sqft_full_other_costs() {
    let breakdown = estimate(&suite(600), RateProfile::Standard.rates()).unwrap();

    let expected: [(&str, i64, i64); 11] = [
        ("Permits & Drawings", 13_965, 15_435),
        ("Site Preparation", 5_985, 6_615),
        ("Foundation (Concrete Slab)", 23_940, 26_460),
        ("CSA Certification & QA", 24_938, 27_562),
        ("Duty & Importation", 7_701, 8_511),
        ("Shipping to Site (3 mod.)", 23_940, 26_460),
        ("Module Assembly (3 mod.)", 8_978, 9_922),
        ("Crane Services (1 day)", 9_975, 11_025),
        ("Utility Connections", 10_972, 12_128),
        ("Project Finishing & On-Site Work", 5_985, 6_615),
        ("Landscaping Restoration", 4_988, 5_512),
    ];
    let other: Vec<(&str, i64, i64)> = breakdown
        .items_in(CostGroup::Other)
        .map(|item| (item.label.as_str(), item.low, item.high))
        .collect();
    assert_eq!(other, expected.to_vec());

    let low: i64 = expected.iter().map(|(_, low, _)| low).sum();
    let high: i64 = expected.iter().map(|(_, _, high)| high).sum();
    assert_eq!(breakdown.other.low, low);
    assert_eq!(breakdown.other.high, high);
    assert_eq!(breakdown.total.low, 118_560 + low);
}

#[test]
fn test_extra_bedroom_and_bathroom_use_modular_markup() {
    let input = suite(600)
        .with_bedrooms(RoomCount::Two)
        .with_bathrooms(RoomCount::Two);
    let breakdown = estimate(&input, RateProfile::Standard.rates()).unwrap();

    let modular: Vec<&str> =
        breakdown.items_in(CostGroup::Modular).map(|i| i.label.as_str()).collect();
    assert_eq!(
        modular,
        vec!["CSA Approved Modular Units", "Additional Bedroom", "Additional Bathroom"]
    );

    let bedroom = breakdown.item(Category::AdditionalBedroom).unwrap();
    assert_eq!(bedroom.marked_up, Money::from_dollars(3_250));
    let bathroom = breakdown.item(Category::AdditionalBathroom).unwrap();
    assert_eq!(bathroom.marked_up, Money::from_dollars(6_500));
}

#[test]
fn test_two_storey_900_sqft_needs_three_crane_days() {
    let mut input = suite(900);
    input.floors = Floors::Two;
    let breakdown = estimate(&input, RateProfile::Standard.rates()).unwrap();

    assert_eq!(breakdown.crane_days, 3);
    let crane = breakdown.item(Category::Crane { days: 3 }).unwrap();
    assert_eq!(crane.label, "Crane Services (3 days)");
    assert_eq!(crane.base, Money::from_dollars(30_000));
}

#[test]
fn test_tier_breakpoints_are_inclusive() {
    let rates = RateProfile::Standard.rates();
    assert_eq!(module_unit_rate(499, rates).unwrap(), Money::from_dollars(180));
    assert_eq!(module_unit_rate(500, rates).unwrap(), Money::from_dollars(160));
    assert_eq!(module_unit_rate(800, rates).unwrap(), Money::from_dollars(145));

    let breakdown = estimate(&suite(500), rates).unwrap();
    assert_eq!(breakdown.item(Category::ModularUnits).unwrap().base, Money::from_dollars(80_000));
}

#[test]
fn test_ultimate_package_on_piles() {
    let input =
        ProjectInput::new(700, Floors::One, FoundationType::Piles, PremiumTier::UltimateBespoke);
    let breakdown = estimate(&input, RateProfile::Standard.rates()).unwrap();

    assert_eq!(breakdown.labels()[1], "Premium: Ultimate Bespoke");
    // 14 piles at $1,000
    let foundation = breakdown
        .item(Category::Foundation { foundation: FoundationType::Piles })
        .unwrap();
    assert_eq!(foundation.base, Money::from_dollars(14_000));
    // 7% × (112,000 + 70% × 28,000) + 1,000
    let duty = breakdown.item(Category::DutyAndImportation).unwrap();
    assert_eq!(duty.base, Money::from_dollars(10_212));
}

// =============================================================================
// Alternate profiles
// =============================================================================

#[test]
fn test_flat_rate_profile() {
    let breakdown = estimate(&suite(600), RateProfile::FlatRate.rates()).unwrap();

    assert_eq!(breakdown.module_unit_rate, Money::from_dollars(165));
    // ceil(600 / 400) = 2 modules
    assert_eq!(breakdown.module_count, 2);
    // Standard finishes cost $20/sqft in this profile, so the premium row shows
    assert_eq!(breakdown.labels()[1], "Premium: Standard Luxury");
    // Other lines carry the same 30% markup
    let permits = breakdown.item(Category::PermitsAndDrawings).unwrap();
    assert_eq!(permits.marked_up, Money::from_dollars(18_200));
}

#[test]
fn test_split_markup_rejects_large_suites() {
    let err = estimate(&suite(1_100), RateProfile::SplitMarkup.rates()).unwrap_err();
    assert!(matches!(err, EstimateError::InvalidInput { ref field, .. } if field == "area_sqft"));
}

#[test]
fn test_profiles_price_side_by_side() {
    let input = suite(600);
    let standard = estimate(&input, RateProfile::Standard.rates()).unwrap();
    let split = estimate(&input, RateProfile::SplitMarkup.rates()).unwrap();

    assert!(split.modular.low > standard.modular.low);
    // Pricing with one profile leaves the other untouched
    assert_eq!(estimate(&input, RateProfile::Standard.rates()).unwrap(), standard);
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_report_with_advisories() {
    let input = suite(400)
        .with_bedrooms(RoomCount::Two)
        .with_lot_area(3_000);
    let report = EstimateReport::generate(&input, RateProfile::Standard.rates()).unwrap();

    assert_eq!(report.advisories.len(), 2);
    assert!(matches!(report.advisories[0], Advisory::LotCoverageExceeded { .. }));
    assert!(matches!(report.advisories[1], Advisory::SmallAreaForTwoBedrooms { .. }));
}

#[test]
fn test_error_json_shape() {
    let err = estimate(&suite(100), RateProfile::Standard.rates()).unwrap_err();
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["type"], "InvalidInput");
    assert_eq!(json["details"]["field"], "area_sqft");
}
