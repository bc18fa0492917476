//! # pricing_core - Garden-Suite Pricing Engine
//!
//! `pricing_core` turns a handful of buyer choices (floor area, floors,
//! foundation, rooms, finish tier, model style) into a budget range made of
//! priced line items. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: `estimate` is a pure function of its input and a rate table
//! - **Exact**: money is fixed-point; rounding happens once, at line low/high
//! - **Injected rates**: every number comes from a [`RateConfig`], so profiles coexist
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use pricing_core::input::ProjectInput;
//! use pricing_core::options::{Floors, FoundationType, PremiumTier, RoomCount};
//! use pricing_core::rates::RateProfile;
//!
//! let input = ProjectInput::new(600, Floors::One, FoundationType::Slab, PremiumTier::Standard)
//!     .with_bathrooms(RoomCount::Two);
//! let breakdown = pricing_core::estimate(&input, RateProfile::Standard.rates()).unwrap();
//!
//! for item in &breakdown.items {
//!     assert!(item.high >= item.low);
//! }
//! println!("Total: ${} - ${}", breakdown.total.low, breakdown.total.high);
//! ```
//!
//! ## Modules
//!
//! - [`rates`] - Rate table, built-in profiles and validated lookups
//! - [`derive`] - Module count, footprint, tiered rate, foundation, crane, duty
//! - [`breakdown`] - Line items, margin transform and subtotals
//! - [`input`] - Buyer configuration and range checks
//! - [`options`] - Closed option enums (foundation, tier, model, floors, rooms)
//! - [`estimate`] - Saved reports with metadata and advisories
//! - [`units`] - Fixed-point money and basis-point rates
//! - [`errors`] - Structured error types
//! - [`file_io`] - Rate profile and estimate files with atomic saves
//! - [`leads`] - Flat lead records and the CSV lead log

pub mod breakdown;
pub mod derive;
pub mod errors;
pub mod estimate;
pub mod file_io;
pub mod input;
#[cfg(not(target_arch = "wasm32"))]
pub mod leads;
pub mod options;
pub mod rates;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use breakdown::{Breakdown, Category, CostGroup, LineItem, Subtotal};
pub use errors::{EstimateError, EstimateResult};
pub use estimate::{Advisory, EstimateReport};
pub use file_io::{load_estimate, load_rate_config, save_estimate};
pub use input::ProjectInput;
pub use rates::{RateConfig, RateProfile};
pub use units::{Bps, Money};

/// Price a project against a rate table.
///
/// Same input and rates always give the same breakdown.
pub fn estimate(input: &ProjectInput, rates: &RateConfig) -> EstimateResult<Breakdown> {
    breakdown::assemble(input, rates)
}
