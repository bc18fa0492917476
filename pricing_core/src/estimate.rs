//! # Estimate Reports
//!
//! An [`EstimateReport`] is the saved form of one priced configuration:
//! metadata, the input, the breakdown and any advisories. Reports serialize
//! to human-readable JSON (see [`crate::file_io`] for atomic saves).
//!
//! ## Structure
//!
//! ```text
//! EstimateReport
//! ├── meta: EstimateMetadata (version, id, timestamp, profile)
//! ├── input: ProjectInput
//! ├── breakdown: Breakdown (line items, subtotals, derived quantities)
//! └── advisories: Vec<Advisory>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pricing_core::estimate::EstimateReport;
//! use pricing_core::input::ProjectInput;
//! use pricing_core::options::{Floors, FoundationType, PremiumTier};
//! use pricing_core::rates::RateProfile;
//!
//! let input = ProjectInput::new(600, Floors::One, FoundationType::Slab, PremiumTier::Standard);
//! let report = EstimateReport::generate(&input, RateProfile::Standard.rates()).unwrap();
//!
//! assert!(report.advisories.is_empty());
//! assert!(report.share_summary().contains("600 sq ft"));
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breakdown::{assemble, Breakdown};
use crate::errors::EstimateResult;
use crate::input::ProjectInput;
use crate::options::RoomCount;
use crate::rates::RateConfig;
use crate::units::{format_dollars, Bps};

/// Current schema version for saved estimate files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root container for a saved estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    pub meta: EstimateMetadata,

    /// Configuration the breakdown was priced from
    pub input: ProjectInput,

    pub breakdown: Breakdown,

    /// Non-fatal notes for the buyer or the sales team
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

/// Metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub id: Uuid,

    /// When the estimate was priced
    pub created: DateTime<Utc>,

    /// Name of the rate profile used
    pub profile: String,
}

impl EstimateReport {
    /// Price an input and wrap the result with fresh metadata and advisories.
    pub fn generate(input: &ProjectInput, rates: &RateConfig) -> EstimateResult<Self> {
        let breakdown = assemble(input, rates)?;
        let advisories = Advisory::check(input, rates);

        let report = EstimateReport {
            meta: EstimateMetadata {
                version: SCHEMA_VERSION.to_string(),
                id: Uuid::new_v4(),
                created: Utc::now(),
                profile: rates.name.clone(),
            },
            input: input.clone(),
            breakdown,
            advisories,
        };

        tracing::debug!(
            id = %report.meta.id,
            profile = %report.meta.profile,
            low = report.breakdown.total.low,
            high = report.breakdown.total.high,
            advisories = report.advisories.len(),
            "generated estimate report"
        );
        Ok(report)
    }

    /// Short plain-text summary suitable for pasting into a message.
    ///
    /// ```text
    /// Garden suite estimate
    ///
    /// Model: The Garden Loft
    /// Size: 600 sq ft, 1 floor(s)
    /// Foundation: Concrete Slab
    /// Upgrades: Standard Luxury
    /// Estimated budget: $263,841 - $291,612
    /// ```
    pub fn share_summary(&self) -> String {
        let input = &self.input;
        let model = input
            .model_style
            .map(|style| style.display_name().to_string())
            .unwrap_or_else(|| "Custom".to_string());
        let total = &self.breakdown.total;

        let mut summary = String::from("Garden suite estimate\n\n");
        summary.push_str(&format!("Model: {}\n", model));
        summary.push_str(&format!(
            "Size: {} sq ft, {} floor(s)\n",
            input.area_sqft,
            input.floors.count()
        ));
        summary.push_str(&format!("Foundation: {}\n", input.foundation));
        summary.push_str(&format!("Upgrades: {}\n", input.premium_tier));
        summary.push_str(&format!(
            "Estimated budget: {} - {}\n",
            format_dollars(total.low),
            format_dollars(total.high)
        ));
        summary
    }
}

/// A non-fatal note attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum Advisory {
    /// The suite covers more of the lot than zoning usually allows
    LotCoverageExceeded {
        /// Actual coverage, truncated to basis points
        coverage: Bps,
        limit: Bps,
    },
    /// Two bedrooms in a suite smaller than recommended
    SmallAreaForTwoBedrooms { area_sqft: u32, recommended_min_sqft: u32 },
}

impl Advisory {
    /// Evaluate every advisory rule for an input.
    pub fn check(input: &ProjectInput, rates: &RateConfig) -> Vec<Advisory> {
        let thresholds = &rates.advisories;
        let mut advisories = Vec::new();

        if let Some(lot) = input.lot_area_sqft.filter(|lot| *lot > 0) {
            let coverage = Bps((input.area_sqft as u64 * Bps::WHOLE.0 as u64 / lot as u64) as u32);
            if coverage > thresholds.max_lot_coverage {
                advisories.push(Advisory::LotCoverageExceeded {
                    coverage,
                    limit: thresholds.max_lot_coverage,
                });
            }
        }

        let cramped = input.area_sqft < thresholds.min_two_bedroom_area_sqft;
        if input.bedrooms == RoomCount::Two && cramped {
            advisories.push(Advisory::SmallAreaForTwoBedrooms {
                area_sqft: input.area_sqft,
                recommended_min_sqft: thresholds.min_two_bedroom_area_sqft,
            });
        }

        advisories
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::LotCoverageExceeded { coverage, limit } => write!(
                f,
                "Suite covers {} of the lot, above {}; flag for zoning review",
                coverage, limit
            ),
            Advisory::SmallAreaForTwoBedrooms { area_sqft, recommended_min_sqft } => write!(
                f,
                "Two bedrooms in {} sq ft; at least {} sq ft is recommended",
                area_sqft, recommended_min_sqft
            ),
        }
    }
}
