//! # Lead Log
//!
//! Flattens an estimate plus the buyer's contact details into one
//! [`LeadRecord`] and appends it to a CSV log.
//!
//! The record is a flat, fixed-order schema populated by field name, so any
//! spreadsheet-style sink can take it. Appends hold an exclusive OS lock on
//! the log (via fs2) for the whole write, so two processes never interleave
//! rows. The log is append-only; a failed append may be retried and can
//! leave a duplicate row.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use pricing_core::estimate::EstimateReport;
//! use pricing_core::input::ProjectInput;
//! use pricing_core::leads::{append_lead, Contact, LeadRecord};
//! use pricing_core::options::{Floors, FoundationType, PremiumTier};
//! use pricing_core::rates::RateProfile;
//! use std::path::Path;
//!
//! let input = ProjectInput::new(600, Floors::One, FoundationType::Slab, PremiumTier::Standard);
//! let report = EstimateReport::generate(&input, RateProfile::Standard.rates())?;
//!
//! let contact = Contact::new("Jane Buyer", "jane@example.com").with_notes("Sloped backyard");
//! let record = LeadRecord::from_report(&report, &contact, Utc::now())?;
//! append_lead(Path::new("leads.csv"), &record)?;
//! # Ok::<(), pricing_core::errors::EstimateError>(())
//! ```

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::breakdown::CostGroup;
use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::EstimateReport;

/// Who asked for the estimate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Contact {
            name: name.into(),
            email: email.into(),
            ..Contact::default()
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_location(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self.country = Some(country.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Name and email are required; the email needs at least an `@`.
    pub fn validate(&self) -> EstimateResult<()> {
        if self.name.trim().is_empty() {
            return Err(EstimateError::invalid_input("name", "", "Name is required"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(EstimateError::invalid_input("email", "", "Email address is required"));
        }
        match email.split_once('@') {
            Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(EstimateError::invalid_input("email", email, "Not a valid email address")),
        }
    }
}

/// One row of the lead log. Money columns are whole dollars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub country: String,
    pub area_sqft: u32,
    pub floors: u32,
    pub modules_count: u32,
    pub foundation_type: String,
    pub premium_package: String,
    pub bedrooms_count: u32,
    pub bathrooms_count: u32,
    pub mid_modular_subtotal_marked_up: i64,
    pub other_costs_subtotal_marked_up: i64,
    pub complete_project_cost_mid_marked_up: i64,
    pub base_modular_subtotal: i64,
    pub base_other_costs_subtotal: i64,
    pub total_base_cost: i64,
    pub profit_modular_mid: i64,
    pub profit_other_costs_mid: i64,
    pub profit_total_project_mid: i64,
    pub notes: String,
}

impl LeadRecord {
    /// Column names, in row order
    pub const HEADER: [&'static str; 23] = [
        "timestamp",
        "name",
        "email",
        "phone",
        "city",
        "country",
        "area_sqft",
        "floors",
        "modules_count",
        "foundation_type",
        "premium_package",
        "bedrooms_count",
        "bathrooms_count",
        "mid_modular_subtotal_marked_up",
        "other_costs_subtotal_marked_up",
        "complete_project_cost_mid_marked_up",
        "base_modular_subtotal",
        "base_other_costs_subtotal",
        "total_base_cost",
        "profit_modular_mid",
        "profit_other_costs_mid",
        "profit_total_project_mid",
        "notes",
    ];

    /// Flatten a report and contact into a lead row.
    ///
    /// The modular mid is the midpoint of the modular subtotal; the other
    /// mid is the sum of each other-group line's midpoint. Profits are mids
    /// minus bases rounded to whole dollars.
    pub fn from_report(
        report: &EstimateReport,
        contact: &Contact,
        timestamp: DateTime<Utc>,
    ) -> EstimateResult<Self> {
        contact.validate()?;

        let input = &report.input;
        let breakdown = &report.breakdown;

        let modular_mid = breakdown.modular.mid();
        let other_mid: i64 = breakdown.items_in(CostGroup::Other).map(|item| item.mid()).sum();
        let complete_mid = modular_mid + other_mid;

        let modular_base = breakdown.modular.base.round_dollars();
        let other_base = breakdown.other.base.round_dollars();
        let total_base = breakdown.total.base.round_dollars();

        let text = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();

        Ok(LeadRecord {
            timestamp,
            name: contact.name.trim().to_string(),
            email: contact.email.trim().to_string(),
            phone: text(&contact.phone),
            city: text(&contact.city),
            country: text(&contact.country),
            area_sqft: input.area_sqft,
            floors: input.floors.count(),
            modules_count: breakdown.module_count,
            foundation_type: input.foundation.display_name().to_string(),
            premium_package: input.premium_tier.display_name().to_string(),
            bedrooms_count: input.bedrooms.count(),
            bathrooms_count: input.bathrooms.count(),
            mid_modular_subtotal_marked_up: modular_mid,
            other_costs_subtotal_marked_up: other_mid,
            complete_project_cost_mid_marked_up: complete_mid,
            base_modular_subtotal: modular_base,
            base_other_costs_subtotal: other_base,
            total_base_cost: total_base,
            profit_modular_mid: modular_mid - modular_base,
            profit_other_costs_mid: other_mid - other_base,
            profit_total_project_mid: complete_mid - total_base,
            notes: text(&contact.notes),
        })
    }

    /// Field values in [`LeadRecord::HEADER`] order
    pub fn values(&self) -> Vec<String> {
        vec![
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.city.clone(),
            self.country.clone(),
            self.area_sqft.to_string(),
            self.floors.to_string(),
            self.modules_count.to_string(),
            self.foundation_type.clone(),
            self.premium_package.clone(),
            self.bedrooms_count.to_string(),
            self.bathrooms_count.to_string(),
            self.mid_modular_subtotal_marked_up.to_string(),
            self.other_costs_subtotal_marked_up.to_string(),
            self.complete_project_cost_mid_marked_up.to_string(),
            self.base_modular_subtotal.to_string(),
            self.base_other_costs_subtotal.to_string(),
            self.total_base_cost.to_string(),
            self.profit_modular_mid.to_string(),
            self.profit_other_costs_mid.to_string(),
            self.profit_total_project_mid.to_string(),
            self.notes.clone(),
        ]
    }

    pub fn header_line() -> String {
        csv_line(LeadRecord::HEADER.iter().copied())
    }

    pub fn to_csv_line(&self) -> String {
        let values = self.values();
        csv_line(values.iter().map(String::as_str))
    }
}

/// Append a record to a CSV lead log, creating it with a header if needed.
///
/// An existing log whose first line is not the expected header is still
/// appended to; the mismatch is logged as a warning.
pub fn append_lead(path: &Path, record: &LeadRecord) -> EstimateResult<()> {
    let path_str = path.display().to_string();
    let file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| EstimateError::file_error("open lead log", path_str.clone(), e.to_string()))?;

    file.lock_exclusive()
        .map_err(|e| EstimateError::file_error("lock lead log", path_str.clone(), e.to_string()))?;

    let result = write_locked(&file, path, record);

    // The OS releases the lock when the handle closes; unlocking here just makes it prompt
    let _ = FileExt::unlock(&file);
    result
}

fn write_locked(mut file: &std::fs::File, path: &Path, record: &LeadRecord) -> EstimateResult<()> {
    let path_str = path.display().to_string();
    let io_err = |operation: &str, e: std::io::Error| {
        EstimateError::file_error(operation, path_str.clone(), e.to_string())
    };

    let len = file.metadata().map_err(|e| io_err("stat lead log", e))?.len();
    let mut contents = String::new();
    if len == 0 {
        contents.push_str(&LeadRecord::header_line());
        contents.push('\n');
        tracing::info!(path = %path.display(), "created lead log");
    } else {
        let mut first_line = String::new();
        BufReader::new(file)
            .read_line(&mut first_line)
            .map_err(|e| io_err("read lead log header", e))?;
        if first_line.trim_end_matches(['\r', '\n']) != LeadRecord::header_line() {
            tracing::warn!(
                path = %path.display(),
                "lead log header does not match the expected columns; appending anyway"
            );
        }
    }
    contents.push_str(&record.to_csv_line());
    contents.push('\n');

    file.write_all(contents.as_bytes()).map_err(|e| io_err("append lead", e))?;
    file.sync_all().map_err(|e| io_err("sync lead log", e))?;

    tracing::info!(path = %path.display(), email = %record.email, "appended lead");
    Ok(())
}

fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    fields.map(csv_field).collect::<Vec<_>>().join(",")
}

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
