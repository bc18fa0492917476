//! # File I/O Module
//!
//! Handles rate-profile and estimate files with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **Version validation**: Ensure schema compatibility
//! - **Profile validation**: A loaded rate profile is checked before use
//!
//! ## File Formats
//!
//! Rate profiles are TOML (`.toml`) or JSON (`.json`), chosen by extension.
//! Saved estimates are pretty-printed JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pricing_core::file_io::{load_rate_config, save_estimate};
//! use pricing_core::estimate::EstimateReport;
//! use pricing_core::input::ProjectInput;
//! use pricing_core::options::{Floors, FoundationType, PremiumTier};
//! use std::path::Path;
//!
//! let rates = load_rate_config(Path::new("rates/spring.toml"))?;
//! let input = ProjectInput::new(600, Floors::One, FoundationType::Slab, PremiumTier::Standard);
//! let report = EstimateReport::generate(&input, &rates)?;
//!
//! save_estimate(&report, Path::new("quotes/600-slab.json"))?;
//! # Ok::<(), pricing_core::errors::EstimateError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use crate::errors::{EstimateError, EstimateResult};
use crate::estimate::{EstimateReport, SCHEMA_VERSION};
use crate::rates::{RateConfig, RATE_SCHEMA_VERSION};

/// Serialization format of a rate profile file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateFormat {
    Toml,
    Json,
}

impl RateFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> EstimateResult<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "toml" => Ok(RateFormat::Toml),
            "json" => Ok(RateFormat::Json),
            _ => Err(EstimateError::file_error(
                "detect format",
                path.display().to_string(),
                "rate profiles must have a .toml or .json extension",
            )),
        }
    }

    /// Render a profile in this format
    pub fn render(&self, rates: &RateConfig) -> EstimateResult<String> {
        let rendered = match self {
            RateFormat::Toml => toml::to_string_pretty(rates).map_err(|e| e.to_string()),
            RateFormat::Json => serde_json::to_string_pretty(rates).map_err(|e| e.to_string()),
        };
        rendered.map_err(EstimateError::serialization)
    }

    /// Parse a profile in this format. Does not validate it.
    pub fn parse(&self, contents: &str) -> EstimateResult<RateConfig> {
        let parsed = match self {
            RateFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
            RateFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        };
        parsed.map_err(EstimateError::serialization)
    }
}

/// Load and validate a rate profile from a TOML or JSON file.
///
/// # Returns
///
/// * `Ok(RateConfig)` - Parsed, version-checked and validated profile
/// * `Err(EstimateError::VersionMismatch)` - File version is incompatible
/// * `Err(EstimateError::SerializationError)` - Malformed TOML/JSON
/// * `Err(EstimateError::Configuration)` - Profile is structurally unusable
/// * `Err(EstimateError::FileError)` - I/O error or unknown extension
pub fn load_rate_config(path: &Path) -> EstimateResult<RateConfig> {
    let format = RateFormat::from_path(path)?;
    let contents = read_to_string(path)?;

    let rates = format.parse(&contents).map_err(|e| match e {
        EstimateError::SerializationError { reason } => EstimateError::serialization(format!(
            "Invalid rate profile {}: {}",
            path.display(),
            reason
        )),
        other => other,
    })?;

    validate_version(&rates.version, RATE_SCHEMA_VERSION)?;
    rates.validate()?;

    tracing::info!(path = %path.display(), profile = %rates.name, "loaded rate profile");
    Ok(rates)
}

/// Save a rate profile, format chosen by extension, with atomic write semantics.
pub fn save_rate_config(rates: &RateConfig, path: &Path) -> EstimateResult<()> {
    let contents = RateFormat::from_path(path)?.render(rates)?;
    write_atomic(path, contents.as_bytes())?;
    tracing::info!(path = %path.display(), profile = %rates.name, "saved rate profile");
    Ok(())
}

/// Save an estimate report to a file with atomic write semantics.
///
/// The save process:
/// 1. Serialize report to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename .tmp over the target (atomic on most filesystems)
///
/// This prevents corruption if the process is interrupted during write.
pub fn save_estimate(report: &EstimateReport, path: &Path) -> EstimateResult<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| EstimateError::serialization(e.to_string()))?;
    write_atomic(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), id = %report.meta.id, "saved estimate");
    Ok(())
}

/// Load an estimate report from a file.
///
/// # Returns
///
/// * `Ok(EstimateReport)` - Successfully loaded report
/// * `Err(EstimateError::VersionMismatch)` - File version is incompatible
/// * `Err(EstimateError::SerializationError)` - Invalid JSON
/// * `Err(EstimateError::FileError)` - I/O error
pub fn load_estimate(path: &Path) -> EstimateResult<EstimateReport> {
    let contents = read_to_string(path)?;

    let report: EstimateReport = serde_json::from_str(&contents).map_err(|e| {
        EstimateError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    validate_version(&report.meta.version, SCHEMA_VERSION)?;

    Ok(report)
}

fn read_to_string(path: &Path) -> EstimateResult<String> {
    let io_err = |operation: &str, e: std::io::Error| {
        EstimateError::file_error(operation, path.display().to_string(), e.to_string())
    };

    let mut file = File::open(path).map_err(|e| io_err("open", e))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| io_err("read", e))?;
    Ok(contents)
}

/// Temp-file + fsync + rename.
fn write_atomic(path: &Path, contents: &[u8]) -> EstimateResult<()> {
    let extension = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    let tmp_path = path.with_extension(extension);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        EstimateError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(contents).map_err(|e| {
        EstimateError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        EstimateError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EstimateError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str, expected: &str) -> EstimateResult<()> {
    let mismatch = || EstimateError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: expected.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = expected.split('.').filter_map(|p| p.parse().ok()).collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // In 0.x a newer minor may carry breaking changes
    if let (0, Some(file_minor), Some(current_minor)) =
        (current_parts[0], file_parts.get(1), current_parts.get(1))
    {
        if file_minor > current_minor {
            return Err(mismatch());
        }
    }

    Ok(())
}
