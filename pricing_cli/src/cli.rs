use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "suite-estimate", version, about = "Garden suite budget estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Price a suite configuration
    Estimate {
        #[command(flatten)]
        project: ProjectArgs,

        /// Print the full report as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also save the report as JSON to this path
        #[arg(long)]
        save: Option<PathBuf>,

        /// Follow the table with a short summary to paste into an email or message
        #[arg(long, conflicts_with = "json")]
        share: bool,
    },

    /// Display a saved estimate
    Show {
        /// Path to a saved estimate (.json)
        file: PathBuf,

        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List built-in rate profiles
    Profiles,

    /// Print a rate profile, e.g. as a starting point for a custom --rates file
    Rates {
        /// Built-in profile name
        #[arg(short, long, default_value = "standard")]
        profile: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Toml)]
        format: OutputFormat,
    },

    /// Price a configuration and append it to a lead log
    Lead {
        #[command(flatten)]
        contact: ContactArgs,

        /// CSV lead log to append to (created with a header if missing)
        #[arg(long, default_value = "leads.csv")]
        log: PathBuf,

        #[command(flatten)]
        project: ProjectArgs,
    },
}

/// Suite configuration and the rate table to price it with
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Total floor area in sq ft (defaults to the model's suggested area)
    #[arg(short, long, required_unless_present = "model")]
    pub area: Option<u32>,

    /// Number of floors (1 or 2)
    #[arg(long, default_value_t = 1)]
    pub floors: u8,

    /// Foundation: slab or piles
    #[arg(long, default_value = "slab")]
    pub foundation: String,

    /// Bedrooms (1 or 2)
    #[arg(long, default_value_t = 1)]
    pub beds: u8,

    /// Bathrooms (1 or 2)
    #[arg(long, default_value_t = 1)]
    pub baths: u8,

    /// Finish package: standard, designer, ultimate
    #[arg(long, default_value = "standard")]
    pub premium: String,

    /// Base model: urban-studio, garden-loft, estate-suite
    #[arg(long)]
    pub model: Option<String>,

    /// Lot size in sq ft, for the coverage advisory
    #[arg(long)]
    pub lot_area: Option<u32>,

    /// Built-in rate profile
    #[arg(long, conflicts_with = "rates")]
    pub profile: Option<String>,

    /// Custom rate profile file (.toml or .json)
    #[arg(long)]
    pub rates: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    /// Questions or site notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Toml,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_estimate_with_share() {
        let args = vec!["suite-estimate", "estimate", "--area", "600", "--share"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Estimate { project, json, share, .. } => {
                assert!(share);
                assert!(!json);
                assert_eq!(project.area, Some(600));
            }
            _ => panic!("Expected Estimate command"),
        }
    }

    #[test]
    fn test_cli_share_conflicts_with_json() {
        let args = vec!["suite-estimate", "estimate", "--area", "600", "--share", "--json"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_model_stands_in_for_area() {
        let args = vec!["suite-estimate", "estimate", "--model", "garden-loft"];
        assert!(Cli::try_parse_from(args).is_ok());

        let args = vec!["suite-estimate", "estimate"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
