//! # Garden Suite Estimator CLI
//!
//! Command-line front end over `pricing_core`: price a configuration,
//! inspect rate profiles, re-display saved estimates and record leads.

mod cli;

use std::borrow::Cow;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pricing_core::breakdown::CostGroup;
use pricing_core::errors::{EstimateError, EstimateResult};
use pricing_core::estimate::EstimateReport;
use pricing_core::file_io::{self, RateFormat};
use pricing_core::input::ProjectInput;
use pricing_core::leads::{self, Contact, LeadRecord};
use pricing_core::options::{Floors, FoundationType, ModelStyle, PremiumTier, RoomCount};
use pricing_core::rates::{RateConfig, RateProfile};
use pricing_core::units::format_dollars;

use cli::{Cli, Commands, ContactArgs, OutputFormat, ProjectArgs};

/// Logs go to stderr so `--json` output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> EstimateResult<()> {
    match command {
        Commands::Estimate { project, json, save, share } => {
            let report = price(&project)?;
            if json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
            if share {
                println!();
                println!("--- Share ---");
                print!("{}", report.share_summary());
            }
            if let Some(path) = save {
                file_io::save_estimate(&report, &path)?;
                if !json {
                    println!();
                    println!("Saved to {}", path.display());
                }
            }
        }
        Commands::Show { file, json } => {
            let report = file_io::load_estimate(&file)?;
            if json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
        }
        Commands::Profiles => print_profiles(),
        Commands::Rates { profile, format } => {
            let rates = RateProfile::from_str_flexible(&profile)?.rates();
            let format = match format {
                OutputFormat::Toml => RateFormat::Toml,
                OutputFormat::Json => RateFormat::Json,
            };
            println!("{}", format.render(rates)?);
        }
        Commands::Lead { contact, log, project } => {
            let report = price(&project)?;
            let record = LeadRecord::from_report(&report, &to_contact(contact), Utc::now())?;
            leads::append_lead(&log, &record)?;

            print_report(&report);
            println!();
            println!(
                "Thanks {}! Your estimate was recorded in {}.",
                record.name,
                log.display()
            );
        }
    }
    Ok(())
}

/// Rate table selected by `--rates FILE` or `--profile NAME`
fn load_rates(args: &ProjectArgs) -> EstimateResult<Cow<'static, RateConfig>> {
    match (&args.rates, &args.profile) {
        (Some(path), _) => Ok(Cow::Owned(file_io::load_rate_config(path)?)),
        (None, Some(name)) => Ok(Cow::Borrowed(RateProfile::from_str_flexible(name)?.rates())),
        (None, None) => Ok(Cow::Borrowed(RateProfile::Standard.rates())),
    }
}

fn build_input(args: &ProjectArgs, rates: &RateConfig) -> EstimateResult<ProjectInput> {
    let model = args
        .model
        .as_deref()
        .map(ModelStyle::from_str_flexible)
        .transpose()?;

    let mut input = match (args.area, model) {
        (Some(area), _) => {
            ProjectInput::new(area, Floors::One, FoundationType::Slab, PremiumTier::Standard)
        }
        (None, Some(style)) => ProjectInput::for_model(style, rates)?,
        (None, None) => {
            return Err(EstimateError::invalid_input(
                "area_sqft",
                "",
                "Give --area or pick a --model to use its suggested area",
            ))
        }
    };

    input.floors = Floors::try_from(args.floors)?;
    input.foundation = FoundationType::from_str_flexible(&args.foundation)?;
    input.premium_tier = PremiumTier::from_str_flexible(&args.premium)?;
    input = input
        .with_bedrooms(RoomCount::try_from(args.beds)?)
        .with_bathrooms(RoomCount::try_from(args.baths)?);
    if let Some(style) = model {
        input = input.with_model_style(style);
    }
    if let Some(lot) = args.lot_area {
        input = input.with_lot_area(lot);
    }
    Ok(input)
}

fn price(args: &ProjectArgs) -> EstimateResult<EstimateReport> {
    let rates = load_rates(args)?;
    tracing::debug!(profile = %rates.name, "pricing with rate profile");
    let input = build_input(args, &rates)?;
    EstimateReport::generate(&input, &rates)
}

fn to_contact(args: ContactArgs) -> Contact {
    Contact {
        name: args.name,
        email: args.email,
        phone: args.phone,
        city: args.city,
        country: args.country,
        notes: args.notes,
    }
}

fn print_json(report: &EstimateReport) -> EstimateResult<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| EstimateError::serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn print_report(report: &EstimateReport) {
    let input = &report.input;
    let breakdown = &report.breakdown;

    println!("═══════════════════════════════════════════════════════════════");
    println!("  GARDEN SUITE ESTIMATE ({})", report.meta.profile);
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("Configuration:");
    if let Some(style) = input.model_style {
        println!("  Model:      {}", style);
    }
    println!("  Area:       {} sq ft, {} floor(s)", input.area_sqft, input.floors.count());
    println!(
        "  Footprint:  {:.0}' x {:.0}' ({} modules)",
        breakdown.footprint.width_ft,
        breakdown.footprint.length_ft,
        breakdown.module_count
    );
    println!("  Foundation: {}", input.foundation);
    println!("  Rooms:      {} bed / {} bath", input.bedrooms.count(), input.bathrooms.count());
    println!("  Finishes:   {}", input.premium_tier);

    for group in [CostGroup::Modular, CostGroup::Other] {
        let subtotal = breakdown.subtotal(group);
        println!();
        println!("{}:", group.display_name());
        for item in breakdown.items_in(group) {
            println!(
                "  {:<36} {:>12} - {:>12}",
                item.label,
                format_dollars(item.low),
                format_dollars(item.high)
            );
        }
        println!(
            "  {:<36} {:>12} - {:>12}",
            "Subtotal",
            format_dollars(subtotal.low),
            format_dollars(subtotal.high)
        );
    }

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!(
        "  ESTIMATED BUDGET: {} - {}",
        format_dollars(breakdown.total.low),
        format_dollars(breakdown.total.high)
    );
    println!(
        "  Modular only:     {} ({}/sq ft)",
        format_dollars(breakdown.modular.mid()),
        format_dollars(breakdown.modular_mid_per_sqft())
    );
    println!("═══════════════════════════════════════════════════════════════");

    if !report.advisories.is_empty() {
        println!();
        println!("Notes:");
        for advisory in &report.advisories {
            println!("  [!] {}", advisory);
        }
    }

    println!();
    println!("Excludes HST. Subject to site verification and detailed design.");
}

fn print_profiles() {
    println!("Built-in rate profiles:");
    println!();
    for profile in RateProfile::ALL {
        let rates = profile.rates();
        println!(
            "  {:<14} {} ({}-{} sq ft)",
            profile.code(),
            rates.description,
            rates.area.min_sqft,
            rates.area.max_sqft
        );
    }
}
