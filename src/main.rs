use std::env;
use std::path::Path;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zonefield_rs::report::REPORT_PATH;
use zonefield_rs::sync::{DEFAULT_WRITE_DELAY, FixedDelay, SyncDriver, SyncOptions};
use zonefield_rs::{
    AdminClient, Config, PlantDatabase, ZoneTable, describe_zip, extract_plant_name, run_audit,
};

fn print_usage(program: &str) {
    eprintln!("Usage: {program} <command> [options]");
    eprintln!("Commands:");
    eprintln!("  sync             populate missing hardiness-zone metafields");
    eprintln!("  audit            classify existing metafield formats (read-only)");
    eprintln!("  zone <zip>       resolve a ZIP code to its hardiness zone");
    eprintln!("  match <title>    match a product title against the plant database");
    eprintln!("Options:");
    eprintln!("  --dry-run        compute sync outcomes without writing");
    eprintln!("  --normalize      rewrite legacy \"zone-N\" metafield values");
    eprintln!("  --verbose        per-product detail");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let rest = &args[2..];
    let dry_run = rest.iter().any(|a| a == "--dry-run");
    let verbose = rest.iter().any(|a| a == "--verbose");
    let normalize = rest.iter().any(|a| a == "--normalize");
    let operand = rest.iter().find(|a| !a.starts_with("--"));

    let default_filter = if verbose {
        "zonefield_rs=debug"
    } else {
        "zonefield_rs=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args[1].as_str() {
        "sync" => run_sync(SyncOptions { dry_run, normalize }).await,
        "audit" => run_audit_command(verbose).await,
        "zone" => match operand {
            Some(zip) => cmd_zone(zip),
            None => {
                eprintln!("Error: zone requires a 5-digit ZIP code");
                std::process::exit(1);
            }
        },
        "match" => match operand {
            Some(title) => cmd_match(title),
            None => {
                eprintln!("Error: match requires a product title");
                std::process::exit(1);
            }
        },
        other => {
            eprintln!("Unknown command: {other}");
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

async fn run_sync(options: SyncOptions) -> Result<()> {
    let config = Config::from_env()?;
    let plants = PlantDatabase::bundled()?;
    let client = AdminClient::new(&config)?;
    let driver = SyncDriver::new(&plants, options, FixedDelay(DEFAULT_WRITE_DELAY));

    println!(
        "Syncing hardiness zones for {}{}...",
        config.store_domain,
        if options.dry_run { " (dry run)" } else { "" }
    );
    let report = driver.run(&client).await?;
    report.save(Path::new(REPORT_PATH))?;
    report.print_summary();
    println!("\nReport written to {REPORT_PATH}");
    Ok(())
}

async fn run_audit_command(verbose: bool) -> Result<()> {
    let config = Config::from_env()?;
    let client = AdminClient::new(&config)?;

    println!("Auditing zone metafields for {}...", config.store_domain);
    let report = run_audit(&client).await?;
    report.print_summary(verbose);
    Ok(())
}

fn cmd_zone(zip: &str) -> Result<()> {
    let table = ZoneTable::bundled()?;
    match table.resolve(zip) {
        Some(info) => println!(
            "{}: zone {} ({} to {} °F)",
            describe_zip(zip),
            info.zone,
            info.min,
            info.max
        ),
        None => println!("No zone data for {zip}"),
    }
    Ok(())
}

fn cmd_match(title: &str) -> Result<()> {
    let plants = PlantDatabase::bundled()?;
    println!("Normalized: \"{}\"", extract_plant_name(title));
    match plants.match_title(title) {
        Some(m) => {
            println!(
                "Match: {} ({})",
                m.matched_key.as_deref().unwrap_or("-"),
                m.match_type
            );
            if let Some(word) = &m.matched_word {
                println!("Via word: {word}");
            }
            println!("Zones: {}", m.zones.join(", "));
        }
        None => println!("No match"),
    }
    Ok(())
}
