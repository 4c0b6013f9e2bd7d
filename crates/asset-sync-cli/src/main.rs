mod commands;
mod logging;
mod progress;

use std::process::ExitCode;

use anyhow::Context;
use asset_sync_core::upload::{self, UploadContext};
use asset_sync_core::{
    AppConfig, CommandConverter, ItemStatus, Pipeline, ProgressReporter, RunReport,
    SilentReporter, SqliteCatalog,
};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{CatalogArgs, Cli, Commands, RootArgs};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

fn main() -> ExitCode {
    dotenv().ok();

    let args = Cli::parse();
    let _guard = logging::init_logger(args.json);

    let config = match asset_sync_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let reporter: Box<dyn ProgressReporter> = if args.json {
        Box::new(SilentReporter)
    } else {
        Box::new(CliReporter::new())
    };

    let result = match args.command {
        Some(Commands::Scan(root)) => {
            run_scan(&with_root(&config, &root), reporter.as_ref(), args.json)
        }
        Some(Commands::Convert { root, converter }) => run_convert(
            &with_root(&config, &root),
            converter,
            reporter.as_ref(),
            args.json,
        ),
        Some(Commands::Rename(root)) => {
            run_rename(&with_root(&config, &root), reporter.as_ref(), args.json)
        }
        Some(Commands::Match { root, catalog }) => run_match(
            &with_root(&config, &root),
            &catalog,
            reporter.as_ref(),
            args.json,
        ),
        Some(Commands::AuditUrls(catalog)) => run_audit_urls(&config, &catalog, args.json),
        Some(Commands::UploadPath {
            file,
            category,
            product,
        }) => run_upload_path(&config, file, category, product),
        Some(Commands::PrintConfig) => print_config(&config),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn with_root(config: &AppConfig, args: &RootArgs) -> AppConfig {
    match &args.root {
        Some(root) => config.clone().with_root(root),
        None => config.clone(),
    }
}

fn open_catalog(config: &AppConfig, args: &CatalogArgs) -> anyhow::Result<SqliteCatalog> {
    let path = args.catalog.as_deref().unwrap_or(&config.catalog_db);
    info!("Reading catalog from {}", path);
    Ok(SqliteCatalog::open(path)?)
}

fn run_scan(config: &AppConfig, reporter: &dyn ProgressReporter, json: bool) -> anyhow::Result<()> {
    let report = Pipeline::new(config.clone()).scan(reporter)?;
    print_report(&report, json)
}

fn run_convert(
    config: &AppConfig,
    program: Option<String>,
    reporter: &dyn ProgressReporter,
    json: bool,
) -> anyhow::Result<()> {
    let program = program.unwrap_or_else(|| config.converter_program.clone());
    let converter = CommandConverter::new(program);
    let report = Pipeline::new(config.clone()).convert(&converter, reporter)?;
    print_report(&report, json)
}

fn run_rename(config: &AppConfig, reporter: &dyn ProgressReporter, json: bool) -> anyhow::Result<()> {
    let report = Pipeline::new(config.clone()).rename(reporter)?;
    print_report(&report, json)
}

fn run_match(
    config: &AppConfig,
    catalog_args: &CatalogArgs,
    reporter: &dyn ProgressReporter,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(config.clone());
    // Root first: a missing store must fail before the catalog is touched.
    asset_sync_core::scanner::Walker::from_config(config)?;
    let catalog = open_catalog(config, catalog_args)?;
    let (matches, report) = pipeline.match_catalog(&catalog, reporter)?;

    if json {
        let out = serde_json::json!({ "report": report, "matches": matches });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_report(&report, false)?;
    for result in matches.matched() {
        if let asset_sync_core::analysis::MatchOutcome::Matched {
            proposed_images, ..
        } = &result.outcome
        {
            println!();
            println!("{} [{}] images:", result.record_name.bold(), result.record_id);
            for image in proposed_images {
                println!("    {}", image);
            }
        }
    }
    Ok(())
}

fn run_audit_urls(config: &AppConfig, catalog_args: &CatalogArgs, json: bool) -> anyhow::Result<()> {
    let catalog = open_catalog(config, catalog_args)?;
    let (audits, report) = Pipeline::new(config.clone()).audit_urls(&catalog)?;

    if json {
        let out = serde_json::json!({ "report": report, "audits": audits });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    print_report(&report, false)
}

fn run_upload_path(
    config: &AppConfig,
    file: String,
    category: Option<String>,
    product: Option<String>,
) -> anyhow::Result<()> {
    if !upload::accepts(&file) {
        anyhow::bail!(
            "{} is not an accepted upload type (JPEG, PNG, GIF or WebP)",
            file
        );
    }
    let ctx = UploadContext {
        base: config.upload_base.clone(),
        category,
        product_name: product,
        original_file_name: file,
        unique_suffix: chrono::Utc::now().timestamp_millis().to_string(),
    };
    println!("{}", upload::target_path(&ctx).display());
    Ok(())
}

fn print_config(config: &AppConfig) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(config).context("serializing configuration")?;
    println!("{}", text);
    Ok(())
}

/// Text mode reuses the report's own layout and only adds colour.
fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let text = report.to_string();
    let mut lines = text.lines();
    if let Some(header) = lines.next() {
        println!();
        println!("{}", header.bold());
    }
    for (item, line) in report.items.iter().zip(lines.by_ref()) {
        println!("{}", colorize(item.status, line));
    }
    for line in lines {
        if report.needs_attention() {
            println!("{}", line.yellow());
        } else {
            println!("{}", line.green());
        }
    }
    Ok(())
}

fn colorize(status: ItemStatus, line: &str) -> ColoredString {
    match status {
        ItemStatus::Failed | ItemStatus::Conflict => line.red(),
        ItemStatus::Unmatched | ItemStatus::Orphaned | ItemStatus::NonCanonical => line.yellow(),
        ItemStatus::Converted | ItemStatus::Renamed | ItemStatus::Matched => line.green(),
        ItemStatus::Skipped => line.dimmed(),
        ItemStatus::Found => line.normal(),
    }
}
