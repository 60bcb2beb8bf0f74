use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use npi_finder::config::{global_config, set_global_config};
use npi_finder::cookbook;
use npi_finder::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "npfinder")]
#[command(version, about = "NPI Provider Finder - Filter, summarize, and export provider spreadsheets by specialty and region", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Configuration file (TOML); replaces the default config file and environment
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the specialties and regions available in an upload
    Options(OptionsArgs),
    /// Print the dashboard report for a selection
    Report(ReportArgs),
    /// Export the filtered rows, map, or report
    Export(ExportArgs),
}

#[derive(Args)]
struct OptionsArgs {
    /// Uploaded spreadsheet (.csv, .xlsx, .xls, .ods)
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Args)]
struct SelectionArgs {
    /// Uploaded spreadsheet (.csv, .xlsx, .xls, .ods)
    #[arg(short, long)]
    input: PathBuf,
    /// Specialty, exactly as it appears in the Speciality column
    #[arg(short, long)]
    specialty: Option<String>,
    /// Region, exactly as it appears in the Region column ("All Regions" for none)
    #[arg(short, long)]
    region: Option<String>,
}

impl SelectionArgs {
    fn selection(&self) -> npi_finder::Result<Selection> {
        Selection::new(self.specialty.clone().unwrap_or_default(), self.region.as_deref())
    }
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Output directory (defaults to the configured output_dir, then ".")
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Export format (defaults to the configured default_export_format)
    #[arg(long, value_enum)]
    format: Option<ExportFormatOpt>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum ExportFormatOpt {
    Csv,
    Excel,
    Html,
    Json,
    All,
}

impl ExportFormatOpt {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            ExportFormatOpt::Csv => vec![ExportFormat::Csv],
            ExportFormatOpt::Excel => vec![ExportFormat::Excel],
            ExportFormatOpt::Html => vec![ExportFormat::Html],
            ExportFormatOpt::Json => vec![ExportFormat::Json],
            ExportFormatOpt::All => ExportFormat::all().to_vec(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        match e.downcast_ref::<FinderError>() {
            Some(err) => eprintln!("{}", err.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => FinderConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FinderConfig::load(),
    };
    debug!("Using configuration: {:?}", config);
    set_global_config(config);

    match cli.command {
        Commands::Options(args) => cmd_options(args),
        Commands::Report(args) => cmd_report(args),
        Commands::Export(args) => cmd_export(args),
    }
}

fn load(input: &Path) -> npi_finder::Result<ProviderDataset> {
    ProviderDatasetBuilder::new().path(input).config(global_config()).build()
}

fn cmd_options(args: OptionsArgs) -> anyhow::Result<()> {
    let dataset = load(&args.input)?;
    let options = dataset.filter_options();
    let counts = cookbook::specialty_counts(&dataset);

    println!("Specialties:");
    for specialty in &options.specialties {
        println!("  {} ({})", specialty, counts.get(specialty).copied().unwrap_or(0));
    }
    println!("Regions:");
    for region in &options.regions {
        println!("  {}", region);
    }
    if let Some(default) = options.default_specialty() {
        println!("Default specialty: {}", default);
    }
    Ok(())
}

fn cmd_report(args: ReportArgs) -> anyhow::Result<()> {
    let dataset = load(&args.selection.input)?;
    let selection = args.selection.selection()?;
    let report = dataset.render(&selection);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_summary();
    }
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let dataset = load(&args.selection.input)?;
    let selection = args.selection.selection()?;

    let config = global_config();
    let dir = args
        .output
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let formats = match args.format {
        Some(opt) => opt.formats(),
        None => vec![config.default_export_format],
    };

    let report = dataset.render(&selection);
    if report.is_empty() {
        println!("No data available for the selected filters.");
    }

    for format in formats {
        let path = npi_finder::export::export_report(&report, format, &dir)?;
        println!("Exported {} to {}", format, path.display());
    }
    Ok(())
}
