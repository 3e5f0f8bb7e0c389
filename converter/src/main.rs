use anyhow::{Context, Result};
use clap::Parser;
use renako_mania_converter::catalog::Catalog;
use renako_mania_converter::source::{ChartDatabase, JsonDatabase};
use renako_mania_converter::{ConversionReport, Converter, ConverterConfig, Selection};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert osu!mania 4K beatmaps into Renako bundles", long_about = None)]
struct Args {
    /// JSON export of the osu! beatmap listing
    #[arg(short, long, env = "RENAKO_OSU_DATABASE")]
    database: PathBuf,

    /// osu! Songs folder (defaults to the osu! install in the local data dir)
    #[arg(short, long, env = "RENAKO_OSU_SONGS")]
    songs_dir: Option<PathBuf>,

    /// Renako beatmaps folder to write bundles into
    #[arg(short, long, env = "RENAKO_BEATMAPS_DIR")]
    output: Option<PathBuf>,

    /// `all` or a beatmapset id; asked on stdin when omitted
    target: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_default_env()
        .filter_level(level.parse()?)
        .init();

    let defaults = ConverterConfig::default();
    let config = ConverterConfig {
        songs_dir: args.songs_dir.unwrap_or(defaults.songs_dir),
        output_dir: args.output.unwrap_or(defaults.output_dir),
    };
    log::info!("Songs folder: {}", config.songs_dir.display());
    log::info!("Output folder: {}", config.output_dir.display());

    let database = JsonDatabase::new(&args.database);
    let difficulties = database
        .difficulties()
        .with_context(|| format!("failed to load listing {}", database.path().display()))?;
    let catalog = Catalog::new(difficulties);

    print_catalog(&catalog);

    let target = match args.target {
        Some(target) => target,
        None => prompt_target()?,
    };
    let selection: Selection = match target.parse() {
        Ok(selection) => selection,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let converter = Converter::new(config);
    let report = match converter.run(&catalog, selection) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Invalid beatmapset id: {e}");
            std::process::exit(2);
        }
    };

    print_summary(&report);
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    let stats = catalog.stats();
    println!("All beatmap count: {}", stats.difficulties);
    println!("All mania beatmap count: {}", stats.mania_difficulties);
    println!("All mania beatmapset count: {}", stats.chart_sets);
    println!("All beatmapset:");
    for (i, entry) in catalog.list_mania_sets().iter().enumerate() {
        println!("{}. {}", i + 1, entry.label);
    }
}

fn prompt_target() -> Result<String> {
    print!("Enter the beatmapset id to convert (or write 'all' to convert all beatmapset): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_summary(report: &ConversionReport) {
    println!("\n=== Conversion Summary ===");
    println!("Converted beatmapsets:   {}", report.converted.len());
    println!("Skipped beatmapsets:     {}", report.skipped.len());
    println!("Failed beatmapsets:      {}", report.failed.len());
    println!("Difficulties written:    {}", report.difficulties_written());
    println!("Difficulties skipped:    {}", report.difficulties_skipped());
    for (set_id, err) in &report.failed {
        println!("  {set_id}: {err}");
    }
    println!("=== End Summary ===\n");
}
