use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use ctc_kws::{KeywordSpotterBuilder, LimitPolicy, SpotterConfig};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[path = "kws/csv_report_formatter.rs"]
mod csv_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "kws")]
#[command(about = "Spot keywords in handwriting recognizer confidence matrices")]
struct Args {
    /// Document directories, each with symbols.txt and confmats.json.
    #[arg(required = true)]
    documents: Vec<PathBuf>,
    /// Comma-separated search words.
    #[arg(long, short, env = "KWS_QUERY")]
    query: String,
    #[arg(long, env = "KWS_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "KWS_WORD_CONFIDENCE")]
    word_confidence: Option<f32>,
    #[arg(long, env = "KWS_COMBINATION_LIMIT")]
    combination_limit: Option<u64>,
    /// Stop the run instead of skipping a word whose combinations exceed the limit.
    #[arg(long, env = "KWS_ABORT_ON_LIMIT", default_value_t = false)]
    abort_on_limit: bool,
    #[arg(long, default_value_t = false)]
    keep_ctc_columns: bool,
    #[arg(long, default_value_t = false)]
    collapse_ctc_runs: bool,
    #[arg(long, default_value_t = false)]
    no_length_adjustment: bool,
    /// Ignore and do not write normalized-matrix caches.
    #[arg(long, env = "KWS_NO_CACHE", default_value_t = false)]
    no_cache: bool,
    /// Merged CSV output; stdout when absent.
    #[arg(long, env = "KWS_OUT")]
    out: Option<PathBuf>,
    /// Also print one line per hit to stdout.
    #[arg(long, default_value_t = false)]
    print: bool,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = build_config(&args)?;
    let normalization_power = config.normalization.power;
    let spotter = KeywordSpotterBuilder::new(config)
        .build()
        .map_err(|err| err.to_string())?;

    let progress = ProgressBar::new(args.documents.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    let batch = spotter
        .spot_batch_with(&args.documents, &args.query, |dir| {
            progress.set_message(dir.display().to_string());
            progress.inc(1);
        })
        .map_err(|err| err.to_string())?;
    progress.finish_and_clear();

    let records = batch.reports.iter().flat_map(|report| report.records.iter());
    match args.out.as_ref() {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|err| {
                    format!("Failed to create output directory '{}': {err}", parent.display())
                })?;
            }
            let file = File::create(path)
                .map_err(|err| format!("Failed to create CSV file '{}': {err}", path.display()))?;
            let mut writer = BufWriter::new(file);
            csv_report_formatter::write_csv(&mut writer, records, normalization_power)?;
            writer
                .flush()
                .map_err(|err| format!("Failed to finalize CSV file '{}': {err}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            csv_report_formatter::write_csv(&mut lock, records, normalization_power)?;
        }
    }

    if args.print {
        for record in batch.reports.iter().flat_map(|report| report.records.iter()) {
            println!(
                "{} {} '{}' {:.3} (best '{}')",
                record.document,
                record.occurrence.location,
                record.occurrence.text,
                record.occurrence.confidence,
                record.best.text
            );
        }
    }

    let hits: usize = batch.reports.iter().map(|report| report.records.len()).sum();
    tracing::info!(
        documents = batch.reports.len(),
        failed = batch.failures.len(),
        hits,
        sublines = spotter.stats().snapshot().overall,
        "kws: run finished"
    );
    if !batch.failures.is_empty() && batch.reports.is_empty() {
        return Err(format!("All {} documents failed", batch.failures.len()));
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<SpotterConfig, String> {
    let mut config = match args.config.as_ref() {
        Some(path) => SpotterConfig::load(path).map_err(|err| err.to_string())?,
        None => SpotterConfig::default(),
    };
    if let Some(word_confidence) = args.word_confidence {
        config.word_confidence = word_confidence;
    }
    if let Some(limit) = args.combination_limit {
        config.combination_limit = limit;
    }
    if args.abort_on_limit {
        config.limit_policy = LimitPolicy::Abort;
    }
    if args.keep_ctc_columns {
        config.remove_ctc_columns = false;
    }
    if args.collapse_ctc_runs {
        config.collapse_ctc_runs = true;
    }
    if args.no_length_adjustment {
        config.adjust_by_word_length = false;
    }
    if args.no_cache {
        config.cache.use_cache = false;
        config.cache.create_cache = false;
    }
    Ok(config)
}
