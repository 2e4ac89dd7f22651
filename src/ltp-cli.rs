use arrow::util::pretty::pretty_format_batches;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use ltp::pipelines::columnar::{assemble_record_batch, results_to_arrays};
use ltp::pipelines::onnx::{ONNXEnvironmentConfig, OptimizationLevel};
use ltp::{LTPConfig, LTPModel, LTPResult};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One JSON object per sentence
    Json,
    /// Arrow pretty-printed table
    Table,
}

/// Annotates Chinese sentences with the LTP pipeline
#[derive(Parser, Debug)]
#[command(version, author)]
struct Opts {
    /// Model directory (ltp.onnx, vocab.txt, vocab.json)
    #[arg(short, long)]
    model: PathBuf,
    /// Input file, one sentence per line
    #[arg(short, long)]
    file: Option<PathBuf>,
    #[arg(short, long, default_value_t = 8)]
    batch_size: usize,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// ONNX Runtime intra-op threads
    #[arg(short, long)]
    threads: Option<usize>,
}

fn print_results(results: &[LTPResult], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            for result in results {
                println!("{}", serde_json::to_string(result)?);
            }
        }
        OutputFormat::Table => {
            let batch = assemble_record_batch(results_to_arrays(results)?)?;
            println!("{}", pretty_format_batches(&[batch])?);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let opts = Opts::parse();

    let config = LTPConfig {
        batch_size: opts.batch_size,
        onnx_config: ONNXEnvironmentConfig {
            optimization_level: Some(OptimizationLevel::Level3),
            num_intra_threads: opts.threads,
            ..Default::default()
        },
        ..LTPConfig::from_directory(&opts.model)
    };
    let mut ltp = LTPModel::new_with_config(config)?;

    let start = Instant::now();
    let mut sentence_count = 0;
    match &opts.file {
        Some(path) => {
            let lines = BufReader::new(File::open(path)?).lines();
            let bar = ProgressBar::new_spinner().with_style(ProgressStyle::with_template(
                "{spinner} {pos} sentences [{elapsed_precise}] {per_sec}",
            )?);
            let mut batch = Vec::with_capacity(opts.batch_size);
            for line in lines {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                batch.push(line);
                if batch.len() == opts.batch_size {
                    print_results(&ltp.predict(&batch)?, opts.format)?;
                    sentence_count += batch.len();
                    bar.inc(batch.len() as u64);
                    batch.clear();
                }
            }
            if !batch.is_empty() {
                print_results(&ltp.predict(&batch)?, opts.format)?;
                sentence_count += batch.len();
                bar.inc(batch.len() as u64);
            }
            bar.finish();
        }
        None => {
            let sentences = [
                "我爱赛尔！",
                "他叫汤姆去拿外衣。",
                "同时发表一组阐述这次会议主要精神的评论员文章。",
            ];
            print_results(&ltp.predict(&sentences)?, opts.format)?;
            sentence_count += sentences.len();
        }
    }

    let elapsed = start.elapsed();
    info!(
        sentences = sentence_count,
        seconds = elapsed.as_secs_f64(),
        "done"
    );
    Ok(())
}
