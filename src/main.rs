mod classifier;
mod encoder;
mod error;
mod estimate;
mod evaluate;
mod loader;
mod record;
mod split;

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    classifier::NaiveBayes,
    evaluate::{
        EvaluationConfig, EvaluationReport, DEFAULT_PREDICTION_CAP, DEFAULT_SEED,
        DEFAULT_TEST_FRACTION,
    },
    record::{Feature, StudentId},
};

#[derive(Parser)]
#[command(name = "dropout_bayes")]
#[command(about = "Naive-Bayes course dropout prediction", long_about = None)]
struct Cli {
    /// Enrollment and payment records, one student per row
    #[arg(
        short,
        long,
        env = "DROPOUT_BAYES_INPUT",
        default_value = "historic_data_1.csv",
        global = true
    )]
    input: PathBuf,

    /// Suppress in-place progress lines
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log filter, e.g. `debug` or `dropout_bayes=trace`. Falls back to RUST_LOG.
    #[arg(long, env = "DROPOUT_BAYES_LOG", global = true)]
    log_level: Option<String>,

    #[command(flatten)]
    evaluation: EvaluateArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options for `evaluate`, which is also what runs when no subcommand is given.
#[derive(Args, Debug, Clone)]
struct EvaluateArgs {
    #[arg(
        long,
        env = "DROPOUT_BAYES_TEST_FRACTION",
        default_value_t = DEFAULT_TEST_FRACTION,
        global = true
    )]
    test_fraction: f64,

    #[arg(long, env = "DROPOUT_BAYES_SEED", default_value_t = DEFAULT_SEED, global = true)]
    seed: u64,

    #[arg(
        long,
        env = "DROPOUT_BAYES_PREDICTION_CAP",
        default_value_t = DEFAULT_PREDICTION_CAP,
        global = true
    )]
    prediction_cap: usize,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Commands {
    /// Split the records, predict the test subset and report accuracy
    Evaluate,

    /// Predict a single student against the whole record set
    Predict {
        #[arg(value_name = "STUDENT_ID")]
        student_id: StudentId,
    },

    /// Print the prior and per-feature estimates
    Inspect,
}

impl Cli {
    fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Evaluate)
    }

    fn evaluation_config(&self) -> EvaluationConfig {
        EvaluationConfig {
            test_fraction: self.evaluation.test_fraction,
            seed: self.evaluation.seed,
            prediction_cap: self.evaluation.prediction_cap,
            progress: !self.quiet,
        }
    }
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("dropout_bayes=info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads `input` and evaluates it. The reported runtime includes the load.
fn run_evaluation(input: &Path, config: &EvaluationConfig) -> Result<EvaluationReport> {
    let start = Instant::now();

    let dataset = loader::load(input, config.progress)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let mut report =
        evaluate::evaluate(&dataset.records, config).context("evaluation failed")?;
    info!(scoring = ?report.elapsed, "evaluation finished");

    report.elapsed = start.elapsed();
    Ok(report)
}

fn print_report(report: &EvaluationReport) {
    println!("Predictions: {}/{}", report.predicted, report.total);
    println!("Correct: {}", report.correct);
    println!("Errors: {}", report.errors);
    println!("Accuracy: {:.2}%", 100.0 * report.accuracy());
    if let Some(sensitivity) = report.confusion.sensitivity() {
        println!("True Positive Rate: {:.2}%", 100.0 * sensitivity);
    }
    if let Some(specificity) = report.confusion.specificity() {
        println!("True Negative Rate: {:.2}%", 100.0 * specificity);
    }
    println!("Runtime: {:.2} seconds", report.elapsed.as_secs_f64());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let load = || {
        loader::load(&cli.input, !cli.quiet)
            .with_context(|| format!("failed to load {}", cli.input.display()))
    };

    match cli.command() {
        Commands::Evaluate => {
            let report = run_evaluation(&cli.input, &cli.evaluation_config())?;
            print_report(&report);
        }
        Commands::Predict { student_id } => {
            let dataset = load()?;
            let records = &dataset.records;
            let posterior = classifier::posterior(records, student_id)
                .with_context(|| format!("cannot predict student {student_id}"))?;
            let encoders = &dataset.encoders;

            if let Some(record) = records.get(student_id) {
                let evidence = &record.evidence;
                for (encoder, code) in [
                    (&encoders.semester, evidence.semester),
                    (&encoders.term, evidence.term),
                    (&encoders.deadline, evidence.deadline),
                    (&encoders.academic_level, evidence.academic_level),
                ] {
                    println!("{}: {}", encoder.column(), encoder.decode(code).unwrap_or("?"));
                }
            }
            println!("P(dropped) = {:.4}", posterior.dropped);
            println!("P(not dropped) = {:.4}", posterior.not_dropped);
            let predicted = classifier::predict(records, student_id)?;
            println!("Prediction for record {student_id}: {predicted}");
            if let Some(record) = records.get(student_id) {
                println!("Actual label: {}", record.label);
            }
        }
        Commands::Inspect => {
            let dataset = load()?;
            let records = &dataset.records;
            let model = NaiveBayes::fit(records).context("cannot estimate over records")?;
            let prior = model.prior();

            println!("records: {}", records.len());
            for encoder in dataset.encoders.iter() {
                if encoder.is_empty() {
                    println!("{}: (none)", encoder.column());
                } else {
                    println!("{}: {}", encoder.column(), encoder.classes().join(", "));
                }
            }
            println!("prior(dropped) = {prior:.4}");
            println!(
                "{:<18} {:>10} {:>10} {:>10}",
                "feature", "likelihood", "marginal", "posterior"
            );
            for feature in Feature::ALL {
                let likelihood = model.likelihood(feature);
                let marginal = estimate::marginal(records, feature)?;
                let posterior = match estimate::bayes_theorem(prior, likelihood, marginal) {
                    Ok(p) => format!("{p:.4}"),
                    Err(_) => "-".to_string(),
                };
                println!(
                    "{:<18} {:>10.4} {:>10.4} {:>10}",
                    feature.name(),
                    likelihood,
                    marginal,
                    posterior
                );
            }
        }
    }

    Ok(())
}
