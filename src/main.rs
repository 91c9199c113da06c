//! noshow - Hospital appointment no-show prediction CLI
//!
//! Usage:
//!   noshow predict --age 45 --gender Male --sms No      # Score one patient
//!   noshow predict --age 45 --threshold 0.35 --json      # JSON report
//!   noshow summary --age 67 --diabetes No                # Patient summary line only
//!   noshow inspect --model final_random_forest_model.nsrf

use clap::{Args, Parser, Subcommand};
use noshow::config::AppConfig;
use noshow::encoder::{Gender, PatientInput, YesNo};
use noshow::error::{NoShowError, Result};
use noshow::importance::top_features;
use noshow::model::ModelHandle;
use noshow::pipeline::Predictor;
use noshow::report::{importance_chart, PredictionReport};
use noshow::schema::FeatureSchema;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// noshow - Hospital Appointment No-Show Prediction
///
/// Scores a patient record with a trained random forest and reports the
/// probability of a missed appointment.
#[derive(Parser)]
#[command(name = "noshow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Model artifact (overrides the configured path)
    #[arg(long, global = true, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict whether a patient will miss the appointment
    Predict {
        #[command(flatten)]
        patient: PatientArgs,
    },

    /// Print the patient summary line without scoring
    Summary {
        #[command(flatten)]
        patient: PatientArgs,
    },

    /// Describe the model artifact: schema, trees and feature importances
    Inspect,
}

/// Patient form values. Defaults match the form's initial selections.
#[derive(Args, Debug)]
struct PatientArgs {
    /// Age in years (0-100)
    #[arg(long, default_value_t = 30)]
    age: u32,

    /// SMS reminder received (Yes/No)
    #[arg(long, default_value = "Yes", value_name = "Yes|No")]
    sms: YesNo,

    /// Hypertension (Yes/No)
    #[arg(long, default_value = "Yes", value_name = "Yes|No")]
    hypertension: YesNo,

    /// Diabetes (Yes/No)
    #[arg(long, default_value = "Yes", value_name = "Yes|No")]
    diabetes: YesNo,

    /// Alcoholism (Yes/No)
    #[arg(long, default_value = "Yes", value_name = "Yes|No")]
    alcoholism: YesNo,

    /// Handicap (Yes/No)
    #[arg(long, default_value = "Yes", value_name = "Yes|No")]
    handicap: YesNo,

    /// Scholarship (Yes/No)
    #[arg(long, default_value = "Yes", value_name = "Yes|No")]
    scholarship: YesNo,

    /// Gender (Male/Female)
    #[arg(long, default_value = "Female", value_name = "Male|Female")]
    gender: Gender,

    /// Decision threshold in [0, 1] (default: configured threshold)
    #[arg(long)]
    threshold: Option<f64>,
}

impl PatientArgs {
    fn to_input(&self, default_threshold: f64) -> Result<PatientInput> {
        Ok(
            PatientInput::new(self.age, self.threshold.unwrap_or(default_threshold))?
                .with_sms_received(self.sms)
                .with_hypertension(self.hypertension)
                .with_diabetes(self.diabetes)
                .with_alcoholism(self.alcoholism)
                .with_handicap(self.handicap)
                .with_scholarship(self.scholarship)
                .with_gender(self.gender),
        )
    }
}

#[derive(Serialize)]
struct ModelDescription<'a> {
    path: &'a std::path::Path,
    schema_version: u32,
    columns: &'a [String],
    n_estimators: Option<usize>,
    feature_importances: Vec<noshow::importance::FeatureImportance>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    let model_path = cli.model.clone().unwrap_or_else(|| config.model_path.clone());
    debug!(?config, model = %model_path.display(), "configuration resolved");

    match &cli.command {
        Commands::Predict { patient } => {
            // the model must load before any input is accepted
            let model = ModelHandle::load(&model_path, FeatureSchema::v1())?;
            let input = patient.to_input(config.default_threshold)?;
            let prediction = Predictor::new(&model).predict(&input)?;
            let report = PredictionReport::new(&input, &prediction, &model, config.top_features);
            if cli.json {
                println!("{}", to_json(&report)?);
            } else {
                print!("{}", report.render_text(config.bar_width));
            }
        }
        Commands::Summary { patient } => {
            let input = patient.to_input(config.default_threshold)?;
            if cli.json {
                println!("{}", to_json(&input)?);
            } else {
                println!("{}", input.summary_line());
            }
        }
        Commands::Inspect => {
            let model = ModelHandle::load(&model_path, FeatureSchema::v1())?;
            let classifier = model.classifier();
            let names = classifier.feature_names();
            let description = ModelDescription {
                path: &model_path,
                schema_version: model.schema().version(),
                columns: names,
                n_estimators: classifier.n_estimators(),
                feature_importances: top_features(
                    names,
                    classifier.feature_importances(),
                    names.len(),
                ),
            };
            if cli.json {
                println!("{}", to_json(&description)?);
            } else {
                print_description(&description, config.bar_width);
            }
        }
    }
    Ok(())
}

fn print_description(description: &ModelDescription<'_>, bar_width: usize) {
    println!("Model:          {}", description.path.display());
    println!("Schema version: {}", description.schema_version);
    println!("Features:       {}", description.columns.len());
    if let Some(n) = description.n_estimators {
        println!("Trees:          {n}");
    }
    println!();
    println!("Feature importances:");
    print!(
        "{}",
        importance_chart(&description.feature_importances, bar_width)
    );
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| NoShowError::Serialization(e.to_string()))
}
