use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use loan_fraud_predictor::{
    config::{ArtifactsConfig, Config, CoverageMode},
    ml::{load_feature_names, load_model, write_artifact, FraudPredictor, PredictorInfo},
    models::{
        all_attributes, EmploymentStatus, FraudAssessment, Gender, LoanApplication, LoanType,
        PropertyOwnershipStatus, PurposeOfLoan,
    },
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lfp-cli")]
#[command(about = "Loan fraud predictor CLI", long_about = None)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = "CONFIG_PATH", default_value = "config/local.toml")]
    config: String,

    /// Override the classifier artifact path
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Override the feature-name list artifact path
    #[arg(long, global = true)]
    feature_columns: Option<PathBuf>,

    /// Override the categorical coverage mode
    #[arg(long, global = true, value_enum)]
    coverage: Option<CoverageArg>,

    /// Emit debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one application
    Predict {
        #[command(flatten)]
        form: FormArgs,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the loaded model, its feature list and categorical coverage
    Schema {
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List categorical options and their one-hot columns
    Options,

    /// Re-encode an artifact (JSON <-> bincode, chosen by extension)
    Convert {
        #[arg(value_enum)]
        kind: ArtifactKind,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ArtifactKind {
    Model,
    FeatureColumns,
}

#[derive(Clone, Copy, ValueEnum)]
enum CoverageArg {
    Warn,
    Strict,
}

impl From<CoverageArg> for CoverageMode {
    fn from(arg: CoverageArg) -> Self {
        match arg {
            CoverageArg::Warn => CoverageMode::Warn,
            CoverageArg::Strict => CoverageMode::Strict,
        }
    }
}

/// Every field of the application form, with the form's defaults
#[derive(Args)]
struct FormArgs {
    #[arg(long, default_value_t = 50000.0)]
    loan_amount_requested: f64,

    #[arg(long, default_value_t = 24)]
    loan_tenure_months: u32,

    #[arg(long, default_value_t = 12.0)]
    interest_rate_offered: f64,

    #[arg(long, default_value_t = 30000.0, allow_negative_numbers = true)]
    monthly_income: f64,

    #[arg(long, default_value_t = 5000.0)]
    existing_emis_monthly: f64,

    #[arg(long, default_value_t = 0.3)]
    debt_to_income_ratio: f64,

    #[arg(long, default_value_t = 35)]
    applicant_age: u32,

    #[arg(long, default_value_t = 1)]
    number_of_dependents: u32,

    #[arg(long, default_value_t = 10000.0)]
    avg_txn_amt: f64,

    #[arg(long, default_value_t = 50000.0)]
    total_txn_amt: f64,

    #[arg(long, default_value_t = 20000.0)]
    max_txn_amt: f64,

    #[arg(long, default_value_t = 500.0)]
    min_txn_amt: f64,

    #[arg(long, default_value_t = 10.0)]
    txn_count: f64,

    #[arg(long, default_value_t = 0.1)]
    intl_txn_ratio: f64,

    #[arg(long, default_value = "Business Loan")]
    loan_type: LoanType,

    #[arg(long, default_value = "Employed")]
    employment_status: EmploymentStatus,

    #[arg(long, default_value = "Rented")]
    property_ownership_status: PropertyOwnershipStatus,

    #[arg(long, default_value = "Male")]
    gender: Gender,

    #[arg(long, default_value = "Business")]
    purpose_of_loan: PurposeOfLoan,
}

impl From<FormArgs> for LoanApplication {
    fn from(form: FormArgs) -> Self {
        LoanApplication {
            loan_amount_requested: form.loan_amount_requested,
            loan_tenure_months: form.loan_tenure_months,
            interest_rate_offered: form.interest_rate_offered,
            monthly_income: form.monthly_income,
            existing_emis_monthly: form.existing_emis_monthly,
            debt_to_income_ratio: form.debt_to_income_ratio,
            applicant_age: form.applicant_age,
            number_of_dependents: form.number_of_dependents,
            avg_txn_amt: form.avg_txn_amt,
            total_txn_amt: form.total_txn_amt,
            max_txn_amt: form.max_txn_amt,
            min_txn_amt: form.min_txn_amt,
            txn_count: form.txn_count,
            intl_txn_ratio: form.intl_txn_ratio,
            loan_type: form.loan_type,
            employment_status: form.employment_status,
            property_ownership_status: form.property_ownership_status,
            gender: form.gender,
            purpose_of_loan: form.purpose_of_loan,
        }
    }
}

fn init_cli_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("loan_fraud_predictor={}", default_level).into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn artifacts_config(cli: &Cli) -> anyhow::Result<ArtifactsConfig> {
    let config = Config::load_from(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config))?;

    let mut artifacts = config.artifacts;
    if let Some(model) = &cli.model {
        artifacts.model_path = model.clone();
    }
    if let Some(feature_columns) = &cli.feature_columns {
        artifacts.feature_columns_path = feature_columns.clone();
    }
    if let Some(coverage) = cli.coverage {
        artifacts.categorical_coverage = coverage.into();
    }
    Ok(artifacts)
}

fn load_predictor(artifacts: &ArtifactsConfig) -> anyhow::Result<FraudPredictor> {
    FraudPredictor::load(artifacts).context("loading model artifacts")
}

fn print_assessment(assessment: &FraudAssessment, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(assessment)?);
        }
        OutputFormat::Text => {
            let derived = &assessment.derived;
            println!("{}", assessment.summary());
            println!();
            println!("Derived features:");
            println!("  loan_to_income_ratio: {:.5}", derived.loan_to_income_ratio);
            println!("  emi_to_income_ratio:  {:.5}", derived.emi_to_income_ratio);
            println!("  interest_burden:      {:.4}", derived.interest_burden);
            println!("  high_intl_txn:        {}", derived.high_intl_txn);
            println!("  age_group:            {}", derived.age_group);
            if !assessment.ignored_features.is_empty() {
                println!();
                println!(
                    "Not used by the model: {}",
                    assessment.ignored_features.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn print_schema(info: &PredictorInfo, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(info)?);
        }
        OutputFormat::Text => {
            println!(
                "Model: {} v{} ({})",
                info.model.name, info.model.version, info.model_type
            );
            if let Some(trained_at) = info.model.trained_at {
                println!("Trained: {}", trained_at.to_rfc3339());
            }
            println!("Features ({}):", info.n_features);
            for (i, name) in info.feature_names.iter().enumerate() {
                println!("  {:>3}  {}", i, name);
            }
            if info.coverage.is_complete() {
                println!("Every categorical option has a column.");
            } else {
                println!("Options without a column:");
                for missing in &info.coverage.missing {
                    println!(
                        "  {} = {:?} ({})",
                        missing.attribute, missing.option, missing.feature_name
                    );
                }
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing(cli.verbose);

    let artifacts = artifacts_config(&cli)?;

    match cli.command {
        Commands::Predict { form, format } => {
            let predictor = load_predictor(&artifacts)?;
            let assessment = predictor.assess(&LoanApplication::from(form))?;
            print_assessment(&assessment, format)?;
        }

        Commands::Schema { format } => {
            let predictor = load_predictor(&artifacts)?;
            print_schema(&predictor.info(), format)?;
        }

        Commands::Options => {
            for attribute in all_attributes() {
                println!("{}:", attribute.attribute);
                for (option, feature) in attribute.options.iter().zip(&attribute.feature_names) {
                    println!("  {:<16} -> {}", option, feature);
                }
            }
        }

        Commands::Convert {
            kind,
            input,
            output,
        } => {
            match kind {
                ArtifactKind::Model => write_artifact(&output, &load_model(&input)?)?,
                ArtifactKind::FeatureColumns => {
                    write_artifact(&output, &load_feature_names(&input)?)?
                }
            }
            println!("Wrote {}", output.display());
        }
    }

    Ok(())
}
