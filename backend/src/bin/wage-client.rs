use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::error;

use wage_backend::client::{DatasetPreview, WageClient, DEFAULT_API_URL};
use wage_backend::models::{Education, Health, HealthIns, JobClass, MaritalStatus, Race};
use wage_backend::WageQuery;

#[derive(Parser)]
#[command(name = "wage-client")]
#[command(version)]
#[command(about = "Command-line front end for the wage prediction API", long_about = None)]
struct Cli {
    /// Base URL of the prediction API
    #[arg(long, global = true, env = "API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is up
    Health,

    /// Send one record to POST /predict and print the result
    Predict {
        #[command(flatten)]
        record: RecordArgs,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show the first rows of the dataset file
    Preview {
        #[arg(short, long, default_value = "Wage.csv")]
        file: PathBuf,

        #[arg(short, long, default_value_t = 5)]
        rows: usize,
    },
}

/// Record fields; the defaults form the reference profile.
#[derive(Args)]
struct RecordArgs {
    #[arg(long, default_value_t = 30)]
    age: i32,

    #[arg(long, default_value = "College Grad")]
    education: Education,

    #[arg(long, default_value = "Information")]
    jobclass: JobClass,

    #[arg(long, default_value = "Muy Buena o Excelente")]
    health: Health,

    #[arg(long, default_value = "Yes")]
    health_ins: HealthIns,

    #[arg(long, default_value = "Never Married")]
    maritl: MaritalStatus,

    #[arg(long, default_value = "White")]
    race: Race,

    #[arg(long, default_value_t = 2006)]
    year: i32,
}

impl RecordArgs {
    fn to_query(&self) -> WageQuery {
        WageQuery {
            age: self.age,
            education: self.education,
            jobclass: self.jobclass,
            health: self.health,
            health_ins: self.health_ins,
            maritl: Some(self.maritl),
            race: Some(self.race),
            year: Some(self.year),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Health => health(&cli.api_url).await,
        Commands::Predict { record, json } => {
            predict(&cli.api_url, &record.to_query(), json).await
        }
        Commands::Preview { file, rows } => preview(&file, rows),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn health(api_url: &str) -> anyhow::Result<()> {
    let greeting = WageClient::new(api_url)?.health().await?;
    println!("{}", greeting.message);
    Ok(())
}

async fn predict(api_url: &str, query: &WageQuery, json: bool) -> anyhow::Result<()> {
    let result = WageClient::new(api_url)?.predict(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Estimated wage: {:.2} (thousands/year)", result.estimate);
    println!("Salary class:   {} - {}", result.class, result.label);
    println!("{}", result.description);
    println!();
    println!("{}", result.explanatory_text);
    println!();
    println!("Input sent:");
    println!("{}", serde_json::to_string_pretty(&result.echo_of_input)?);
    Ok(())
}

fn preview(file: &Path, rows: usize) -> anyhow::Result<()> {
    let preview = DatasetPreview::load(file, rows)?;
    println!("{}", preview.render());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wage_backend::models::Schema;

    fn record(args: &[&str]) -> WageQuery {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Predict { record, .. } => record.to_query(),
            _ => panic!("expected the predict command"),
        }
    }

    #[test]
    fn bare_predict_sends_a_complete_extended_record() {
        let query = record(&["wage-client", "predict"]);

        assert_eq!(query.validate(Schema::Extended, true), Ok(()));
        assert_eq!(query.maritl, Some(MaritalStatus::NeverMarried));
        assert_eq!(query.race, Some(Race::White));
        assert_eq!(query.year, Some(2006));
    }

    #[test]
    fn predict_flags_override_defaults() {
        let query = record(&[
            "wage-client",
            "predict",
            "--education",
            "Advanced Degree",
            "--race",
            "Asian",
            "--year",
            "2009",
        ]);

        assert_eq!(query.education, Education::Advanced);
        assert_eq!(query.race, Some(Race::Asian));
        assert_eq!(query.year, Some(2009));
    }

    #[test]
    fn unknown_level_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["wage-client", "predict", "--health", "Good"]).is_err());
    }
}
