//! This module contains the main entrypoint to the housing cli.

use clap::Parser;
use colored::Colorize;
use housing_client::{parse_runs_limit, Client, ClientOptions, DEFAULT_API_URL};
use housing_core::{
	comparison::{ComparisonOutcome, ModelComparison},
	data_quality::{DataQualityOutcome, DataQualitySummary},
	ingest,
	predict::{PredictionRequest, PredictionSummary, PropertyType},
};
use housing_metrics::RankLabel;
use housing_util::{
	err,
	error::Result,
	format::{format_number, format_percent, format_pounds},
	table::Table,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
	about = "Compare London housing price models and request predictions.",
	disable_help_subcommand = true,
)]
enum Options {
	#[clap(name = "app")]
	App(Box<AppOptions>),
	#[clap(name = "runs")]
	Runs(RunsOptions),
	#[clap(name = "predict")]
	Predict(PredictOptions),
	#[clap(name = "data-quality")]
	DataQuality(DataQualityOptions),
}

#[derive(clap::Args)]
struct BackendOptions {
	/// the base url of the experiment backend
	#[clap(long, env = "HOUSING_API_URL", default_value = DEFAULT_API_URL)]
	api_url: String,
	/// the number of runs to request, between 1 and 200
	#[clap(long, env = "HOUSING_RUNS_LIMIT", parse(try_from_str = parse_runs_limit))]
	runs_limit: Option<u32>,
}

impl BackendOptions {
	fn client_options(&self) -> Result<ClientOptions> {
		ClientOptions::new(&self.api_url, self.runs_limit)
	}
}

/// run the dashboard server
#[derive(clap::Args)]
struct AppOptions {
	#[clap(flatten)]
	backend: BackendOptions,
	#[clap(long, default_value = "0.0.0.0")]
	host: std::net::IpAddr,
	#[clap(long, env = "PORT", default_value = "8080")]
	port: u16,
}

/// compare the runs of the experiment
#[derive(clap::Args)]
struct RunsOptions {
	#[clap(flatten)]
	backend: BackendOptions,
}

/// request a price prediction
#[derive(clap::Args)]
struct PredictOptions {
	#[clap(flatten)]
	backend: BackendOptions,
	#[clap(long)]
	postcode: String,
	/// one of F, D, S, or T
	#[clap(long, default_value = "F")]
	property_type: PropertyType,
	#[clap(long)]
	new_build: bool,
	#[clap(long)]
	leasehold: bool,
}

/// summarize the latest data quality report
#[derive(clap::Args)]
struct DataQualityOptions {
	#[clap(flatten)]
	backend: BackendOptions,
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();
	let options = Options::parse();
	let result = match options {
		Options::App(options) => cli_app(*options),
		Options::Runs(options) => cli_runs(options),
		Options::Predict(options) => cli_predict(options),
		Options::DataQuality(options) => cli_data_quality(options),
	};
	if let Err(error) = result {
		eprintln!("{}: {}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn cli_app(options: AppOptions) -> Result<()> {
	housing_app::run(housing_app::Options {
		client: options.backend.client_options()?,
		host: options.host,
		port: options.port,
	})
}

fn cli_runs(options: RunsOptions) -> Result<()> {
	let client = Client::new(options.backend.client_options()?);
	let outcome = block_on(async {
		let result = client.list_runs().await;
		let experiment_name = result
			.as_ref()
			.ok()
			.and_then(|listing| listing.experiment_name())
			.map(|name| name.to_owned());
		let ingestion = result.map(|listing| ingest(&listing.into_documents()));
		ComparisonOutcome::from_fetch(experiment_name, ingestion)
	})?;
	match outcome {
		ComparisonOutcome::Ready(comparison) => print_comparison(&comparison),
		ComparisonOutcome::Failed(message) => return Err(err!("{}", message)),
		outcome => {
			if let Some(message) = outcome.message() {
				eprintln!("{}", message);
			}
		}
	}
	Ok(())
}

fn print_comparison(comparison: &ModelComparison) {
	if let Some(experiment_name) = &comparison.experiment_name {
		println!("{}", experiment_name.bold());
	}
	let header = [
		"RANK",
		"MODEL",
		"FINISHED",
		"VALIDATION RMSE",
		"VALIDATION MSE",
		"VALIDATION R2",
		"TRAIN RMSE",
		"TEST RMSE",
		"GENERALIZATION",
	];
	let mut table = Table::new(header.iter().map(|title| title.to_string()).collect());
	for card in comparison.cards.iter() {
		let generalization = match &card.generalization_percent {
			Some(percent) => format!("{} ({})", card.generalization_title, percent),
			None => card.generalization_title.clone(),
		};
		table.push_row(vec![
			rank_label(card.rank),
			card.title.clone(),
			card.end_time.clone(),
			card.validation_rmse.clone(),
			card.validation_mse.clone(),
			card.validation_r2.clone(),
			card.train_rmse.clone(),
			card.test_rmse.clone(),
			generalization,
		]);
	}
	print!("{}", table);
	let extreme = |value: Option<f64>| value.map(format_pounds).unwrap_or_else(|| "-".to_owned());
	println!(
		"best validation rmse {}, second best {}",
		extreme(comparison.extremes.best),
		extreme(comparison.extremes.second_best)
	);
	if !comparison.params_table.header.is_empty() {
		let mut header = vec!["RUN".to_owned()];
		header.extend(comparison.params_table.header.iter().cloned());
		let mut table = Table::new(header);
		for row in comparison.params_table.rows.iter() {
			let mut values = vec![row.run_id.clone()];
			values.extend(row.values.iter().cloned());
			table.push_row(values);
		}
		println!();
		print!("{}", table);
	}
}

fn rank_label(rank: RankLabel) -> String {
	let title = rank.title();
	match rank {
		RankLabel::Champion => title.green().bold().to_string(),
		RankLabel::Challenger => title.yellow().to_string(),
		RankLabel::Archive => title.dimmed().to_string(),
		RankLabel::Unknown => title.to_owned(),
	}
}

fn cli_predict(options: PredictOptions) -> Result<()> {
	let client = Client::new(options.backend.client_options()?);
	let request = PredictionRequest::new(
		&options.postcode,
		options.property_type,
		options.new_build,
		options.leasehold,
	)?;
	let response = block_on(client.predict(&request))??;
	let summary = PredictionSummary::compute(&response);
	println!("{}", summary.predicted_price.green().bold());
	println!("95% confidence interval {}", summary.confidence_interval);
	println!("model version {}, run {}", summary.model_version, summary.run_id);
	for group in summary.feature_groups.iter() {
		println!("{}: {}", group.title, group.features.join(", "));
	}
	Ok(())
}

fn cli_data_quality(options: DataQualityOptions) -> Result<()> {
	let client = Client::new(options.backend.client_options()?);
	let outcome = DataQualityOutcome::from_fetch(block_on(client.data_quality())?);
	match outcome {
		DataQualityOutcome::Absent(message) => eprintln!("{}", message),
		DataQualityOutcome::Ready(summary) => print_data_quality(&summary),
		DataQualityOutcome::Failed(message) => return Err(err!("{}", message)),
	}
	Ok(())
}

fn print_data_quality(summary: &DataQualitySummary) {
	let mut table = Table::new(vec!["COLUMN".to_owned(), "MISSING".to_owned()]);
	for value in summary.missing.iter() {
		table.push_row(vec![value.column.clone(), format_percent(value.value)]);
	}
	print!("{}", table);
	let mut table = Table::new(vec!["COLUMN".to_owned(), "TRAIN/VALIDATION DRIFT".to_owned()]);
	for value in summary.train_val_drift.iter() {
		table.push_row(vec![value.column.clone(), format_number(value.value)]);
	}
	println!();
	print!("{}", table);
	let mut table = Table::new(vec!["COLUMN".to_owned(), "OUTLIERS".to_owned()]);
	for count in summary.outliers.iter() {
		table.push_row(vec![count.column.clone(), count.count.to_string()]);
	}
	println!();
	print!("{}", table);
	let mut table = Table::new(vec!["COLUMN".to_owned(), "TYPE".to_owned()]);
	for column in summary.schema.iter() {
		table.push_row(vec![column.column.clone(), column.dtype.clone()]);
	}
	println!();
	print!("{}", table);
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
	let runtime = tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()?;
	Ok(runtime.block_on(future))
}

#[test]
fn test_parse_options() {
	assert!(Options::try_parse_from(&["housing", "help"]).is_err());
	let options = Options::try_parse_from(&[
		"housing",
		"predict",
		"--postcode",
		"SW1A 1AA",
		"--property-type",
		"t",
		"--leasehold",
		"--api-url",
		"http://localhost:9000",
	])
	.unwrap();
	match options {
		Options::Predict(options) => {
			assert_eq!(options.property_type, PropertyType::Terraced);
			assert!(options.leasehold);
			assert!(!options.new_build);
			assert_eq!(options.backend.api_url, "http://localhost:9000");
		}
		_ => panic!("expected the predict subcommand"),
	}
	assert!(Options::try_parse_from(&["housing", "runs", "--runs-limit", "500"]).is_err());
}
