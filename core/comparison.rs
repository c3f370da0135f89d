use crate::{
	ingest::Ingestion,
	run::{RunRecord, TEST_RMSE, TRAIN_RMSE, VALIDATION_MSE, VALIDATION_R2, VALIDATION_RMSE},
	time::format_readable_or_unknown,
};
use housing_metrics::{Generalization, RankLabel, Ranking, ScoreExtremesOutput, SCORE_DECIMALS};
use housing_util::{
	finite::Finite,
	format::{format_number, format_percent_with_precision, format_pounds},
};

pub const NO_RUNS_MESSAGE: &str = "No MLflow runs found yet.";
pub const NO_ELIGIBLE_RUNS_MESSAGE: &str = "MLflow runs found, but required metrics are missing.";
const UNKNOWN_MODEL: &str = "Unknown model";
const CHAMPION_SUFFIX: &str = " 🏆";

/// What the model comparison tab shows after a fetch.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ComparisonOutcome {
	NoRuns,
	NoEligibleRuns,
	Ready(ModelComparison),
	Failed(String),
}

impl ComparisonOutcome {
	pub fn from_ingestion(experiment_name: Option<String>, ingestion: &Ingestion) -> ComparisonOutcome {
		if ingestion.is_empty() {
			ComparisonOutcome::NoRuns
		} else if !ingestion.has_eligible_runs() {
			ComparisonOutcome::NoEligibleRuns
		} else {
			ComparisonOutcome::Ready(ModelComparison::compute(experiment_name, &ingestion.runs))
		}
	}

	/// A failed fetch becomes `Failed` with the error's message, so it is never confused with an empty result.
	pub fn from_fetch<E>(experiment_name: Option<String>, result: Result<Ingestion, E>) -> ComparisonOutcome
	where
		E: std::fmt::Display,
	{
		match result {
			Ok(ingestion) => ComparisonOutcome::from_ingestion(experiment_name, &ingestion),
			Err(error) => ComparisonOutcome::Failed(error.to_string()),
		}
	}

	pub fn message(&self) -> Option<&str> {
		match self {
			ComparisonOutcome::NoRuns => Some(NO_RUNS_MESSAGE),
			ComparisonOutcome::NoEligibleRuns => Some(NO_ELIGIBLE_RUNS_MESSAGE),
			ComparisonOutcome::Ready(_) => None,
			ComparisonOutcome::Failed(message) => Some(message),
		}
	}
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ModelComparison {
	pub experiment_name: Option<String>,
	pub extremes: ScoreExtremesOutput,
	pub cards: Vec<RunCard>,
	pub params_table: ParamsTable,
	pub rmse_series: ChartSeries,
	pub r2_series: ChartSeries,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RunCard {
	pub run_id: String,
	pub run_name: Option<String>,
	pub title: String,
	pub end_time: String,
	pub rank: RankLabel,
	pub validation_rmse: String,
	pub validation_mse: String,
	pub validation_r2: String,
	pub train_rmse: String,
	pub test_rmse: String,
	pub generalization: Generalization,
	pub generalization_title: String,
	pub generalization_percent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ParamsTable {
	pub header: Vec<String>,
	pub rows: Vec<ParamsRow>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ParamsRow {
	pub run_id: String,
	pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ChartSeries {
	pub metric: String,
	pub points: Vec<ChartPoint>,
	pub domain: Option<(f64, f64)>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ChartPoint {
	pub label: String,
	pub value: f64,
}

impl ModelComparison {
	/**
	Derive everything the comparison tab displays from a set of runs in backend order. Runs are expected to have been filtered by [`ingest`](../ingest/fn.ingest.html), but an unfiltered run never causes a failure: its rank is unknown, its generalization is unavailable, and its missing values are left out of the charts.
	*/
	pub fn compute(experiment_name: Option<String>, runs: &[RunRecord]) -> ModelComparison {
		let ranking = Ranking::compute(runs.iter().map(primary_score));
		let cards = runs
			.iter()
			.zip(ranking.labels.iter())
			.map(|(run, rank)| RunCard::compute(run, *rank))
			.collect();
		let mut chronological: Vec<&RunRecord> = runs.iter().collect();
		chronological.sort_by_key(|run| run.end_time);
		ModelComparison {
			experiment_name,
			extremes: ranking.extremes,
			cards,
			params_table: ParamsTable::compute(runs),
			rmse_series: ChartSeries::compute(VALIDATION_RMSE, &chronological),
			r2_series: ChartSeries::compute(VALIDATION_R2, &chronological),
		}
	}
}

fn primary_score(run: &RunRecord) -> Option<Finite<f64>> {
	run.metric(VALIDATION_RMSE)
		.map(|score| score.round_to(SCORE_DECIMALS))
}

impl RunCard {
	fn compute(run: &RunRecord, rank: RankLabel) -> RunCard {
		let model_class = run.model_class().unwrap_or(UNKNOWN_MODEL);
		let title = if rank == RankLabel::Champion {
			format!("{}{}", model_class, CHAMPION_SUFFIX)
		} else {
			model_class.to_owned()
		};
		let pounds = |name: &str| {
			run.metric(name)
				.map(|value| format_pounds(value.get()))
				.unwrap_or_default()
		};
		let generalization = Generalization::compute(run.metric(VALIDATION_RMSE), run.metric(TRAIN_RMSE));
		RunCard {
			run_id: run.run_id.clone(),
			run_name: run.run_name.clone(),
			title,
			end_time: format_readable_or_unknown(run.end_time),
			rank,
			validation_rmse: pounds(VALIDATION_RMSE),
			validation_mse: pounds(VALIDATION_MSE),
			validation_r2: run
				.metric(VALIDATION_R2)
				.map(|value| format_number(value.get()))
				.unwrap_or_default(),
			train_rmse: pounds(TRAIN_RMSE),
			test_rmse: pounds(TEST_RMSE),
			generalization_title: generalization.title().to_owned(),
			generalization_percent: generalization
				.gap()
				.map(|gap| format_percent_with_precision(gap, 1)),
			generalization,
		}
	}
}

impl ParamsTable {
	/// The columns are the first run's parameters. Later runs that lack one of them get an empty cell, and parameters only later runs have are not shown.
	fn compute(runs: &[RunRecord]) -> ParamsTable {
		let keys: Vec<&String> = runs
			.first()
			.map(|run| run.params.keys().collect())
			.unwrap_or_default();
		let header = keys.iter().map(|key| param_heading(key)).collect();
		let rows = runs
			.iter()
			.map(|run| ParamsRow {
				run_id: run.run_id.clone(),
				values: keys
					.iter()
					.map(|key| run.params.get(*key).cloned().unwrap_or_default())
					.collect(),
			})
			.collect();
		ParamsTable { header, rows }
	}
}

fn param_heading(key: &str) -> String {
	key.replace('_', " ").to_uppercase()
}

impl ChartSeries {
	fn compute(metric: &str, runs: &[&RunRecord]) -> ChartSeries {
		let points: Vec<ChartPoint> = runs
			.iter()
			.filter_map(|run| {
				let value = run.metric(metric)?.round_to(SCORE_DECIMALS).get();
				Some(ChartPoint {
					label: format_readable_or_unknown(run.end_time),
					value,
				})
			})
			.collect();
		let domain = points.iter().fold(None, |domain, point| match domain {
			None => Some((point.value, point.value)),
			Some((min, max)) => Some((f64::min(min, point.value), f64::max(max, point.value))),
		});
		ChartSeries {
			metric: metric.to_owned(),
			points,
			domain,
		}
	}
}

#[cfg(test)]
use crate::{
	ingest::{complete_metrics, document, ingest},
	run::RunDocument,
};

#[cfg(test)]
const DAY: i64 = 86_400_000;

#[cfg(test)]
const NOV_14_2023: i64 = 1_700_000_000_000;

#[cfg(test)]
fn compare(documents: &[RunDocument]) -> ModelComparison {
	match ComparisonOutcome::from_ingestion(None, &ingest(documents)) {
		ComparisonOutcome::Ready(comparison) => comparison,
		outcome => panic!("expected a comparison, got {:?}", outcome),
	}
}

#[test]
fn test_comparison_ranks() {
	let comparison = compare(&[
		document("a", NOV_14_2023 + 3 * DAY, complete_metrics(120.0, 100.0)),
		document("b", NOV_14_2023 + 2 * DAY, complete_metrics(120.004, 100.0)),
		document("c", NOV_14_2023 + DAY, complete_metrics(95.5, 90.0)),
		document("d", NOV_14_2023, complete_metrics(130.25, 80.0)),
	]);
	assert_eq!(comparison.extremes.best, Some(95.5));
	assert_eq!(comparison.extremes.second_best, Some(120.0));
	let ranks: Vec<RankLabel> = comparison.cards.iter().map(|card| card.rank).collect();
	assert_eq!(
		ranks,
		vec![
			RankLabel::Challenger,
			RankLabel::Challenger,
			RankLabel::Champion,
			RankLabel::Archive,
		]
	);
	assert_eq!(comparison.cards[2].title, "CatBoostRegressor 🏆");
	assert_eq!(comparison.cards[0].title, "CatBoostRegressor");
}

#[test]
fn test_comparison_card() {
	let comparison = compare(&[document("a", NOV_14_2023, complete_metrics(125.0, 100.0))]);
	let card = &comparison.cards[0];
	assert_eq!(card.rank, RankLabel::Champion);
	assert_eq!(card.end_time, "14 Nov 2023, 22:13");
	assert_eq!(card.validation_rmse, "£125.00");
	assert_eq!(card.validation_mse, "£15625.00");
	assert_eq!(card.validation_r2, "0.81");
	assert_eq!(card.train_rmse, "£100.00");
	assert_eq!(card.test_rmse, "£126.00");
	assert_eq!(card.generalization_title, "Potential overfit");
	assert_eq!(card.generalization_percent.as_deref(), Some("25.0%"));
}

#[test]
fn test_comparison_unknown_model_and_zero_train_rmse() {
	let mut run = RunRecord::from_document(&document("a", NOV_14_2023, complete_metrics(100.0, 0.0)));
	run.params.clear();
	let comparison = ModelComparison::compute(None, &[run]);
	let card = &comparison.cards[0];
	assert_eq!(card.title, "Unknown model 🏆");
	assert_eq!(card.generalization, Generalization::Unavailable);
	assert_eq!(card.generalization_title, "Generalization unavailable");
	assert_eq!(card.generalization_percent, None);
}

#[test]
fn test_comparison_unfiltered_runs_are_unknown() {
	let runs = vec![
		RunRecord::from_document(&document("a", NOV_14_2023, serde_json::json!({}))),
		RunRecord::from_document(&document("b", NOV_14_2023, complete_metrics(100.0, 90.0))),
	];
	let comparison = ModelComparison::compute(None, &runs);
	assert_eq!(comparison.cards[0].rank, RankLabel::Unknown);
	assert_eq!(comparison.cards[0].generalization, Generalization::Unavailable);
	assert_eq!(comparison.cards[0].validation_rmse, "");
	assert_eq!(comparison.cards[1].rank, RankLabel::Champion);
	assert_eq!(comparison.rmse_series.points.len(), 1);
}

#[test]
fn test_comparison_chart_is_chronological() {
	let comparison = compare(&[
		document("a", NOV_14_2023 + DAY, complete_metrics(120.004, 100.0)),
		document("b", NOV_14_2023, complete_metrics(95.5, 90.0)),
	]);
	insta::assert_debug_snapshot!(comparison.rmse_series, @r###"
 ChartSeries {
     metric: "validation_rmse",
     points: [
         ChartPoint {
             label: "14 Nov 2023, 22:13",
             value: 95.5,
         },
         ChartPoint {
             label: "15 Nov 2023, 22:13",
             value: 120.0,
         },
     ],
     domain: Some(
         (
             95.5,
             120.0,
         ),
     ),
 }
 "###);
	assert_eq!(comparison.r2_series.domain, Some((0.81, 0.81)));
}

#[test]
fn test_comparison_chart_puts_unknown_time_first() {
	let mut undated = document("c", 0, complete_metrics(110.0, 100.0));
	undated.info.end_time = None;
	let comparison = compare(&[
		document("a", NOV_14_2023 + DAY, complete_metrics(120.0, 100.0)),
		undated,
		document("b", NOV_14_2023, complete_metrics(95.5, 90.0)),
	]);
	let points: Vec<(&str, f64)> = comparison
		.rmse_series
		.points
		.iter()
		.map(|point| (point.label.as_str(), point.value))
		.collect();
	assert_eq!(
		points,
		vec![
			("Unknown time", 110.0),
			("14 Nov 2023, 22:13", 95.5),
			("15 Nov 2023, 22:13", 120.0),
		]
	);
	// Cards keep backend order.
	let run_ids: Vec<&str> = comparison.cards.iter().map(|card| card.run_id.as_str()).collect();
	assert_eq!(run_ids, vec!["a", "c", "b"]);
	assert_eq!(comparison.cards[1].end_time, "Unknown time");
}

#[test]
fn test_comparison_params_table() {
	let mut documents = vec![
		document("a", NOV_14_2023, complete_metrics(100.0, 90.0)),
		document("b", NOV_14_2023, complete_metrics(110.0, 90.0)),
	];
	documents[1].data.params.remove("depth");
	documents[1]
		.data
		.params
		.insert("learning_rate".to_owned(), serde_json::json!(0.05));
	let comparison = compare(&documents);
	assert_eq!(comparison.params_table.header, vec!["DEPTH", "MODEL CLASS"]);
	assert_eq!(
		comparison.params_table.rows,
		vec![
			ParamsRow {
				run_id: "a".to_owned(),
				values: vec!["6".to_owned(), "CatBoostRegressor".to_owned()],
			},
			ParamsRow {
				run_id: "b".to_owned(),
				values: vec!["".to_owned(), "CatBoostRegressor".to_owned()],
			},
		]
	);
}

#[test]
fn test_comparison_outcomes() {
	let outcome = ComparisonOutcome::from_ingestion(None, &ingest(&[]));
	assert_eq!(outcome, ComparisonOutcome::NoRuns);
	assert_eq!(outcome.message(), Some("No MLflow runs found yet."));
	let outcome = ComparisonOutcome::from_ingestion(
		None,
		&ingest(&[document("a", NOV_14_2023, serde_json::json!({ "validation_rmse": 1.0 }))]),
	);
	assert_eq!(outcome, ComparisonOutcome::NoEligibleRuns);
	assert_eq!(
		serde_json::to_value(&outcome).unwrap(),
		serde_json::json!({ "type": "no_eligible_runs" })
	);
	let outcome = ComparisonOutcome::from_ingestion(
		Some("LondonHousingAI".to_owned()),
		&ingest(&[document("a", NOV_14_2023, complete_metrics(100.0, 90.0))]),
	);
	assert_eq!(outcome.message(), None);
	match outcome {
		ComparisonOutcome::Ready(comparison) => {
			assert_eq!(comparison.experiment_name.as_deref(), Some("LondonHousingAI"));
			assert_eq!(comparison.extremes.best, Some(100.0));
			assert_eq!(comparison.extremes.second_best, None);
		}
		outcome => panic!("unexpected outcome {:?}", outcome),
	}
	let failed = ComparisonOutcome::from_fetch(
		None,
		Err::<Ingestion, _>("could not reach backend: connection refused"),
	);
	assert_eq!(
		failed,
		ComparisonOutcome::Failed("could not reach backend: connection refused".to_owned())
	);
	assert_eq!(failed.message(), Some("could not reach backend: connection refused"));
}
