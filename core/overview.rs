use crate::{
	health::HealthReport,
	ingest::Ingestion,
	run::{RunDocument, RunRecord},
	time::format_readable_or_unknown,
};

/// The overview tab: the most recent run whether or not it is eligible, counts from the latest ingestion, and the backend's health.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Overview {
	pub experiment_name: Option<String>,
	pub n_runs: usize,
	pub n_eligible_runs: usize,
	pub latest_run: Option<LatestRun>,
	pub health: HealthSummary,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LatestRun {
	pub run_id: String,
	pub run_name: Option<String>,
	pub status: Option<String>,
	pub end_time: String,
	pub metrics: Vec<OverviewMetric>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OverviewMetric {
	pub name: String,
	pub value: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum HealthSummary {
	Reported(HealthReport),
	Unreachable(String),
}

impl Overview {
	pub fn compute(
		experiment_name: Option<String>,
		documents: &[RunDocument],
		ingestion: &Ingestion,
		health: HealthSummary,
	) -> Overview {
		let latest_run = documents.first().map(|document| {
			let run = RunRecord::from_document(document);
			// Metrics that do not normalize are left out.
			let metrics = run
				.metrics
				.iter()
				.filter_map(|(name, value)| {
					Some(OverviewMetric {
						name: name.clone(),
						value: value.as_ref()?.get(),
					})
				})
				.collect();
			LatestRun {
				end_time: format_readable_or_unknown(run.end_time),
				run_id: run.run_id,
				run_name: run.run_name,
				status: run.status,
				metrics,
			}
		});
		let experiment_name = experiment_name.or_else(|| match &health {
			HealthSummary::Reported(report) => report.experiment_name.clone(),
			HealthSummary::Unreachable(_) => None,
		});
		Overview {
			experiment_name,
			n_runs: ingestion.n_documents,
			n_eligible_runs: ingestion.runs.len(),
			latest_run,
			health,
		}
	}
}

#[test]
fn test_overview() {
	use crate::{health::HealthStatus, ingest::ingest, ingest::document};
	let documents = vec![
		document(
			"latest",
			1_700_000_000_000,
			serde_json::json!({ "validation_rmse": 101.5, "validation_r2": "n/a" }),
		),
		document("older", 0, crate::ingest::complete_metrics(100.0, 90.0)),
	];
	let ingestion = ingest(&documents);
	let health = HealthSummary::Reported(HealthReport {
		status: HealthStatus::Ok,
		experiment_name: Some("LondonHousingAI".to_owned()),
		mlflow_tracking_uri: None,
		latest_run_id: Some("latest".to_owned()),
		detail: None,
	});
	let overview = Overview::compute(None, &documents, &ingestion, health);
	assert_eq!(overview.experiment_name.as_deref(), Some("LondonHousingAI"));
	assert_eq!(overview.n_runs, 2);
	assert_eq!(overview.n_eligible_runs, 1);
	let latest_run = overview.latest_run.unwrap();
	assert_eq!(latest_run.run_id, "latest");
	assert_eq!(latest_run.end_time, "14 Nov 2023, 22:13");
	assert_eq!(
		latest_run.metrics,
		vec![OverviewMetric {
			name: "validation_rmse".to_owned(),
			value: 101.5,
		}]
	);
}

#[test]
fn test_overview_without_runs() {
	let overview = Overview::compute(
		None,
		&[],
		&crate::ingest::ingest(&[]),
		HealthSummary::Unreachable("connection refused".to_owned()),
	);
	assert_eq!(overview.latest_run, None);
	assert_eq!(overview.experiment_name, None);
	assert_eq!(overview.n_runs, 0);
}
