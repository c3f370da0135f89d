use crate::run::{RunDocument, RunRecord};

/// The result of ingesting one run listing. `n_documents` counts every document the backend returned so that "no runs at all" can be told apart from "no eligible runs".
#[derive(Clone, Debug, PartialEq)]
pub struct Ingestion {
	pub n_documents: usize,
	pub runs: Vec<RunRecord>,
}

impl Ingestion {
	pub fn is_empty(&self) -> bool {
		self.n_documents == 0
	}

	pub fn has_eligible_runs(&self) -> bool {
		!self.runs.is_empty()
	}
}

/**
Normalize every document and keep the runs whose required metrics are all finite. The backend's order, most recent first, is preserved. Duplicates are not removed.
*/
pub fn ingest(documents: &[RunDocument]) -> Ingestion {
	let runs: Vec<RunRecord> = documents
		.iter()
		.map(RunRecord::from_document)
		.filter(RunRecord::is_eligible)
		.collect();
	tracing::debug!(
		n_documents = documents.len(),
		n_eligible = runs.len(),
		"ingested runs"
	);
	Ingestion {
		n_documents: documents.len(),
		runs,
	}
}

#[cfg(test)]
pub(crate) fn document(run_id: &str, end_time: i64, metrics: serde_json::Value) -> RunDocument {
	serde_json::from_value(serde_json::json!({
		"data": {
			"metrics": metrics,
			"params": { "model_class": "CatBoostRegressor", "depth": "6" },
		},
		"info": { "run_id": run_id, "end_time": end_time },
	}))
	.unwrap()
}

#[cfg(test)]
pub(crate) fn complete_metrics(validation_rmse: f64, train_rmse: f64) -> serde_json::Value {
	serde_json::json!({
		"validation_rmse": validation_rmse,
		"validation_mse": validation_rmse * validation_rmse,
		"validation_r2": 0.81,
		"train_rmse": train_rmse,
		"test_rmse": validation_rmse + 1.0,
	})
}

#[test]
fn test_ingest_filters_incomplete_runs() {
	let documents = vec![
		document("a", 3, complete_metrics(120.0, 100.0)),
		document(
			"b",
			2,
			serde_json::json!({
				"validation_rmse": 100.0,
				"validation_mse": 10000.0,
				"validation_r2": null,
				"train_rmse": 90.0,
				"test_rmse": 101.0,
			}),
		),
		document(
			"c",
			1,
			serde_json::json!({
				"validation_rmse": "99.5",
				"validation_mse": "9900.25",
				"validation_r2": "0.8",
				"train_rmse": "90",
				"test_rmse": "100",
			}),
		),
		document(
			"d",
			0,
			serde_json::json!({
				"validation_rmse": "NaN",
				"validation_mse": 1.0,
				"validation_r2": 1.0,
				"train_rmse": 1.0,
				"test_rmse": 1.0,
			}),
		),
	];
	let ingestion = ingest(&documents);
	assert_eq!(ingestion.n_documents, 4);
	let run_ids: Vec<&str> = ingestion.runs.iter().map(|run| run.run_id.as_str()).collect();
	assert_eq!(run_ids, vec!["a", "c"]);
	assert!(ingestion.has_eligible_runs());
}

#[test]
fn test_ingest_empty() {
	let ingestion = ingest(&[]);
	assert!(ingestion.is_empty());
	assert!(!ingestion.has_eligible_runs());
	let ingestion = ingest(&[document("a", 0, serde_json::json!({}))]);
	assert!(!ingestion.is_empty());
	assert!(!ingestion.has_eligible_runs());
}

#[test]
fn test_ingest_keeps_duplicates_in_order() {
	let documents = vec![
		document("a", 1, complete_metrics(100.0, 90.0)),
		document("a", 1, complete_metrics(100.0, 90.0)),
	];
	assert_eq!(ingest(&documents).runs.len(), 2);
}
