use chrono::prelude::*;
use housing_metrics::{normalize, MetricValue};
use housing_util::finite::Finite;
use std::collections::BTreeMap;

pub const VALIDATION_RMSE: &str = "validation_rmse";
pub const VALIDATION_MSE: &str = "validation_mse";
pub const VALIDATION_R2: &str = "validation_r2";
pub const TRAIN_RMSE: &str = "train_rmse";
pub const TEST_RMSE: &str = "test_rmse";

/// A run is only ranked if every one of these metrics is a finite number.
pub const REQUIRED_METRICS: [&str; 5] = [
	VALIDATION_RMSE,
	VALIDATION_MSE,
	VALIDATION_R2,
	TRAIN_RMSE,
	TEST_RMSE,
];

pub const MODEL_CLASS_PARAM: &str = "model_class";
pub const RUN_NAME_TAG: &str = "mlflow.runName";

/// The body of `GET /mlflow/runs`. Depending on the backend version this is either a bare array of runs or an envelope that also names the experiment.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(untagged)]
pub enum RunListing {
	Runs(Vec<RunEntry>),
	Envelope {
		#[serde(default)]
		experiment_name: Option<String>,
		runs: Vec<RunEntry>,
	},
}

impl RunListing {
	pub fn experiment_name(&self) -> Option<&str> {
		match self {
			RunListing::Runs(_) => None,
			RunListing::Envelope {
				experiment_name, ..
			} => experiment_name.as_deref(),
		}
	}

	pub fn into_documents(self) -> Vec<RunDocument> {
		let runs = match self {
			RunListing::Runs(runs) => runs,
			RunListing::Envelope { runs, .. } => runs,
		};
		runs.into_iter().map(RunDocument::from).collect()
	}
}

/// One element of a run listing. A summary carries its `run_id` at the top level and has no metrics. A document nests everything under `data` and `info`.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(untagged)]
pub enum RunEntry {
	Summary(RunSummary),
	Document(RunDocument),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct RunSummary {
	pub run_id: String,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub start_time: Option<Timestamp>,
	#[serde(default)]
	pub end_time: Option<Timestamp>,
}

impl From<RunEntry> for RunDocument {
	fn from(entry: RunEntry) -> RunDocument {
		match entry {
			RunEntry::Document(document) => document,
			RunEntry::Summary(summary) => RunDocument {
				data: RunData::default(),
				info: RunInfo {
					run_id: summary.run_id,
					status: summary.status,
					start_time: summary.start_time,
					end_time: summary.end_time,
					..Default::default()
				},
			},
		}
	}
}

/// A run exactly as the tracking backend reports it. Every field is optional because older runs and partially failed runs leave gaps.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default)]
pub struct RunDocument {
	#[serde(default, deserialize_with = "null_as_default")]
	pub data: RunData,
	#[serde(default, deserialize_with = "null_as_default")]
	pub info: RunInfo,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default)]
pub struct RunData {
	#[serde(default, deserialize_with = "null_as_default")]
	pub metrics: BTreeMap<String, Option<MetricValue>>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub params: BTreeMap<String, serde_json::Value>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub tags: BTreeMap<String, serde_json::Value>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default)]
pub struct RunInfo {
	#[serde(default)]
	pub run_id: String,
	#[serde(default)]
	pub run_uuid: Option<String>,
	#[serde(default)]
	pub experiment_id: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
	#[serde(default)]
	pub start_time: Option<Timestamp>,
	#[serde(default)]
	pub end_time: Option<Timestamp>,
	#[serde(default)]
	pub artifact_uri: Option<String>,
	#[serde(default)]
	pub lifecycle_stage: Option<String>,
	#[serde(default)]
	pub user_id: Option<String>,
}

/// MLflow reports times as milliseconds since the epoch. The summary endpoint reports them as RFC 3339 strings.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum Timestamp {
	Millis(i64),
	FractionalMillis(f64),
	DateTime(DateTime<Utc>),
}

impl Timestamp {
	pub fn to_date_time(self) -> Option<DateTime<Utc>> {
		match self {
			Timestamp::Millis(millis) => Utc.timestamp_millis_opt(millis).single(),
			Timestamp::FractionalMillis(millis) if millis.is_finite() => {
				Utc.timestamp_millis_opt(millis.trunc() as i64).single()
			}
			Timestamp::FractionalMillis(_) => None,
			Timestamp::DateTime(date_time) => Some(date_time),
		}
	}
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: serde::Deserialize<'de> + Default,
{
	let value: Option<T> = serde::Deserialize::deserialize(deserializer)?;
	Ok(value.unwrap_or_default())
}

/// A run after normalization. Every metric the backend reported is kept, either as a finite number or as `None` when it could not be read. Parameters are rendered to strings for display.
#[derive(Clone, Debug, PartialEq)]
pub struct RunRecord {
	pub run_id: String,
	pub run_name: Option<String>,
	pub status: Option<String>,
	pub end_time: Option<DateTime<Utc>>,
	pub metrics: BTreeMap<String, Option<Finite<f64>>>,
	pub params: BTreeMap<String, String>,
}

impl RunRecord {
	pub fn from_document(document: &RunDocument) -> RunRecord {
		let metrics = document
			.data
			.metrics
			.iter()
			.map(|(name, value)| (name.clone(), normalize(value.as_ref())))
			.collect();
		let params = document
			.data
			.params
			.iter()
			.map(|(name, value)| (name.clone(), param_to_string(value)))
			.collect();
		let run_name = document
			.data
			.tags
			.get(RUN_NAME_TAG)
			.and_then(|value| value.as_str())
			.map(|value| value.to_owned());
		let run_id = if document.info.run_id.is_empty() {
			document.info.run_uuid.clone().unwrap_or_default()
		} else {
			document.info.run_id.clone()
		};
		RunRecord {
			run_id,
			run_name,
			status: document.info.status.clone(),
			end_time: document.info.end_time.and_then(Timestamp::to_date_time),
			metrics,
			params,
		}
	}

	/// The normalized value of a metric, or `None` if it is missing or not a finite number.
	pub fn metric(&self, name: &str) -> Option<Finite<f64>> {
		self.metrics.get(name).copied().flatten()
	}

	/// A run is eligible for ranking if all of the required metrics are finite numbers.
	pub fn is_eligible(&self) -> bool {
		REQUIRED_METRICS
			.iter()
			.all(|name| self.metric(name).is_some())
	}

	pub fn model_class(&self) -> Option<&str> {
		self.params.get(MODEL_CLASS_PARAM).map(|value| value.as_str())
	}
}

fn param_to_string(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::Null => String::new(),
		serde_json::Value::String(value) => value.clone(),
		value => value.to_string(),
	}
}

#[test]
fn test_run_document_deserialize() {
	let document: RunDocument = serde_json::from_str(
		r#"{
			"data": {
				"metrics": {
					"validation_rmse": 95.5,
					"validation_mse": "9120.25",
					"validation_r2": null,
					"train_rmse": 90.1
				},
				"params": { "model_class": "CatBoostRegressor", "iterations": "1000", "depth": 6 },
				"tags": { "mlflow.runName": "bright-owl-42" }
			},
			"info": { "run_id": "abc", "end_time": 1700000000000, "status": "FINISHED" }
		}"#,
	)
	.unwrap();
	let record = RunRecord::from_document(&document);
	assert_eq!(record.run_id, "abc");
	assert_eq!(record.run_name.as_deref(), Some("bright-owl-42"));
	assert_eq!(record.metric(VALIDATION_RMSE).map(Finite::get), Some(95.5));
	assert_eq!(record.metric(VALIDATION_MSE).map(Finite::get), Some(9120.25));
	assert_eq!(record.metric(VALIDATION_R2), None);
	assert_eq!(record.metric(TEST_RMSE), None);
	assert_eq!(record.params["depth"], "6");
	assert_eq!(record.model_class(), Some("CatBoostRegressor"));
	assert_eq!(
		record.end_time,
		Some(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
	);
	assert!(!record.is_eligible());
}

#[test]
fn test_run_document_missing_sections() {
	let document: RunDocument =
		serde_json::from_str(r#"{ "data": null, "info": { "run_uuid": "u-1" } }"#).unwrap();
	let record = RunRecord::from_document(&document);
	assert_eq!(record.run_id, "u-1");
	assert!(record.metrics.is_empty());
	assert!(record.params.is_empty());
	assert_eq!(record.end_time, None);
	let document: RunDocument = serde_json::from_str("{}").unwrap();
	assert!(!RunRecord::from_document(&document).is_eligible());
}

#[test]
fn test_run_listing_shapes() {
	let listing: RunListing = serde_json::from_str(
		r#"[{ "data": { "metrics": {} }, "info": { "run_id": "a" } }]"#,
	)
	.unwrap();
	assert_eq!(listing.experiment_name(), None);
	let documents = listing.into_documents();
	assert_eq!(documents.len(), 1);
	assert_eq!(documents[0].info.run_id, "a");

	let listing: RunListing = serde_json::from_str(
		r#"{
			"experiment_name": "LondonHousingAI",
			"runs": [
				{ "run_id": "b", "status": "FINISHED", "end_time": "2024-03-01T12:00:00Z" }
			]
		}"#,
	)
	.unwrap();
	assert_eq!(listing.experiment_name(), Some("LondonHousingAI"));
	let documents = listing.into_documents();
	assert_eq!(documents[0].info.run_id, "b");
	let record = RunRecord::from_document(&documents[0]);
	assert_eq!(
		record.end_time,
		Some(Utc.ymd(2024, 3, 1).and_hms(12, 0, 0))
	);
	assert!(!record.is_eligible());
}
