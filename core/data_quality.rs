use std::{cmp::Ordering, collections::BTreeMap};

/// The body of `GET /artifacts/data_quality`. When no report has been logged yet the backend answers with a `message` instead.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum DataQualityResponse {
	Absent { message: String },
	Report(DataQualityReport),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataQualityReport {
	/// Fraction of missing values per column.
	#[serde(default)]
	pub missing: BTreeMap<String, f64>,
	/// Column dtypes as reported by the training pipeline.
	#[serde(default)]
	pub schema_summary: BTreeMap<String, String>,
	/// One record per summary statistic, keyed by column.
	#[serde(default)]
	pub numeric_stats: Vec<BTreeMap<String, serde_json::Value>>,
	/// Number of values outside 1.5 IQR per numeric column.
	#[serde(default)]
	pub outliers: BTreeMap<String, u64>,
	/// Kolmogorov-Smirnov statistic between the training and validation split per numeric column.
	#[serde(default)]
	pub train_val_drift: BTreeMap<String, f64>,
	#[serde(default)]
	pub category_distribution: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DataQualityOutcome {
	Absent(String),
	Ready(DataQualitySummary),
	Failed(String),
}

impl DataQualityOutcome {
	pub fn from_fetch<E>(result: Result<DataQualityResponse, E>) -> DataQualityOutcome
	where
		E: std::fmt::Display,
	{
		match result {
			Ok(response) => response.into(),
			Err(error) => DataQualityOutcome::Failed(error.to_string()),
		}
	}
}

impl From<DataQualityResponse> for DataQualityOutcome {
	fn from(response: DataQualityResponse) -> DataQualityOutcome {
		match response {
			DataQualityResponse::Absent { message } => DataQualityOutcome::Absent(message),
			DataQualityResponse::Report(report) => {
				DataQualityOutcome::Ready(DataQualitySummary::compute(&report))
			}
		}
	}
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DataQualitySummary {
	pub missing: Vec<ColumnValue>,
	pub train_val_drift: Vec<ColumnValue>,
	pub outliers: Vec<ColumnCount>,
	pub schema: Vec<ColumnType>,
	pub numeric_stats: Vec<BTreeMap<String, serde_json::Value>>,
	pub category_distribution: BTreeMap<String, Vec<ColumnValue>>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ColumnValue {
	pub column: String,
	pub value: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ColumnCount {
	pub column: String,
	pub count: u64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ColumnType {
	pub column: String,
	pub dtype: String,
}

impl DataQualitySummary {
	pub fn compute(report: &DataQualityReport) -> DataQualitySummary {
		let mut outliers: Vec<ColumnCount> = report
			.outliers
			.iter()
			.map(|(column, count)| ColumnCount {
				column: column.clone(),
				count: *count,
			})
			.collect();
		outliers.sort_by(|a, b| b.count.cmp(&a.count));
		DataQualitySummary {
			missing: descending(&report.missing),
			train_val_drift: descending(&report.train_val_drift),
			outliers,
			schema: report
				.schema_summary
				.iter()
				.map(|(column, dtype)| ColumnType {
					column: column.clone(),
					dtype: dtype.clone(),
				})
				.collect(),
			numeric_stats: report.numeric_stats.clone(),
			category_distribution: report
				.category_distribution
				.iter()
				.map(|(column, distribution)| (column.clone(), descending(distribution)))
				.collect(),
		}
	}
}

/// Sort by value, largest first. Equal values stay in column order.
fn descending(values: &BTreeMap<String, f64>) -> Vec<ColumnValue> {
	let mut values: Vec<ColumnValue> = values
		.iter()
		.map(|(column, value)| ColumnValue {
			column: column.clone(),
			value: *value,
		})
		.collect();
	values.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
	values
}

#[test]
fn test_data_quality_absent() {
	let response: DataQualityResponse =
		serde_json::from_str(r#"{ "message": "No data quality report found" }"#).unwrap();
	assert_eq!(
		DataQualityOutcome::from(response),
		DataQualityOutcome::Absent("No data quality report found".to_owned())
	);
	assert_eq!(
		DataQualityOutcome::from_fetch(Err::<DataQualityResponse, _>("Request failed: 500")),
		DataQualityOutcome::Failed("Request failed: 500".to_owned())
	);
}

#[test]
fn test_data_quality_summary() {
	let response: DataQualityResponse = serde_json::from_str(
		r#"{
			"missing": { "price": 0.0, "postcode": 0.125, "property_type": 0.5 },
			"schema_summary": { "price": "float64", "postcode": "object" },
			"numeric_stats": [{ "price": 412000.5 }],
			"outliers": { "price": 12, "floor_area": 40 },
			"train_val_drift": { "price": 0.02, "floor_area": 0.08 },
			"category_distribution": { "property_type": { "F": 0.6, "T": 0.3, "D": 0.1 } }
		}"#,
	)
	.unwrap();
	let summary = match DataQualityOutcome::from(response) {
		DataQualityOutcome::Ready(summary) => summary,
		outcome => panic!("unexpected outcome {:?}", outcome),
	};
	let columns = |values: &[ColumnValue]| -> Vec<String> {
		values.iter().map(|value| value.column.clone()).collect()
	};
	assert_eq!(columns(&summary.missing), vec!["property_type", "postcode", "price"]);
	assert_eq!(columns(&summary.train_val_drift), vec!["floor_area", "price"]);
	assert_eq!(summary.outliers[0].column, "floor_area");
	assert_eq!(columns(&summary.category_distribution["property_type"]), vec!["F", "T", "D"]);
	assert_eq!(summary.schema.len(), 2);
}
