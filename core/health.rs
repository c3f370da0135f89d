/// The body of the backend's `GET /health`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HealthReport {
	pub status: HealthStatus,
	#[serde(default)]
	pub experiment_name: Option<String>,
	#[serde(default)]
	pub mlflow_tracking_uri: Option<String>,
	#[serde(default)]
	pub latest_run_id: Option<String>,
	#[serde(default)]
	pub detail: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
	Ok,
	Degraded,
}

impl HealthReport {
	pub fn is_ok(&self) -> bool {
		self.status == HealthStatus::Ok
	}
}

#[test]
fn test_health_report_deserialize() {
	let report: HealthReport = serde_json::from_str(
		r#"{
			"status": "degraded",
			"experiment_name": "LondonHousingAI",
			"mlflow_tracking_uri": "http://mlflow:5000",
			"latest_run_id": null,
			"detail": "no runs logged"
		}"#,
	)
	.unwrap();
	assert!(!report.is_ok());
	assert_eq!(report.latest_run_id, None);
	assert_eq!(report.detail.as_deref(), Some("no runs logged"));
	let report: HealthReport = serde_json::from_str(r#"{ "status": "ok" }"#).unwrap();
	assert!(report.is_ok());
}
