use thiserror::Error;

/// The dashboard's tabs. The set is closed, so routing and navigation match on this enum instead of on free strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Tab {
	#[serde(rename = "overview")]
	Overview,
	#[serde(rename = "model-comparison")]
	ModelComparison,
	#[serde(rename = "data-quality")]
	DataQuality,
	#[serde(rename = "upload-data")]
	UploadData,
	#[serde(rename = "predict")]
	Predict,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown tab \"{0}\"")]
pub struct UnknownTabError(pub String);

impl Tab {
	/// Tabs in the order they appear in the navigation.
	pub const ALL: [Tab; 5] = [
		Tab::Overview,
		Tab::ModelComparison,
		Tab::DataQuality,
		Tab::UploadData,
		Tab::Predict,
	];

	pub fn slug(self) -> &'static str {
		match self {
			Tab::Overview => "overview",
			Tab::ModelComparison => "model-comparison",
			Tab::DataQuality => "data-quality",
			Tab::UploadData => "upload-data",
			Tab::Predict => "predict",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Tab::Overview => "Overview",
			Tab::ModelComparison => "Model Comparison",
			Tab::DataQuality => "Data Quality",
			Tab::UploadData => "Upload Data",
			Tab::Predict => "Predict Price",
		}
	}
}

impl Default for Tab {
	fn default() -> Tab {
		Tab::Predict
	}
}

impl std::str::FromStr for Tab {
	type Err = UnknownTabError;
	fn from_str(value: &str) -> Result<Tab, UnknownTabError> {
		Tab::ALL
			.iter()
			.copied()
			.find(|tab| tab.slug() == value)
			.ok_or_else(|| UnknownTabError(value.to_owned()))
	}
}

impl std::fmt::Display for Tab {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.slug())
	}
}

#[test]
fn test_tab_from_str() {
	for tab in Tab::ALL.iter() {
		assert_eq!(tab.slug().parse::<Tab>(), Ok(*tab));
	}
	assert_eq!(
		"settings".parse::<Tab>(),
		Err(UnknownTabError("settings".to_owned()))
	);
	assert_eq!(Tab::default(), Tab::Predict);
	assert_eq!(
		serde_json::to_string(&Tab::ModelComparison).unwrap(),
		"\"model-comparison\""
	);
}
