use housing_util::format::format_whole_pounds;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PropertyType {
	#[serde(rename = "F")]
	Flat,
	#[serde(rename = "D")]
	Detached,
	#[serde(rename = "S")]
	SemiDetached,
	#[serde(rename = "T")]
	Terraced,
}

impl PropertyType {
	pub const ALL: [PropertyType; 4] = [
		PropertyType::Flat,
		PropertyType::Detached,
		PropertyType::SemiDetached,
		PropertyType::Terraced,
	];

	pub fn code(self) -> &'static str {
		match self {
			PropertyType::Flat => "F",
			PropertyType::Detached => "D",
			PropertyType::SemiDetached => "S",
			PropertyType::Terraced => "T",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			PropertyType::Flat => "Flat / Maisonette",
			PropertyType::Detached => "Detached",
			PropertyType::SemiDetached => "Semi-Detached",
			PropertyType::Terraced => "Terraced",
		}
	}
}

impl std::str::FromStr for PropertyType {
	type Err = PredictionRequestError;
	fn from_str(value: &str) -> Result<PropertyType, PredictionRequestError> {
		let value = value.trim();
		PropertyType::ALL
			.iter()
			.copied()
			.find(|property_type| property_type.code().eq_ignore_ascii_case(value))
			.ok_or_else(|| PredictionRequestError::InvalidPropertyType(value.to_owned()))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum YesNo {
	#[serde(rename = "Y")]
	Yes,
	#[serde(rename = "N")]
	No,
}

impl From<bool> for YesNo {
	fn from(value: bool) -> YesNo {
		if value {
			YesNo::Yes
		} else {
			YesNo::No
		}
	}
}

impl std::str::FromStr for YesNo {
	type Err = PredictionRequestError;
	fn from_str(value: &str) -> Result<YesNo, PredictionRequestError> {
		match value.trim() {
			"Y" | "y" => Ok(YesNo::Yes),
			"N" | "n" => Ok(YesNo::No),
			value => Err(PredictionRequestError::InvalidFlag(value.to_owned())),
		}
	}
}

#[derive(Debug, Error, PartialEq)]
pub enum PredictionRequestError {
	#[error("postcode is required")]
	MissingPostcode,
	#[error("property type must be one of F, D, S, or T, got \"{0}\"")]
	InvalidPropertyType(String),
	#[error("expected Y or N, got \"{0}\"")]
	InvalidFlag(String),
}

/// The body of `POST /predict`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PredictionRequest {
	pub postcode: String,
	pub property_type: PropertyType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_new_build: Option<YesNo>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_leasehold: Option<YesNo>,
}

impl PredictionRequest {
	/// Build a request from form input. The postcode is trimmed and must not be empty.
	pub fn new(
		postcode: &str,
		property_type: PropertyType,
		is_new_build: bool,
		is_leasehold: bool,
	) -> Result<PredictionRequest, PredictionRequestError> {
		let request = PredictionRequest {
			postcode: postcode.trim().to_owned(),
			property_type,
			is_new_build: Some(is_new_build.into()),
			is_leasehold: Some(is_leasehold.into()),
		};
		request.validate()?;
		Ok(request)
	}

	pub fn validate(&self) -> Result<(), PredictionRequestError> {
		if self.postcode.trim().is_empty() {
			return Err(PredictionRequestError::MissingPostcode);
		}
		Ok(())
	}
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PredictionResponse {
	pub predicted_price: f64,
	pub confidence_interval: (f64, f64),
	pub model_version: String,
	pub run_id: String,
	#[serde(default)]
	pub features_used: FeaturesUsed,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeaturesUsed {
	#[serde(default)]
	pub user_provided: Vec<String>,
	#[serde(default)]
	pub enriched: Vec<String>,
	#[serde(default)]
	pub defaulted: Vec<String>,
}

/// The body the backend returns with a non-success status. Hand-raised errors carry a string `detail`. Request validation errors carry a list of objects with a `msg` each.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct ErrorBody {
	#[serde(default)]
	pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
	pub fn message(&self) -> Option<String> {
		match self.detail.as_ref()? {
			serde_json::Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
			serde_json::Value::Array(details) => {
				let messages: Vec<&str> = details
					.iter()
					.filter_map(|detail| detail.get("msg")?.as_str())
					.collect();
				if messages.is_empty() {
					None
				} else {
					Some(messages.join("; "))
				}
			}
			_ => None,
		}
	}
}

/// A prediction formatted for display.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PredictionSummary {
	pub predicted_price: String,
	pub confidence_interval: String,
	pub model_version: String,
	pub run_id: String,
	pub feature_groups: Vec<FeatureGroup>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FeatureGroup {
	pub title: &'static str,
	pub features: Vec<String>,
}

impl PredictionSummary {
	pub fn compute(response: &PredictionResponse) -> PredictionSummary {
		let (low, high) = response.confidence_interval;
		let groups = [
			("Provided", &response.features_used.user_provided),
			("Enriched", &response.features_used.enriched),
			("Defaulted", &response.features_used.defaulted),
		];
		let feature_groups = groups
			.iter()
			.filter(|(_, features)| !features.is_empty())
			.map(|(title, features)| FeatureGroup {
				title: *title,
				features: (*features).clone(),
			})
			.collect();
		PredictionSummary {
			predicted_price: format_whole_pounds(response.predicted_price),
			confidence_interval: format!(
				"{} to {}",
				format_whole_pounds(low),
				format_whole_pounds(high)
			),
			model_version: response.model_version.clone(),
			run_id: response.run_id.clone(),
			feature_groups,
		}
	}
}

#[test]
fn test_prediction_request() {
	let request = PredictionRequest::new(" SW1A 1AA ", PropertyType::Flat, false, true).unwrap();
	assert_eq!(
		serde_json::to_value(&request).unwrap(),
		serde_json::json!({
			"postcode": "SW1A 1AA",
			"property_type": "F",
			"is_new_build": "N",
			"is_leasehold": "Y",
		})
	);
	assert_eq!(
		PredictionRequest::new("   ", PropertyType::Detached, false, false),
		Err(PredictionRequestError::MissingPostcode)
	);
}

#[test]
fn test_property_type_from_str() {
	assert_eq!("s".parse::<PropertyType>(), Ok(PropertyType::SemiDetached));
	assert_eq!("T".parse::<PropertyType>(), Ok(PropertyType::Terraced));
	assert_eq!(
		"X".parse::<PropertyType>(),
		Err(PredictionRequestError::InvalidPropertyType("X".to_owned()))
	);
	assert_eq!(PropertyType::Flat.label(), "Flat / Maisonette");
	assert_eq!("y".parse::<YesNo>(), Ok(YesNo::Yes));
	assert!("maybe".parse::<YesNo>().is_err());
}

#[test]
fn test_prediction_summary() {
	let response: PredictionResponse = serde_json::from_str(
		r#"{
			"predicted_price": 612345.67,
			"confidence_interval": [550000, 675000.4],
			"model_version": "7",
			"run_id": "abc",
			"features_used": {
				"user_provided": ["postcode", "property_type"],
				"enriched": [],
				"defaulted": ["is_new_build"]
			}
		}"#,
	)
	.unwrap();
	let summary = PredictionSummary::compute(&response);
	assert_eq!(summary.predicted_price, "£612,346");
	assert_eq!(summary.confidence_interval, "£550,000 to £675,000");
	let titles: Vec<&str> = summary.feature_groups.iter().map(|group| group.title).collect();
	assert_eq!(titles, vec!["Provided", "Defaulted"]);
}

#[test]
fn test_error_body() {
	let body: ErrorBody =
		serde_json::from_str(r#"{ "detail": "Postcode not found" }"#).unwrap();
	assert_eq!(body.message().as_deref(), Some("Postcode not found"));
	let body: ErrorBody = serde_json::from_str(
		r#"{ "detail": [{ "loc": ["body", "property_type"], "msg": "property_type must be one of D, S, T, F" }] }"#,
	)
	.unwrap();
	assert_eq!(
		body.message().as_deref(),
		Some("property_type must be one of D, S, T, F")
	);
	let body: ErrorBody = serde_json::from_str("{}").unwrap();
	assert_eq!(body.message(), None);
}
