use crate::layout::AppLayoutInfo;
use housing_client::LoadState;
use housing_core::predict::{PredictionSummary, PropertyType};

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Props {
	pub app_layout_info: AppLayoutInfo,
	pub form: PredictForm,
	pub prediction: Option<LoadState<PredictionSummary>>,
	pub error: Option<String>,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PredictForm {
	pub postcode: String,
	pub property_type: PropertyType,
	pub is_new_build: bool,
	pub is_leasehold: bool,
	pub property_types: Vec<PropertyTypeOption>,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTypeOption {
	pub value: PropertyType,
	pub label: &'static str,
}
