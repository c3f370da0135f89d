use crate::layout::AppLayoutInfo;
use housing_client::LoadState;
use housing_core::data_quality::DataQualityOutcome;

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Props {
	pub app_layout_info: AppLayoutInfo,
	pub data_quality: LoadState<DataQualityOutcome>,
}
