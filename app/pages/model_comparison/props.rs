use crate::layout::AppLayoutInfo;
use housing_client::LoadState;
use housing_core::comparison::ComparisonOutcome;

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Props {
	pub app_layout_info: AppLayoutInfo,
	pub comparison: LoadState<ComparisonOutcome>,
}
