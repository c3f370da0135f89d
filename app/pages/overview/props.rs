use crate::layout::AppLayoutInfo;
use housing_client::LoadState;
use housing_core::overview::Overview;

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Props {
	pub app_layout_info: AppLayoutInfo,
	pub overview: LoadState<Overview>,
}
