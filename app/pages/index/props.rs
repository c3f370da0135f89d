use crate::layout::AppLayoutInfo;
use housing_core::tab::Tab;

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Props {
	pub app_layout_info: AppLayoutInfo,
	pub default_tab: Tab,
}
