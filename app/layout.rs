use housing_core::tab::Tab;

/// The navigation shared by every tab's props.
#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AppLayoutInfo {
	pub tabs: Vec<TabLink>,
	pub active_tab: Tab,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TabLink {
	pub tab: Tab,
	pub label: &'static str,
	pub href: String,
}

pub fn get_app_layout_info(active_tab: Tab) -> AppLayoutInfo {
	let tabs = Tab::ALL
		.iter()
		.map(|tab| TabLink {
			tab: *tab,
			label: tab.label(),
			href: format!("/{}", tab.slug()),
		})
		.collect();
	AppLayoutInfo { tabs, active_tab }
}
