use super::props::Props;
use crate::{layout::get_app_layout_info, response, Context};
use housing_core::tab::Tab;
use housing_util::error::Result;
use hyper::{Body, Response, StatusCode};

pub async fn get(_context: &Context) -> Result<Response<Body>> {
	let props = Props {
		app_layout_info: get_app_layout_info(Tab::UploadData),
		message: "Uploading data is not available yet.",
	};
	response::json(StatusCode::OK, &props)
}
