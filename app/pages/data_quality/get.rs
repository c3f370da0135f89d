use super::props::Props;
use crate::{context::Views, layout::get_app_layout_info, response, Context};
use housing_core::{data_quality::DataQualityOutcome, tab::Tab};
use housing_util::error::Result;
use hyper::{Body, Response, StatusCode};
use std::convert::Infallible;

pub async fn get(context: &Context, views: &Views) -> Result<Response<Body>> {
	let client = &context.client;
	let data_quality = views
		.data_quality
		.refresh(async {
			Ok::<_, Infallible>(DataQualityOutcome::from_fetch(client.data_quality().await))
		})
		.await;
	let props = Props {
		app_layout_info: get_app_layout_info(Tab::DataQuality),
		data_quality,
	};
	response::json(StatusCode::OK, &props)
}
