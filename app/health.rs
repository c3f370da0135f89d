use crate::{response, Context};
use housing_util::error::Result;
use hyper::{Body, Response, StatusCode};

/// The dashboard's own liveness. The backend's health is reported on the overview tab.
pub async fn get(context: &Context) -> Result<Response<Body>> {
	let body = serde_json::json!({
		"status": "ok",
		"api_url": context.options.client.base_url.as_str(),
	});
	response::json(StatusCode::OK, &body)
}
