use super::props::Props;
use crate::{context::Views, layout::get_app_layout_info, response, Context};
use housing_core::{comparison::ComparisonOutcome, ingest, tab::Tab};
use housing_util::error::Result;
use hyper::{Body, Response, StatusCode};
use std::convert::Infallible;

pub async fn get(context: &Context, views: &Views) -> Result<Response<Body>> {
	let client = &context.client;
	let comparison = views
		.model_comparison
		.refresh(async {
			let result = client.list_runs().await;
			let experiment_name = result
				.as_ref()
				.ok()
				.and_then(|listing| listing.experiment_name())
				.map(|name| name.to_owned());
			let ingestion = result.map(|listing| ingest(&listing.into_documents()));
			Ok::<_, Infallible>(ComparisonOutcome::from_fetch(experiment_name, ingestion))
		})
		.await;
	let props = Props {
		app_layout_info: get_app_layout_info(Tab::ModelComparison),
		comparison,
	};
	response::json(StatusCode::OK, &props)
}
