use super::props::Props;
use crate::{context::Views, layout::get_app_layout_info, response, Context};
use housing_client::FetchError;
use housing_core::{
	ingest,
	overview::{HealthSummary, Overview},
	tab::Tab,
};
use housing_util::error::Result;
use hyper::{Body, Response, StatusCode};

pub async fn get(context: &Context, views: &Views) -> Result<Response<Body>> {
	let client = &context.client;
	let overview = views
		.overview
		.refresh(async {
			let (listing, health) = futures::join!(client.list_runs(), client.health());
			// An unreachable health endpoint is shown on the overview rather than failing it.
			let health = match health {
				Ok(report) => HealthSummary::Reported(report),
				Err(error) => HealthSummary::Unreachable(error.to_string()),
			};
			let listing = listing?;
			let experiment_name = listing.experiment_name().map(|name| name.to_owned());
			let documents = listing.into_documents();
			let ingestion = ingest(&documents);
			Ok::<_, FetchError>(Overview::compute(
				experiment_name,
				&documents,
				&ingestion,
				health,
			))
		})
		.await;
	let props = Props {
		app_layout_info: get_app_layout_info(Tab::Overview),
		overview,
	};
	response::json(StatusCode::OK, &props)
}
