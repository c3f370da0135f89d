use super::props::{PredictForm, PropertyTypeOption, Props};
use crate::{context::Views, error::Error, layout::get_app_layout_info, response, Context};
use housing_core::{
	predict::{PredictionRequest, PredictionSummary, PropertyType, YesNo},
	tab::Tab,
};
use housing_util::error::Result;
use hyper::{Body, Response, StatusCode};
use std::collections::BTreeMap;

/// Without a `postcode` search param this renders the empty form. With one it submits a prediction and renders the result alongside the submitted form.
pub async fn get(
	context: &Context,
	views: &Views,
	search_params: Option<BTreeMap<String, String>>,
) -> Result<Response<Body>> {
	let search_params = search_params.unwrap_or_default();
	let form = form(&search_params)?;
	let mut prediction = None;
	let mut error = None;
	if search_params.contains_key("postcode") {
		match PredictionRequest::new(
			&form.postcode,
			form.property_type,
			form.is_new_build,
			form.is_leasehold,
		) {
			Ok(request) => {
				let client = &context.client;
				let state = views
					.predict
					.refresh(async move {
						client
							.predict(&request)
							.await
							.map(|response| PredictionSummary::compute(&response))
					})
					.await;
				prediction = Some(state);
			}
			Err(validation_error) => error = Some(validation_error.to_string()),
		}
	}
	let props = Props {
		app_layout_info: get_app_layout_info(Tab::Predict),
		form,
		prediction,
		error,
	};
	response::json(StatusCode::OK, &props)
}

fn form(search_params: &BTreeMap<String, String>) -> Result<PredictForm> {
	let property_type = match search_params.get("property_type") {
		Some(property_type) => property_type
			.parse::<PropertyType>()
			.map_err(|_| Error::BadRequest)?,
		None => PropertyType::Flat,
	};
	let flag = |name: &str| -> Result<bool> {
		match search_params.get(name) {
			Some(value) => Ok(value.parse::<YesNo>().map_err(|_| Error::BadRequest)? == YesNo::Yes),
			None => Ok(false),
		}
	};
	Ok(PredictForm {
		postcode: search_params.get("postcode").cloned().unwrap_or_default(),
		property_type,
		is_new_build: flag("is_new_build")?,
		is_leasehold: flag("is_leasehold")?,
		property_types: PropertyType::ALL
			.iter()
			.map(|property_type| PropertyTypeOption {
				value: *property_type,
				label: property_type.label(),
			})
			.collect(),
	})
}
