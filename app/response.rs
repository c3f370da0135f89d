use housing_util::error::Result;
use hyper::{header, Body, Response, StatusCode};

pub fn json<T>(status: StatusCode, value: &T) -> Result<Response<Body>>
where
	T: serde::Serialize,
{
	let body = serde_json::to_vec(value)?;
	let response = Response::builder()
		.status(status)
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body))?;
	Ok(response)
}

pub fn text(status: StatusCode, body: &'static str) -> Response<Body> {
	let mut response = Response::new(Body::from(body));
	*response.status_mut() = status;
	response
}
