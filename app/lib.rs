use self::{
	context::Context,
	error::Error,
	viewer::{ViewerId, Viewers},
};
use housing_client::{Client, ClientOptions};
use housing_core::tab::Tab;
use housing_util::error::Result;
use hyper::{header, Body, Method, Request, Response, StatusCode};
use std::{collections::BTreeMap, sync::Arc};

mod error;
mod health;
mod layout;
mod pages;
mod response;
mod viewer;

pub struct Options {
	pub client: ClientOptions,
	pub host: std::net::IpAddr,
	pub port: u16,
}

mod context {
	use housing_client::{Client, View};
	use housing_core::{
		comparison::ComparisonOutcome, data_quality::DataQualityOutcome, overview::Overview,
		predict::PredictionSummary,
	};

	pub struct Context {
		pub options: super::Options,
		pub client: Client,
		pub viewers: super::Viewers,
	}

	/// One holder per tab that fetches data, owned by a single viewer. Activating a tab replaces its holder's state.
	#[derive(Default)]
	pub struct Views {
		pub overview: View<Overview>,
		pub model_comparison: View<ComparisonOutcome>,
		pub data_quality: View<DataQualityOutcome>,
		pub predict: View<PredictionSummary>,
	}
}

async fn handle(context: Arc<Context>, request: Request<Body>) -> Response<Body> {
	let method = request.method().clone();
	let uri = request.uri().clone();
	let path = uri.path();
	let query = uri.query();
	let path_components: Vec<_> = path.split('/').skip(1).collect();
	let search_params: Option<BTreeMap<String, String>> = query.map(|search_params| {
		url::form_urlencoded::parse(search_params.as_bytes())
			.into_owned()
			.collect()
	});
	// A request without a viewer cookie starts a new viewer and is told its id.
	let cookie_viewer_id = viewer::viewer_id(request.headers());
	let viewer_id = cookie_viewer_id.unwrap_or_else(ViewerId::new);
	let views = || context.viewers.get(viewer_id);
	let result = match (&method, path_components.as_slice()) {
		(&Method::GET, &["health"]) => self::health::get(&context).await,
		(&Method::GET, &[""]) => self::pages::index::get(&context).await,
		(&Method::GET, &[tab]) => match tab.parse::<Tab>() {
			Ok(Tab::Overview) => self::pages::overview::get(&context, &views()).await,
			Ok(Tab::ModelComparison) => {
				self::pages::model_comparison::get(&context, &views()).await
			}
			Ok(Tab::DataQuality) => self::pages::data_quality::get(&context, &views()).await,
			Ok(Tab::UploadData) => self::pages::upload_data::get(&context).await,
			Ok(Tab::Predict) => {
				self::pages::predict::get(&context, &views(), search_params).await
			}
			Err(_) => Err(Error::NotFound.into()),
		},
		_ => Err(Error::NotFound.into()),
	};
	let mut response = respond(result, &method, path);
	if cookie_viewer_id.is_none() {
		if let Ok(value) = viewer::set_cookie(viewer_id).parse() {
			response.headers_mut().insert(header::SET_COOKIE, value);
		}
	}
	response
}

fn respond(result: Result<Response<Body>>, method: &Method, path: &str) -> Response<Body> {
	match result {
		Ok(response) => response,
		Err(error) => {
			if let Some(error) = error.downcast_ref::<Error>() {
				match error {
					Error::BadRequest => response::text(StatusCode::BAD_REQUEST, "bad request"),
					Error::NotFound => response::text(StatusCode::NOT_FOUND, "not found"),
				}
			} else {
				tracing::error!(%method, %path, %error, "request failed");
				response::text(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
			}
		}
	}
}

pub fn run(options: Options) -> Result<()> {
	tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.build()?
		.block_on(run_impl(options))
}

async fn run_impl(options: Options) -> Result<()> {
	let client = Client::new(options.client.clone());
	tracing::info!(api_url = %options.client.base_url, "using backend");
	let host = options.host;
	let port = options.port;
	let context = Context {
		options,
		client,
		viewers: Viewers::default(),
	};
	housing_util::serve::serve(host, port, context, handle).await?;
	Ok(())
}

#[cfg(test)]
type Handler = fn(&str) -> (u16, String);

#[cfg(test)]
async fn test_backend(handler: Handler) -> String {
	test_backend_with_delay(handler, std::time::Duration::from_millis(0)).await
}

#[cfg(test)]
async fn test_backend_with_delay(handler: Handler, delay: std::time::Duration) -> String {
	use hyper::service::{make_service_fn, service_fn};
	use std::convert::Infallible;
	let make_service = make_service_fn(move |_| async move {
		Ok::<_, Infallible>(service_fn(move |request: Request<Body>| async move {
			tokio::time::sleep(delay).await;
			let (status, body) = handler(request.uri().path());
			let mut response = Response::new(Body::from(body));
			*response.status_mut() = StatusCode::from_u16(status).unwrap();
			Ok::<_, Infallible>(response)
		}))
	});
	let server = hyper::Server::bind(&([127, 0, 0, 1], 0).into()).serve(make_service);
	let addr = server.local_addr();
	tokio::spawn(server);
	format!("http://{}", addr)
}

#[cfg(test)]
fn test_context(api_url: &str) -> Arc<Context> {
	let options = Options {
		client: ClientOptions::new(api_url, None).unwrap(),
		host: [127, 0, 0, 1].into(),
		port: 0,
	};
	Arc::new(Context {
		client: Client::new(options.client.clone()),
		options,
		viewers: Viewers::default(),
	})
}

#[cfg(test)]
async fn get(context: &Arc<Context>, uri: &str) -> (StatusCode, serde_json::Value) {
	let (status, _, body) = get_as(context, uri, None).await;
	(status, body)
}

/// Send a request with an optional viewer cookie. Returns the viewer cookie the response sets, if any.
#[cfg(test)]
async fn get_as(
	context: &Arc<Context>,
	uri: &str,
	cookie: Option<&str>,
) -> (StatusCode, Option<String>, serde_json::Value) {
	let mut request = Request::builder().uri(uri);
	if let Some(cookie) = cookie {
		request = request.header(header::COOKIE, cookie);
	}
	let request = request.body(Body::empty()).unwrap();
	let response = handle(context.clone(), request).await;
	let status = response.status();
	let set_cookie = response
		.headers()
		.get(header::SET_COOKIE)
		.map(|value| value.to_str().unwrap().split(';').next().unwrap().to_owned());
	let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
	let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
	(status, set_cookie, body)
}

#[cfg(test)]
fn test_backend_routes(path: &str) -> (u16, String) {
	match path {
		"/mlflow/runs" => (
			200,
			serde_json::json!([
				{
					"data": {
						"metrics": {
							"validation_rmse": 95.5,
							"validation_mse": 9120.25,
							"validation_r2": 0.82,
							"train_rmse": 90.0,
							"test_rmse": 97.0
						},
						"params": { "model_class": "CatBoostRegressor" }
					},
					"info": { "run_id": "a", "end_time": 1700000000000i64 }
				}
			])
			.to_string(),
		),
		"/health" => (
			200,
			r#"{ "status": "ok", "experiment_name": "LondonHousingAI" }"#.to_owned(),
		),
		"/artifacts/data_quality" => (200, r#"{ "message": "No data quality report found" }"#.to_owned()),
		"/predict" => (404, r#"{ "detail": "Postcode not found" }"#.to_owned()),
		_ => (404, "".to_owned()),
	}
}

#[cfg(test)]
#[tokio::test]
async fn test_index() {
	let context = test_context("http://localhost:7777");
	let (status, body) = get(&context, "/").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["defaultTab"], "predict");
	assert_eq!(body["appLayoutInfo"]["tabs"].as_array().unwrap().len(), 5);
	assert_eq!(body["appLayoutInfo"]["tabs"][1]["label"], "Model Comparison");
	let (status, body) = get(&context, "/health").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], "ok");
}

#[cfg(test)]
#[tokio::test]
async fn test_not_found() {
	let context = test_context("http://localhost:7777");
	assert_eq!(get(&context, "/settings").await.0, StatusCode::NOT_FOUND);
	assert_eq!(get(&context, "/predict/extra").await.0, StatusCode::NOT_FOUND);
}

#[cfg(test)]
#[tokio::test]
async fn test_model_comparison() {
	let context = test_context(&test_backend(test_backend_routes).await);
	let (status, body) = get(&context, "/model-comparison").await;
	assert_eq!(status, StatusCode::OK);
	let comparison = &body["comparison"];
	assert_eq!(comparison["type"], "loaded");
	assert_eq!(comparison["value"]["type"], "ready");
	let card = &comparison["value"]["value"]["cards"][0];
	assert_eq!(card["rank"], "champion");
	assert_eq!(card["title"], "CatBoostRegressor 🏆");
}

#[cfg(test)]
#[tokio::test]
async fn test_model_comparison_unreachable_backend() {
	let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
	let api_url = format!("http://{}", listener.local_addr().unwrap());
	drop(listener);
	let context = test_context(&api_url);
	let (status, body) = get(&context, "/model-comparison").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["comparison"]["value"]["type"], "failed");
}

#[cfg(test)]
#[tokio::test]
async fn test_overview_and_data_quality() {
	let context = test_context(&test_backend(test_backend_routes).await);
	let (_, body) = get(&context, "/overview").await;
	let overview = &body["overview"]["value"];
	assert_eq!(overview["experiment_name"], "LondonHousingAI");
	assert_eq!(overview["latest_run"]["run_id"], "a");
	assert_eq!(overview["health"]["type"], "reported");
	let (_, body) = get(&context, "/data-quality").await;
	assert_eq!(body["dataQuality"]["value"]["type"], "absent");
	assert_eq!(body["dataQuality"]["value"]["value"], "No data quality report found");
}

#[cfg(test)]
#[tokio::test]
async fn test_predict() {
	let context = test_context(&test_backend(test_backend_routes).await);
	let (status, body) = get(&context, "/predict").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["prediction"], serde_json::Value::Null);
	assert_eq!(body["form"]["propertyTypes"][0]["label"], "Flat / Maisonette");
	let (status, body) = get(&context, "/predict?postcode=+&property_type=D").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["error"], "postcode is required");
	let (status, body) = get(&context, "/predict?postcode=ZZ1+1ZZ&property_type=T").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["prediction"]["type"], "failed");
	assert_eq!(body["prediction"]["value"], "Postcode not found");
	let (status, _) = get(&context, "/predict?postcode=ZZ1+1ZZ&property_type=X").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	let (status, _) = get(&context, "/predict?postcode=ZZ1+1ZZ&is_leasehold=maybe").await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[cfg(test)]
#[tokio::test]
async fn test_viewer_cookie() {
	let context = test_context("http://localhost:7777");
	let (_, cookie, _) = get_as(&context, "/", None).await;
	let cookie = cookie.unwrap();
	assert!(cookie.starts_with("housing_viewer="));
	let (_, again, _) = get_as(&context, "/", Some(&cookie)).await;
	assert_eq!(again, None);
}

#[cfg(test)]
#[tokio::test]
async fn test_overlapping_requests_from_different_viewers() {
	let api_url =
		test_backend_with_delay(test_backend_routes, std::time::Duration::from_millis(200)).await;
	let context = test_context(&api_url);
	let first = tokio::spawn({
		let context = context.clone();
		async move { get(&context, "/model-comparison").await }
	});
	tokio::time::sleep(std::time::Duration::from_millis(50)).await;
	let (status, second) = get(&context, "/model-comparison").await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(second["comparison"]["type"], "loaded");
	let (status, first) = first.await.unwrap();
	assert_eq!(status, StatusCode::OK);
	assert_eq!(first["comparison"]["type"], "loaded");
	assert_eq!(first["comparison"]["value"]["type"], "ready");
}

#[cfg(test)]
#[tokio::test]
async fn test_overlapping_requests_from_one_viewer() {
	let api_url =
		test_backend_with_delay(test_backend_routes, std::time::Duration::from_millis(200)).await;
	let context = test_context(&api_url);
	let (_, cookie, _) = get_as(&context, "/", None).await;
	let cookie = cookie.unwrap();
	let first = tokio::spawn({
		let context = context.clone();
		let cookie = cookie.clone();
		async move { get_as(&context, "/model-comparison", Some(&cookie)).await }
	});
	tokio::time::sleep(std::time::Duration::from_millis(50)).await;
	let (_, _, second) = get_as(&context, "/model-comparison", Some(&cookie)).await;
	assert_eq!(second["comparison"]["type"], "loaded");
	// The superseded request answers with the newer activation's result.
	let (status, _, first) = first.await.unwrap();
	assert_eq!(status, StatusCode::OK);
	assert_eq!(first["comparison"], second["comparison"]);
}
