use crate::{ClientOptions, FetchError};
use housing_core::{
	data_quality::DataQualityResponse,
	health::HealthReport,
	predict::{ErrorBody, PredictionRequest, PredictionResponse},
	run::RunListing,
};
use serde::de::DeserializeOwned;
use url::Url;

#[derive(Clone, Debug)]
pub struct Client {
	options: ClientOptions,
	client: reqwest::Client,
}

impl Client {
	pub fn new(options: ClientOptions) -> Client {
		Client {
			options,
			client: reqwest::Client::new(),
		}
	}

	pub fn options(&self) -> &ClientOptions {
		&self.options
	}

	/// `GET /mlflow/runs`, most recent run first.
	pub async fn list_runs(&self) -> Result<RunListing, FetchError> {
		let mut url = self.url("/mlflow/runs");
		if let Some(limit) = self.options.runs_limit {
			url.query_pairs_mut()
				.append_pair("limit", &limit.to_string());
		}
		self.send(self.client.get(url)).await
	}

	pub async fn predict(
		&self,
		request: &PredictionRequest,
	) -> Result<PredictionResponse, FetchError> {
		self.send(self.client.post(self.url("/predict")).json(request))
			.await
	}

	pub async fn data_quality(&self) -> Result<DataQualityResponse, FetchError> {
		self.send(self.client.get(self.url("/artifacts/data_quality")))
			.await
	}

	pub async fn health(&self) -> Result<HealthReport, FetchError> {
		self.send(self.client.get(self.url("/health"))).await
	}

	// Paths are appended to the base url's path so that a backend mounted under a prefix keeps it.
	fn url(&self, path: &str) -> Url {
		let mut url = self.options.base_url.clone();
		let base_path = url.path().trim_end_matches('/').to_owned();
		url.set_path(&format!("{}{}", base_path, path));
		url
	}

	async fn send<T>(&self, request: reqwest::RequestBuilder) -> Result<T, FetchError>
	where
		T: DeserializeOwned,
	{
		let request = request.build()?;
		let method = request.method().clone();
		let url = request.url().clone();
		let response = self.client.execute(request).await.map_err(|error| {
			tracing::error!(%method, %url, %error, "backend request failed");
			FetchError::from(error)
		})?;
		let status = response.status();
		let body = response.bytes().await?;
		if !status.is_success() {
			let message = serde_json::from_slice::<ErrorBody>(&body)
				.ok()
				.and_then(|body| body.message())
				.unwrap_or_else(|| format!("Request failed: {}", status.as_u16()));
			tracing::error!(%method, %url, %status, %message, "backend returned an error");
			return Err(FetchError::Status { status, message });
		}
		Ok(serde_json::from_slice(&body)?)
	}
}

#[cfg(test)]
type Handler = fn(&str, &str) -> (u16, String);

#[cfg(test)]
async fn test_server(handler: Handler) -> Url {
	use hyper::{
		service::{make_service_fn, service_fn},
		Body, Request, Response, Server,
	};
	use std::convert::Infallible;
	let make_service = make_service_fn(move |_| async move {
		Ok::<_, Infallible>(service_fn(move |request: Request<Body>| async move {
			let path = request
				.uri()
				.path_and_query()
				.map(|path| path.as_str().to_owned())
				.unwrap_or_default();
			let body = hyper::body::to_bytes(request.into_body()).await?;
			let (status, body) = handler(&path, &String::from_utf8_lossy(&body));
			let response = Response::builder()
				.status(status)
				.header(hyper::header::CONTENT_TYPE, "application/json")
				.body(Body::from(body))
				.unwrap();
			Ok::<_, hyper::Error>(response)
		}))
	});
	let server = Server::bind(&([127, 0, 0, 1], 0).into()).serve(make_service);
	let addr = server.local_addr();
	tokio::spawn(server);
	Url::parse(&format!("http://{}", addr)).unwrap()
}

#[cfg(test)]
fn test_client(base_url: &Url, runs_limit: Option<u32>) -> Client {
	Client::new(ClientOptions::new(base_url.as_str(), runs_limit).unwrap())
}

#[cfg(test)]
#[tokio::test]
async fn test_list_runs() {
	let base_url = test_server(|path, _| match path {
		"/mlflow/runs?limit=5" => (
			200,
			r#"{
				"experiment_name": "LondonHousingAI",
				"runs": [{ "data": { "metrics": { "validation_rmse": 95.5 } }, "info": { "run_id": "a" } }]
			}"#
			.to_owned(),
		),
		_ => (404, r#"{ "detail": "Not Found" }"#.to_owned()),
	})
	.await;
	let listing = test_client(&base_url, Some(5)).list_runs().await.unwrap();
	assert_eq!(listing.experiment_name(), Some("LondonHousingAI"));
	let documents = listing.into_documents();
	assert_eq!(documents.len(), 1);
	assert_eq!(documents[0].info.run_id, "a");
	let error = test_client(&base_url, None).list_runs().await.unwrap_err();
	assert_eq!(error.status().map(|status| status.as_u16()), Some(404));
	assert_eq!(error.to_string(), "Not Found");
}

#[cfg(test)]
#[tokio::test]
async fn test_predict() {
	let base_url = test_server(|path, body| {
		let body: serde_json::Value = serde_json::from_str(body).unwrap();
		match (path, body["postcode"].as_str()) {
			("/predict", Some("SW1A 1AA")) => (
				200,
				r#"{
					"predicted_price": 850000.0,
					"confidence_interval": [800000.0, 900000.0],
					"model_version": "3",
					"run_id": "abc",
					"features_used": { "user_provided": ["postcode"], "enriched": [], "defaulted": [] }
				}"#
				.to_owned(),
			),
			("/predict", _) => (404, r#"{ "detail": "Postcode not found" }"#.to_owned()),
			_ => (500, "".to_owned()),
		}
	})
	.await;
	let client = test_client(&base_url, None);
	let request = PredictionRequest::new("SW1A 1AA", housing_core::predict::PropertyType::Flat, false, false).unwrap();
	let response = client.predict(&request).await.unwrap();
	assert_eq!(response.predicted_price, 850000.0);
	assert_eq!(response.confidence_interval, (800000.0, 900000.0));
	let request = PredictionRequest::new("ZZ1 1ZZ", housing_core::predict::PropertyType::Terraced, true, true).unwrap();
	let error = client.predict(&request).await.unwrap_err();
	assert_eq!(error.to_string(), "Postcode not found");
}

#[cfg(test)]
#[tokio::test]
async fn test_status_without_detail() {
	let base_url = test_server(|_, _| (503, "service unavailable".to_owned())).await;
	let error = test_client(&base_url, None).health().await.unwrap_err();
	assert_eq!(error.to_string(), "Request failed: 503");
}

#[cfg(test)]
#[tokio::test]
async fn test_decode_error() {
	let base_url = test_server(|_, _| (200, "[1, 2, 3]".to_owned())).await;
	let error = test_client(&base_url, None).data_quality().await.unwrap_err();
	assert!(matches!(error, FetchError::Decode(_)));
}

#[cfg(test)]
#[tokio::test]
async fn test_transport_error() {
	let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);
	let base_url = Url::parse(&format!("http://{}", addr)).unwrap();
	let error = test_client(&base_url, None).health().await.unwrap_err();
	assert!(matches!(error, FetchError::Transport(_)));
	assert!(error.to_string().starts_with("could not reach backend"));
}

#[cfg(test)]
#[tokio::test]
async fn test_base_path_prefix() {
	let base_url = test_server(|path, _| match path {
		"/api/health" => (200, r#"{ "status": "ok" }"#.to_owned()),
		_ => (404, "".to_owned()),
	})
	.await;
	let base_url = base_url.join("api/").unwrap();
	let report = test_client(&base_url, None).health().await.unwrap();
	assert!(report.is_ok());
}
