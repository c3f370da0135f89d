use housing_util::{err, error::Result};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:7777";
pub const API_URL_ENV: &str = "HOUSING_API_URL";
pub const RUNS_LIMIT_ENV: &str = "HOUSING_RUNS_LIMIT";

#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
	pub base_url: Url,
	/// Forwarded as the `limit` query parameter of the run listing. The backend uses its own default when this is `None`.
	pub runs_limit: Option<u32>,
}

impl ClientOptions {
	pub fn new(base_url: &str, runs_limit: Option<u32>) -> Result<ClientOptions> {
		let base_url = Url::parse(base_url)?;
		if base_url.cannot_be_a_base() {
			return Err(err!("\"{}\" cannot be used as a base url", base_url));
		}
		Ok(ClientOptions {
			base_url,
			runs_limit,
		})
	}

	pub fn from_env() -> Result<ClientOptions> {
		let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
		let runs_limit = match std::env::var(RUNS_LIMIT_ENV) {
			Ok(runs_limit) => Some(parse_runs_limit(&runs_limit)?),
			Err(_) => None,
		};
		ClientOptions::new(&base_url, runs_limit)
	}
}

/// The backend accepts between 1 and 200 runs per listing.
pub fn parse_runs_limit(value: &str) -> Result<u32> {
	let limit: u32 = value
		.trim()
		.parse()
		.map_err(|_| err!("runs limit must be a number, got \"{}\"", value))?;
	if !(1..=200).contains(&limit) {
		return Err(err!("runs limit must be between 1 and 200, got {}", limit));
	}
	Ok(limit)
}

#[test]
fn test_parse_runs_limit() {
	assert_eq!(parse_runs_limit("30").unwrap(), 30);
	assert_eq!(parse_runs_limit(" 200 ").unwrap(), 200);
	assert!(parse_runs_limit("0").is_err());
	assert!(parse_runs_limit("201").is_err());
	assert!(parse_runs_limit("ten").is_err());
}

#[test]
fn test_client_options() {
	let options = ClientOptions::new(DEFAULT_API_URL, None).unwrap();
	assert_eq!(options.base_url.as_str(), "http://localhost:7777/");
	assert!(ClientOptions::new("mailto:someone@example.com", None).is_err());
	assert!(ClientOptions::new("not a url", None).is_err());
	let options = ClientOptions::new("https://housing.example.com/api", Some(50)).unwrap();
	assert_eq!(options.runs_limit, Some(50));
}
