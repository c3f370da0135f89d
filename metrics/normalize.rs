use housing_util::finite::{Finite, ToFinite};

/// Error scores are compared at this many decimal places.
pub const SCORE_DECIMALS: i32 = 2;

/// A metric value as the tracking backend sends it. Values are usually numbers, but older runs logged some metrics as strings, and anything else the backend sends is kept so that it can be rejected rather than failing the whole document. A JSON `null` or a missing key is represented by the absence of a `MetricValue`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
	Number(f64),
	String(String),
	Other(serde_json::Value),
}

impl From<f64> for MetricValue {
	fn from(value: f64) -> MetricValue {
		MetricValue::Number(value)
	}
}

impl From<&str> for MetricValue {
	fn from(value: &str) -> MetricValue {
		MetricValue::String(value.to_owned())
	}
}

/**
Convert a raw metric value to a finite number, or `None` if it is unknown.

* Numbers are accepted if they are finite.
* Strings are trimmed and parsed as decimal or scientific notation. Empty strings, non-numeric strings, and strings that parse to NaN or infinity are unknown.
* `null`, a missing value, booleans, arrays, and objects are unknown.

Ingestion uses this to decide which runs are eligible and ranking uses it to read scores, so the two can never disagree about what a valid value is.
*/
pub fn normalize(value: Option<&MetricValue>) -> Option<Finite<f64>> {
	match value? {
		MetricValue::Number(value) => value.to_finite().ok(),
		MetricValue::String(value) => {
			let value = value.trim();
			if value.is_empty() {
				return None;
			}
			value.parse::<f64>().ok()?.to_finite().ok()
		}
		MetricValue::Other(_) => None,
	}
}

/// Normalize a value and round it to [`SCORE_DECIMALS`] places, which is the form every score comparison uses.
pub fn normalize_score(value: Option<&MetricValue>) -> Option<Finite<f64>> {
	normalize(value).map(|value| value.round_to(SCORE_DECIMALS))
}

#[test]
fn test_normalize() {
	let n = |value: MetricValue| normalize(Some(&value)).map(|value| value.get());
	assert_eq!(n(MetricValue::Number(95.5)), Some(95.5));
	assert_eq!(n(MetricValue::Number(0.0)), Some(0.0));
	assert_eq!(n(MetricValue::Number(f64::NAN)), None);
	assert_eq!(n(MetricValue::Number(f64::INFINITY)), None);
	assert_eq!(n(MetricValue::Number(f64::NEG_INFINITY)), None);
	assert_eq!(n("120.5".into()), Some(120.5));
	assert_eq!(n(" 42 ".into()), Some(42.0));
	assert_eq!(n("1e3".into()), Some(1000.0));
	assert_eq!(n("".into()), None);
	assert_eq!(n("   ".into()), None);
	assert_eq!(n("abc".into()), None);
	assert_eq!(n("NaN".into()), None);
	assert_eq!(n("inf".into()), None);
	assert_eq!(n("-Infinity".into()), None);
	assert_eq!(n(MetricValue::Other(serde_json::Value::Bool(true))), None);
	assert_eq!(n(MetricValue::Other(serde_json::json!({ "value": 1 }))), None);
	assert_eq!(normalize(None), None);
}

#[test]
fn test_normalize_score_rounds() {
	let score = |value: f64| normalize_score(Some(&MetricValue::Number(value))).map(|v| v.get());
	assert_eq!(score(95.504), Some(95.5));
	assert_eq!(score(120.0049), Some(120.0));
	assert_eq!(score(119.996), Some(120.0));
	assert_eq!(score(f64::NAN), None);
}

#[test]
fn test_metric_value_deserialize() {
	let values: std::collections::BTreeMap<String, Option<MetricValue>> = serde_json::from_str(
		r#"{ "a": 1.5, "b": "2.5", "c": null, "d": true, "e": 3 }"#,
	)
	.unwrap();
	assert_eq!(values["a"], Some(MetricValue::Number(1.5)));
	assert_eq!(values["b"], Some(MetricValue::String("2.5".to_owned())));
	assert_eq!(values["c"], None);
	assert_eq!(values["d"], Some(MetricValue::Other(serde_json::Value::Bool(true))));
	assert_eq!(values["e"], Some(MetricValue::Number(3.0)));
}
