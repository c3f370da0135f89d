use crate::context::Views;
use hyper::{header, HeaderMap};
use std::{
	collections::{BTreeMap, HashMap},
	sync::{Arc, Mutex, MutexGuard},
};
use thiserror::Error;

pub const VIEWER_COOKIE: &str = "housing_viewer";

const MAX_VIEWERS: usize = 1024;

/// Identifies one browser session. Activations from the same viewer supersede each other, activations from different viewers never do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewerId(u128);

impl ViewerId {
	pub fn new() -> ViewerId {
		ViewerId::default()
	}
}

impl Default for ViewerId {
	fn default() -> ViewerId {
		ViewerId(rand::random())
	}
}

#[derive(Debug, Error)]
#[error("invalid viewer id")]
pub struct ParseViewerIdError;

impl std::str::FromStr for ViewerId {
	type Err = ParseViewerIdError;
	fn from_str(s: &str) -> Result<ViewerId, ParseViewerIdError> {
		Ok(ViewerId(
			u128::from_str_radix(s, 16).map_err(|_| ParseViewerIdError)?,
		))
	}
}

impl std::fmt::Display for ViewerId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:032x}", self.0)
	}
}

/// Malformed cookies are skipped.
pub fn parse_cookies(cookies: &str) -> BTreeMap<&str, &str> {
	cookies
		.split(';')
		.filter_map(|cookie| {
			let mut components = cookie.trim().splitn(2, '=');
			let key = components.next()?;
			let value = components.next()?;
			Some((key, value))
		})
		.collect()
}

pub fn viewer_id(headers: &HeaderMap) -> Option<ViewerId> {
	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.find_map(|cookies| parse_cookies(cookies).get(VIEWER_COOKIE)?.parse().ok())
}

pub fn set_cookie(viewer_id: ViewerId) -> String {
	format!(
		"{}={}; Path=/; HttpOnly; SameSite=Lax",
		VIEWER_COOKIE, viewer_id
	)
}

/// The views of every recent viewer. The least recently seen viewer is dropped once there are more than `MAX_VIEWERS`.
#[derive(Default)]
pub struct Viewers {
	inner: Mutex<ViewersInner>,
}

#[derive(Default)]
struct ViewersInner {
	tick: u64,
	viewers: HashMap<ViewerId, Viewer>,
}

struct Viewer {
	views: Arc<Views>,
	last_seen: u64,
}

impl Viewers {
	pub fn get(&self, viewer_id: ViewerId) -> Arc<Views> {
		let mut inner = self.lock();
		inner.tick += 1;
		let tick = inner.tick;
		let viewer = inner.viewers.entry(viewer_id).or_insert_with(|| Viewer {
			views: Arc::new(Views::default()),
			last_seen: tick,
		});
		viewer.last_seen = tick;
		let views = viewer.views.clone();
		while inner.viewers.len() > MAX_VIEWERS {
			let oldest = inner
				.viewers
				.iter()
				.min_by_key(|(_, viewer)| viewer.last_seen)
				.map(|(viewer_id, _)| *viewer_id);
			match oldest {
				Some(oldest) => {
					inner.viewers.remove(&oldest);
				}
				None => break,
			}
		}
		views
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.lock().viewers.len()
	}

	fn lock(&self) -> MutexGuard<'_, ViewersInner> {
		self.inner
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}

#[test]
fn test_viewer_id_cookie() {
	let id = ViewerId::new();
	let mut headers = HeaderMap::new();
	let cookie = format!("theme=dark; {}={}", VIEWER_COOKIE, id);
	headers.insert(header::COOKIE, cookie.parse().unwrap());
	assert_eq!(viewer_id(&headers), Some(id));
	assert!(set_cookie(id).starts_with(&format!("housing_viewer={}", id)));
	let mut headers = HeaderMap::new();
	headers.insert(header::COOKIE, "housing_viewer=not-hex; broken".parse().unwrap());
	assert_eq!(viewer_id(&headers), None);
}

#[test]
fn test_viewers_share_views_per_viewer() {
	let viewers = Viewers::default();
	let a = ViewerId::new();
	let b = ViewerId::new();
	assert!(Arc::ptr_eq(&viewers.get(a), &viewers.get(a)));
	assert!(!Arc::ptr_eq(&viewers.get(a), &viewers.get(b)));
	assert_eq!(viewers.len(), 2);
}

#[test]
fn test_viewers_evict_least_recently_seen() {
	let viewers = Viewers::default();
	let first = ViewerId::new();
	let first_views = viewers.get(first);
	for _ in 0..MAX_VIEWERS {
		viewers.get(ViewerId::new());
	}
	assert_eq!(viewers.len(), MAX_VIEWERS);
	assert!(!Arc::ptr_eq(&first_views, &viewers.get(first)));
}
