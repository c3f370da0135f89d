use futures::future::{AbortHandle, Abortable};
use std::{
	fmt::Display,
	future::Future,
	sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::watch;

/// The state of one tab's data. Every activation replaces it wholesale.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LoadState<T> {
	Idle,
	Loading,
	Loaded(T),
	Failed(String),
}

/// Identifies one activation of a view. A result is applied only if it carries the view's current generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/**
A `View` holds the result of the most recent fetch for one tab.

Each call to [`activate`](#method.activate) starts a new generation and aborts the fetch that the previous generation started. A fetch run with [`load`](#method.load) only writes its result if its generation is still current when it completes, so a slow response from an earlier activation can never overwrite a newer one. [`teardown`](#method.teardown) aborts the in-flight fetch and invalidates its generation without starting a new one.

A `View` belongs to one viewer. Activations from the same viewer supersede each other, so callers that serve several viewers keep one `View` per viewer.
*/
pub struct View<T> {
	inner: Arc<Mutex<ViewInner<T>>>,
	changes: Arc<watch::Sender<u64>>,
	settled: watch::Receiver<u64>,
}

struct ViewInner<T> {
	generation: u64,
	state: LoadState<T>,
	abort_handle: Option<AbortHandle>,
}

impl<T> Clone for View<T> {
	fn clone(&self) -> Self {
		View {
			inner: self.inner.clone(),
			changes: self.changes.clone(),
			settled: self.settled.clone(),
		}
	}
}

impl<T> Default for View<T> {
	fn default() -> Self {
		View::new()
	}
}

impl<T> View<T> {
	pub fn new() -> View<T> {
		let (changes, settled) = watch::channel(0);
		View {
			inner: Arc::new(Mutex::new(ViewInner {
				generation: 0,
				state: LoadState::Idle,
				abort_handle: None,
			})),
			changes: Arc::new(changes),
			settled,
		}
	}

	pub fn activate(&self) -> Generation {
		let mut inner = self.lock();
		inner.invalidate();
		inner.state = LoadState::Loading;
		Generation(inner.generation)
	}

	pub fn teardown(&self) {
		let generation = {
			let mut inner = self.lock();
			inner.invalidate();
			inner.state = LoadState::Idle;
			inner.generation
		};
		self.changes.send(generation).ok();
	}

	pub fn generation(&self) -> Generation {
		Generation(self.lock().generation)
	}

	/// Write a result if `generation` is still current. Returns whether it was applied.
	pub fn apply<E>(&self, generation: Generation, result: Result<T, E>) -> bool
	where
		E: Display,
	{
		{
			let mut inner = self.lock();
			if inner.generation != generation.0 {
				tracing::warn!(
					generation = generation.0,
					current = inner.generation,
					"discarding stale result"
				);
				return false;
			}
			inner.abort_handle = None;
			inner.state = match result {
				Ok(value) => LoadState::Loaded(value),
				Err(error) => LoadState::Failed(error.to_string()),
			};
		}
		self.changes.send(generation.0).ok();
		true
	}

	fn lock(&self) -> MutexGuard<'_, ViewInner<T>> {
		// The state is replaced wholesale, so a panic while the lock was held cannot leave it half written.
		self.inner
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}
}

impl<T> View<T>
where
	T: Clone,
{
	pub fn state(&self) -> LoadState<T> {
		self.lock().state.clone()
	}

	/**
	Run `fetch` on behalf of `generation`. Returns the new state if the result was applied, or `None` if the fetch was aborted or its generation went stale before it finished.
	*/
	pub async fn load<F, E>(&self, generation: Generation, fetch: F) -> Option<LoadState<T>>
	where
		F: Future<Output = Result<T, E>>,
		E: Display,
	{
		let (abort_handle, abort_registration) = AbortHandle::new_pair();
		{
			let mut inner = self.lock();
			if inner.generation != generation.0 {
				return None;
			}
			inner.abort_handle = Some(abort_handle);
		}
		let mut guard = LoadGuard {
			view: self,
			generation,
			finished: false,
		};
		let result = Abortable::new(fetch, abort_registration).await;
		guard.finished = true;
		let result = match result {
			Ok(result) => result,
			Err(_) => {
				tracing::debug!(generation = generation.0, "fetch aborted");
				return None;
			}
		};
		if self.apply(generation, result) {
			Some(self.state())
		} else {
			None
		}
	}

	/**
	Activate the view and load it in one step. If a newer activation supersedes this one, wait for the newer activation's result instead, so the returned state is never `Loading`.
	*/
	pub async fn refresh<F, E>(&self, fetch: F) -> LoadState<T>
	where
		F: Future<Output = Result<T, E>>,
		E: Display,
	{
		let generation = self.activate();
		match self.load(generation, fetch).await {
			Some(state) => state,
			None => self.settled().await,
		}
	}

	/// Wait until the view holds something other than `Loading`.
	pub async fn settled(&self) -> LoadState<T> {
		let mut settled = self.settled.clone();
		loop {
			let state = self.state();
			if !matches!(state, LoadState::Loading) {
				return state;
			}
			if settled.changed().await.is_err() {
				return state;
			}
		}
	}
}

/// Fails the view's current generation if its fetch is dropped before completing, so waiters in `settled` are released.
struct LoadGuard<'a, T> {
	view: &'a View<T>,
	generation: Generation,
	finished: bool,
}

impl<'a, T> Drop for LoadGuard<'a, T> {
	fn drop(&mut self) {
		if !self.finished {
			self.view.apply(self.generation, Err::<T, _>("fetch was cancelled"));
		}
	}
}

impl<T> ViewInner<T> {
	fn invalidate(&mut self) {
		self.generation += 1;
		if let Some(abort_handle) = self.abort_handle.take() {
			abort_handle.abort();
		}
	}
}

#[cfg(test)]
#[tokio::test]
async fn test_view_applies_current_generation() {
	let view: View<u32> = View::new();
	assert_eq!(view.state(), LoadState::Idle);
	let state = view.refresh(async { Ok::<_, String>(7) }).await;
	assert_eq!(state, LoadState::Loaded(7));
	let state = view
		.refresh(async { Err::<u32, _>("could not reach backend") })
		.await;
	assert_eq!(state, LoadState::Failed("could not reach backend".to_owned()));
}

#[cfg(test)]
#[tokio::test]
async fn test_view_discards_stale_result() {
	let view: View<&'static str> = View::new();
	let first = view.activate();
	let second = view.activate();
	assert!(first < second);
	assert!(!view.apply(first, Ok::<_, String>("old")));
	assert_eq!(view.state(), LoadState::Loading);
	assert!(view.apply(second, Ok::<_, String>("new")));
	assert_eq!(view.state(), LoadState::Loaded("new"));
	assert_eq!(view.load(first, async { Ok::<_, String>("old") }).await, None);
	assert_eq!(view.state(), LoadState::Loaded("new"));
}

#[cfg(test)]
#[tokio::test]
async fn test_view_activation_aborts_in_flight_fetch() {
	let view: View<&'static str> = View::new();
	let (sender, receiver) = tokio::sync::oneshot::channel::<&'static str>();
	let first = view.activate();
	let task = tokio::spawn({
		let view = view.clone();
		async move {
			view.load(first, async move { receiver.await.map_err(|error| error.to_string()) })
				.await
		}
	});
	tokio::task::yield_now().await;
	let second = view.activate();
	// The first fetch completes after the second activation.
	sender.send("old").ok();
	assert_eq!(task.await.unwrap(), None);
	assert_eq!(view.state(), LoadState::Loading);
	assert_eq!(
		view.load(second, async { Ok::<_, String>("new") }).await,
		Some(LoadState::Loaded("new"))
	);
}

#[cfg(test)]
#[tokio::test]
async fn test_view_teardown() {
	let view: View<u32> = View::new();
	let generation = view.activate();
	let task = tokio::spawn({
		let view = view.clone();
		async move {
			view.load(generation, futures::future::pending::<Result<u32, String>>())
				.await
		}
	});
	tokio::task::yield_now().await;
	view.teardown();
	assert_eq!(task.await.unwrap(), None);
	assert_eq!(view.state(), LoadState::Idle);
	assert_ne!(view.generation(), generation);
}

#[cfg(test)]
#[tokio::test]
async fn test_view_superseded_refresh_returns_newer_result() {
	let view: View<&'static str> = View::new();
	let (sender, receiver) = tokio::sync::oneshot::channel::<&'static str>();
	let first = tokio::spawn({
		let view = view.clone();
		async move {
			view.refresh(async move { receiver.await.map_err(|error| error.to_string()) })
				.await
		}
	});
	tokio::task::yield_now().await;
	let second = view.refresh(async { Ok::<_, String>("new") }).await;
	assert_eq!(second, LoadState::Loaded("new"));
	sender.send("old").ok();
	assert_eq!(first.await.unwrap(), LoadState::Loaded("new"));
}

#[cfg(test)]
#[tokio::test]
async fn test_view_dropped_fetch_releases_waiters() {
	let view: View<u32> = View::new();
	let generation = view.activate();
	let task = tokio::spawn({
		let view = view.clone();
		async move {
			view.load(generation, futures::future::pending::<Result<u32, String>>())
				.await
		}
	});
	tokio::task::yield_now().await;
	task.abort();
	assert!(task.await.is_err());
	assert_eq!(
		view.settled().await,
		LoadState::Failed("fetch was cancelled".to_owned())
	);
}
