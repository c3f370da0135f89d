/*!
This crate talks to the London Housing backend over HTTP. [`Client`](struct.Client.html) wraps the run listing, prediction, data quality, and health endpoints. [`View`](struct.View.html) holds the result of one tab's fetch and discards results that arrive after the tab was activated again or torn down.
*/

mod client;
mod error;
mod options;
mod view;

pub use self::client::Client;
pub use self::error::FetchError;
pub use self::options::{parse_runs_limit, ClientOptions, DEFAULT_API_URL};
pub use self::view::{Generation, LoadState, View};
