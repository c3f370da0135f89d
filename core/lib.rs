/*!
This crate holds the data the dashboard works with: the run documents returned by the tracking backend and the ingestion step that turns them into eligible [`RunRecord`](run/struct.RunRecord.html)s, the model comparison derived from those runs, the overview of the latest run, and the wire types for the prediction, data quality, and health endpoints.
*/

pub mod comparison;
pub mod data_quality;
pub mod health;
pub mod ingest;
pub mod overview;
pub mod predict;
pub mod run;
pub mod tab;
pub mod time;

pub use self::ingest::{ingest, Ingestion};
