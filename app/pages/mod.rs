pub mod data_quality;
pub mod index;
pub mod model_comparison;
pub mod overview;
pub mod predict;
pub mod upload_data;
