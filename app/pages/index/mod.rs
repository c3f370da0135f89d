mod get;
mod props;

pub use self::get::get;
