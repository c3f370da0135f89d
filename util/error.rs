pub type Error = anyhow::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Build an [`Error`] from a format string, like `format!`.
#[macro_export]
macro_rules! err {
	($($arg:tt)*) => {
		$crate::error::Error::msg(format!($($arg)*))
	};
}
