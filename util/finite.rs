use num_traits::Float;
use std::{
	cmp::{Ord, Ordering},
	fmt::Debug,
	hash::{Hash, Hasher},
};
use thiserror::Error;

/// A float that is known to be neither NaN nor infinite. Because of that it can implement `Eq`, `Ord`, and `Hash`, which lets metric values be compared, sorted, and deduplicated directly.
#[derive(Clone, Copy, Debug)]
pub struct Finite<T>(T)
where
	T: Float;

#[derive(Debug, Error, PartialEq)]
#[error("not finite")]
pub struct NotFiniteError;

impl<T> Finite<T>
where
	T: Float,
{
	pub fn new(value: T) -> Result<Self, NotFiniteError> {
		if value.is_finite() {
			Ok(Self(value))
		} else {
			Err(NotFiniteError)
		}
	}

	pub fn get(self) -> T {
		self.0
	}

	/// Round half away from zero to `decimals` places. Rounding a finite value can only overflow for values near `T::max_value()`, in which case the value is returned unchanged.
	pub fn round_to(self, decimals: i32) -> Self {
		let scale = T::from(10.0).map(|ten| ten.powi(decimals));
		match scale {
			Some(scale) => Self::new((self.0 * scale).round() / scale).unwrap_or(self),
			None => self,
		}
	}
}

impl<T> std::ops::Deref for Finite<T>
where
	T: Float,
{
	type Target = T;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<T> std::fmt::Display for Finite<T>
where
	T: Float + std::fmt::Display,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl<T> PartialEq for Finite<T>
where
	T: Float,
{
	#[inline]
	fn eq(&self, other: &Self) -> bool {
		self.0.eq(&other.0)
	}
}

impl<T> Eq for Finite<T> where T: Float {}

impl<T> PartialOrd for Finite<T>
where
	T: Float,
{
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl<T> Ord for Finite<T>
where
	T: Float,
{
	fn cmp(&self, other: &Self) -> Ordering {
		// Two finite floats always compare.
		self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
	}
}

impl Hash for Finite<f64> {
	#[inline]
	fn hash<H: Hasher>(&self, state: &mut H) {
		// 0.0 and -0.0 are equal, so they must hash the same.
		let value = if self.0 == 0.0 { 0.0f64 } else { self.0 };
		value.to_bits().hash(state);
	}
}

pub trait ToFinite<T>
where
	T: Float,
{
	/// If the value is finite, return `Ok(Finite(self))`, otherwise return `Err(NotFiniteError)`.
	fn to_finite(self) -> Result<Finite<T>, NotFiniteError>;
}

impl<T> ToFinite<T> for T
where
	T: Float,
{
	fn to_finite(self) -> Result<Finite<T>, NotFiniteError> {
		Finite::new(self)
	}
}

#[test]
fn test_finite() {
	assert!(Finite::new(1.5f64).is_ok());
	assert_eq!(Finite::new(f64::NAN), Err(NotFiniteError));
	assert_eq!(f64::INFINITY.to_finite(), Err(NotFiniteError));
	assert_eq!(f64::NEG_INFINITY.to_finite(), Err(NotFiniteError));
	let mut values = vec![
		Finite::new(3.0f64).unwrap(),
		Finite::new(-1.0).unwrap(),
		Finite::new(2.0).unwrap(),
	];
	values.sort();
	let values: Vec<f64> = values.into_iter().map(Finite::get).collect();
	assert_eq!(values, vec![-1.0, 2.0, 3.0]);
}

#[test]
fn test_round_to() {
	let round = |value: f64| Finite::new(value).unwrap().round_to(2).get();
	assert_eq!(round(95.499), 95.5);
	assert_eq!(round(120.004), 120.0);
	assert_eq!(round(130.2549), 130.25);
	assert_eq!(round(0.0), 0.0);
	assert_eq!(round(-1.234), -1.23);
}
