/*!
This crate computes everything the model comparison view derives from run metrics. It defines the [`StreamingMetric`](trait.StreamingMetric.html) trait, the single [`normalize`](fn.normalize.html) function that decides whether a raw metric value is usable, the [`ScoreExtremes`](struct.ScoreExtremes.html) metric that finds the best and second best error scores, the [`RankLabel`](enum.RankLabel.html) assigned to each run, and the [`Generalization`](enum.Generalization.html) classification.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod extremes;
mod generalization;
mod normalize;
mod rank;

pub use self::extremes::{ScoreExtremes, ScoreExtremesOutput};
pub use self::generalization::{GapClassification, Generalization};
pub use self::normalize::{normalize, normalize_score, MetricValue, SCORE_DECIMALS};
pub use self::rank::{RankLabel, Ranking};

/**
The `StreamingMetric` trait defines a common interface to metrics that are computed one input at a time, such as the best and second best score over a set of runs.

After being initialized, a value of type `T` implementing the `StreamingMetric` trait can have `update()` called on it with values of the associated type `Input`. Multiple values of `T` can be merged together by calling `merge()`. When finished aggregating, call `finalize()` to produce the associated type `Output`.

# Examples

Here is a basic example implementation of a `Max` metric, which takes `f64`s as input and produces the largest one, or `None` if there was no input.

```
use housing_metrics::StreamingMetric;

#[derive(Default)]
struct Max(Option<f64>);

impl StreamingMetric<'_> for Max {
	type Input = f64;
	type Output = Option<f64>;
	fn update(&mut self, input: Self::Input) {
		self.0 = Some(self.0.map_or(input, |max| max.max(input)));
	}
	fn merge(&mut self, other: Self) {
		if let Some(other) = other.0 {
			self.update(other);
		}
	}
	fn finalize(self) -> Self::Output { self.0 }
}
```

The generic lifetime `'a` exists to allow `Input`s and `Output`s to borrow from their enclosing scope.
*/
pub trait StreamingMetric<'a> {
	/// `Input` is the type to aggregate in calls to `update()`.
	type Input;
	/// `Output` is the return type of `finalize()`.
	type Output;
	/// Update this streaming metric with the `Input` `input`.
	fn update(&mut self, input: Self::Input);
	/// Merge multiple independently computed streaming metrics.
	fn merge(&mut self, other: Self);
	/// When you are done aggregating `Input`s, call `finalize()` to produce an `Output`.
	fn finalize(self) -> Self::Output;
}
