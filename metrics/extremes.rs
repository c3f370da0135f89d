use super::StreamingMetric;
use housing_util::finite::Finite;

/// Tracks the lowest and second lowest distinct scores. Equal scores collapse into one, so a tie for first place does not also fill second place.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreExtremes {
	best: Option<Finite<f64>>,
	second_best: Option<Finite<f64>>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScoreExtremesOutput {
	pub best: Option<f64>,
	pub second_best: Option<f64>,
}

impl ScoreExtremes {
	pub fn new() -> ScoreExtremes {
		ScoreExtremes::default()
	}
}

impl StreamingMetric<'_> for ScoreExtremes {
	type Input = Finite<f64>;
	type Output = ScoreExtremesOutput;

	fn update(&mut self, score: Finite<f64>) {
		match self.best {
			None => self.best = Some(score),
			Some(best) if score < best => {
				self.second_best = Some(best);
				self.best = Some(score);
			}
			Some(best) if score == best => {}
			Some(_) => match self.second_best {
				Some(second_best) if second_best <= score => {}
				_ => self.second_best = Some(score),
			},
		}
	}

	fn merge(&mut self, other: Self) {
		if let Some(best) = other.best {
			self.update(best);
		}
		if let Some(second_best) = other.second_best {
			self.update(second_best);
		}
	}

	fn finalize(self) -> ScoreExtremesOutput {
		ScoreExtremesOutput {
			best: self.best.map(Finite::get),
			second_best: self.second_best.map(Finite::get),
		}
	}
}

#[cfg(test)]
fn extremes(scores: &[f64]) -> ScoreExtremesOutput {
	let mut metric = ScoreExtremes::new();
	for score in scores {
		metric.update(Finite::new(*score).unwrap());
	}
	metric.finalize()
}

#[test]
fn test_extremes() {
	let output = extremes(&[120.0, 120.0, 95.5, 130.25]);
	assert_eq!(output.best, Some(95.5));
	assert_eq!(output.second_best, Some(120.0));
}

#[test]
fn test_extremes_ties_for_best() {
	let output = extremes(&[95.5, 95.5, 95.5]);
	assert_eq!(output.best, Some(95.5));
	assert_eq!(output.second_best, None);
	let output = extremes(&[95.5, 130.0, 95.5, 120.0]);
	assert_eq!(output.best, Some(95.5));
	assert_eq!(output.second_best, Some(120.0));
}

#[test]
fn test_extremes_empty_and_single() {
	let output = extremes(&[]);
	assert_eq!(output.best, None);
	assert_eq!(output.second_best, None);
	let output = extremes(&[101.25]);
	assert_eq!(output.best, Some(101.25));
	assert_eq!(output.second_best, None);
}

#[test]
fn test_extremes_merge() {
	let mut a = ScoreExtremes::new();
	a.update(Finite::new(130.0).unwrap());
	a.update(Finite::new(110.0).unwrap());
	let mut b = ScoreExtremes::new();
	b.update(Finite::new(120.0).unwrap());
	b.update(Finite::new(90.0).unwrap());
	a.merge(b);
	let output = a.finalize();
	assert_eq!(output.best, Some(90.0));
	assert_eq!(output.second_best, Some(110.0));
}
