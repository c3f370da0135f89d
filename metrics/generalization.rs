use housing_util::finite::Finite;

/// How far the validation error sits above the training error, relative to the training error. Reported as `Unavailable` when either error is unknown, when the training error is zero, or when the ratio does not fit in a finite float.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Generalization {
	Available {
		gap: f64,
		classification: GapClassification,
	},
	Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapClassification {
	Excellent,
	Acceptable,
	PotentialOverfit,
	LikelyOverfit,
}

impl Generalization {
	pub fn compute(
		validation_rmse: Option<Finite<f64>>,
		train_rmse: Option<Finite<f64>>,
	) -> Generalization {
		let (validation_rmse, train_rmse) = match (validation_rmse, train_rmse) {
			(Some(v), Some(t)) => (v.get(), t.get()),
			_ => return Generalization::Unavailable,
		};
		if train_rmse == 0.0 {
			return Generalization::Unavailable;
		}
		let gap = (validation_rmse - train_rmse) / train_rmse;
		if !gap.is_finite() {
			return Generalization::Unavailable;
		}
		Generalization::Available {
			gap,
			classification: GapClassification::from_gap(gap),
		}
	}

	pub fn gap(&self) -> Option<f64> {
		match self {
			Generalization::Available { gap, .. } => Some(*gap),
			Generalization::Unavailable => None,
		}
	}

	pub fn title(&self) -> &'static str {
		match self {
			Generalization::Available { classification, .. } => classification.title(),
			Generalization::Unavailable => "Generalization unavailable",
		}
	}
}

impl GapClassification {
	/// Thresholds are inclusive on the lower bound: a gap of exactly 0.10 is acceptable, 0.25 is a potential overfit, and 0.40 is a likely overfit.
	pub fn from_gap(gap: f64) -> GapClassification {
		if gap < 0.10 {
			GapClassification::Excellent
		} else if gap < 0.25 {
			GapClassification::Acceptable
		} else if gap < 0.40 {
			GapClassification::PotentialOverfit
		} else {
			GapClassification::LikelyOverfit
		}
	}

	pub fn title(self) -> &'static str {
		match self {
			GapClassification::Excellent => "Excellent generalization",
			GapClassification::Acceptable => "Acceptable generalization",
			GapClassification::PotentialOverfit => "Potential overfit",
			GapClassification::LikelyOverfit => "Likely overfit",
		}
	}
}

impl std::fmt::Display for Generalization {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.title())
	}
}

#[cfg(test)]
fn classify(validation_rmse: f64, train_rmse: f64) -> Generalization {
	Generalization::compute(
		Finite::new(validation_rmse).ok(),
		Finite::new(train_rmse).ok(),
	)
}

#[test]
fn test_gap_boundaries() {
	let classification = |v: f64| match classify(v, 100.0) {
		Generalization::Available { classification, .. } => Some(classification),
		Generalization::Unavailable => None,
	};
	assert_eq!(classification(109.9), Some(GapClassification::Excellent));
	assert_eq!(classification(110.0), Some(GapClassification::Acceptable));
	assert_eq!(classification(124.9), Some(GapClassification::Acceptable));
	assert_eq!(classification(125.0), Some(GapClassification::PotentialOverfit));
	assert_eq!(classification(139.9), Some(GapClassification::PotentialOverfit));
	assert_eq!(classification(140.0), Some(GapClassification::LikelyOverfit));
	assert_eq!(classification(90.0), Some(GapClassification::Excellent));
}

#[test]
fn test_gap_value() {
	let gap = classify(125.0, 100.0).gap().unwrap();
	assert_eq!(gap, 0.25);
	assert_eq!(classify(110.0, 100.0).title(), "Acceptable generalization");
}

#[test]
fn test_gap_unavailable() {
	assert_eq!(classify(110.0, 0.0), Generalization::Unavailable);
	assert_eq!(classify(0.0, 0.0), Generalization::Unavailable);
	assert_eq!(classify(f64::NAN, 100.0), Generalization::Unavailable);
	assert_eq!(classify(110.0, f64::INFINITY), Generalization::Unavailable);
	assert_eq!(classify(1e308, 1e-308), Generalization::Unavailable);
	assert_eq!(
		classify(110.0, 0.0).title(),
		"Generalization unavailable"
	);
}

#[test]
fn test_generalization_serialize() {
	assert_eq!(
		serde_json::to_value(classify(140.0, 100.0)).unwrap(),
		serde_json::json!({
			"type": "available",
			"gap": 0.4,
			"classification": "likely_overfit",
		})
	);
	assert_eq!(
		serde_json::to_value(classify(140.0, 0.0)).unwrap(),
		serde_json::json!({ "type": "unavailable" })
	);
}
