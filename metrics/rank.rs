use super::{ScoreExtremes, ScoreExtremesOutput, StreamingMetric};
use housing_util::finite::Finite;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankLabel {
	Champion,
	Challenger,
	Archive,
	Unknown,
}

impl RankLabel {
	pub fn title(self) -> &'static str {
		match self {
			RankLabel::Champion => "Champion",
			RankLabel::Challenger => "Challenger",
			RankLabel::Archive => "Archive",
			RankLabel::Unknown => "Unknown",
		}
	}
}

impl std::fmt::Display for RankLabel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.title())
	}
}

/// The extremes of a set of rounded primary scores together with one label per score, in input order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Ranking {
	pub extremes: ScoreExtremesOutput,
	pub labels: Vec<RankLabel>,
}

impl Ranking {
	/**
	Rank runs by their rounded primary score, lower is better. Every run tied for the best score is a champion and every run tied for the second best distinct score is a challenger. A run whose score is `None` is labeled unknown and does not take part in the extremes.
	*/
	pub fn compute<I>(scores: I) -> Ranking
	where
		I: IntoIterator<Item = Option<Finite<f64>>>,
	{
		let scores: Vec<Option<Finite<f64>>> = scores.into_iter().collect();
		let mut extremes = ScoreExtremes::new();
		for score in scores.iter().flatten() {
			extremes.update(*score);
		}
		let extremes = extremes.finalize();
		let labels = scores
			.iter()
			.map(|score| Ranking::label(*score, &extremes))
			.collect();
		Ranking { extremes, labels }
	}

	pub fn label(score: Option<Finite<f64>>, extremes: &ScoreExtremesOutput) -> RankLabel {
		let score = match score {
			Some(score) => score.get(),
			None => return RankLabel::Unknown,
		};
		if Some(score) == extremes.best {
			RankLabel::Champion
		} else if Some(score) == extremes.second_best {
			RankLabel::Challenger
		} else {
			RankLabel::Archive
		}
	}
}

#[cfg(test)]
fn rank(scores: &[Option<f64>]) -> Ranking {
	Ranking::compute(
		scores
			.iter()
			.map(|score| score.and_then(|score| Finite::new(score).ok())),
	)
}

#[test]
fn test_ranking() {
	let ranking = rank(&[Some(120.0), Some(120.0), Some(95.5), Some(130.25)]);
	insta::assert_debug_snapshot!(ranking, @r###"
 Ranking {
     extremes: ScoreExtremesOutput {
         best: Some(
             95.5,
         ),
         second_best: Some(
             120.0,
         ),
     },
     labels: [
         Challenger,
         Challenger,
         Champion,
         Archive,
     ],
 }
 "###);
}

#[test]
fn test_ranking_single_run_is_champion() {
	let ranking = rank(&[Some(101.0)]);
	assert_eq!(ranking.extremes.best, Some(101.0));
	assert_eq!(ranking.extremes.second_best, None);
	assert_eq!(ranking.labels, vec![RankLabel::Champion]);
}

#[test]
fn test_ranking_empty() {
	let ranking = rank(&[]);
	assert_eq!(ranking.extremes.best, None);
	assert_eq!(ranking.extremes.second_best, None);
	assert!(ranking.labels.is_empty());
}

#[test]
fn test_ranking_unknown_scores() {
	let ranking = rank(&[None, Some(100.0), Some(f64::NAN), Some(110.0)]);
	assert_eq!(
		ranking.labels,
		vec![
			RankLabel::Unknown,
			RankLabel::Champion,
			RankLabel::Unknown,
			RankLabel::Challenger,
		]
	);
	let ranking = rank(&[None, None]);
	assert_eq!(ranking.extremes.best, None);
	assert_eq!(ranking.labels, vec![RankLabel::Unknown, RankLabel::Unknown]);
}

#[test]
fn test_ranking_is_idempotent() {
	let scores = [Some(98.25), Some(97.0), None, Some(98.25), Some(150.0)];
	assert_eq!(rank(&scores), rank(&scores));
}
