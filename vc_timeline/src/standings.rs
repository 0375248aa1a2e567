//! Medal, rank and per-problem statistics for a finished contest.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::format::format_time_used;
use crate::model::{ContestBundle, MedalCutoffs, PROBLEM_MAX_SCORE};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn label(self) -> &'static str {
        match self {
            Medal::Gold => "Gold",
            Medal::Silver => "Silver",
            Medal::Bronze => "Bronze",
        }
    }

    fn slot(self) -> usize {
        match self {
            Medal::Gold => 0,
            Medal::Silver => 1,
            Medal::Bronze => 2,
        }
    }
}

impl MedalCutoffs {
    pub fn classify(&self, total: f64) -> Option<Medal> {
        if total >= self.gold {
            Some(Medal::Gold)
        } else if total >= self.silver {
            Some(Medal::Silver)
        } else if total >= self.bronze {
            Some(Medal::Bronze)
        } else {
            None
        }
    }
}

/// Per-participant totals from per-problem score columns; short columns count as 0.
pub fn participant_totals(problem_scores: &[Vec<f64>]) -> Vec<f64> {
    let participants = problem_scores.iter().map(Vec::len).max().unwrap_or(0);
    (0..participants)
        .map(|i| {
            problem_scores
                .iter()
                .map(|column| column.get(i).copied().unwrap_or(0.0))
                .sum()
        })
        .collect()
}

/// Competition rank: one more than the number of strictly better scores.
pub fn rank(scores: &[f64], score: f64) -> u32 {
    1 + scores.iter().filter(|&&s| s > score).count() as u32
}

/// Share of the field strictly below `score`, rounded to a whole percent.
pub fn percentile(scores: &[f64], score: f64) -> Option<u32> {
    if scores.is_empty() {
        return None;
    }
    let below = scores.iter().filter(|&&s| s < score).count();
    Some((below as f64 / scores.len() as f64 * 100.0).round() as u32)
}

pub fn contest_mean(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some((scores.iter().sum::<f64>() / scores.len() as f64).round())
}

fn average(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// 0-based index of the problem with the lowest field average.
pub fn hardest_problem(problem_scores: &[Vec<f64>]) -> Option<usize> {
    problem_scores
        .iter()
        .enumerate()
        .filter_map(|(idx, column)| average(column).map(|avg| (idx, avg)))
        .min_by_key(|(_, avg)| OrderedFloat(*avg))
        .map(|(idx, _)| idx)
}

/// 0-based index of the problem with the highest field average.
pub fn easiest_problem(problem_scores: &[Vec<f64>]) -> Option<usize> {
    problem_scores
        .iter()
        .enumerate()
        .filter_map(|(idx, column)| average(column).map(|avg| (idx, avg)))
        .max_by_key(|(_, avg)| OrderedFloat(*avg))
        .map(|(idx, _)| idx)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProblemStanding {
    pub problem_index: u32,
    pub name: String,
    pub score: f64,
    pub rank: Option<u32>,
    pub field_size: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContestSummary {
    pub title: String,
    pub total: f64,
    pub max_score: f64,
    pub score_rate: u32,
    pub medal: Option<Medal>,
    pub medal_name: Option<String>,
    pub rank: Option<u32>,
    pub participants: Option<usize>,
    pub percentile: Option<u32>,
    pub contest_mean: Option<f64>,
    pub delta_vs_mean: Option<f64>,
    pub perfect_count: usize,
    pub attempted_count: usize,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub time_used: String,
    pub hardest: Option<String>,
    pub easiest: Option<String>,
    pub problems: Vec<ProblemStanding>,
}

impl ContestSummary {
    pub fn build(bundle: &ContestBundle) -> Self {
        let record = &bundle.contest;
        let scores = &record.per_problem_scores;
        let total = record.total();
        let max_score = bundle.problem_count() as f64 * PROBLEM_MAX_SCORE;

        let cutoffs = bundle.cutoffs();
        let medal = cutoffs.and_then(|c| c.classify(total));
        let medal_name = medal.map(|m| {
            bundle
                .scoring
                .as_ref()
                .and_then(|s| s.medal_names.as_ref())
                .and_then(|names| names.get(m.slot()))
                .cloned()
                .unwrap_or_else(|| m.label().to_string())
        });

        let field: &[Vec<f64>] = bundle
            .scoring
            .as_ref()
            .and_then(|s| s.problem_scores.as_deref())
            .unwrap_or(&[]);
        let totals = participant_totals(field);
        let has_field = !totals.is_empty();
        let mean = contest_mean(&totals);

        let mut sorted = scores.clone();
        sorted.sort_by_key(|s| OrderedFloat(*s));
        let median = match sorted.len() {
            0 => 0.0,
            n if n % 2 == 0 => ((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0).round(),
            n => sorted[n / 2].round(),
        };

        let problems = scores
            .iter()
            .enumerate()
            .map(|(idx, &score)| {
                let column = field.get(idx).filter(|c| !c.is_empty());
                ProblemStanding {
                    problem_index: idx as u32 + 1,
                    name: bundle.problem_name(idx as u32 + 1),
                    score,
                    rank: column.map(|c| rank(c, score)),
                    field_size: column.map(Vec::len),
                }
            })
            .collect();

        Self {
            title: record.title(),
            total,
            max_score,
            score_rate: if max_score > 0.0 {
                (total / max_score * 100.0).round().max(0.0) as u32
            } else {
                0
            },
            medal,
            medal_name,
            rank: has_field.then(|| rank(&totals, total)),
            participants: has_field.then_some(totals.len()),
            percentile: percentile(&totals, total),
            contest_mean: mean,
            delta_vs_mean: mean.map(|m| total - m),
            perfect_count: scores.iter().filter(|&&s| s == PROBLEM_MAX_SCORE).count(),
            attempted_count: scores.iter().filter(|&&s| s > 0.0).count(),
            average: average(scores).map(f64::round).unwrap_or(0.0),
            median,
            min: sorted.first().copied().unwrap_or(0.0),
            max: sorted.last().copied().unwrap_or(0.0),
            time_used: format_time_used(record.elapsed_minutes()),
            hardest: hardest_problem(field).map(|i| bundle.problem_name(i as u32 + 1)),
            easiest: easiest_problem(field).map(|i| bundle.problem_name(i as u32 + 1)),
            problems,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Vec<Vec<f64>> {
        vec![
            vec![100.0, 100.0, 40.0, 0.0],
            vec![50.0, 20.0, 20.0, 0.0],
            vec![30.0, 0.0, 0.0],
        ]
    }

    #[test]
    fn classify_uses_inclusive_cutoffs() {
        let cutoffs = MedalCutoffs::new(250.0, 180.0, 120.0);
        assert_eq!(cutoffs.classify(250.0), Some(Medal::Gold));
        assert_eq!(cutoffs.classify(249.9), Some(Medal::Silver));
        assert_eq!(cutoffs.classify(120.0), Some(Medal::Bronze));
        assert_eq!(cutoffs.classify(119.0), None);
    }

    #[test]
    fn totals_pad_short_columns() {
        assert_eq!(participant_totals(&field()), vec![180.0, 120.0, 60.0, 0.0]);
        assert!(participant_totals(&[]).is_empty());
    }

    #[test]
    fn ties_share_the_best_rank() {
        let totals = [180.0, 120.0, 120.0, 0.0];
        assert_eq!(rank(&totals, 200.0), 1);
        assert_eq!(rank(&totals, 180.0), 1);
        assert_eq!(rank(&totals, 120.0), 2);
        assert_eq!(rank(&totals, 50.0), 4);
    }

    #[test]
    fn percentile_and_mean() {
        let totals = [180.0, 120.0, 60.0, 0.0];
        assert_eq!(percentile(&totals, 120.0), Some(50));
        assert_eq!(percentile(&totals, 0.0), Some(0));
        assert_eq!(percentile(&[], 10.0), None);
        assert_eq!(contest_mean(&totals), Some(90.0));
    }

    #[test]
    fn hardest_and_easiest_by_average() {
        assert_eq!(hardest_problem(&field()), Some(2));
        assert_eq!(easiest_problem(&field()), Some(0));
        assert_eq!(hardest_problem(&[]), None);
    }

    #[test]
    fn summary_from_bundle() {
        let json = r#"{
            "contest": {
                "started_at": "2024-05-01T09:00:00Z",
                "ended_at": "2024-05-01T11:05:00Z",
                "per_problem_scores": "[100, 20, 0]",
                "contest_source": "IOI", "contest_year": 2023, "contest_stage": "Day 1"
            },
            "scoring": {
                "medal_cutoffs": [250, 150, 100],
                "problem_scores": [[100, 100, 40, 0], [50, 20, 20, 0], [30, 0, 0]]
            },
            "problem_names": ["Alpha", "", "Gamma"]
        }"#;
        let bundle = ContestBundle::from_json(json).unwrap();
        let summary = ContestSummary::build(&bundle);
        assert_eq!(summary.title, "IOI 2023 Day 1");
        assert_eq!(summary.total, 120.0);
        assert_eq!(summary.max_score, 300.0);
        assert_eq!(summary.score_rate, 40);
        assert_eq!(summary.medal, Some(Medal::Bronze));
        assert_eq!(summary.medal_name.as_deref(), Some("Bronze"));
        assert_eq!(summary.rank, Some(2));
        assert_eq!(summary.participants, Some(4));
        assert_eq!(summary.percentile, Some(50));
        assert_eq!(summary.contest_mean, Some(90.0));
        assert_eq!(summary.delta_vs_mean, Some(30.0));
        assert_eq!(summary.perfect_count, 1);
        assert_eq!(summary.attempted_count, 2);
        assert_eq!(summary.average, 40.0);
        assert_eq!(summary.median, 20.0);
        assert_eq!((summary.min, summary.max), (0.0, 100.0));
        assert_eq!(summary.time_used, "2h 5m");
        assert_eq!(summary.hardest.as_deref(), Some("Gamma"));
        assert_eq!(summary.easiest.as_deref(), Some("Alpha"));
        assert_eq!(summary.problems[1].name, "Problem 2");
        assert_eq!(summary.problems[1].rank, Some(2));
        assert_eq!(summary.problems[1].field_size, Some(4));
    }

    #[test]
    fn summary_without_field_data() {
        let json = r#"{"contest": {"started_at": "2024-05-01T09:00:00Z", "ended_at": "2024-05-01T09:45:00Z"}}"#;
        let summary = ContestSummary::build(&ContestBundle::from_json(json).unwrap());
        assert_eq!(summary.max_score, 300.0);
        assert_eq!(summary.rank, None);
        assert_eq!(summary.medal, None);
        assert_eq!(summary.time_used, "45m");
        assert!(summary.problems.is_empty());
    }

    #[test]
    fn perfect_means_exactly_full_marks() {
        let json = r#"{"contest": {
            "started_at": "2024-05-01T09:00:00Z",
            "ended_at": "2024-05-01T10:00:00Z",
            "per_problem_scores": [100, 120, 99.5]
        }}"#;
        let summary = ContestSummary::build(&ContestBundle::from_json(json).unwrap());
        assert_eq!(summary.perfect_count, 1);
        assert_eq!(summary.attempted_count, 3);
    }
}
