//! Best-so-far aggregation of subtask submissions into step series.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Submission, Timestamp};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct StepPoint {
    pub time: Timestamp,
    pub value: f64,
}

/// Right-continuous step function over the contest window.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StepSeries {
    points: Vec<StepPoint>,
}

impl StepSeries {
    fn starting_at(start: Timestamp) -> Self {
        Self {
            points: vec![StepPoint {
                time: start,
                value: 0.0,
            }],
        }
    }

    fn push(&mut self, time: Timestamp, value: f64) {
        self.points.push(StepPoint { time, value });
    }

    fn terminate(&mut self, end: Timestamp) {
        let last = self.last_value();
        if self.points.last().map(|p| p.time) != Some(end) {
            self.push(end, last);
        }
    }

    pub fn points(&self) -> &[StepPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_value(&self) -> f64 {
        self.points.last().map(|p| p.value).unwrap_or(0.0)
    }

    /// Value of the step function at `time` (0 before the first point).
    pub fn value_at(&self, time: Timestamp) -> f64 {
        let idx = self.points.partition_point(|p| p.time <= time);
        if idx == 0 {
            0.0
        } else {
            self.points[idx - 1].value
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SeriesSet {
    pub per_problem: BTreeMap<u32, StepSeries>,
    pub total: StepSeries,
}

impl SeriesSet {
    pub fn problem(&self, problem_index: u32) -> Option<&StepSeries> {
        self.per_problem.get(&problem_index)
    }
}

/// Running per-subtask maxima for one problem.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BestSoFar {
    best: Vec<f64>,
}

impl BestSoFar {
    /// Fold one submission in and return the problem's new cumulative score.
    pub fn absorb(&mut self, subtasks: &[f64]) -> f64 {
        if subtasks.len() > self.best.len() {
            self.best.resize(subtasks.len(), 0.0);
        }
        for (slot, &score) in self.best.iter_mut().zip(subtasks) {
            if score.is_finite() && score > *slot {
                *slot = score;
            }
        }
        self.total()
    }

    pub fn total(&self) -> f64 {
        self.best.iter().sum()
    }

    pub fn subtasks(&self) -> &[f64] {
        &self.best
    }
}

fn sorted_by_time(submissions: &[Submission]) -> Vec<&Submission> {
    let mut sorted: Vec<&Submission> = submissions.iter().collect();
    sorted.sort_by_key(|s| s.time);
    sorted
}

/// Build per-problem and total step series for `1..=problem_count`.
///
/// Problem series only gain a point when that problem's score changes; the
/// total gains one at every accepted submission. Submissions outside
/// `[start, end]` or naming an unknown problem are skipped.
pub fn build_series(
    submissions: &[Submission],
    problem_count: u32,
    start: Timestamp,
    end: Timestamp,
) -> SeriesSet {
    let end = end.max(start);
    let mut per_problem: BTreeMap<u32, StepSeries> = (1..=problem_count)
        .map(|p| (p, StepSeries::starting_at(start)))
        .collect();
    let mut state: BTreeMap<u32, BestSoFar> = BTreeMap::new();
    let mut current: BTreeMap<u32, f64> = BTreeMap::new();
    let mut total = StepSeries::starting_at(start);

    for submission in sorted_by_time(submissions) {
        if submission.time < start || submission.time > end {
            debug!(time = %submission.time, "submission outside contest window skipped");
            continue;
        }
        let Some(series) = per_problem.get_mut(&submission.problem_index) else {
            debug!(
                problem = submission.problem_index,
                "submission for unknown problem skipped"
            );
            continue;
        };
        let best = state.entry(submission.problem_index).or_default();
        let previous = best.total();
        let updated = best.absorb(submission.subtasks());
        if updated != previous {
            series.push(submission.time, updated);
            current.insert(submission.problem_index, updated);
        }
        total.push(submission.time, current.values().sum());
    }

    for series in per_problem.values_mut() {
        series.terminate(end);
    }
    total.terminate(end);

    SeriesSet { per_problem, total }
}

/// One plotted submission with the score it added to its problem.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub time: Timestamp,
    pub problem_index: u32,
    pub score: f64,
    pub delta: f64,
}

/// Replay submissions in time order and report each one's gain.
pub fn timeline_events(submissions: &[Submission]) -> Vec<TimelineEvent> {
    let mut state: BTreeMap<u32, BestSoFar> = BTreeMap::new();
    sorted_by_time(submissions)
        .into_iter()
        .map(|submission| {
            let best = state.entry(submission.problem_index).or_default();
            let previous = best.total();
            let updated = best.absorb(submission.subtasks());
            TimelineEvent {
                time: submission.time,
                problem_index: submission.problem_index,
                score: submission.score,
                delta: updated - previous,
            }
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProblemResult {
    pub problem_index: u32,
    pub score: f64,
    pub subtask_scores: Vec<f64>,
    /// Earliest submission at which the final score was reached.
    pub first_reached_at: Option<Timestamp>,
}

/// Final best result for every problem in `1..=problem_count`.
pub fn final_results(submissions: &[Submission], problem_count: u32) -> Vec<ProblemResult> {
    let mut results: Vec<ProblemResult> = (1..=problem_count)
        .map(|problem_index| ProblemResult {
            problem_index,
            score: 0.0,
            subtask_scores: Vec::new(),
            first_reached_at: None,
        })
        .collect();
    let mut state: Vec<BestSoFar> = vec![BestSoFar::default(); problem_count as usize];

    for submission in sorted_by_time(submissions) {
        let Some(slot) = submission
            .problem_index
            .checked_sub(1)
            .map(|i| i as usize)
            .filter(|&i| i < results.len())
        else {
            continue;
        };
        let best = &mut state[slot];
        let previous = best.total();
        let updated = best.absorb(submission.subtasks());
        let result = &mut results[slot];
        if updated > previous {
            result.first_reached_at = Some(submission.time);
        }
        result.score = updated;
        result.subtask_scores = best.subtasks().to_vec();
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn at(minutes: i64) -> Timestamp {
        start() + Duration::minutes(minutes)
    }

    fn sub(minutes: i64, problem: u32, subtasks: &[f64]) -> Submission {
        Submission::new(at(minutes), problem, subtasks.to_vec())
    }

    fn values(series: &StepSeries) -> Vec<(i64, f64)> {
        series
            .points()
            .iter()
            .map(|p| ((p.time - start()).num_minutes(), p.value))
            .collect()
    }

    #[test]
    fn best_so_far_keeps_subtask_maxima() {
        let mut best = BestSoFar::default();
        assert_eq!(best.absorb(&[10.0, 0.0]), 10.0);
        assert_eq!(best.absorb(&[0.0, 20.0, 5.0]), 35.0);
        assert_eq!(best.absorb(&[5.0]), 35.0);
        assert_eq!(best.subtasks(), &[10.0, 20.0, 5.0]);
    }

    #[test]
    fn flat_submissions_do_not_add_problem_points() {
        let subs = vec![
            sub(5, 1, &[30.0]),
            sub(15, 1, &[10.0]),
            sub(25, 1, &[30.0]),
        ];
        let set = build_series(&subs, 1, start(), at(60));
        assert_eq!(values(set.problem(1).unwrap()), vec![(0, 0.0), (5, 30.0), (60, 30.0)]);
        // total observes every submission
        assert_eq!(
            values(&set.total),
            vec![(0, 0.0), (5, 30.0), (15, 30.0), (25, 30.0), (60, 30.0)]
        );
    }

    #[test]
    fn unsorted_input_is_replayed_in_time_order() {
        let subs = vec![sub(30, 1, &[0.0, 50.0]), sub(10, 1, &[20.0, 0.0])];
        let set = build_series(&subs, 1, start(), at(60));
        assert_eq!(values(set.problem(1).unwrap()), vec![(0, 0.0), (10, 20.0), (30, 70.0), (60, 70.0)]);
    }

    #[test]
    fn missing_subtasks_contribute_nothing() {
        let mut broken = sub(10, 1, &[]);
        broken.subtask_scores = None;
        broken.score = 77.0;
        let set = build_series(&[broken], 2, start(), at(60));
        assert_eq!(set.problem(1).unwrap().last_value(), 0.0);
        assert_eq!(values(&set.total), vec![(0, 0.0), (10, 0.0), (60, 0.0)]);
    }

    #[test]
    fn out_of_window_and_unknown_problems_are_skipped() {
        let subs = vec![
            sub(-5, 1, &[10.0]),
            sub(10, 4, &[10.0]),
            sub(90, 1, &[10.0]),
        ];
        let set = build_series(&subs, 3, start(), at(60));
        assert_eq!(set.per_problem.len(), 3);
        assert_eq!(values(&set.total), vec![(0, 0.0), (60, 0.0)]);
    }

    #[test]
    fn submission_at_end_is_not_duplicated() {
        let set = build_series(&[sub(60, 1, &[40.0])], 1, start(), at(60));
        assert_eq!(values(set.problem(1).unwrap()), vec![(0, 0.0), (60, 40.0)]);
        assert_eq!(values(&set.total), vec![(0, 0.0), (60, 40.0)]);
    }

    #[test]
    fn value_at_follows_steps() {
        let set = build_series(&[sub(10, 1, &[40.0])], 1, start(), at(60));
        let series = set.problem(1).unwrap();
        assert_eq!(series.value_at(at(-1)), 0.0);
        assert_eq!(series.value_at(at(9)), 0.0);
        assert_eq!(series.value_at(at(10)), 40.0);
        assert_eq!(series.value_at(at(59)), 40.0);
    }

    #[test]
    fn timeline_events_report_gain() {
        let subs = vec![
            sub(10, 1, &[20.0, 0.0]),
            sub(20, 1, &[10.0, 30.0]),
            sub(30, 1, &[20.0, 30.0]),
        ];
        let deltas: Vec<f64> = timeline_events(&subs).iter().map(|e| e.delta).collect();
        assert_eq!(deltas, vec![20.0, 30.0, 0.0]);
    }

    #[test]
    fn final_results_track_first_time_final_score_reached() {
        let subs = vec![
            sub(10, 2, &[20.0]),
            sub(40, 2, &[60.0]),
            sub(50, 2, &[60.0]),
        ];
        let results = final_results(&subs, 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].score, 0.0);
        assert_eq!(results[0].first_reached_at, None);
        assert_eq!(results[1].score, 60.0);
        assert_eq!(results[1].first_reached_at, Some(at(40)));
        assert_eq!(results[1].subtask_scores, vec![60.0]);
    }
}
