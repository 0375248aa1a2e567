//! Wire-level contest data as delivered by the virtual-contest backend.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::TimelineError;

pub type Timestamp = DateTime<Utc>;

/// Problem count assumed when neither metadata nor scores say otherwise.
pub const DEFAULT_PROBLEM_COUNT: u32 = 3;
/// Full marks for a single problem.
pub const PROBLEM_MAX_SCORE: f64 = 100.0;
/// Longest planned window a chart will lay out (one week).
pub const MAX_PLANNED_MINUTES: f64 = 7.0 * 24.0 * 60.0;

/// Planned durations that can be binned and gridded.
pub fn is_plannable(minutes: f64) -> bool {
    minutes.is_finite() && minutes > 0.0 && minutes <= MAX_PLANNED_MINUTES
}

/// One scored attempt.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    #[serde(rename = "submission_time", deserialize_with = "de_timestamp")]
    pub time: Timestamp,
    pub problem_index: u32,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub subtask_scores: Option<Vec<f64>>,
}

impl Submission {
    pub fn new(time: Timestamp, problem_index: u32, subtask_scores: Vec<f64>) -> Self {
        let score = subtask_scores.iter().sum();
        Self {
            time,
            problem_index,
            score,
            subtask_scores: Some(subtask_scores),
        }
    }

    pub fn subtasks(&self) -> &[f64] {
        self.subtask_scores.as_deref().unwrap_or(&[])
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContestRecord {
    #[serde(deserialize_with = "de_timestamp")]
    pub started_at: Timestamp,
    #[serde(deserialize_with = "de_timestamp")]
    pub ended_at: Timestamp,
    #[serde(default)]
    pub submissions: Vec<Submission>,
    #[serde(default, deserialize_with = "de_scores")]
    pub per_problem_scores: Vec<f64>,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub contest_name: Option<String>,
    #[serde(default)]
    pub contest_stage: Option<String>,
    #[serde(default)]
    pub contest_source: Option<String>,
    #[serde(default)]
    pub contest_year: Option<i32>,
}

impl ContestRecord {
    pub fn from_json(text: &str) -> Result<Self, TimelineError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Sum of the final per-problem scores, falling back to the stored total.
    pub fn total(&self) -> f64 {
        if self.per_problem_scores.is_empty() {
            self.total_score.unwrap_or(0.0)
        } else {
            self.per_problem_scores.iter().sum()
        }
    }

    pub fn elapsed_minutes(&self) -> i64 {
        (self.ended_at - self.started_at).num_minutes().max(0)
    }

    pub fn title(&self) -> String {
        [
            self.contest_source.clone(),
            self.contest_year.map(|y| y.to_string()),
            self.contest_stage.clone().or_else(|| self.contest_name.clone()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemRef {
    pub source: String,
    pub year: i32,
    pub number: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContestMeta {
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub problems: Vec<ProblemRef>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl ContestMeta {
    /// Planned duration, or `None` when absent, non-positive or beyond a week.
    pub fn planned_minutes(&self) -> Option<f64> {
        self.duration_minutes.filter(|minutes| is_plannable(*minutes))
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScoringMeta {
    #[serde(default)]
    pub medal_cutoffs: Option<Vec<f64>>,
    #[serde(default)]
    pub problem_scores: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub medal_names: Option<Vec<String>>,
}

impl ScoringMeta {
    pub fn cutoffs(&self) -> Option<MedalCutoffs> {
        self.medal_cutoffs
            .as_deref()
            .and_then(MedalCutoffs::from_slice)
    }
}

/// Gold/silver/bronze score thresholds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MedalCutoffs {
    pub gold: f64,
    pub silver: f64,
    pub bronze: f64,
}

impl MedalCutoffs {
    pub fn new(gold: f64, silver: f64, bronze: f64) -> Self {
        Self {
            gold,
            silver,
            bronze,
        }
    }

    /// Backend order is `[gold, silver, bronze]`; shorter lists mean no cutoffs.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [gold, silver, bronze, ..] if [gold, silver, bronze].iter().all(|v| v.is_finite()) => {
                Some(Self::new(*gold, *silver, *bronze))
            }
            _ => None,
        }
    }
}

/// Everything a host needs to draw one contest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContestBundle {
    pub contest: ContestRecord,
    #[serde(default)]
    pub meta: ContestMeta,
    #[serde(default)]
    pub scoring: Option<ScoringMeta>,
    #[serde(default)]
    pub problem_names: Vec<String>,
}

impl ContestBundle {
    pub fn from_json(text: &str) -> Result<Self, TimelineError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Problem count from metadata or final scores. Submissions never widen it.
    pub fn problem_count(&self) -> u32 {
        let from_meta = self.meta.problems.len() as u32;
        let from_scores = self.contest.per_problem_scores.len() as u32;
        let count = from_meta.max(from_scores);
        if count == 0 {
            DEFAULT_PROBLEM_COUNT
        } else {
            count
        }
    }

    /// Planned duration, for hosts that reject undrawable contests up front.
    pub fn require_duration(&self) -> Result<f64, TimelineError> {
        self.meta
            .planned_minutes()
            .ok_or(TimelineError::MissingDuration)
    }

    pub fn max_score(&self) -> f64 {
        self.problem_count() as f64 * PROBLEM_MAX_SCORE
    }

    pub fn cutoffs(&self) -> Option<MedalCutoffs> {
        self.scoring.as_ref().and_then(ScoringMeta::cutoffs)
    }

    /// Display name for a 1-based problem index.
    pub fn problem_name(&self, problem_index: u32) -> String {
        problem_index
            .checked_sub(1)
            .and_then(|i| self.problem_names.get(i as usize))
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| default_problem_name(problem_index))
    }
}

pub fn default_problem_name(problem_index: u32) -> String {
    format!("Problem {problem_index}")
}

/// Parse backend timestamps: RFC 3339, or a naive date-time taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, TimelineError> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(TimelineError::InvalidTimestamp(raw.to_string()))
}

pub(crate) fn millis(ts: &Timestamp) -> f64 {
    ts.timestamp_millis() as f64
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoresRepr {
    List(Vec<f64>),
    Encoded(String),
}

// The backend stores per-problem scores as a JSON string column.
fn de_scores<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ScoresRepr>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(ScoresRepr::List(values)) => Ok(values),
        Some(ScoresRepr::Encoded(text)) if text.trim().is_empty() => Ok(Vec::new()),
        Some(ScoresRepr::Encoded(text)) => {
            serde_json::from_str(&text).map_err(serde::de::Error::custom)
        }
    }
}
