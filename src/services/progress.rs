//! Weighted technical progress for field-service orders.
//!
//! Every order that needs an installation crew walks through the same five
//! checklist steps. Each step carries an integer weight and the weights add up
//! to 100. A completed step contributes its full weight, a step in progress
//! contributes half of it. Contributions are summed as integer half-points and
//! converted to a percentage once, so an all-completed checklist is exactly
//! `100.0`.
//!
//! This module has no I/O; persistence lives in
//! [`technical_progress`](super::technical_progress).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("Unknown progress step '{0}'")]
    UnknownStep(String),

    #[error("Invalid step status '{0}', expected not_started, in_progress or completed")]
    InvalidStatus(String),
}

/// One of the five fixed checklist steps, in workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
    Survey,
    Installation,
    Certification,
    Paperwork,
    KwhMeter,
}

impl StepKind {
    pub const ALL: [StepKind; 5] = [
        StepKind::Survey,
        StepKind::Installation,
        StepKind::Certification,
        StepKind::Paperwork,
        StepKind::KwhMeter,
    ];

    /// Name shown to operators and stored in the database
    pub fn display_name(self) -> &'static str {
        match self {
            StepKind::Survey => "Survey Teknis",
            StepKind::Installation => "Pemasangan/Instalasi",
            StepKind::Certification => "Pemeriksaan NIDI/SLO",
            StepKind::Paperwork => "Pemberkasan Teknis",
            StepKind::KwhMeter => "Pemasangan KWH Meter",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            StepKind::Survey => "survey",
            StepKind::Installation => "installation",
            StepKind::Certification => "certification",
            StepKind::Paperwork => "paperwork",
            StepKind::KwhMeter => "kwh_meter",
        }
    }

    /// Percentage this step contributes once completed
    pub fn weight(self) -> u32 {
        match self {
            StepKind::Survey => 50,
            StepKind::Installation => 20,
            StepKind::Certification => 20,
            StepKind::Paperwork => 8,
            StepKind::KwhMeter => 2,
        }
    }

    /// Position in the checklist, starting at 0
    pub fn position(self) -> usize {
        match self {
            StepKind::Survey => 0,
            StepKind::Installation => 1,
            StepKind::Certification => 2,
            StepKind::Paperwork => 3,
            StepKind::KwhMeter => 4,
        }
    }

    /// Resolve a step from its display name or short key (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.display_name().eq_ignore_ascii_case(name) || kind.key().eq_ignore_ascii_case(name)
        })
    }
}

impl FromStr for StepKind {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ProgressError::UnknownStep(s.to_string()))
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for StepKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

impl<'de> Deserialize<'de> for StepKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::NotStarted => "not_started",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
        }
    }

    /// Fraction of the step weight earned in this status
    pub fn factor(self) -> f64 {
        f64::from(self.half_points()) / 2.0
    }

    fn half_points(self) -> u32 {
        match self {
            StepStatus::NotStarted => 0,
            StepStatus::InProgress => 1,
            StepStatus::Completed => 2,
        }
    }
}

impl FromStr for StepStatus {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "not_started" => Ok(StepStatus::NotStarted),
            "in_progress" => Ok(StepStatus::InProgress),
            "completed" => Ok(StepStatus::Completed),
            other => Err(ProgressError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStep {
    #[serde(rename = "step_name")]
    pub kind: StepKind,
    #[serde(rename = "step_weight")]
    pub weight: u32,
    pub status: StepStatus,
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressStep {
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            weight: kind.weight(),
            status: StepStatus::NotStarted,
            notes: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Move the step to `status`, maintaining its timestamps.
    ///
    /// `started_at` is stamped on entry into `in_progress` unless already set.
    /// `completed_at` is stamped on entry into `completed` and cleared when the
    /// step leaves it. Resetting to `not_started` clears both. Blank notes
    /// leave the existing notes untouched.
    pub fn transition(&mut self, status: StepStatus, notes: Option<String>, now: DateTime<Utc>) {
        match status {
            StepStatus::NotStarted => {
                self.started_at = None;
                self.completed_at = None;
            }
            StepStatus::InProgress => {
                self.started_at.get_or_insert(now);
                self.completed_at = None;
            }
            StepStatus::Completed => {
                if self.status != StepStatus::Completed || self.completed_at.is_none() {
                    self.completed_at = Some(now);
                }
            }
        }
        self.status = status;

        if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
            self.notes = Some(notes);
        }
    }

    fn half_points(&self) -> u32 {
        self.weight * self.status.half_points()
    }
}

/// A request to change one step of an order's checklist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepUpdate {
    pub step_name: String,
    pub status: StepStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The full checklist of one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderProgress {
    pub order_id: String,
    pub steps: Vec<ProgressStep>,
}

impl OrderProgress {
    /// Fresh checklist with every step `not_started`
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            steps: default_steps(),
        }
    }

    pub fn overall_progress(&self) -> f64 {
        overall_progress(&self.steps)
    }

    pub fn step(&self, kind: StepKind) -> Option<&ProgressStep> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    /// Apply an update and return the changed step.
    ///
    /// An unknown step name is rejected before anything is touched.
    pub fn apply(
        &mut self,
        update: StepUpdate,
        now: DateTime<Utc>,
    ) -> Result<&ProgressStep, ProgressError> {
        let kind: StepKind = update.step_name.parse()?;
        let step = self
            .steps
            .iter_mut()
            .find(|s| s.kind == kind)
            .ok_or(ProgressError::UnknownStep(update.step_name))?;
        step.transition(update.status, update.notes, now);
        Ok(step)
    }
}

pub fn default_steps() -> Vec<ProgressStep> {
    StepKind::ALL.into_iter().map(ProgressStep::new).collect()
}

/// Weighted completion percentage in `[0, 100]`; an empty list yields 0.
pub fn overall_progress(steps: &[ProgressStep]) -> f64 {
    let half_points: u32 = steps.iter().map(ProgressStep::half_points).sum();
    f64::from(half_points) / 2.0
}
