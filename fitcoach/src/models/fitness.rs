use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub exercise_name: String,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub date: String,
    /// Minutes.
    pub duration: Option<i64>,
    pub notes: Option<String>,
    pub exercises: Vec<ExerciseEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardioSession {
    pub date: String,
    pub activity: Option<String>,
    /// Kilometres.
    pub distance: Option<f64>,
    /// Minutes.
    pub duration: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMetrics {
    pub date: String,
    pub weight: Option<f64>,
    pub body_fat_perc: Option<f64>,
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub bicep: Option<f64>,
    pub thigh: Option<f64>,
}

/// Digest of the user's most recent logged activity. Recomputed per question,
/// never persisted. Lists are most-recent-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessSnapshot {
    pub recent_workouts: Vec<WorkoutEntry>,
    pub recent_cardio: Vec<CardioSession>,
    pub latest_metrics: Option<BodyMetrics>,
}

impl FitnessSnapshot {
    pub fn is_empty(&self) -> bool {
        self.latest_metrics.is_none()
            && self.recent_workouts.is_empty()
            && self.recent_cardio.is_empty()
    }
}
