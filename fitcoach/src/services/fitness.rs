use std::sync::Arc;

use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::{BodyMetrics, CardioSession, FitnessSnapshot, WorkoutEntry};

pub const RECENT_WORKOUTS_LIMIT: u32 = 5;
pub const RECENT_CARDIO_LIMIT: u32 = 5;

/// Summary used when the tracker has no workouts, cardio or metrics at all.
pub const NO_FITNESS_DATA: &str = "No fitness data available yet.";

/// Reads the user's latest logged activity and renders it for the prompt.
#[derive(Clone)]
pub struct FitnessContextBuilder {
    db: Arc<dyn DatabaseBackend>,
}

impl FitnessContextBuilder {
    pub fn new(db: Arc<dyn DatabaseBackend>) -> Self {
        Self { db }
    }

    pub async fn build_snapshot(&self) -> Result<FitnessSnapshot> {
        let recent_workouts = self.db.recent_workouts(RECENT_WORKOUTS_LIMIT).await?;
        let recent_cardio = self.db.recent_cardio(RECENT_CARDIO_LIMIT).await?;
        let latest_metrics = self.db.latest_body_metrics().await?;

        tracing::debug!(
            workouts = recent_workouts.len(),
            cardio = recent_cardio.len(),
            has_metrics = latest_metrics.is_some(),
            "Built fitness snapshot"
        );

        Ok(FitnessSnapshot {
            recent_workouts,
            recent_cardio,
            latest_metrics,
        })
    }

    /// Render blocks in fixed order: metrics, workouts, cardio. Each block is
    /// emitted only when its category has data.
    pub fn render_summary(snapshot: &FitnessSnapshot) -> String {
        if snapshot.is_empty() {
            return NO_FITNESS_DATA.to_string();
        }

        let mut summary = String::from("User Fitness Data:\n\n");

        if let Some(metrics) = &snapshot.latest_metrics {
            summary.push_str(&render_metrics(metrics));
        }

        if !snapshot.recent_workouts.is_empty() {
            summary.push_str("Recent Workouts:\n");
            for (i, workout) in snapshot.recent_workouts.iter().enumerate() {
                summary.push_str(&render_workout(i + 1, workout));
            }
            summary.push('\n');
        }

        if !snapshot.recent_cardio.is_empty() {
            summary.push_str("Recent Cardio:\n");
            for (i, session) in snapshot.recent_cardio.iter().enumerate() {
                summary.push_str(&render_cardio(i + 1, session));
            }
        }

        summary
    }
}

fn render_metrics(metrics: &BodyMetrics) -> String {
    let mut block = format!("Latest Metrics ({}):\n", metrics.date);
    match metrics.weight {
        Some(weight) => block.push_str(&format!("- Weight: {weight}kg\n")),
        None => block.push_str("- Weight: not recorded\n"),
    }
    // Zero means the field was left blank in the tracker.
    if let Some(body_fat) = metrics.body_fat_perc.filter(|bf| *bf != 0.0) {
        block.push_str(&format!("- Body Fat: {body_fat}%\n"));
    }
    block.push('\n');
    block
}

fn render_workout(position: usize, workout: &WorkoutEntry) -> String {
    let names = workout
        .exercises
        .iter()
        .map(|e| e.exercise_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let names = if names.is_empty() {
        "No exercises logged".to_string()
    } else {
        names
    };

    let mut line = format!("{position}. {}: {names}", workout.date);
    if let Some(duration) = workout.duration.filter(|d| *d > 0) {
        line.push_str(&format!(" ({duration} min)"));
    }
    line.push('\n');
    line
}

fn render_cardio(position: usize, session: &CardioSession) -> String {
    format!(
        "{position}. {}: {} - {}km in {} min\n",
        session.date,
        session.activity.as_deref().unwrap_or("n/a"),
        or_na(session.distance),
        or_na(session.duration),
    )
}

fn or_na<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}
