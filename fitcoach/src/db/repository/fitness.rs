use libsql::{params, Connection};

use super::{value_as_f64, value_as_i64, value_as_string};
use crate::error::Result;
use crate::models::{BodyMetrics, CardioSession, ExerciseEntry, WorkoutEntry};

/// Reads from the tracker's tables. Nothing here writes.
pub struct FitnessRepository;

impl FitnessRepository {
    /// Most recent workouts first, each with its exercises in logging order.
    pub async fn recent_workouts(conn: &Connection, limit: u32) -> Result<Vec<WorkoutEntry>> {
        let mut rows = conn
            .query(
                "SELECT id, date, duration, notes FROM workouts ORDER BY date DESC, id DESC LIMIT ?1",
                params![limit as i64],
            )
            .await?;

        let mut headers = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: i64 = row.get(0)?;
            headers.push((
                id,
                value_as_string(row.get_value(1)?).unwrap_or_default(),
                value_as_i64(row.get_value(2)?),
                value_as_string(row.get_value(3)?),
            ));
        }

        let mut workouts = Vec::with_capacity(headers.len());
        for (id, date, duration, notes) in headers {
            workouts.push(WorkoutEntry {
                date,
                duration,
                notes,
                exercises: Self::exercises_for(conn, id).await?,
            });
        }

        Ok(workouts)
    }

    async fn exercises_for(conn: &Connection, workout_id: i64) -> Result<Vec<ExerciseEntry>> {
        let mut rows = conn
            .query(
                r#"
                SELECT exercise_name, sets, reps, weight
                FROM workout_exercises
                WHERE workout_id = ?1
                ORDER BY id ASC
                "#,
                params![workout_id],
            )
            .await?;

        let mut exercises = Vec::new();
        while let Some(row) = rows.next().await? {
            exercises.push(ExerciseEntry {
                exercise_name: value_as_string(row.get_value(0)?).unwrap_or_default(),
                sets: value_as_i64(row.get_value(1)?),
                reps: value_as_i64(row.get_value(2)?),
                weight: value_as_f64(row.get_value(3)?),
            });
        }
        Ok(exercises)
    }

    pub async fn recent_cardio(conn: &Connection, limit: u32) -> Result<Vec<CardioSession>> {
        let mut rows = conn
            .query(
                r#"
                SELECT date, type, distance, duration, notes
                FROM cardio_logs
                ORDER BY date DESC, id DESC
                LIMIT ?1
                "#,
                params![limit as i64],
            )
            .await?;

        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(CardioSession {
                date: value_as_string(row.get_value(0)?).unwrap_or_default(),
                activity: value_as_string(row.get_value(1)?),
                distance: value_as_f64(row.get_value(2)?),
                duration: value_as_i64(row.get_value(3)?),
                notes: value_as_string(row.get_value(4)?),
            });
        }
        Ok(sessions)
    }

    pub async fn latest_body_metrics(conn: &Connection) -> Result<Option<BodyMetrics>> {
        let mut rows = conn
            .query(
                r#"
                SELECT date, weight, body_fat_perc, chest, waist, hips, bicep, thigh
                FROM body_metrics
                ORDER BY date DESC, id DESC
                LIMIT 1
                "#,
                (),
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(BodyMetrics {
                date: value_as_string(row.get_value(0)?).unwrap_or_default(),
                weight: value_as_f64(row.get_value(1)?),
                body_fat_perc: value_as_f64(row.get_value(2)?),
                chest: value_as_f64(row.get_value(3)?),
                waist: value_as_f64(row.get_value(4)?),
                hips: value_as_f64(row.get_value(5)?),
                bicep: value_as_f64(row.get_value(6)?),
                thigh: value_as_f64(row.get_value(7)?),
            }))
        } else {
            Ok(None)
        }
    }
}
