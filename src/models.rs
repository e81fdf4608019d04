use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub weight_kg: f64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbUser {
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub weight_kg: Option<f64>,
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self {
            id: user.user_id.unwrap_or_default(),
            name: user.name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
            weight_kg: user.weight_kg.unwrap_or_default(),
        }
    }
}

/// The `(id, name, email)` projection used for user pickers and friend lists.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserSummary {
    #[sqlx(rename = "user_id")]
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub duration_minutes: i64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbWorkout {
    pub workout_id: i64,
    pub user_id: i64,
    pub workout_date: NaiveDate,
    pub duration_minutes: Option<i64>,
}

impl From<DbWorkout> for Workout {
    fn from(workout: DbWorkout) -> Self {
        Self {
            id: workout.workout_id,
            user_id: workout.user_id,
            date: workout.workout_date,
            duration_minutes: workout.duration_minutes.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: i64,
    pub workout_id: i64,
    pub name: String,
    pub reps: i64,
    pub sets: i64,
    pub weight_kg: f64,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbExercise {
    pub exercise_id: i64,
    pub workout_id: i64,
    pub exercise_name: Option<String>,
    pub reps: Option<i64>,
    pub sets: Option<i64>,
    pub weight_lifted_kg: Option<f64>,
}

impl From<DbExercise> for Exercise {
    fn from(exercise: DbExercise) -> Self {
        Self {
            id: exercise.exercise_id,
            workout_id: exercise.workout_id,
            name: exercise.exercise_name.unwrap_or_default(),
            reps: exercise.reps.unwrap_or_default(),
            sets: exercise.sets.unwrap_or_default(),
            weight_kg: exercise.weight_lifted_kg.unwrap_or_default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub metric: String,
    pub target_value: f64,
    // Stored but never advanced by any operation.
    pub current_value: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbGoal {
    pub goal_id: i64,
    pub user_id: i64,
    pub goal_description: Option<String>,
    pub goal_metric: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl From<DbGoal> for Goal {
    fn from(goal: DbGoal) -> Self {
        Self {
            id: goal.goal_id,
            user_id: goal.user_id,
            description: goal.goal_description.unwrap_or_default(),
            metric: goal.goal_metric.unwrap_or_default(),
            target_value: goal.target_value.unwrap_or_default(),
            current_value: goal.current_value.unwrap_or_default(),
            start_date: goal.start_date,
            end_date: goal.end_date,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub name: String,
    pub total_minutes: i64,
}

/// Operator-facing aggregate statistics, recomputed on every request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BusinessInsights {
    pub total_users: i64,
    pub total_workouts: i64,
    pub avg_workout_duration: f64,
    pub max_workout_duration: i64,
    pub most_common_exercise: String,
}

impl Default for BusinessInsights {
    fn default() -> Self {
        Self {
            total_users: 0,
            total_workouts: 0,
            avg_workout_duration: 0.0,
            max_workout_duration: 0,
            most_common_exercise: NO_EXERCISES.to_string(),
        }
    }
}

pub const NO_EXERCISES: &str = "N/A";
