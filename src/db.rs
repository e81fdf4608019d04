use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{error, info, instrument};

use crate::env::DbConfig;
use crate::error::AppError;
use crate::models::{
    BusinessInsights, DbExercise, DbGoal, DbUser, DbWorkout, Exercise, Goal, LeaderboardEntry,
    NO_EXERCISES, User, UserSummary, Workout,
};

/// Opens the store. Failure is logged and reported as `None`; the caller
/// decides whether that is fatal.
#[instrument]
pub async fn connect(config: &DbConfig) -> Option<Pool<Sqlite>> {
    info!("Connecting to database");
    let options = match SqliteConnectOptions::from_str(&config.database_url) {
        Ok(options) => options.foreign_keys(true),
        Err(e) => {
            error!(error = %e, "Invalid DATABASE_URL");
            return None;
        }
    };

    match SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            error!(error = %e, "Error connecting to database");
            None
        }
    }
}

/// Releases every pooled connection. Dropping the pool has the same effect,
/// this just makes it happen now.
#[instrument(skip(pool))]
pub async fn close(pool: Pool<Sqlite>) {
    info!("Closing database connections");
    pool.close().await;
}

#[instrument(skip(pool))]
pub async fn migrate(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    info!("Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn create_user(
    pool: &Pool<Sqlite>,
    name: &str,
    email: &str,
    weight_kg: f64,
) -> Result<i64, AppError> {
    info!("Creating new user");
    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (name, email, weight_kg) VALUES (?, ?, ?) RETURNING user_id",
    )
    .bind(name)
    .bind(email)
    .bind(weight_kg)
    .fetch_one(pool)
    .await?;

    Ok(user_id)
}

#[instrument(skip(pool))]
pub async fn create_workout(
    pool: &Pool<Sqlite>,
    user_id: i64,
    date: NaiveDate,
    duration_minutes: i64,
) -> Result<i64, AppError> {
    info!("Creating workout");
    let workout_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO workouts (user_id, workout_date, duration_minutes)
         VALUES (?, ?, ?)
         RETURNING workout_id",
    )
    .bind(user_id)
    .bind(date)
    .bind(duration_minutes)
    .fetch_one(pool)
    .await?;

    Ok(workout_id)
}

#[instrument(skip(pool))]
pub async fn create_exercise(
    pool: &Pool<Sqlite>,
    workout_id: i64,
    name: &str,
    reps: i64,
    sets: i64,
    weight_kg: f64,
) -> Result<(), AppError> {
    info!("Creating exercise");
    sqlx::query(
        "INSERT INTO exercises (workout_id, exercise_name, reps, sets, weight_lifted_kg)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(workout_id)
    .bind(name)
    .bind(reps)
    .bind(sets)
    .bind(weight_kg)
    .execute(pool)
    .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn add_friend(pool: &Pool<Sqlite>, user_id: i64, friend_id: i64) -> Result<(), AppError> {
    info!("Adding friend");
    sqlx::query("INSERT INTO friends (user_id, friend_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(friend_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn create_goal(
    pool: &Pool<Sqlite>,
    user_id: i64,
    description: &str,
    metric: &str,
    target_value: f64,
) -> Result<(), AppError> {
    info!("Creating goal");
    sqlx::query(
        "INSERT INTO goals (user_id, goal_description, goal_metric, target_value)
         VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(description)
    .bind(metric)
    .bind(target_value)
    .execute(pool)
    .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn get_user_by_email(pool: &Pool<Sqlite>, email: &str) -> Result<Option<User>, AppError> {
    info!("Getting user by email");
    let row = sqlx::query_as::<_, DbUser>(
        "SELECT user_id, name, email, weight_kg FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(User::from))
}

#[instrument(skip(pool))]
pub async fn get_user_by_id(pool: &Pool<Sqlite>, user_id: i64) -> Result<Option<User>, AppError> {
    info!("Getting user by ID");
    let row = sqlx::query_as::<_, DbUser>(
        "SELECT user_id, name, email, weight_kg FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(User::from))
}

#[instrument(skip(pool))]
pub async fn get_all_users(pool: &Pool<Sqlite>) -> Result<Vec<UserSummary>, AppError> {
    info!("Getting all users");
    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT user_id, name, email FROM users ORDER BY user_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

#[instrument(skip(pool))]
pub async fn get_user_workouts(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<Workout>, AppError> {
    info!("Getting user workouts");
    let rows = sqlx::query_as::<_, DbWorkout>(
        "SELECT workout_id, user_id, workout_date, duration_minutes
         FROM workouts
         WHERE user_id = ?
         ORDER BY workout_date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Workout::from).collect())
}

#[instrument(skip(pool))]
pub async fn get_workout_exercises(
    pool: &Pool<Sqlite>,
    workout_id: i64,
) -> Result<Vec<Exercise>, AppError> {
    info!("Getting workout exercises");
    let rows = sqlx::query_as::<_, DbExercise>(
        "SELECT exercise_id, workout_id, exercise_name, reps, sets, weight_lifted_kg
         FROM exercises
         WHERE workout_id = ?
         ORDER BY exercise_id",
    )
    .bind(workout_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Exercise::from).collect())
}

/// Outbound friends only: users this user has added.
#[instrument(skip(pool))]
pub async fn get_user_friends(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Vec<UserSummary>, AppError> {
    info!("Getting user friends");
    let friends = sqlx::query_as::<_, UserSummary>(
        "SELECT u.user_id, u.name, u.email
         FROM friends f
         JOIN users u ON f.friend_id = u.user_id
         WHERE f.user_id = ?
         ORDER BY u.user_id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(friends)
}

#[instrument(skip(pool))]
pub async fn get_user_goals(pool: &Pool<Sqlite>, user_id: i64) -> Result<Vec<Goal>, AppError> {
    info!("Getting user goals");
    let rows = sqlx::query_as::<_, DbGoal>(
        "SELECT goal_id, user_id, goal_description, goal_metric, target_value,
                current_value, start_date, end_date
         FROM goals
         WHERE user_id = ?
         ORDER BY start_date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Goal::from).collect())
}

/// Total workout minutes per outbound friend over the last seven days,
/// today included, as seen by the store's clock. A workout dated exactly
/// seven days ago is outside the window, as is one dated in the future.
#[instrument(skip(pool))]
pub async fn get_leaderboard_data(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    info!("Getting leaderboard data");
    let entries = sqlx::query_as::<_, LeaderboardEntry>(
        "SELECT u.name AS name, SUM(w.duration_minutes) AS total_minutes
         FROM friends f
         JOIN workouts w ON f.friend_id = w.user_id
         JOIN users u ON w.user_id = u.user_id
         WHERE f.user_id = ?
           AND w.workout_date > date('now', '-7 days')
           AND w.workout_date <= date('now')
         GROUP BY u.name
         ORDER BY total_minutes DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

#[instrument(skip(pool))]
pub async fn update_user_profile(
    pool: &Pool<Sqlite>,
    user_id: i64,
    name: &str,
    email: &str,
    weight_kg: f64,
) -> Result<(), AppError> {
    info!("Updating user profile");
    sqlx::query("UPDATE users SET name = ?, email = ?, weight_kg = ? WHERE user_id = ?")
        .bind(name)
        .bind(email)
        .bind(weight_kg)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn delete_friend(
    pool: &Pool<Sqlite>,
    user_id: i64,
    friend_id: i64,
) -> Result<(), AppError> {
    info!("Deleting friend");
    sqlx::query("DELETE FROM friends WHERE user_id = ? AND friend_id = ?")
        .bind(user_id)
        .bind(friend_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn get_business_insights(pool: &Pool<Sqlite>) -> Result<BusinessInsights, AppError> {
    info!("Computing business insights");

    let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let total_workouts = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workouts")
        .fetch_one(pool)
        .await?;

    let avg_duration =
        sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(duration_minutes) FROM workouts")
            .fetch_one(pool)
            .await?;

    let max_duration =
        sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(duration_minutes) FROM workouts")
            .fetch_one(pool)
            .await?;

    let most_common = sqlx::query_scalar::<_, String>(
        "SELECT exercise_name
         FROM exercises
         GROUP BY exercise_name
         ORDER BY COUNT(*) DESC
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(BusinessInsights {
        total_users,
        total_workouts,
        avg_workout_duration: avg_duration.map(round_two_places).unwrap_or(0.0),
        max_workout_duration: max_duration.unwrap_or(0),
        most_common_exercise: most_common.unwrap_or_else(|| NO_EXERCISES.to_string()),
    })
}

fn round_two_places(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
