use chrono::{NaiveDate, Utc};
use rocket::State;
use rocket::http::Status;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use tracing::info;
use validator::Validate;

use crate::db::{
    add_friend, create_exercise, create_goal, create_user, create_workout, delete_friend,
    get_all_users, get_business_insights, get_leaderboard_data, get_user_by_email, get_user_by_id,
    get_user_friends, get_user_goals, get_user_workouts, get_workout_exercises,
    update_user_profile,
};
use crate::error::AppError;
use crate::models::{
    BusinessInsights, Exercise, Goal, LeaderboardEntry, User, UserSummary, Workout,
};
use crate::validation::{ApiError, AppErrorExt, JsonValidateExt, ToValidationResponse};

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct UserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    #[serde(default)]
    pub weight_kg: f64,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct ExerciseRequest {
    #[serde(default)]
    pub name: String,
    #[validate(range(min = 0, message = "Reps cannot be negative"))]
    #[serde(default)]
    pub reps: i64,
    #[validate(range(min = 0, message = "Sets cannot be negative"))]
    #[serde(default)]
    pub sets: i64,
    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    #[serde(default)]
    pub weight_kg: f64,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct WorkoutRequest {
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Duration must be at least one minute"))]
    pub duration_minutes: i64,
    #[validate(nested)]
    #[serde(default)]
    pub exercises: Vec<ExerciseRequest>,
}

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct GoalRequest {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metric: String,
    #[validate(range(min = 0.0, message = "Target cannot be negative"))]
    pub target_value: f64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FriendRequest {
    pub friend_id: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WorkoutWithExercises {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises: Vec<Exercise>,
}

async fn require_user(db: &Pool<Sqlite>, user_id: i64) -> Result<User, AppError> {
    get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", user_id)))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

#[get("/users")]
pub async fn api_get_all_users(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let users = get_all_users(db).await.validate_custom()?;
    Ok(Json(users))
}

#[post("/users", data = "<user>")]
pub async fn api_create_user(
    user: Json<UserRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let validated = user.validate_custom()?;

    let id = create_user(db, &validated.name, &validated.email, validated.weight_kg)
        .await
        .map_err(|e| {
            if e.is_conflict() {
                AppError::Conflict("Email already exists. Please use a different email.".to_string())
            } else {
                e
            }
        })
        .validate_custom()?;

    info!(user_id = id, "User created");
    Ok(Json(CreatedResponse { id }))
}

#[get("/users/<id>")]
pub async fn api_get_user(id: i64, db: &State<Pool<Sqlite>>) -> Result<Json<User>, ApiError> {
    let user = require_user(db, id).await.validate_custom()?;
    Ok(Json(user))
}

#[get("/users/by-email/<email>")]
pub async fn api_get_user_by_email(
    email: &str,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<User>, ApiError> {
    let user = get_user_by_email(db, email)
        .await
        .and_then(|user| {
            user.ok_or_else(|| AppError::NotFound(format!("User with email {} not found", email)))
        })
        .validate_custom()?;
    Ok(Json(user))
}

#[put("/users/<id>", data = "<user>")]
pub async fn api_update_user(
    id: i64,
    user: Json<UserRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<User>, ApiError> {
    let validated = user.validate_custom()?;

    require_user(db, id).await.validate_custom()?;
    update_user_profile(db, id, &validated.name, &validated.email, validated.weight_kg)
        .await
        .validate_custom()?;

    let updated = require_user(db, id).await.validate_custom()?;
    Ok(Json(updated))
}

#[get("/users/<id>/workouts")]
pub async fn api_get_user_workouts(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<WorkoutWithExercises>>, ApiError> {
    let workouts = get_user_workouts(db, id).await.validate_custom()?;

    let mut history = Vec::with_capacity(workouts.len());
    for workout in workouts {
        let exercises = get_workout_exercises(db, workout.id)
            .await
            .validate_custom()?;
        history.push(WorkoutWithExercises { workout, exercises });
    }

    Ok(Json(history))
}

/// Logs the workout, then each named exercise as its own insert. Exercises
/// with a blank name are skipped.
#[post("/users/<id>/workouts", data = "<workout>")]
pub async fn api_log_workout(
    id: i64,
    workout: Json<WorkoutRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let validated = workout.validate_custom()?;
    require_user(db, id).await.validate_custom()?;

    let date = validated
        .date
        .unwrap_or_else(|| Utc::now().date_naive());

    let workout_id = create_workout(db, id, date, validated.duration_minutes)
        .await
        .validate_custom()?;

    for exercise in validated
        .exercises
        .iter()
        .filter(|e| !e.name.trim().is_empty())
    {
        create_exercise(
            db,
            workout_id,
            exercise.name.trim(),
            exercise.reps,
            exercise.sets,
            exercise.weight_kg,
        )
        .await
        .validate_custom()?;
    }

    Ok(Json(CreatedResponse { id: workout_id }))
}

#[get("/workouts/<id>/exercises")]
pub async fn api_get_workout_exercises(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    let exercises = get_workout_exercises(db, id).await.validate_custom()?;
    Ok(Json(exercises))
}

#[get("/users/<id>/goals")]
pub async fn api_get_user_goals(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<Goal>>, ApiError> {
    let goals = get_user_goals(db, id).await.validate_custom()?;
    Ok(Json(goals))
}

#[post("/users/<id>/goals", data = "<goal>")]
pub async fn api_create_goal(
    id: i64,
    goal: Json<GoalRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, ApiError> {
    let validated = goal.validate_custom()?;
    require_user(db, id).await.validate_custom()?;

    create_goal(
        db,
        id,
        &validated.description,
        &validated.metric,
        validated.target_value,
    )
    .await
    .validate_custom()?;

    Ok(Status::Created)
}

#[get("/users/<id>/friends")]
pub async fn api_get_user_friends(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let friends = get_user_friends(db, id).await.validate_custom()?;
    Ok(Json(friends))
}

#[post("/users/<id>/friends", data = "<friend>")]
pub async fn api_add_friend(
    id: i64,
    friend: Json<FriendRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, ApiError> {
    let friend_id = friend.friend_id;

    if friend_id == id {
        return Err(
            AppError::Validation("You cannot add yourself as a friend".to_string())
                .to_validation_response(),
        );
    }

    require_user(db, id).await.validate_custom()?;
    require_user(db, friend_id).await.validate_custom()?;

    add_friend(db, id, friend_id)
        .await
        .map_err(|e| {
            if e.is_conflict() {
                AppError::Conflict("You are already friends with this user.".to_string())
            } else {
                e
            }
        })
        .validate_custom()?;

    Ok(Status::Created)
}

#[delete("/users/<id>/friends/<friend_id>")]
pub async fn api_delete_friend(
    id: i64,
    friend_id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, ApiError> {
    delete_friend(db, id, friend_id).await.validate_custom()?;
    Ok(Status::NoContent)
}

#[get("/users/<id>/leaderboard")]
pub async fn api_get_leaderboard(
    id: i64,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let leaderboard = get_leaderboard_data(db, id).await.validate_custom()?;
    Ok(Json(leaderboard))
}

#[get("/insights")]
pub async fn api_get_insights(
    db: &State<Pool<Sqlite>>,
) -> Result<Json<BusinessInsights>, ApiError> {
    let insights = get_business_insights(db).await.validate_custom()?;
    Ok(Json(insights))
}
