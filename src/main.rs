#[macro_use]
extern crate rocket;

mod api;
mod db;
mod env;
mod error;
mod models;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use api::{
    api_add_friend, api_create_goal, api_create_user, api_delete_friend, api_get_all_users,
    api_get_insights, api_get_leaderboard, api_get_user, api_get_user_by_email,
    api_get_user_friends, api_get_user_goals, api_get_user_workouts, api_get_workout_exercises,
    api_log_workout, api_update_user, health,
};
use env::{DbConfig, load_environment, report_environment};
use error::AppError;
use rocket::{Build, Rocket};
use sqlx::SqlitePool;
use telemetry::{TelemetryFairing, init_tracing, shutdown_telemetry};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Rocket(Box<rocket::Error>),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

impl From<rocket::Error> for Error {
    fn from(value: rocket::Error) -> Self {
        Error::Rocket(Box::new(value))
    }
}

#[rocket::main]
async fn main() -> Result<(), Error> {
    let env_files = load_environment();

    init_tracing();

    match env_files {
        Ok(files) => report_environment(&files),
        Err(e) => error!(error = %e, "Failed to load environment files"),
    }

    let config = DbConfig::from_env()?;

    let Some(pool) = db::connect(&config).await else {
        error!("Could not connect to the database, check DATABASE_URL and that the store is reachable");
        shutdown_telemetry();
        return Err(anyhow::anyhow!("database connection failed").into());
    };

    if let Err(e) = db::migrate(&pool).await {
        e.log_and_record("Startup migrations");
        db::close(pool).await;
        shutdown_telemetry();
        return Err(e.into());
    }
    info!("Migrations completed successfully");

    let result = init_rocket(pool.clone()).await.launch().await;

    db::close(pool).await;
    shutdown_telemetry();

    result?;
    Ok(())
}

pub async fn init_rocket(pool: SqlitePool) -> Rocket<Build> {
    info!("Starting fitness tracker");

    rocket::build()
        .manage(pool)
        .mount(
            "/api",
            routes![
                health,
                api_get_all_users,
                api_create_user,
                api_get_user,
                api_get_user_by_email,
                api_update_user,
                api_get_user_workouts,
                api_log_workout,
                api_get_workout_exercises,
                api_get_user_goals,
                api_create_goal,
                api_get_user_friends,
                api_add_friend,
                api_delete_friend,
                api_get_leaderboard,
                api_get_insights,
            ],
        )
        .attach(TelemetryFairing)
}
