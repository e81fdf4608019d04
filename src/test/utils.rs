#[cfg(test)]
pub mod test_utils {
    use crate::db::{add_friend, create_exercise, create_user, create_workout, migrate};
    use crate::error::AppError;
    use chrono::{Days, NaiveDate, Utc};
    use rocket::local::asynchronous::Client;
    use sqlx::{Pool, Sqlite, SqlitePool};
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();

    #[derive(Default)]
    pub struct TestDbBuilder {
        users: Vec<TestUser>,
        workouts: Vec<TestWorkout>,
        friendships: Vec<(String, String)>,
    }

    pub struct TestUser {
        pub name: String,
        pub email: String,
        pub weight_kg: f64,
    }

    pub struct TestWorkout {
        pub email: String,
        pub date: NaiveDate,
        pub duration_minutes: i64,
        pub exercises: Vec<String>,
    }

    /// Today's date on the store clock minus `n` days.
    pub fn days_ago(n: u64) -> NaiveDate {
        Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(n))
            .expect("date out of range")
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn user(mut self, name: &str, email: &str, weight_kg: f64) -> Self {
            self.users.push(TestUser {
                name: name.to_string(),
                email: email.to_string(),
                weight_kg,
            });
            self
        }

        pub fn workout(mut self, email: &str, date: NaiveDate, duration_minutes: i64) -> Self {
            self.workouts.push(TestWorkout {
                email: email.to_string(),
                date,
                duration_minutes,
                exercises: Vec::new(),
            });
            self
        }

        /// A workout with one 10x3 @ 20kg exercise per given name.
        pub fn workout_with_exercises(
            mut self,
            email: &str,
            date: NaiveDate,
            duration_minutes: i64,
            exercises: &[&str],
        ) -> Self {
            self.workouts.push(TestWorkout {
                email: email.to_string(),
                date,
                duration_minutes,
                exercises: exercises.iter().map(|e| e.to_string()).collect(),
            });
            self
        }

        pub fn friends(mut self, email: &str, friend_email: &str) -> Self {
            self.friendships
                .push((email.to_string(), friend_email.to_string()));
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder()
                    .parse_filters("debug")
                    .is_test(true)
                    .try_init();
            });

            let pool = SqlitePool::connect("sqlite::memory:").await?;

            migrate(&pool).await?;

            let mut user_id_map: HashMap<String, i64> = HashMap::new();
            let mut workout_ids: Vec<i64> = Vec::new();

            for user in &self.users {
                let user_id = create_user(&pool, &user.name, &user.email, user.weight_kg).await?;
                user_id_map.insert(user.email.clone(), user_id);
            }

            for workout in &self.workouts {
                let user_id = user_id_map.get(&workout.email).copied().ok_or_else(|| {
                    AppError::NotFound(format!("Test user {} not seeded", workout.email))
                })?;

                let workout_id =
                    create_workout(&pool, user_id, workout.date, workout.duration_minutes).await?;

                for name in &workout.exercises {
                    create_exercise(&pool, workout_id, name, 10, 3, 20.0).await?;
                }

                workout_ids.push(workout_id);
            }

            for (email, friend_email) in &self.friendships {
                let (Some(user_id), Some(friend_id)) =
                    (user_id_map.get(email), user_id_map.get(friend_email))
                else {
                    return Err(AppError::NotFound(format!(
                        "Friendship {} -> {} refers to an unseeded user",
                        email, friend_email
                    )));
                };
                add_friend(&pool, *user_id, *friend_id).await?;
            }

            Ok(TestDb {
                pool,
                user_id_map,
                workout_ids,
            })
        }
    }

    #[derive(Debug)]
    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub user_id_map: HashMap<String, i64>,
        pub workout_ids: Vec<i64>,
    }

    impl TestDb {
        pub fn user_id(&self, email: &str) -> Option<i64> {
            self.user_id_map.get(email).copied()
        }
    }

    pub async fn create_empty_test_db() -> TestDb {
        TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .user("Ana", "ana@x.com", 60.0)
            .user("Ben", "ben@x.com", 82.5)
            .user("Cleo", "cleo@x.com", 70.0)
            .workout_with_exercises("ben@x.com", days_ago(1), 40, &["Squat", "Bench Press"])
            .workout_with_exercises("cleo@x.com", days_ago(2), 25, &["Squat"])
            .friends("ana@x.com", "ben@x.com")
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let rocket = crate::init_rocket(test_db.pool.clone()).await;
        let client = Client::tracked(rocket)
            .await
            .expect("valid rocket instance");
        (client, test_db)
    }
}
