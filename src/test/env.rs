#[cfg(test)]
mod tests {
    use crate::env::{
        DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS, DbConfig, EnvFile, load_environment,
    };
    use crate::error::AppError;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        temp_env::with_vars_unset(["DATABASE_URL", "DATABASE_MAX_CONNECTIONS"], || {
            let config = DbConfig::from_env().expect("Defaults should load");
            assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
            assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
            assert_eq!(config, DbConfig::default());
        });
    }

    #[test]
    #[serial]
    fn test_reads_environment() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("sqlite::memory:")),
                ("DATABASE_MAX_CONNECTIONS", Some("2")),
            ],
            || {
                let config = DbConfig::from_env().expect("Config should load");
                assert_eq!(config.database_url, "sqlite::memory:");
                assert_eq!(config.max_connections, 2);
            },
        );
    }

    #[test]
    #[serial]
    fn test_rejects_bad_pool_size() {
        temp_env::with_var("DATABASE_MAX_CONNECTIONS", Some("many"), || {
            let result = DbConfig::from_env();
            assert!(matches!(result, Err(AppError::Internal(_))), "{:?}", result);
        });

        temp_env::with_var("DATABASE_MAX_CONNECTIONS", Some("0"), || {
            let result = DbConfig::from_env();
            assert!(matches!(result, Err(AppError::Internal(_))), "{:?}", result);
        });
    }

    #[rocket::async_test]
    #[serial]
    async fn test_config_drives_connect() {
        let pool = temp_env::async_with_vars(
            [("DATABASE_URL", Some("sqlite::memory:"))],
            async {
                let config = DbConfig::from_env().expect("Config should load");
                crate::db::connect(&config).await
            },
        )
        .await;

        let pool = pool.expect("In-memory database should connect");
        crate::db::close(pool).await;
    }

    #[test]
    #[serial]
    fn test_load_environment_layers_dev_over_common() {
        temp_env::with_vars_unset(
            [
                "ROCKET_PROFILE",
                "DATABASE_URL",
                "DATABASE_MAX_CONNECTIONS",
                "RUST_LOG",
                "ROCKET_LOG_LEVEL",
            ],
            || {
                let files = load_environment().expect("Env files should parse");

                assert_eq!(files[0], EnvFile::Loaded("config/common.env"));
                assert_eq!(files[1], EnvFile::Loaded("config/dev.env"));
                assert_eq!(dotenvy::var("DATABASE_MAX_CONNECTIONS").unwrap(), "10");

                let config = DbConfig::from_env().expect("Config should load");
                assert_eq!(config.max_connections, 10);
            },
        );
    }
}
