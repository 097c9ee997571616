use secrecy::SecretString;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub jwt_refresh_expiration_hours: i64,
    pub allow_resubmission: bool,
    pub judge_api_url: String,
    pub judge_api_key: Option<SecretString>,
    pub judge_concurrency: usize,
    pub judge_timeout_secs: u64,
    pub ai_api_base: String,
    pub ai_api_key: SecretString,
    pub ai_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "evalera-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            jwt_secret: SecretString::from(env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev_secret_key_change_in_production".to_string())),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            jwt_refresh_expiration_hours: env::var("JWT_REFRESH_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(168),
            allow_resubmission: env::var("ALLOW_RESUBMISSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            judge_api_url: env::var("JUDGE_API_URL")
                .unwrap_or_else(|_| "https://judge0-ce.p.rapidapi.com".to_string()),
            judge_api_key: env::var("JUDGE_API_KEY").ok().map(SecretString::from),
            judge_concurrency: env::var("JUDGE_CONCURRENCY")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(4),
            judge_timeout_secs: env::var("JUDGE_TIMEOUT_SECS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(10),
            ai_api_base: env::var("AI_API_BASE")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            ai_api_key: SecretString::from(
                env::var("AI_API_KEY").unwrap_or_else(|_| "ai_api_key".to_string()),
            ),
            ai_model: env::var("AI_MODEL")
                .unwrap_or_else(|_| "openai/gpt-3.5-turbo".to_string()),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();
        let ai_key = self.ai_api_key.expose_secret();

        // Check for dangerous default values
        if jwt_secret == "dev_secret_key_change_in_production" {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if ai_key == "ai_api_key" {
            panic!(
                "FATAL: AI_API_KEY is using default value! Set AI_API_KEY environment variable."
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "evalera-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            jwt_refresh_expiration_hours: 24,
            allow_resubmission: true,
            judge_api_url: "http://localhost:2358".to_string(),
            judge_api_key: None,
            judge_concurrency: 2,
            judge_timeout_secs: 2,
            ai_api_base: "http://localhost:9999/v1".to_string(),
            ai_api_key: SecretString::from("test key".to_string()),
            ai_model: "openai/gpt-3.5-turbo".to_string(),
        }
    }
}
