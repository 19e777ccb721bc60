use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. The struct is immutable once loaded
/// and is pulled into handlers and extractors through `FromRef`, next to the document store
/// and the identity provider.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local session bypass and cookie flags.
    pub env: Env,
    // Postgres connection string. `None` runs the service on the in-memory store (local only).
    pub db_url: Option<String>,
    // HMAC secret used to sign and verify the session cookie.
    pub session_secret: String,
    // Lifetime of an issued session cookie, in seconds.
    pub session_ttl_secs: u64,
    // GitHub OAuth application credentials.
    pub github_client_id: String,
    pub github_client_secret: String,
    // Absolute URL GitHub redirects back to after the consent screen.
    pub github_callback_url: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences
/// (in-memory store, `x-user-name` bypass) and the hardened production setup.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_SESSION_SECRET: &str = "bountiful-local-session-secret";
const DEFAULT_CALLBACK_URL: &str = "http://localhost:3000/auth/github/callback";
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24;

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for test scaffolding. No environment variables are read.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            github_client_id: "local-client-id".to_string(),
            github_client_secret: "local-client-secret".to_string(),
            github_callback_url: DEFAULT_CALLBACK_URL.to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from the environment (after `.env` has been applied by `main`).
    ///
    /// # Panics
    /// Panics when a variable required by the current environment is missing. Production
    /// refuses to start without a database, a session secret, and GitHub credentials.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        let github_callback_url =
            env::var("GITHUB_CALLBACK_URL").unwrap_or_else(|_| DEFAULT_CALLBACK_URL.to_string());

        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let bind_addr = format!("0.0.0.0:{}", port);

        match env {
            Env::Local => Self {
                env: Env::Local,
                // Without DATABASE_URL the service falls back to the in-memory store.
                db_url: env::var("DATABASE_URL").ok(),
                session_secret: env::var("SESSION_SECRET")
                    .unwrap_or_else(|_| LOCAL_SESSION_SECRET.to_string()),
                session_ttl_secs,
                github_client_id: env::var("GITHUB_CLIENT_ID")
                    .unwrap_or_else(|_| "local-client-id".to_string()),
                github_client_secret: env::var("GITHUB_CLIENT_SECRET")
                    .unwrap_or_else(|_| "local-client-secret".to_string()),
                github_callback_url,
                bind_addr,
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: Some(
                    env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                ),
                session_secret: env::var("SESSION_SECRET")
                    .expect("FATAL: SESSION_SECRET must be set in production."),
                session_ttl_secs,
                github_client_id: env::var("GITHUB_CLIENT_ID")
                    .expect("FATAL: GITHUB_CLIENT_ID required in prod"),
                github_client_secret: env::var("GITHUB_CLIENT_SECRET")
                    .expect("FATAL: GITHUB_CLIENT_SECRET required in prod"),
                github_callback_url,
                bind_addr,
            },
        }
    }
}
