use std::{env, path::PathBuf, time::Duration};

/// Default API origin used by the development backend.
const LOCAL_API_URL: &str = "http://localhost:8001/api";

/// ClientConfig
///
/// Holds the client's entire configuration state. Immutable once loaded and cloned into
/// every component that needs it (Gateway, credential store, CLI).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    // Base URL of the remote API, including the `/api` prefix.
    pub api_url: String,
    // Origin used to resolve relative media paths (profile images, club images).
    pub media_base: String,
    // Location of the persisted credential file.
    pub credentials_path: PathBuf,
    // Optional per-request timeout. `None` keeps requests fire-once with no deadline.
    pub request_timeout: Option<Duration>,
    // Runtime environment marker. Controls logging format and fail-fast checks.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context: a developer machine against the local backend, or a
/// production build pointed at a real deployment.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for ClientConfig {
    /// Safe, non-panicking values for test setup.
    fn default() -> Self {
        Self {
            api_url: LOCAL_API_URL.to_string(),
            media_base: media_base_for(LOCAL_API_URL),
            credentials_path: PathBuf::from(".clubs-portal/credentials.json"),
            request_timeout: None,
            env: Env::Local,
        }
    }
}

impl ClientConfig {
    /// load
    ///
    /// Reads all parameters from environment variables.
    ///
    /// # Panics
    /// Panics when `APP_ENV=production` and `API_URL` is not set, so a release build never
    /// silently talks to the development backend.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let api_url = match env {
            Env::Production => {
                env::var("API_URL").expect("FATAL: API_URL must be set in production.")
            }
            Env::Local => env::var("API_URL").unwrap_or_else(|_| LOCAL_API_URL.to_string()),
        };
        let api_url = api_url.trim_end_matches('/').to_string();

        let media_base = env::var("MEDIA_BASE").unwrap_or_else(|_| media_base_for(&api_url));

        let credentials_path = env::var("CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_credentials_path());

        // Unparseable or zero values leave the timeout disabled.
        let request_timeout = env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            api_url,
            media_base,
            credentials_path,
            request_timeout,
            env,
        }
    }

    /// media_url
    ///
    /// Resolves a media reference returned by the API. Absolute URLs pass through; relative
    /// paths (`/media/clubs/a.jpg`) are joined onto `media_base`.
    pub fn media_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.media_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn media_base_for(api_url: &str) -> String {
    let trimmed = api_url.trim_end_matches('/');
    trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string()
}

fn default_credentials_path() -> PathBuf {
    let home = env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."));
    home.join(".clubs-portal").join("credentials.json")
}
