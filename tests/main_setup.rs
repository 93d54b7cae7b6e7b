use clubs_portal::{ClientConfig, config::Env};
use serial_test::serial;
use std::{env, panic, path::PathBuf, time::Duration};

const CONFIG_VARS: [&str; 5] = [
    "APP_ENV",
    "API_URL",
    "MEDIA_BASE",
    "CREDENTIALS_PATH",
    "API_TIMEOUT_SECS",
];

// --- Setup/Teardown Utilities ---

/// Utility to run a test function with a clean configuration environment and restore the
/// original variables afterward.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_production_requires_api_url() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            // API_URL is missing
            ClientConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without API_URL"
    );
}

#[test]
#[serial]
fn test_production_config() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("API_URL", "https://clubs.example.org/api/");
            env::set_var("API_TIMEOUT_SECS", "15");
        }
        ClientConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_url, "https://clubs.example.org/api");
    assert_eq!(config.media_base, "https://clubs.example.org");
    assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
}

#[test]
#[serial]
fn test_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
            env::set_var("API_TIMEOUT_SECS", "0");
        }
        ClientConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_url, "http://localhost:8001/api");
    assert_eq!(config.media_base, "http://localhost:8001");
    assert_eq!(config.request_timeout, None);
    assert!(config.credentials_path.ends_with(".clubs-portal/credentials.json"));
}

#[test]
#[serial]
fn test_explicit_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("API_URL", "http://10.0.0.5:8001/api");
            env::set_var("MEDIA_BASE", "http://cdn.local");
            env::set_var("CREDENTIALS_PATH", "/tmp/portal/creds.json");
        }
        ClientConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_url, "http://10.0.0.5:8001/api");
    assert_eq!(config.media_base, "http://cdn.local");
    assert_eq!(config.credentials_path, PathBuf::from("/tmp/portal/creds.json"));
}

#[test]
fn test_media_url_resolution() {
    let config = ClientConfig::default();

    assert_eq!(
        config.media_url("/media/clubs/chess.jpg"),
        "http://localhost:8001/media/clubs/chess.jpg"
    );
    assert_eq!(
        config.media_url("https://cdn.example.org/a.png"),
        "https://cdn.example.org/a.png"
    );
}
