use std::process::ExitCode;

use clap::{Parser, Subcommand};
use clubs_portal::{
    ApiError, ClientState, Route, RouteDecision,
    config::{ClientConfig, Env},
    models::{RegisterRequest, events_by_day},
    repository::{ClubRepository, EventRepository, UserRepository},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line front end for the clubs portal API.
#[derive(Parser, Debug)]
#[command(name = "clubs-portal", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the session.
    Login { username: String, password: String },
    /// Create an account. Log in afterwards.
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Revoke the refresh token and forget the session.
    Logout,
    /// Show the current session and the account behind it.
    Whoami,
    /// Show where navigating to PATH would land for the current viewer.
    Route { path: String },
    /// List clubs (the admin list for admins).
    Clubs,
    /// List upcoming events grouped by day.
    Events,
    /// List user accounts (admin only).
    Users,
}

/// main
///
/// Loads configuration, initializes logging, restores the session from the credential
/// store and runs one subcommand against the API.
#[tokio::main]
async fn main() -> ExitCode {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = ClientConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise only this crate logs, at info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clubs_portal=info".into());

    // 3. Initialize Logging based on Environment
    // Logs go to stderr so command output on stdout stays clean.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
    }

    tracing::debug!("Client starting in {:?} mode against {}", config.env, config.api_url);

    let cli = Cli::parse();
    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: ClientConfig) -> Result<(), ApiError> {
    // 4. Session Restore
    let state = ClientState::bootstrap(config).await?;
    let is_admin = state.session.current().is_some_and(|s| s.is_admin());

    match command {
        Command::Login { username, password } => {
            let session = state.auth.login(&username, &password).await?;
            let role = session.role.map(|r| r.as_str()).unwrap_or("unknown");
            println!("Logged in as {username} ({role}).");
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let request = RegisterRequest {
                username,
                email,
                password,
            };
            let created = state.auth.register(&request).await?;
            println!("Account {} created. Log in to continue.", created.username);
        }
        Command::Logout => {
            state.auth.logout().await?;
            println!("Logged out.");
        }
        Command::Whoami => {
            let me = state.users().me().await?;
            let role = if me.is_admin { "admin" } else { "user" };
            println!("{} <{}> ({role})", me.username, me.email);
        }
        Command::Route { path } => {
            let target = Route::parse(&path)
                .ok_or_else(|| ApiError::InvalidRequest(format!("unknown route: {path}")))?;
            let mut router = state.router();
            match router.navigate(target) {
                RouteDecision::Pending => println!("pending"),
                RouteDecision::Render(route) => println!("render {route}"),
                RouteDecision::Redirect(route) => println!("redirect {route}"),
            }
            let tabs: Vec<String> = router.visible_tabs().iter().map(|t| t.path()).collect();
            if !tabs.is_empty() {
                println!("tabs: {}", tabs.join(", "));
            }
        }
        Command::Clubs => {
            if is_admin {
                for club in state.clubs().admin_list_clubs().await? {
                    println!("#{} {} (by {})", club.id, club.name, club.created_by_username);
                }
            } else {
                for club in state.clubs().list_clubs().await? {
                    let mark = if club.is_followed { "*" } else { " " };
                    println!("{mark} #{} {} ({} followers)", club.id, club.name, club.followers_count);
                }
            }
        }
        Command::Events => {
            let events = state.events().list_events().await?;
            for (day, events) in events_by_day(&events) {
                println!("{day}");
                for event in events {
                    println!("  {} {} ({})", event.date.format("%H:%M"), event.title, event.created_by);
                }
            }
        }
        Command::Users => {
            for user in state.users().admin_list_users().await? {
                let role = if user.is_superuser { "admin" } else { "user" };
                println!("#{} {} <{}> ({role})", user.id, user.username, user.email);
            }
        }
    }
    Ok(())
}
