// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitness Tracker command-line client
//!
//! Logs in through the identity provider, then lists and logs workouts and
//! shows their recommendations.

use clap::{Parser, Subcommand};
use fitness_tracker::{
    config::Config,
    views::{self, ActivityForm, Screen},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log workouts and read AI recommendations.
#[derive(Parser, Debug)]
#[command(name = "fitness-tracker")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in through the identity provider
    Login,
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Status,
    /// List logged activities
    Activities,
    /// Log a new activity
    Add {
        /// RUNNING, CYCLING or SWIMMING
        #[arg(long = "type", default_value = "RUNNING")]
        activity_type: String,
        /// Duration in minutes
        #[arg(long)]
        duration: String,
        /// Calories burned
        #[arg(long)]
        calories: String,
        /// Additional metric as key=value (repeatable)
        #[arg(long = "metric")]
        metrics: Vec<String>,
    },
    /// Show the recommendation for an activity
    Show {
        /// Activity ID
        activity_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = Config::from_env()?;
    let state = Arc::new(AppState::open(config)?);

    match cli.command {
        Command::Login => login(state).await?,
        Command::Logout => {
            state.auth_view.logout(&state)?;
            println!("Logged out.");
        }
        Command::Status => {
            views::initialize(&state, None).await;
            println!("{}", views::auth::render_status(&state.auth_view.credentials()));
        }
        Command::Activities => {
            if require_login(&state).await {
                print_activities(&state).await;
            }
        }
        Command::Add {
            activity_type,
            duration,
            calories,
            metrics,
        } => {
            if require_login(&state).await {
                let form = ActivityForm {
                    activity_type,
                    duration,
                    calories_burned: calories,
                    metrics,
                };
                match views::submit_activity(&state, &form).await {
                    Ok(_) => print_activities(&state).await,
                    Err(e) => eprintln!("{}", views::render_submit_error(&e)),
                }
            }
        }
        Command::Show { activity_id } => {
            if require_login(&state).await {
                if let Some(details) = views::load_details(&state, &activity_id).await {
                    println!("{}", views::render_details(&details));
                }
            }
        }
    }

    Ok(())
}

/// Reconcile the view with the session; print the sign-in screen if needed.
async fn require_login(state: &AppState) -> bool {
    match views::initialize(state, None).await {
        Screen::LoggedIn => true,
        Screen::LoggedOut => {
            println!("{}", views::auth::render_logged_out());
            false
        }
    }
}

async fn print_activities(state: &AppState) {
    if let Some(activities) = views::load_activities(state).await {
        println!("{}", views::render_activity_list(&activities));
    }
}

/// Send the user to the identity provider and wait for the redirect.
async fn login(state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let redirect_uri = state.config.oauth.redirect_uri.clone();
    let host = redirect_uri.host_str().unwrap_or("localhost").to_string();
    let port = redirect_uri.port_or_known_default().unwrap_or(80);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Waiting for login redirect");

    let auth_url = state.auth.initiate_login()?;
    println!("Open this URL in your browser to sign in:\n\n  {}\n", auth_url);

    let app = fitness_tracker::routes::create_router(state.clone());
    let done = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = done.login_complete.notified() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Login interrupted");
                }
            }
        })
        .await?;

    println!("{}", views::auth::render_status(&state.auth_view.credentials()));
    Ok(())
}

/// Initialize logging to stderr, human-readable or flattened JSON.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("fitness_tracker=info".parse().unwrap())
        .add_directive("warn".parse().unwrap());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
