//! Seeds a user and prints its API key. Intended for bootstrapping the first
//! manager account:
//!
//!   DATABASE_URL=sqlite://events.db cargo run --bin create_user -- admin admin@example.com MANAGER

use events_backend::config::Config;
use events_backend::domain::models::user::{role, User};
use events_backend::infra::factory::bootstrap_state;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: create_user <username> <email> [MANAGER|PARTICIPANT]");
        std::process::exit(1);
    }

    let username = args[1].clone();
    let email = args[2].clone();
    let user_role = match args.get(3).map(String::as_str) {
        None | Some(role::MANAGER) => role::MANAGER.to_string(),
        Some(role::PARTICIPANT) => role::PARTICIPANT.to_string(),
        Some(other) => {
            eprintln!("Unknown role: {}", other);
            std::process::exit(1);
        }
    };

    let config = Config::from_env();
    let state = bootstrap_state(&config).await;

    let user = User::new(username, email, user_role);
    match state.user_repo.create(&user).await {
        Ok(created) => {
            println!("Created user {} ({})", created.username, created.role);
            println!("API key: {}", user.api_key);
        }
        Err(e) => {
            eprintln!("Failed to create user: {}", e);
            std::process::exit(1);
        }
    }
}
