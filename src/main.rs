use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{web, HttpServer};
use log::{info, warn};
use tokio::sync::RwLock;

use lingonest_backend::storage::{LocalSnapshotStore, SessionService};
use lingonest_backend::{create_app, seed, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init();

    // Load environment variables from a .env file when present
    dotenv::dotenv().ok();

    // Get configuration from environment - fail if not set
    let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "JWT_SECRET environment variable is required",
        )
    })?;

    let snapshot_dir = env::var("SNAPSHOT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));

    std::fs::create_dir_all(&snapshot_dir).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to create snapshot directory: {}", e),
        )
    })?;

    let sessions = SessionService::new(Arc::new(LocalSnapshotStore::new(snapshot_dir.clone())));

    // Restore the persisted auth snapshot, if any
    match sessions.load().await {
        Ok(Some(snapshot)) if snapshot.is_authenticated => {
            if let Some(user) = snapshot.user {
                info!("Restored session snapshot for {}", user.email);
            }
        }
        Ok(_) => {}
        Err(e) => warn!("Could not read session snapshot: {}", e),
    }

    // Seed the in-memory stores with the demo catalog and directory
    let (courses, users) = seed::seed_stores();

    let app_state = web::Data::new(AppState {
        courses: RwLock::new(courses),
        users: RwLock::new(users),
        jwt_secret,
        sessions,
    });

    info!("Snapshot directory: {:?}", snapshot_dir);
    info!("Starting server at http://127.0.0.1:8080");

    HttpServer::new(move || create_app(app_state.clone()))
        .bind(("127.0.0.1", 8080))?
        .run()
        .await
}
