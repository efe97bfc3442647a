pub mod app;
pub mod auth;
pub mod handlers;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

use crate::database::{connection::*, migrations::Migrator, seed_data::create_seed_data};
use anyhow::Result;
use sea_orm_migration::prelude::*;
use tracing::info;

pub async fn start_server(port: u16, database_path: &str, cors_origin: Option<&str>) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    // Run migrations
    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    create_seed_data(&db).await?;

    let app = app::create_app(db, cors_origin).await?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                     - Health check");
    info!("  /api/v1/auth/*              - Login and session info");
    info!("  /api/v1/recipes/*           - Recipe book, scaling, costing, CSV import/export");
    info!("  /api/v1/inventory/*         - Stock levels, adjustments, counts, transaction log");
    info!("  /api/v1/production-plans/*  - Production plans and ingredient requirements");
    info!("  /api/v1/grocery-lists/*     - Purchasing lists and receiving");
    info!("  /api/v1/prep-tasks/*        - Prep boards");
    info!("  /api/v1/schedules/*         - Chef schedules");
    info!("  /api/v1/dashboard           - Daily operations summary");
    info!("  /api/v1/analytics           - Waste, low stock and recipe cost reports");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
