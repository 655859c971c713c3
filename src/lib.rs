pub mod infra;
pub mod encoding;
pub mod models;
pub mod payments;
pub mod pricing;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod validation;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Migrations embedded into the binary so a fresh database file is usable right away.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
