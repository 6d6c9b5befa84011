//! Database migrations for the Exeat API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_01_01_000001_create_schools;
mod m2024_01_01_000002_create_users;
mod m2024_01_01_000003_create_houses;
mod m2024_01_01_000004_create_students;
mod m2024_01_01_000005_create_staff_profiles;
mod m2024_01_01_000006_create_exeats;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_01_01_000001_create_schools::Migration),
            Box::new(m2024_01_01_000002_create_users::Migration),
            Box::new(m2024_01_01_000003_create_houses::Migration),
            Box::new(m2024_01_01_000004_create_students::Migration),
            Box::new(m2024_01_01_000005_create_staff_profiles::Migration),
            Box::new(m2024_01_01_000006_create_exeats::Migration),
        ]
    }
}
