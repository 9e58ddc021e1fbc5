//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_tables;
mod m20250101_000002_create_inquiry_tables;
mod m20250101_000003_create_poll_tables;
mod m20250101_000004_create_notification_table;
mod m20250101_000005_create_property_tables;
mod m20250101_000006_create_attachment_table;
mod m20250101_000007_create_info_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_tables::Migration),
            Box::new(m20250101_000002_create_inquiry_tables::Migration),
            Box::new(m20250101_000003_create_poll_tables::Migration),
            Box::new(m20250101_000004_create_notification_table::Migration),
            Box::new(m20250101_000005_create_property_tables::Migration),
            Box::new(m20250101_000006_create_attachment_table::Migration),
            Box::new(m20250101_000007_create_info_table::Migration),
        ]
    }
}
