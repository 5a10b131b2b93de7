//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_persona_tables;
mod m20250101_000002_create_persona_group_tables;
mod m20250101_000003_create_situation_tables;
mod m20250101_000004_create_post_tables;
mod m20250101_000005_create_advice_master_table;
mod m20250101_000006_create_send_history_table;
mod m20250101_000007_create_app_setting_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_persona_tables::Migration),
            Box::new(m20250101_000002_create_persona_group_tables::Migration),
            Box::new(m20250101_000003_create_situation_tables::Migration),
            Box::new(m20250101_000004_create_post_tables::Migration),
            Box::new(m20250101_000005_create_advice_master_table::Migration),
            Box::new(m20250101_000006_create_send_history_table::Migration),
            Box::new(m20250101_000007_create_app_setting_table::Migration),
        ]
    }
}
