pub use sea_orm_migration::prelude::*;

mod m20241001_000001_create_users_table;
mod m20241001_000002_create_schedules_table;
mod m20241001_000003_create_time_entries_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_users_table::Migration),
            Box::new(m20241001_000002_create_schedules_table::Migration),
            Box::new(m20241001_000003_create_time_entries_table::Migration),
        ]
    }
}
