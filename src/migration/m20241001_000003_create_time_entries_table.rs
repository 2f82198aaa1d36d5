use sea_orm_migration::prelude::*;
use crate::entity::schedule;
use crate::entity::time_entry::{Column, Entity};

const UNIQUE_SCHEDULE_WEEK: &str = "uq_time_entries_schedule_week";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table
            .table(Entity)
            .if_not_exists()
            .col(
                ColumnDef::new(Column::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key()
            )
            .col(
                ColumnDef::new(Column::ScheduleId)
                    .integer()
                    .not_null()
            )
            .col(
                ColumnDef::new(Column::WeekEnding)
                    .date()
                    .not_null()
            );

        for day in [Column::Mon, Column::Tue, Column::Wed, Column::Thu, Column::Fri, Column::Sat, Column::Sun] {
            table.col(
                ColumnDef::new(day)
                    .double()
                    .not_null()
                    .default(0.0)
            );
        }

        table
            .col(
                ColumnDef::new(Column::Notes)
                    .text()
                    .not_null()
            )
            .col(
                ColumnDef::new(Column::IsSubmitted)
                    .boolean()
                    .not_null()
                    .default(false)
            )
            .col(
                ColumnDef::new(Column::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null()
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_time_entries_schedule")
                    .from(Entity, Column::ScheduleId)
                    .to(schedule::Entity, schedule::Column::Id)
                    .on_delete(ForeignKeyAction::Cascade)
            );

        manager.create_table(table.to_owned()).await?;

        // upsert 가 의존하는 유일성 제약
        manager
            .create_index(
                Index::create()
                    .name(UNIQUE_SCHEDULE_WEEK)
                    .table(Entity)
                    .col(Column::ScheduleId)
                    .col(Column::WeekEnding)
                    .unique()
                    .if_not_exists()
                    .to_owned()
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entity).to_owned())
            .await
    }
}
