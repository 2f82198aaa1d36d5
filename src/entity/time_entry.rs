use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::timesheet::{Day, DayHours, WeekNotes};

/// One week of hours for a schedule. `(schedule_id, week_ending)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "time_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub schedule_id: i32,
    pub week_ending: Date,
    pub mon: f64,
    pub tue: f64,
    pub wed: f64,
    pub thu: f64,
    pub fri: f64,
    pub sat: f64,
    pub sun: f64,
    // JSON 문자열로 저장, 경계에서만 WeekNotes 로 변환
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub is_submitted: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schedule::Entity",
        from = "Column::ScheduleId",
        to = "super::schedule::Column::Id",
        on_delete = "Cascade"
    )]
    Schedule,
}

impl Related<super::schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn hours(&self) -> DayHours {
        DayHours {
            mon: self.mon,
            tue: self.tue,
            wed: self.wed,
            thu: self.thu,
            fri: self.fri,
            sat: self.sat,
            sun: self.sun,
        }
    }

    /// Unreadable stored notes decode as an empty week rather than failing the request.
    pub fn week_notes(&self) -> WeekNotes {
        WeekNotes::from_stored(&self.notes)
    }
}

impl Column {
    pub fn for_day(day: Day) -> Self {
        match day {
            Day::Mon => Column::Mon,
            Day::Tue => Column::Tue,
            Day::Wed => Column::Wed,
            Day::Thu => Column::Thu,
            Day::Fri => Column::Fri,
            Day::Sat => Column::Sat,
            Day::Sun => Column::Sun,
        }
    }
}
