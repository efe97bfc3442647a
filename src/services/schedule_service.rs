//! Chef shift schedules.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::database::entities::{chef_schedules, users};
use crate::errors::{KitchenError, KitchenResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInput {
    pub user_id: i32,
    pub shift_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleView {
    #[serde(flatten)]
    pub schedule: chef_schedules::Model,
    pub chef_name: String,
    pub created_by_name: Option<String>,
}

pub struct ScheduleService {
    db: DatabaseConnection,
}

impl ScheduleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, shift_date: Option<NaiveDate>) -> KitchenResult<Vec<ScheduleView>> {
        let mut select = chef_schedules::Entity::find();
        if let Some(date) = shift_date {
            select = select.filter(chef_schedules::Column::ShiftDate.eq(date));
        }
        let shifts = select
            .order_by_asc(chef_schedules::Column::ShiftDate)
            .order_by_asc(chef_schedules::Column::StartTime)
            .all(&self.db)
            .await?;

        let mut user_ids: Vec<i32> = shifts.iter().map(|s| s.user_id).collect();
        user_ids.extend(shifts.iter().filter_map(|s| s.created_by));
        let names: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name))
            .collect();

        Ok(shifts
            .into_iter()
            .map(|schedule| ScheduleView {
                chef_name: names.get(&schedule.user_id).cloned().unwrap_or_default(),
                created_by_name: schedule.created_by.and_then(|id| names.get(&id).cloned()),
                schedule,
            })
            .collect())
    }

    pub async fn create(&self, input: ScheduleInput, creator_id: i32) -> KitchenResult<i32> {
        self.ensure_user(input.user_id).await?;
        let now = chrono::Utc::now();
        let shift = chef_schedules::ActiveModel {
            user_id: Set(input.user_id),
            shift_date: Set(input.shift_date),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            station: Set(input.station),
            notes: Set(input.notes),
            status: Set(input.status.unwrap_or_else(|| "scheduled".to_string())),
            created_by: Set(Some(creator_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let shift = shift.insert(&self.db).await?;
        Ok(shift.id)
    }

    pub async fn update(&self, schedule_id: i32, input: ScheduleInput) -> KitchenResult<()> {
        let shift = chef_schedules::Entity::find_by_id(schedule_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::not_found("Schedule", schedule_id))?;
        self.ensure_user(input.user_id).await?;

        let mut shift: chef_schedules::ActiveModel = shift.into();
        shift.user_id = Set(input.user_id);
        shift.shift_date = Set(input.shift_date);
        shift.start_time = Set(input.start_time);
        shift.end_time = Set(input.end_time);
        shift.station = Set(input.station);
        shift.notes = Set(input.notes);
        shift.status = Set(input.status.unwrap_or_else(|| "scheduled".to_string()));
        shift.updated_at = Set(chrono::Utc::now());
        shift.update(&self.db).await?;
        Ok(())
    }

    /// Deleting an unknown schedule is a no-op.
    pub async fn delete(&self, schedule_id: i32) -> KitchenResult<()> {
        chef_schedules::Entity::delete_by_id(schedule_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn ensure_user(&self, user_id: i32) -> KitchenResult<()> {
        if users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(KitchenError::invalid_argument("Invalid user_id"));
        }
        Ok(())
    }
}
