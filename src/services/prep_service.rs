//! Daily and additional prep task boards.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::database::entities::{prep_tasks, recipes, users};
use crate::errors::{KitchenError, KitchenResult};

const LIST_TYPES: [&str; 2] = ["daily", "additional"];
const TASK_STATUSES: [&str; 3] = ["todo", "in_progress", "done"];

#[derive(Debug, Clone, Deserialize)]
pub struct PrepTaskInput {
    pub title: String,
    #[serde(default)]
    pub task_date: Option<NaiveDate>,
    #[serde(default)]
    pub list_type: Option<String>,
    #[serde(default)]
    pub recipe_id: Option<i32>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_time: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrepTaskView {
    #[serde(flatten)]
    pub task: prep_tasks::Model,
    pub assigned_name: Option<String>,
    pub recipe_name: Option<String>,
}

pub struct PrepService {
    db: DatabaseConnection,
}

impl PrepService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Tasks for one date (today when unset), highest priority first, then
    /// by due time with untimed tasks ahead.
    pub async fn list(
        &self,
        task_date: Option<NaiveDate>,
        list_type: Option<&str>,
    ) -> KitchenResult<Vec<PrepTaskView>> {
        let date = task_date.unwrap_or_else(|| chrono::Utc::now().date_naive());
        let mut select = prep_tasks::Entity::find().filter(prep_tasks::Column::TaskDate.eq(date));
        if let Some(list_type) = list_type {
            select = select.filter(prep_tasks::Column::ListType.eq(list_type));
        }
        let mut tasks = select.all(&self.db).await?;
        tasks.sort_by(|a, b| {
            priority_rank(&a.priority)
                .cmp(&priority_rank(&b.priority))
                .then_with(|| a.due_time.cmp(&b.due_time))
        });

        let user_ids: Vec<i32> = tasks.iter().filter_map(|t| t.assigned_to).collect();
        let user_names: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name))
            .collect();
        let recipe_ids: Vec<i32> = tasks.iter().filter_map(|t| t.recipe_id).collect();
        let recipe_names: HashMap<i32, String> = recipes::Entity::find()
            .filter(recipes::Column::Id.is_in(recipe_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();

        Ok(tasks
            .into_iter()
            .map(|task| PrepTaskView {
                assigned_name: task.assigned_to.and_then(|id| user_names.get(&id).cloned()),
                recipe_name: task.recipe_id.and_then(|id| recipe_names.get(&id).cloned()),
                task,
            })
            .collect())
    }

    pub async fn create(&self, input: PrepTaskInput, user_id: i32) -> KitchenResult<i32> {
        let fields = self.validate(input).await?;
        let now = chrono::Utc::now();
        let task = prep_tasks::ActiveModel {
            task_date: Set(fields.task_date),
            list_type: Set(fields.list_type),
            title: Set(fields.title),
            recipe_id: Set(fields.recipe_id),
            priority: Set(fields.priority),
            due_time: Set(fields.due_time),
            assigned_to: Set(fields.assigned_to),
            status: Set(fields.status),
            notes: Set(fields.notes),
            created_by: Set(Some(user_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let task = task.insert(&self.db).await?;
        Ok(task.id)
    }

    pub async fn update(&self, task_id: i32, input: PrepTaskInput) -> KitchenResult<()> {
        let task = self.find_task(task_id).await?;
        let fields = self.validate(input).await?;

        let mut task: prep_tasks::ActiveModel = task.into();
        task.task_date = Set(fields.task_date);
        task.list_type = Set(fields.list_type);
        task.title = Set(fields.title);
        task.recipe_id = Set(fields.recipe_id);
        task.priority = Set(fields.priority);
        task.due_time = Set(fields.due_time);
        task.assigned_to = Set(fields.assigned_to);
        task.status = Set(fields.status);
        task.notes = Set(fields.notes);
        task.updated_at = Set(chrono::Utc::now());
        task.update(&self.db).await?;
        Ok(())
    }

    pub async fn set_status(&self, task_id: i32, status: &str) -> KitchenResult<()> {
        if !TASK_STATUSES.contains(&status) {
            return Err(KitchenError::invalid_argument("Invalid status"));
        }
        let task = self.find_task(task_id).await?;
        let mut task: prep_tasks::ActiveModel = task.into();
        task.status = Set(status.to_string());
        task.updated_at = Set(chrono::Utc::now());
        task.update(&self.db).await?;
        Ok(())
    }

    pub async fn delete(&self, task_id: i32) -> KitchenResult<()> {
        self.find_task(task_id).await?;
        prep_tasks::Entity::delete_by_id(task_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn validate(&self, input: PrepTaskInput) -> KitchenResult<ValidatedTask> {
        let list_type = input
            .list_type
            .as_deref()
            .unwrap_or("daily")
            .trim()
            .to_lowercase();
        if !LIST_TYPES.contains(&list_type.as_str()) {
            return Err(KitchenError::invalid_argument(
                "list_type must be daily or additional",
            ));
        }
        if input.title.trim().is_empty() {
            return Err(KitchenError::invalid_argument("Task title is required"));
        }
        if let Some(recipe_id) = input.recipe_id {
            if recipes::Entity::find_by_id(recipe_id)
                .one(&self.db)
                .await?
                .is_none()
            {
                return Err(KitchenError::invalid_argument("Invalid recipe_id"));
            }
        }
        if let Some(assigned_to) = input.assigned_to {
            if users::Entity::find_by_id(assigned_to)
                .one(&self.db)
                .await?
                .is_none()
            {
                return Err(KitchenError::invalid_argument("Invalid assigned_to"));
            }
        }
        Ok(ValidatedTask {
            task_date: input
                .task_date
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
            list_type,
            title: input.title,
            recipe_id: input.recipe_id,
            priority: input.priority.unwrap_or_else(|| "med".to_string()),
            due_time: input.due_time,
            assigned_to: input.assigned_to,
            status: input.status.unwrap_or_else(|| "todo".to_string()),
            notes: input.notes,
        })
    }

    async fn find_task(&self, task_id: i32) -> KitchenResult<prep_tasks::Model> {
        prep_tasks::Entity::find_by_id(task_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::not_found("Task", task_id))
    }
}

struct ValidatedTask {
    task_date: NaiveDate,
    list_type: String,
    title: String,
    recipe_id: Option<i32>,
    priority: String,
    due_time: Option<String>,
    assigned_to: Option<i32>,
    status: String,
    notes: Option<String>,
}

/// Sort rank for a task priority; unknown values sort last.
fn priority_rank(priority: &str) -> u8 {
    match priority {
        "high" => 1,
        "med" => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_rank_high_before_med_before_rest() {
        assert!(priority_rank("high") < priority_rank("med"));
        assert!(priority_rank("med") < priority_rank("low"));
        assert_eq!(priority_rank("low"), priority_rank("whenever"));
    }
}
