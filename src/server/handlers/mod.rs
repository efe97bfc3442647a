pub mod auth;
pub mod grocery;
pub mod health;
pub mod inventory;
pub mod plans;
pub mod prep_tasks;
pub mod recipes;
pub mod reports;
pub mod schedules;
pub mod users;
