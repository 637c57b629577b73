pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod timetable;
pub mod vision;
