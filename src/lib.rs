//! Goal Metrics - per-user scoreboard for goals and tasks
//!
//! This crate folds goal, task and user lifecycle events into one metric
//! aggregate per user and serves a trailing-window trend view of it.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
