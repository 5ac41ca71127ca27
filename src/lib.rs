//! Terminal to-do board backed by a REST task service.
//!
//! Screens (signup, login, board) keep plain state in [`auth`] and [`board`];
//! [`app`] routes between them and [`ui`] renders them with ratatui.

pub mod app;
pub mod auth;
pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod notify;
pub mod session;
pub mod task;
pub mod ui;

pub use app::{App, Route};
pub use board::{Board, Filter};
pub use client::{ApiClient, ClientError, Credentials, Reply, TaskApi};
pub use config::{ApiBase, Config};
pub use error::{AppError, AppResult};
pub use task::{Priority, Task, TaskDraft, TaskId};
