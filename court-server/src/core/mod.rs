//! Server core - configuration, state, background tasks
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - shared service handles
//! - [`Server`] - HTTP/WebSocket listener
//! - [`EventRouter`] - committed order changes → realtime rooms
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod event_router;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use event_router::EventRouter;
pub use server::Server;
pub use state::ServerState;
pub use tasks::BackgroundTasks;
