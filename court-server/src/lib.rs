//! Court Server - food-court order lifecycle and realtime notifications
//!
//! A customer checks out one cart holding items from several vendors. The
//! cart is split into one sub-order per vendor sharing a parent id and a
//! pickup OTP. Each vendor drives its sub-orders through a state machine
//! from its queue, and every committed change is pushed to vendor, customer
//! and parent-order rooms over WebSocket.
//!
//! ```text
//! court-server/src/
//! ├── core/       # config, state, background tasks, event router
//! ├── auth/       # JWT validation, CurrentUser extractor
//! ├── orders/     # splitter, state machine, queue, aggregation, redb store
//! ├── realtime/   # fan-out hub, rooms, /ws sessions
//! ├── api/        # HTTP routes and handlers
//! └── utils/      # logging, time, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod orders;
pub mod realtime;
pub mod utils;

pub use api::build_router;
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::{OrderStorage, OrdersManager};
pub use realtime::FanoutHub;
pub use shared::{ApiResponse, AppError, AppResult, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - target "security", kept in its own log file
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` and initialize logging from `LOG_LEVEL`, `ENVIRONMENT`, `LOG_DIR`
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let json = std::env::var("ENVIRONMENT")
        .map(|env| env != "development")
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());

    init_logger_with_file(&level, json, log_dir.as_deref())
}

pub fn print_banner() {
    println!(
        r#"
   ______                  __
  / ____/___  __  _______/ /_
 / /   / __ \/ / / / ___/ __/
/ /___/ /_/ / /_/ / /  / /_
\____/\____/\__,_/_/   \__/
    "#
    );
}
