use std::sync::Arc;

use parking_lot::Mutex;

use crate::auth::JwtService;
use crate::core::event_router::EventRouter;
use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, Result};
use crate::orders::{OrderStorage, OrdersManager};
use crate::realtime::FanoutHub;

/// Server state - shared handles to every service
///
/// Cloning is cheap: every field is an `Arc` or a handle around one.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | immutable configuration |
/// | orders | Arc<OrdersManager> | order store + lifecycle |
/// | hub | FanoutHub | realtime room registry |
/// | jwt_service | Arc<JwtService> | token validation |
/// | tz | Tz | business timezone for date filters |
///
/// ```ignore
/// let state = ServerState::initialize(&config)?;
/// state.start_background_tasks();
/// let app = build_router(state.clone());
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub orders: Arc<OrdersManager>,
    pub hub: FanoutHub,
    pub jwt_service: Arc<JwtService>,
    pub tz: chrono_tz::Tz,
    tasks: Arc<Mutex<Option<BackgroundTasks>>>,
}

impl ServerState {
    /// Build state around an existing store (tests use an in-memory one)
    pub fn new(config: Config, storage: OrderStorage) -> Result<Self> {
        let tz = config.tz()?;
        let orders = Arc::new(OrdersManager::with_storage(
            storage,
            config.charge_rates(),
            config.event_channel_capacity,
        ));
        let hub = FanoutHub::new(config.fanout_buffer);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config,
            orders,
            hub,
            jwt_service,
            tz,
            tasks: Arc::new(Mutex::new(None)),
        })
    }

    /// Initialize state
    ///
    /// 1. work_dir/database exists
    /// 2. redb opened at work_dir/database/court.redb
    /// 3. services wired
    pub fn initialize(config: &Config) -> Result<Self> {
        let db_path = config.database_path();
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let storage = OrderStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Order store opened");

        Self::new(config.clone(), storage)
    }

    /// Start background tasks
    ///
    /// Must be called before serving; calling twice is a no-op.
    ///
    /// - event router: OrdersManager broadcast → FanoutHub rooms
    pub fn start_background_tasks(&self) {
        let mut slot = self.tasks.lock();
        if slot.is_some() {
            return;
        }

        let mut tasks = BackgroundTasks::new();
        let router = EventRouter::new(self.hub.clone());
        let source = self.orders.subscribe();
        let token = tasks.shutdown_token();
        tasks.spawn("event_router", async move {
            router.run(source, token).await;
        });

        tracing::info!("Background tasks registered: {}", tasks.len());
        *slot = Some(tasks);
    }

    /// Stop background tasks and drop every socket connection
    pub async fn shutdown(&self) {
        let tasks = self.tasks.lock().take();
        if let Some(tasks) = tasks {
            tasks.shutdown().await;
        }
        self.hub.close_all();
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
