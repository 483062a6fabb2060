use sqlx::SqlitePool;
use std::sync::Arc;

use crate::audit::AuditService;
use crate::board::BoardSync;
use crate::core::Config;
use crate::db::DbService;
use crate::db::models::StockItem;
use crate::db::repository::{DeliveryRepository, StockItemRepository};
use crate::delivery::DeliveryPipeline;
use crate::discord::DiscordClient;
use crate::settings::SettingsStore;

/// Server state — shared handles to every service
///
/// Cloning is shallow; all members are pools, Arcs or cheap clones.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | immutable server configuration |
/// | db | SQLite connection pool |
/// | settings | durable panel settings (webhooks, board message id) |
/// | discord | webhook HTTP client |
/// | board | board reconcile/publish orchestration |
/// | pipeline | delivery pipeline |
/// | audit | audit log service |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: SqlitePool,
    pub settings: Arc<SettingsStore>,
    pub discord: Arc<DiscordClient>,
    pub board: BoardSync,
    pub pipeline: DeliveryPipeline,
    pub audit: AuditService,
}

impl ServerState {
    /// Initialize the server state
    ///
    /// In order:
    /// 1. Work directory layout (database/, uploads/)
    /// 2. Database pool + migrations + catalog seed
    /// 3. Settings, webhook client, board sync, delivery pipeline
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be opened — the process must not
    /// start without persistence.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("vitrine.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let db = db_service.pool;

        let stock = StockItemRepository::new(db.clone());
        stock
            .seed_if_empty(&StockItem::default_catalog())
            .await
            .expect("Failed to seed stock catalog");

        let settings = Arc::new(SettingsStore::load(config.settings_path()));
        let discord = Arc::new(DiscordClient::new().expect("Failed to build webhook client"));
        let audit = AuditService::new(db.clone());

        let board = BoardSync::new(stock.clone(), settings.clone(), discord.clone());
        let pipeline = DeliveryPipeline::new(
            stock,
            DeliveryRepository::new(db.clone()),
            settings.clone(),
            audit.clone(),
        );

        Self {
            config: config.clone(),
            db,
            settings,
            discord,
            board,
            pipeline,
            audit,
        }
    }
}
