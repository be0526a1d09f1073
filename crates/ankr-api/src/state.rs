//! Application state shared across all route handlers.
//!
//! AppState is the composition root for the HTTP surface: it wires the
//! store, registry, lifecycle controller, pump, and chat orchestrator.
//! Everything is behind `Arc` for cheap cloning across handler tasks.

use std::sync::Arc;
use std::time::Instant;

use ankr_action::{ExecutorRegistry, LifecycleController, ProposalEngine, PumpController};
use ankr_chat::{ChatOrchestrator, IntentAnalyzer};
use ankr_core::config::AnkrConfig;
use ankr_storage::{ActionCallRepository, Database, SiteRepository};

/// Settings read by handlers, fixed at construction.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Whether `GET /actions` is served.
    pub dev_listing_enabled: bool,
    /// Row cap for the listing when the query names none.
    pub list_default_limit: u32,
    /// HTTP port, used for the CORS origin list.
    pub port: u16,
}

impl ApiSettings {
    pub fn from_config(config: &AnkrConfig) -> Self {
        Self {
            dev_listing_enabled: config.actions.dev_listing_enabled,
            list_default_limit: config.actions.list_default_limit,
            port: config.general.port,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub lifecycle: Arc<LifecycleController>,
    pub pump: Arc<PumpController>,
    pub proposals: Arc<ProposalEngine>,
    pub chat: Arc<ChatOrchestrator>,
    pub settings: ApiSettings,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// State with the built-in executors over `database`.
    pub fn new(config: &AnkrConfig, database: Arc<Database>) -> Self {
        let site = Arc::new(SiteRepository::new(database.clone()));
        let registry = ExecutorRegistry::with_defaults(site);
        Self::with_registry(config, database, registry)
    }

    /// State with a caller-supplied registry.
    pub fn with_registry(
        config: &AnkrConfig,
        database: Arc<Database>,
        registry: ExecutorRegistry,
    ) -> Self {
        let available_actions = registry.names();
        let store = Arc::new(ActionCallRepository::new(database.clone()));

        let lifecycle = Arc::new(
            LifecycleController::new(store, Arc::new(registry))
                .with_default_actor(config.actions.default_actor.clone()),
        );
        let pump = Arc::new(
            PumpController::new(lifecycle.clone()).with_limits(
                config.actions.pump_default_limit,
                config.actions.pump_max_limit,
            ),
        );
        let chat = Arc::new(ChatOrchestrator::new(
            IntentAnalyzer::keyword(&config.analyzer),
            ProposalEngine::new(config.proposals.max_auto_actions),
            available_actions,
            config.analyzer.max_message_chars,
        ));

        Self {
            database,
            lifecycle,
            pump,
            proposals: Arc::new(ProposalEngine::new(config.proposals.max_auto_actions)),
            chat,
            settings: ApiSettings::from_config(config),
            start_time: Instant::now(),
        }
    }
}
