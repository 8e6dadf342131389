pub(crate) mod table_sync;

pub(crate) use table_sync::TableSyncController;

use crate::api::{ApiClient, EnvConfig};
use crate::table::TableState;
use leptos::prelude::*;

/// Numbers refreshes so a slow reply cannot overwrite a newer one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RefreshSequence {
    latest: u64,
}

impl RefreshSequence {
    /// Registers a new request and returns its id.
    pub fn issue(&mut self) -> u64 {
        self.latest = self.latest.wrapping_add(1);
        self.latest
    }

    pub fn is_current(&self, request_id: u64) -> bool {
        self.latest == request_id
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub config: EnvConfig,
    pub api_client: RwSignal<ApiClient>,

    /// Rows, notice row, original values cache and edit lock.
    pub table: RwSignal<TableState>,

    /// A refresh is in flight.
    pub refreshing: RwSignal<bool>,
    pub last_refreshed_ms: RwSignal<Option<i64>>,

    /// Refresh guard: only the newest request may touch the table.
    pub refresh_requests: RwSignal<RefreshSequence>,
}

impl AppState {
    pub fn new() -> Self {
        let config = EnvConfig::new();
        let api_client = ApiClient::new(config.api_url.clone());

        Self {
            config,
            api_client: RwSignal::new(api_client),
            table: RwSignal::new(TableState::default()),
            refreshing: RwSignal::new(false),
            last_refreshed_ms: RwSignal::new(None),
            refresh_requests: RwSignal::new(RefreshSequence::default()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
