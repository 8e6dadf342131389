use crate::pages::InventoryPage;
use crate::state::{AppContext, AppState, TableSyncController};
use leptos::logging::log;
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let app_state = AppContext(AppState::new());
    log!(
        "[app] API {} (refresh every {} ms)",
        app_state.0.config.api_url,
        app_state.0.config.refresh_interval_ms
    );
    provide_context(app_state.clone());

    // Starts the initial fetch and the poller.
    provide_context(TableSyncController::new(app_state));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=InventoryPage />
            </Routes>
        </Router>
    }
}
