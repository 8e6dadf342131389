use crate::api::SyncError;
use crate::models::{EditableField, ItemId};
use crate::notify::Notice;
use crate::session::{SaveOutcome, SessionError};
use crate::state::AppContext;
use crate::util::now_ms;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::{set_interval_with_handle, IntervalHandle};
use std::time::Duration;

/// What the controller does once an edit action has been applied to the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct FollowUp {
    pub notice: Option<Notice>,
    pub refresh: bool,
}

impl FollowUp {
    pub fn after_start(result: &Result<(), SessionError>) -> Self {
        match result {
            Ok(()) => Self::default(),
            Err(e) => Self {
                notice: Some(Notice::EditRejected(e.to_string())),
                refresh: false,
            },
        }
    }

    /// A cancelled row shows its cached text; the refresh brings in whatever
    /// the lock held back.
    pub fn after_cancel(result: &Result<(), SessionError>) -> Self {
        Self {
            notice: None,
            refresh: result.is_ok(),
        }
    }

    /// Every save reply is reported, including ones that arrive after Cancel.
    pub fn after_save(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Committed | SaveOutcome::Stale { error: None } => Self {
                notice: Some(Notice::Saved),
                refresh: true,
            },
            SaveOutcome::Failed(e) | SaveOutcome::Stale { error: Some(e) } => Self {
                notice: Some(Notice::SaveFailed(e.to_string())),
                refresh: false,
            },
        }
    }
}

/// Drives the warehouse table: periodic and manual refreshes, and the
/// edit/save/cancel actions of the rows.
///
/// Responsibilities:
/// - fetch scheduling (startup, poll interval, manual, after edits)
/// - stale-response guard for overlapping refreshes
/// - async save round-trips and their notifications
///
/// Non-responsibilities:
/// - reconciliation and lock rules (see `TableState`)
#[derive(Clone)]
pub(crate) struct TableSyncController {
    app_state: AppContext,

    poll_interval_ms: u32,
    poll_handle: StoredValue<Option<IntervalHandle>>,
}

impl TableSyncController {
    pub fn new(app_state: AppContext) -> Self {
        let s = Self::detached(app_state);

        s.refresh();
        s.start_poller();

        s
    }

    /// A controller that neither fetches nor polls until asked to.
    pub(crate) fn detached(app_state: AppContext) -> Self {
        let poll_interval_ms = app_state.0.config.refresh_interval_ms;

        Self {
            app_state,
            poll_interval_ms,
            poll_handle: StoredValue::new(None),
        }
    }

    fn start_poller(&self) {
        if self.poll_handle.get_value().is_some() {
            return;
        }

        let s2 = self.clone();
        match set_interval_with_handle(
            move || s2.refresh(),
            Duration::from_millis(self.poll_interval_ms as u64),
        ) {
            Ok(handle) => {
                // Controller lives for the app lifetime; the interval is never cleared.
                self.poll_handle.set_value(Some(handle));
                log!("[sync] polling every {} ms", self.poll_interval_ms);
            }
            Err(e) => warn!("[sync] could not start poller: {e:?}"),
        }
    }

    fn run(&self, follow_up: FollowUp) {
        if let Some(notice) = follow_up.notice {
            notice.show();
        }
        if follow_up.refresh {
            self.refresh();
        }
    }

    /// Fetches the whole collection and reconciles it into the table.
    pub fn refresh(&self) {
        let state = &self.app_state.0;
        let mut request_id = 0;
        state
            .refresh_requests
            .update_untracked(|seq| request_id = seq.issue());
        state.refreshing.set(true);

        let api_client = state.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            let result = api_client.list_items().await;
            let state = &s2.app_state.0;

            if !state
                .refresh_requests
                .with_untracked(|seq| seq.is_current(request_id))
            {
                warn!("[sync] dropping stale refresh #{request_id}");
                return;
            }

            match result {
                Ok(items) => {
                    state.table.update(|t| {
                        t.apply_items(&items);
                    });
                    state.last_refreshed_ms.set(Some(now_ms()));
                }
                Err(e) => {
                    let err = SyncError::Fetch(e);
                    state.table.update(|t| t.apply_fetch_error(&err));
                }
            }
            state.refreshing.set(false);
        });
    }

    pub fn manual_refresh(&self) {
        self.refresh();
        Notice::ManualRefresh.show();
    }

    pub fn start_edit(&self, id: ItemId) {
        let mut result = Ok(());
        self.app_state.0.table.update(|t| result = t.start_edit(&id));

        if let Err(e) = &result {
            warn!("[sync] edit of item {id} rejected: {e}");
        }
        self.run(FollowUp::after_start(&result));
    }

    /// Mirrors a keystroke into the draft without re-rendering the row.
    pub fn edit_input(&self, id: &ItemId, field: EditableField, value: String) {
        self.app_state
            .0
            .table
            .update_untracked(|t| t.edit_input(id, field, value));
    }

    pub fn cancel_edit(&self, id: ItemId) {
        let mut result = Ok(());
        self.app_state.0.table.update(|t| result = t.cancel_edit(&id));

        if let Err(e) = &result {
            warn!("[sync] cancel of item {id} ignored: {e}");
        }
        self.run(FollowUp::after_cancel(&result));
    }

    pub fn save_edit(&self, id: ItemId) {
        let mut ticket = None;
        self.app_state.0.table.update(|t| match t.begin_save(&id) {
            Ok(tk) => ticket = Some(tk),
            Err(e) => warn!("[sync] save of item {id} ignored: {e}"),
        });
        let Some(ticket) = ticket else {
            return;
        };

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            let result = api_client
                .update_item(&ticket.id, &ticket.fields)
                .await
                .map(|resp| {
                    log!(
                        "[sync] item {} updated: {} (fields: {})",
                        ticket.id,
                        resp.message.as_deref().unwrap_or("ok"),
                        resp.updated_fields
                            .map(|f| f.to_string())
                            .unwrap_or_else(|| "-".to_string())
                    );
                });

            let mut outcome = None;
            s2.app_state
                .0
                .table
                .update(|t| outcome = Some(t.finish_save(ticket, result)));

            if let Some(outcome) = outcome {
                s2.run(FollowUp::after_save(outcome));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiErrorKind};

    fn save_error(id: &str, message: &str) -> SyncError {
        SyncError::Save {
            id: ItemId::new(id),
            source: ApiError {
                kind: ApiErrorKind::Http,
                message: message.to_string(),
            },
        }
    }

    #[test]
    fn test_committed_save_notifies_and_refreshes() {
        let f = FollowUp::after_save(SaveOutcome::Committed);
        assert_eq!(f.notice, Some(Notice::Saved));
        assert!(f.refresh);
    }

    #[test]
    fn test_failed_save_notifies_without_refresh() {
        let f = FollowUp::after_save(SaveOutcome::Failed(save_error("3", "Server error: 400 - bad")));
        let Some(Notice::SaveFailed(message)) = f.notice else {
            panic!("expected a failure notice, got {:?}", f.notice);
        };
        assert_eq!(message, "Error saving item 3: Server error: 400 - bad");
        assert!(!f.refresh);
    }

    #[test]
    fn test_save_reply_after_cancel_is_still_reported() {
        let f = FollowUp::after_save(SaveOutcome::Stale { error: None });
        assert_eq!(f.notice, Some(Notice::Saved));
        assert!(f.refresh);

        let f = FollowUp::after_save(SaveOutcome::Stale {
            error: Some(save_error("3", "Network error")),
        });
        assert!(matches!(f.notice, Some(Notice::SaveFailed(_))));
        assert!(!f.refresh);
    }

    #[test]
    fn test_cancel_refreshes_only_when_accepted() {
        let f = FollowUp::after_cancel(&Ok(()));
        assert!(f.refresh);
        assert!(f.notice.is_none());

        let f = FollowUp::after_cancel(&Err(SessionError::NotEditing(ItemId::new("2"))));
        assert_eq!(f, FollowUp::default());
    }

    #[test]
    fn test_rejected_start_shows_reason() {
        assert_eq!(FollowUp::after_start(&Ok(())), FollowUp::default());

        let f = FollowUp::after_start(&Err(SessionError::AlreadyEditing(ItemId::new("1"))));
        assert_eq!(
            f.notice,
            Some(Notice::EditRejected(
                "Item 1 is already being edited. Save or cancel it first.".to_string()
            ))
        );
        assert!(!f.refresh);
    }
}
