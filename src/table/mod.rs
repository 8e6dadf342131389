pub(crate) mod reconcile;
pub(crate) mod row;

pub(crate) use reconcile::{BodyNotice, ReconcileReport, TableModel};
pub(crate) use row::{Row, RowMode};

use crate::api::{ApiError, SyncError};
use crate::models::{EditableField, Item, ItemId};
use crate::session::{EditSession, SaveOutcome, SaveTicket, SessionError};
use leptos::logging::{log, warn};

/// Everything the table view renders from: rows plus the edit session.
///
/// All reconciler and edit-session entry points go through here so the
/// reconciler always sees the current lock.
#[derive(Clone, Debug, Default)]
pub(crate) struct TableState {
    pub model: TableModel,
    pub session: EditSession,
}

impl TableState {
    pub fn apply_items(&mut self, items: &[Item]) -> ReconcileReport {
        self.session.release_if_orphaned(&self.model);
        let report = self.model.reconcile(items, self.session.locked());
        log!(
            "[table] reconciled {} items: {} created, {} updated, {} removed{}",
            items.len(),
            report.created,
            report.updated,
            report.removed,
            if report.skipped_locked { ", locked row kept" } else { "" }
        );
        report
    }

    /// Fetch failures replace the body; the lock is left as is.
    pub fn apply_fetch_error(&mut self, error: &SyncError) {
        warn!("[table] {error}");
        self.model.show_error(error.to_string());
    }

    pub fn start_edit(&mut self, id: &ItemId) -> Result<(), SessionError> {
        self.session.start(&mut self.model, id)
    }

    pub fn cancel_edit(&mut self, id: &ItemId) -> Result<(), SessionError> {
        self.session.cancel(&mut self.model, id)
    }

    pub fn edit_input(&mut self, id: &ItemId, field: EditableField, value: String) {
        if self.session.locked() == Some(id) {
            self.model.set_draft_field(id, field, value);
        }
    }

    pub fn begin_save(&mut self, id: &ItemId) -> Result<SaveTicket, SessionError> {
        self.session.begin_save(&self.model, id)
    }

    pub fn finish_save(&mut self, ticket: SaveTicket, result: Result<(), ApiError>) -> SaveOutcome {
        self.session.finish_save(&mut self.model, ticket, result)
    }
}
