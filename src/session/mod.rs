use crate::api::{ApiError, SyncError};
use crate::models::{EditableFields, ItemId};
use crate::table::TableModel;
use leptos::logging::{log, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SessionState {
    Idle,
    Editing {
        id: ItemId,
        /// Distinguishes successive sessions on the same id.
        generation: u64,
        saving: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SessionError {
    /// Another row is already in edit form.
    AlreadyEditing(ItemId),
    /// The row is not (or no longer) rendered.
    RowMissing(ItemId),
    /// The action targets a row that is not the one being edited.
    NotEditing(ItemId),
    /// A save for this session has not completed yet.
    SaveInFlight(ItemId),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyEditing(id) => {
                write!(f, "Item {id} is already being edited. Save or cancel it first.")
            }
            Self::RowMissing(id) => write!(f, "Item {id} is no longer in the table."),
            Self::NotEditing(id) => write!(f, "Item {id} is not being edited."),
            Self::SaveInFlight(id) => write!(f, "Item {id} is still being saved."),
        }
    }
}

/// Values captured when Save was pressed, and the session they belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SaveTicket {
    pub id: ItemId,
    pub generation: u64,
    pub fields: EditableFields,
}

#[derive(Clone, Debug)]
pub(crate) enum SaveOutcome {
    /// Submitted values are now shown; the lock is released.
    Committed,
    /// The row stays in input form with the lock held.
    Failed(SyncError),
    /// The session was cancelled before the reply arrived. The table is
    /// left alone but the result is still reported.
    Stale { error: Option<SyncError> },
}

/// Edit lock plus the single-row edit state machine.
///
/// At most one row is in `Editing` at a time.
#[derive(Clone, Debug)]
pub(crate) struct EditSession {
    state: SessionState,
    next_generation: u64,
}

impl Default for EditSession {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            next_generation: 0,
        }
    }
}

impl EditSession {
    #[cfg(test)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn locked(&self) -> Option<&ItemId> {
        match &self.state {
            SessionState::Editing { id, .. } => Some(id),
            SessionState::Idle => None,
        }
    }

    pub fn is_saving(&self, id: &ItemId) -> bool {
        matches!(&self.state, SessionState::Editing { id: active, saving: true, .. } if active == id)
    }

    /// True when some row other than `id` holds the lock.
    pub fn is_editing_other(&self, id: &ItemId) -> bool {
        self.locked().is_some_and(|active| active != id)
    }

    /// Drops a lock whose row has been discarded by a placeholder or error
    /// render. Returns the released id.
    ///
    /// A lock with a save in flight is kept until the reply arrives.
    pub fn release_if_orphaned(&mut self, table: &TableModel) -> Option<ItemId> {
        let SessionState::Editing { id, saving, .. } = &self.state else {
            return None;
        };
        if *saving || table.row(id).is_some_and(|r| r.is_editing()) {
            return None;
        }
        let id = id.clone();
        warn!("[edit] releasing lock on item {id}: its row is gone");
        self.state = SessionState::Idle;
        Some(id)
    }

    /// Idle -> Editing(id).
    pub fn start(&mut self, table: &mut TableModel, id: &ItemId) -> Result<(), SessionError> {
        self.release_if_orphaned(table);

        match &self.state {
            SessionState::Editing { id: active, .. } if active == id => return Ok(()),
            SessionState::Editing { id: active, .. } => {
                return Err(SessionError::AlreadyEditing(active.clone()))
            }
            SessionState::Idle => {}
        }

        table
            .begin_edit(id)
            .ok_or_else(|| SessionError::RowMissing(id.clone()))?;

        self.next_generation += 1;
        self.state = SessionState::Editing {
            id: id.clone(),
            generation: self.next_generation,
            saving: false,
        };
        log!("[edit] started on item {id}");
        Ok(())
    }

    /// Editing(id) -> Idle, restoring the pre-edit text.
    ///
    /// Allowed while a save is in flight; that save's reply is then stale.
    pub fn cancel(&mut self, table: &mut TableModel, id: &ItemId) -> Result<(), SessionError> {
        if self.locked() != Some(id) {
            return Err(SessionError::NotEditing(id.clone()));
        }
        self.state = SessionState::Idle;

        let restored = table
            .originals()
            .get(id)
            .cloned()
            .or_else(|| table.row(id).map(|r| r.shown.clone()))
            .unwrap_or_default();
        table.end_edit(id, restored);
        log!("[edit] cancelled on item {id}");
        Ok(())
    }

    /// Marks the session as saving and captures the current input values.
    pub fn begin_save(&mut self, table: &TableModel, id: &ItemId) -> Result<SaveTicket, SessionError> {
        let SessionState::Editing {
            id: active,
            generation,
            saving,
        } = &mut self.state
        else {
            return Err(SessionError::NotEditing(id.clone()));
        };
        if &*active != id {
            return Err(SessionError::NotEditing(id.clone()));
        }
        if *saving {
            return Err(SessionError::SaveInFlight(id.clone()));
        }

        let fields = table
            .row(id)
            .and_then(|r| r.draft())
            .cloned()
            .ok_or_else(|| SessionError::RowMissing(id.clone()))?;

        *saving = true;
        Ok(SaveTicket {
            id: id.clone(),
            generation: *generation,
            fields,
        })
    }

    /// Applies the backend's reply to a save started with `ticket`.
    pub fn finish_save(
        &mut self,
        table: &mut TableModel,
        ticket: SaveTicket,
        result: Result<(), ApiError>,
    ) -> SaveOutcome {
        let current = matches!(
            &self.state,
            SessionState::Editing { id, generation, .. }
                if *id == ticket.id && *generation == ticket.generation
        );
        if !current {
            warn!(
                "[edit] save reply for item {} arrived after cancel (ok={})",
                ticket.id,
                result.is_ok()
            );
            return SaveOutcome::Stale {
                error: result.err().map(|source| SyncError::Save {
                    id: ticket.id,
                    source,
                }),
            };
        }

        match result {
            Ok(()) => {
                self.state = SessionState::Idle;
                table.end_edit(&ticket.id, ticket.fields);
                log!("[edit] saved item {}", ticket.id);
                SaveOutcome::Committed
            }
            Err(source) => {
                if table.row(&ticket.id).is_some_and(|r| r.is_editing()) {
                    if let SessionState::Editing { saving, .. } = &mut self.state {
                        *saving = false;
                    }
                } else {
                    // The row was discarded while saving; nothing is left to retry from.
                    warn!("[edit] releasing lock on item {}: save failed and its row is gone", ticket.id);
                    self.state = SessionState::Idle;
                }
                SaveOutcome::Failed(SyncError::Save {
                    id: ticket.id,
                    source,
                })
            }
        }
    }
}
