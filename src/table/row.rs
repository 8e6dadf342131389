use crate::models::{EditableFields, Item, ItemId};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum RowMode {
    /// Plain text cells and an "Edit" action.
    Display,
    /// Three text inputs and "Save"/"Cancel". `draft` mirrors the inputs.
    Editing { draft: EditableFields },
}

/// Rendered projection of one item.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Row {
    pub id: ItemId,
    pub kolicina: String,
    pub timestamp: Option<String>,

    /// Text currently shown in the ime/lokacija/komentar cells.
    pub shown: EditableFields,

    pub mode: RowMode,

    /// Bumped on every rewrite; the view keys rows by `(id, revision)`.
    pub revision: u64,
}

impl Row {
    pub(crate) fn from_item(item: &Item, revision: u64) -> Self {
        Self {
            id: item.id.clone(),
            kolicina: item.kolicina.clone(),
            timestamp: item.timestamp.clone(),
            shown: EditableFields::from_item(item),
            mode: RowMode::Display,
            revision,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, RowMode::Editing { .. })
    }

    pub fn draft(&self) -> Option<&EditableFields> {
        match &self.mode {
            RowMode::Editing { draft } => Some(draft),
            RowMode::Display => None,
        }
    }
}

/// Last known editable values per item, used to revert a cancelled edit.
///
/// Entries are never evicted.
#[derive(Clone, Debug, Default)]
pub(crate) struct OriginalValues {
    by_id: HashMap<ItemId, EditableFields>,
}

impl OriginalValues {
    pub fn remember(&mut self, id: ItemId, fields: EditableFields) {
        self.by_id.insert(id, fields);
    }

    pub fn get(&self, id: &ItemId) -> Option<&EditableFields> {
        self.by_id.get(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}
