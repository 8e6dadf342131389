use super::row::{OriginalValues, Row, RowMode};
use crate::models::{EditableField, EditableFields, Item, ItemId};
use std::collections::HashSet;

/// Single full-width row that replaces the item rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum BodyNotice {
    /// The last fetch returned no items.
    Placeholder,
    /// The last fetch failed; carries the failure detail.
    Error(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub skipped_locked: bool,
}

/// Table body: ordered rows (or a notice row) plus the original values cache.
#[derive(Clone, Debug, Default)]
pub(crate) struct TableModel {
    rows: Vec<Row>,
    notice: Option<BodyNotice>,
    originals: OriginalValues,
    next_revision: u64,
}

impl TableModel {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn notice(&self) -> Option<&BodyNotice> {
        self.notice.as_ref()
    }

    pub fn originals(&self) -> &OriginalValues {
        &self.originals
    }

    pub fn row(&self, id: &ItemId) -> Option<&Row> {
        self.rows.iter().find(|r| &r.id == id)
    }

    fn row_mut(&mut self, id: &ItemId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| &r.id == id)
    }

    fn bump(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }

    /// Merges a fetched batch into the rendered rows.
    ///
    /// The row for `locked` is neither rewritten nor removed, and its cache
    /// entry is left alone.
    pub fn reconcile(&mut self, items: &[Item], locked: Option<&ItemId>) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if items.is_empty() {
            report.removed = self.rows.len();
            self.rows.clear();
            self.notice = Some(BodyNotice::Placeholder);
            return report;
        }

        // A placeholder or error row never outlives a non-empty batch.
        self.notice = None;

        let mut stale: HashSet<ItemId> = self.rows.iter().map(|r| r.id.clone()).collect();

        for item in items {
            stale.remove(&item.id);

            if locked == Some(&item.id) {
                report.skipped_locked = true;
                continue;
            }

            self.originals
                .remember(item.id.clone(), EditableFields::from_item(item));

            let revision = self.bump();
            match self.row_mut(&item.id) {
                Some(row) => {
                    *row = Row::from_item(item, revision);
                    report.updated += 1;
                }
                None => {
                    self.rows.push(Row::from_item(item, revision));
                    report.created += 1;
                }
            }
        }

        let before = self.rows.len();
        self.rows
            .retain(|r| !stale.contains(&r.id) || locked == Some(&r.id));
        report.removed = before - self.rows.len();

        report
    }

    /// Replaces the whole body with an error row.
    pub fn show_error(&mut self, message: String) {
        self.rows.clear();
        self.notice = Some(BodyNotice::Error(message));
    }

    /// Switches a row to input form, snapshotting its shown text.
    ///
    /// Returns the snapshot, or `None` when there is no such row.
    pub fn begin_edit(&mut self, id: &ItemId) -> Option<EditableFields> {
        let snapshot = self.row(id)?.shown.clone();
        self.originals.remember(id.clone(), snapshot.clone());

        let revision = self.bump();
        let row = self.row_mut(id)?;
        row.mode = RowMode::Editing {
            draft: snapshot.clone(),
        };
        row.revision = revision;
        Some(snapshot)
    }

    /// Mirrors a keystroke into the row's draft. Does not bump the revision,
    /// the input element already shows the value.
    pub fn set_draft_field(&mut self, id: &ItemId, field: EditableField, value: String) -> bool {
        match self.row_mut(id).map(|r| &mut r.mode) {
            Some(RowMode::Editing { draft }) => {
                draft.set(field, value);
                true
            }
            _ => false,
        }
    }

    /// Returns a row to display form showing `shown`.
    pub fn end_edit(&mut self, id: &ItemId, shown: EditableFields) -> bool {
        let revision = self.bump();
        let Some(row) = self.row_mut(id) else {
            return false;
        };
        row.shown = shown;
        row.mode = RowMode::Display;
        row.revision = revision;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, ime: &str, kolicina: &str, lokacija: &str, komentar: Option<&str>) -> Item {
        Item {
            id: ItemId::new(id),
            ime: ime.to_string(),
            kolicina: kolicina.to_string(),
            lokacija: lokacija.to_string(),
            komentar: komentar.map(str::to_string),
            timestamp: None,
        }
    }

    fn ids(t: &TableModel) -> Vec<&str> {
        t.rows().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_batch_renders_placeholder_only() {
        let mut t = TableModel::default();
        t.reconcile(&[item("1", "A", "5", "X", None)], None);

        let report = t.reconcile(&[], None);
        assert_eq!(report.removed, 1);
        assert!(t.rows().is_empty());
        assert_eq!(t.notice(), Some(&BodyNotice::Placeholder));
    }

    #[test]
    fn test_creates_rows_in_fetch_order_and_caches_values() {
        let mut t = TableModel::default();
        let report = t.reconcile(
            &[
                item("2", "B", "1", "Y", Some("note")),
                item("1", "A", "5", "X", None),
            ],
            None,
        );
        assert_eq!(report.created, 2);
        assert_eq!(ids(&t), vec!["2", "1"]);
        assert!(t.notice().is_none());

        let row = t.row(&ItemId::new("1")).expect("row 1");
        assert_eq!(row.shown.komentar, "");
        assert_eq!(row.kolicina, "5");
        assert_eq!(row.mode, RowMode::Display);

        assert_eq!(t.originals().len(), 2);
        let cached = t.originals().get(&ItemId::new("2")).expect("cached");
        assert_eq!(cached.komentar, "note");
    }

    #[test]
    fn test_updates_in_place_and_appends_new_rows_at_end() {
        let mut t = TableModel::default();
        t.reconcile(&[item("1", "A", "5", "X", None), item("2", "B", "1", "Y", None)], None);
        let rev_before = t.row(&ItemId::new("1")).expect("row").revision;

        let report = t.reconcile(
            &[
                item("3", "C", "0", "Z", None),
                item("1", "A2", "6", "X", None),
                item("2", "B", "1", "Y", None),
            ],
            None,
        );
        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 2);
        assert_eq!(ids(&t), vec!["1", "2", "3"]);

        let row = t.row(&ItemId::new("1")).expect("row");
        assert_eq!(row.shown.ime, "A2");
        assert_eq!(row.kolicina, "6");
        assert!(row.revision > rev_before);
    }

    #[test]
    fn test_removes_rows_missing_from_batch_when_unlocked() {
        let mut t = TableModel::default();
        t.reconcile(
            &[item("1", "A", "5", "X", None), item("2", "B", "1", "Y", None), item("3", "C", "1", "Z", None)],
            None,
        );

        let report = t.reconcile(&[item("2", "B", "1", "Y", None)], None);
        assert_eq!(report.removed, 2);
        assert_eq!(ids(&t), vec!["2"]);
    }

    #[test]
    fn test_locked_row_is_neither_rewritten_nor_cached() {
        let mut t = TableModel::default();
        t.reconcile(&[item("1", "A", "5", "X", None), item("2", "B", "1", "Y", None)], None);
        let locked = ItemId::new("1");
        t.begin_edit(&locked).expect("row exists");
        let before = t.row(&locked).cloned().expect("row");
        let cached_before = t.originals().get(&locked).cloned();

        let report = t.reconcile(
            &[item("1", "SERVER", "99", "Q", Some("x")), item("2", "B2", "1", "Y", None)],
            Some(&locked),
        );
        assert!(report.skipped_locked);
        assert_eq!(report.updated, 1);
        assert_eq!(t.row(&locked), Some(&before));
        assert_eq!(t.originals().get(&locked).cloned(), cached_before);
        assert_eq!(t.row(&ItemId::new("2")).expect("row").shown.ime, "B2");
    }

    #[test]
    fn test_locked_row_survives_disappearing_from_batch() {
        let mut t = TableModel::default();
        t.reconcile(&[item("1", "A", "5", "X", None), item("2", "B", "1", "Y", None)], None);
        let locked = ItemId::new("1");
        t.begin_edit(&locked);

        let report = t.reconcile(&[item("2", "B", "1", "Y", None)], Some(&locked));
        assert_eq!(report.removed, 0);
        assert_eq!(ids(&t), vec!["1", "2"]);
        assert!(t.row(&locked).expect("row").is_editing());
    }

    #[test]
    fn test_non_empty_batch_clears_previous_notice() {
        let mut t = TableModel::default();
        t.show_error("Error loading data: offline".to_string());
        assert!(t.rows().is_empty());

        t.reconcile(&[item("1", "A", "5", "X", None)], None);
        assert!(t.notice().is_none());
        assert_eq!(ids(&t), vec!["1"]);
    }

    #[test]
    fn test_error_discards_rows_including_edited_one() {
        let mut t = TableModel::default();
        t.reconcile(&[item("1", "A", "5", "X", None)], None);
        t.begin_edit(&ItemId::new("1"));

        t.show_error("Error loading data: HTTP 500".to_string());
        assert!(t.rows().is_empty());
        assert_eq!(
            t.notice(),
            Some(&BodyNotice::Error("Error loading data: HTTP 500".to_string()))
        );
    }

    #[test]
    fn test_draft_edits_only_touch_editing_rows() {
        let mut t = TableModel::default();
        t.reconcile(&[item("1", "A", "5", "X", None)], None);
        let id = ItemId::new("1");

        assert!(!t.set_draft_field(&id, EditableField::Ime, "nope".to_string()));
        t.begin_edit(&id);
        let rev = t.row(&id).expect("row").revision;
        assert!(t.set_draft_field(&id, EditableField::Ime, "typed".to_string()));

        let row = t.row(&id).expect("row");
        assert_eq!(row.draft().expect("draft").ime, "typed");
        assert_eq!(row.shown.ime, "A");
        assert_eq!(row.revision, rev);
    }
}
