use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    CellInput, Spinner, Table, TableBody, TableCell, TableHead, TableHeader, TableRow,
};
use crate::models::EditableField;
use crate::state::{AppContext, TableSyncController};
use crate::table::{BodyNotice, Row, RowMode};
use crate::util::{format_clock, item_count_label};
use leptos::prelude::*;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumIter)]
pub(crate) enum Column {
    Id,
    Ime,
    Kolicina,
    Lokacija,
    Komentar,
    Akcija,
}

impl Column {
    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Ime => "Name",
            Self::Kolicina => "Quantity",
            Self::Lokacija => "Location",
            Self::Komentar => "Comment",
            Self::Akcija => "Action",
        }
    }

    fn span() -> usize {
        Self::iter().count()
    }
}

/// Full-width row standing in for the item rows.
#[component]
fn NoticeRow(notice: BodyNotice) -> impl IntoView {
    let (text, class) = match notice {
        BodyNotice::Placeholder => (
            "No warehouse items available.".to_string(),
            "py-5 text-center text-muted-foreground",
        ),
        BodyNotice::Error(message) => (message, "py-5 text-center text-destructive"),
    };

    view! {
        <TableRow attr:data-notice="true">
            <TableCell class=class attr:colspan=Column::span().to_string()>{text}</TableCell>
        </TableRow>
    }
}

#[component]
fn ItemRow(row: Row) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let sync = expect_context::<TableSyncController>();
    let table = app_state.0.table;

    let Row {
        id,
        kolicina,
        timestamp,
        shown,
        mode,
        ..
    } = row;

    let row_dom_id = format!("item-row-{id}");
    let kolicina_title = timestamp
        .map(|t| format!("Reading taken {t}"))
        .unwrap_or_default();

    match mode {
        RowMode::Display => {
            let id_for_click = id.clone();
            let id_for_disabled = id.clone();
            let locked_elsewhere = move || {
                table.with(|t| t.session.is_editing_other(&id_for_disabled))
            };

            view! {
                <TableRow attr:id=row_dom_id>
                    <TableCell attr:data-label=Column::Id.label()>{id.to_string()}</TableCell>
                    <TableCell attr:data-label=Column::Ime.label()>{shown.ime}</TableCell>
                    <TableCell attr:data-label=Column::Kolicina.label() attr:title=kolicina_title>
                        {kolicina}
                    </TableCell>
                    <TableCell attr:data-label=Column::Lokacija.label()>{shown.lokacija}</TableCell>
                    <TableCell attr:data-label=Column::Komentar.label()>{shown.komentar}</TableCell>
                    <TableCell attr:data-label=Column::Akcija.label()>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=locked_elsewhere
                            on:click=move |_| sync.start_edit(id_for_click.clone())
                        >
                            "Edit"
                        </Button>
                    </TableCell>
                </TableRow>
            }
            .into_any()
        }
        RowMode::Editing { draft } => {
            let id_for_saving = id.clone();
            let saving = Signal::derive(move || table.with(|t| t.session.is_saving(&id_for_saving)));

            let input_cell = |field: EditableField, column: Column| {
                let sync = sync.clone();
                let id = id.clone();
                let name: &'static str = field.into();
                let autofocus = field == EditableField::Ime;
                let value = draft.get(field).to_string();
                view! {
                    <TableCell attr:data-label=column.label()>
                        <CellInput
                            class=format!("edit-input {name}-input")
                            name=name
                            value=value
                            disabled=saving
                            autofocus=autofocus
                            on_input=Callback::new(move |value: String| {
                                sync.edit_input(&id, field, value)
                            })
                        />
                    </TableCell>
                }
            };
            let ime_cell = input_cell(EditableField::Ime, Column::Ime);
            let lokacija_cell = input_cell(EditableField::Lokacija, Column::Lokacija);
            let komentar_cell = input_cell(EditableField::Komentar, Column::Komentar);

            let sync_save = sync.clone();
            let id_for_save = id.clone();
            let id_for_cancel = id.clone();

            view! {
                <TableRow attr:id=row_dom_id attr:data-editing="true">
                    <TableCell attr:data-label=Column::Id.label()>{id.to_string()}</TableCell>
                    {ime_cell}
                    <TableCell attr:data-label=Column::Kolicina.label() attr:title=kolicina_title>
                        {kolicina}
                    </TableCell>
                    {lokacija_cell}
                    {komentar_cell}
                    <TableCell attr:data-label=Column::Akcija.label()>
                        <div class="flex items-center gap-2">
                            <Button
                                variant=ButtonVariant::Success
                                size=ButtonSize::Sm
                                attr:disabled=move || saving.get()
                                on:click=move |_| sync_save.save_edit(id_for_save.clone())
                            >
                                <Show when=move || saving.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                "Save"
                            </Button>
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Sm
                                on:click=move |_| sync.cancel_edit(id_for_cancel.clone())
                            >
                                "Cancel"
                            </Button>
                        </div>
                    </TableCell>
                </TableRow>
            }
            .into_any()
        }
    }
}

#[component]
pub fn InventoryPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let sync = expect_context::<TableSyncController>();

    let table = app_state.0.table;
    let refreshing = app_state.0.refreshing;
    let last_refreshed_ms = app_state.0.last_refreshed_ms;

    // Memoized so the keyed row list below is not rebuilt on every table change.
    let notice = Memo::new(move |_| table.with(|t| t.model.notice().cloned()));
    let item_count = Memo::new(move |_| table.with(|t| t.model.rows().len()));

    let status = move || {
        let count = item_count_label(item_count.get());
        match last_refreshed_ms.get() {
            Some(ms) => format!("{count} · last refreshed {}", format_clock(ms)),
            None => count,
        }
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-[1080px] px-4 py-8">
                <Card>
                    <CardHeader>
                        <div class="space-y-1">
                            <CardTitle class="text-xl">"Warehouse"</CardTitle>
                            <CardDescription>{status}</CardDescription>
                        </div>

                        <Button
                            size=ButtonSize::Sm
                            attr:id="refreshBtn"
                            on:click=move |_| sync.manual_refresh()
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || refreshing.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if refreshing.get() { "Refreshing" } else { "Refresh" }}
                            </span>
                        </Button>
                    </CardHeader>

                    <CardContent>
                        <Table>
                            <TableHeader>
                                <TableRow>
                                    {Column::iter()
                                        .map(|c| view! { <TableHead>{c.label()}</TableHead> })
                                        .collect_view()}
                                </TableRow>
                            </TableHeader>
                            <TableBody attr:id="itemsBody">
                                {move || notice.get().map(|n| view! { <NoticeRow notice=n /> })}
                                <For
                                    each=move || table.with(|t| t.model.rows().to_vec())
                                    key=|row| (row.id.clone(), row.revision)
                                    children=move |row| view! { <ItemRow row=row /> }
                                />
                            </TableBody>
                        </Table>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_match_row_cells() {
        let labels: Vec<&str> = Column::iter().map(Column::label).collect();
        assert_eq!(
            labels,
            vec!["ID", "Name", "Quantity", "Location", "Comment", "Action"]
        );
        assert_eq!(Column::span(), 6);
    }
}
