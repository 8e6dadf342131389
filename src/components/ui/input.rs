use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

/// Inline text input for a table cell.
///
/// The DOM element owns the text while the user types; every keystroke is
/// reported through `on_input` and `value` is only the initial content.
#[component]
pub fn CellInput(
    #[prop(into, optional)] class: String,
    #[prop(into)] value: String,
    #[prop(into, optional)] name: String,
    #[prop(into)] disabled: Signal<bool>,
    #[prop(optional)] autofocus: bool,
    on_input: Callback<String>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "placeholder:text-muted-foreground selection:bg-primary selection:text-primary-foreground dark:bg-input/30 border-input flex h-8 w-full min-w-24 rounded-md border bg-transparent px-2 py-1 text-sm shadow-xs transition-[color,box-shadow] outline-none disabled:pointer-events-none disabled:cursor-not-allowed disabled:opacity-50",
        "focus-visible:border-ring focus-visible:ring-ring/50",
        "focus-visible:ring-2",
        class
    );

    let handle_input = move |ev: web_sys::Event| {
        if let Some(target) = ev.target() {
            if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
                on_input.run(input.value());
            }
        }
    };

    view! {
        <input
            data-name="CellInput"
            type="text"
            class=merged_class
            name=name
            value=value
            disabled=move || disabled.get()
            autofocus=autofocus
            on:input=handle_input
        />
    }
}
