use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

use super::input::FIELD_CLASS;

/// Browser `<select>` bound to a string signal. Options are `(value, label)` pairs.
#[component]
pub fn NativeSelect(
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] id: String,
    #[prop(into)] options: Signal<Vec<(String, String)>>,
    /// Adds a leading empty-value option with this label.
    #[prop(into, optional)]
    placeholder: Option<Signal<String>>,
    #[prop(into, optional)] disabled: Signal<bool>,
    #[prop(into)] bind_value: RwSignal<String>,
) -> impl IntoView {
    let merged_class = tw_merge!("flex h-9", FIELD_CLASS, class);

    let on_change = move |ev: web_sys::Event| {
        if let Some(select) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        {
            bind_value.set(select.value());
        }
    };

    view! {
        <select
            data-name="NativeSelect"
            class=merged_class
            id=id
            disabled=move || disabled.get()
            on:change=on_change
            prop:value=move || bind_value.get()
        >
            {placeholder.map(|label| view! { <option value="">{move || label.get()}</option> })}
            {move || {
                let selected = bind_value.get();
                options
                    .get()
                    .into_iter()
                    .map(|(value, label)| {
                        let is_selected = value == selected;
                        view! { <option value=value selected=is_selected>{label}</option> }
                    })
                    .collect_view()
            }}
        </select>
    }
}

#[component]
pub fn Checkbox(
    #[prop(into, optional)] id: String,
    #[prop(into)] bind_checked: RwSignal<bool>,
    children: Children,
) -> impl IntoView {
    let on_change = move |ev: web_sys::Event| {
        if let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            bind_checked.set(input.checked());
        }
    };

    view! {
        <label class="inline-flex items-center gap-2 text-xs text-muted-foreground select-none">
            <input
                type="checkbox"
                id=id
                class="size-4 rounded border-input accent-primary"
                prop:checked=move || bind_checked.get()
                on:change=on_change
            />
            {children()}
        </label>
    }
}
