use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

#[component]
pub fn Spinner(#[prop(into, optional)] class: String) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label="Loading" /> }
}

/// Centered spinner with a caption, for whole-section loads.
#[component]
pub fn LoadingBlock(#[prop(into)] label: Signal<String>) -> impl IntoView {
    view! {
        <div class="flex items-center gap-2 py-6 text-sm text-muted-foreground">
            <Spinner />
            <span>{move || label.get()}</span>
        </div>
    }
}
