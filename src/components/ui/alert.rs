use icons::X;
use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Alert, div, "relative w-full rounded-lg border px-4 py-3 text-sm"}
    clx! {AlertDescription, p, "text-sm [&_p]:leading-relaxed"}
}

pub use components::*;

/// Route-scoped failure message. Renders nothing while `message` is `None`.
#[component]
pub fn ErrorBanner(
    #[prop(into)] message: RwSignal<Option<String>>,
    #[prop(optional)] dismissible: bool,
) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some() fallback=|| ().into_view()>
            <Alert class="flex items-start gap-2 border-destructive/30" attr:role="alert">
                <AlertDescription class="flex-1 whitespace-pre-wrap text-destructive text-xs">
                    {move || message.get().unwrap_or_default()}
                </AlertDescription>
                <Show when=move || dismissible fallback=|| ().into_view()>
                    <button
                        type="button"
                        class="text-destructive/70 hover:text-destructive"
                        aria-label="Dismiss"
                        on:click=move |_| message.set(None)
                    >
                        <X class="size-3" />
                    </button>
                </Show>
            </Alert>
        </Show>
    }
}
