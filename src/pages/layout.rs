use crate::components::ui::{Button, ButtonSize, ButtonVariant, LinkButton};
use crate::components::HobbySidebar;
use crate::state::AppContext;
use crate::storage::{load_sidebar_collapsed, save_sidebar_collapsed};
use crate::util::parse_id;
use icons::{LogOut, Plus, Settings};
use leptos::ev;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use leptos_router::hooks::{use_location, use_navigate, use_query_map};
use wasm_bindgen::JsCast;

/// DOM id of the entries search box, focused by Cmd/Ctrl+K.
pub(crate) const SEARCH_INPUT_ID: &str = "entry-search";

/// Hobby highlighted in the sidebar: the `/hobbies/:id` route wins over a `hobby_id` filter.
pub(crate) fn selected_hobby(path: &str, hobby_id_param: Option<&str>) -> Option<i64> {
    if let Some(rest) = path.strip_prefix("/hobbies/") {
        return rest.split('/').next().and_then(parse_id);
    }
    if path == "/entries" || path == "/" {
        return hobby_id_param.and_then(parse_id);
    }
    None
}

#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let sidebar_collapsed: RwSignal<bool> = RwSignal::new(load_sidebar_collapsed());
    let logout_loading: RwSignal<bool> = RwSignal::new(false);

    let navigate = StoredValue::new(use_navigate());
    let location = use_location();
    let query = use_query_map();

    let selected = Signal::derive(move || {
        let path = location.pathname.get();
        let hobby_id = query.with(|q| q.get("hobby_id"));
        selected_hobby(&path, hobby_id.as_deref())
    });

    let toggle_sidebar = move || {
        sidebar_collapsed.update(|v| *v = !*v);
        save_sidebar_collapsed(sidebar_collapsed.get_untracked());
    };

    // Cmd/Ctrl+B toggles the sidebar, Cmd/Ctrl+K jumps to search.
    let key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        let is_meta = ev.meta_key() || ev.ctrl_key();
        if !is_meta {
            return;
        }
        match ev.key().to_lowercase().as_str() {
            "b" => {
                ev.prevent_default();
                toggle_sidebar();
            }
            "k" => {
                ev.prevent_default();
                let search = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.get_element_by_id(SEARCH_INPUT_ID))
                    .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok());
                match search {
                    Some(input) => {
                        let _ = input.focus();
                    }
                    None => navigate.with_value(|nav| nav("/entries", Default::default())),
                }
            }
            _ => {}
        }
    });
    // The layout is rebuilt per route, so drop the listener with it.
    on_cleanup(move || key_handle.remove());

    let on_logout = move |_| {
        if logout_loading.get_untracked() {
            return;
        }
        let api = app_state.client();
        logout_loading.set(true);
        spawn_local(async move {
            if let Err(e) = api.logout().await {
                // The session is dropped locally either way.
                warn!("[layout] logout request failed: {e}");
            } else {
                log!("[layout] signed out");
            }
            logout_loading.set(false);
            app_state.current_user.set(Some(None));
            navigate.with_value(|nav| nav("/login", Default::default()));
        });
    };

    let user_name = move || {
        app_state.current_user.with(|u| {
            u.as_ref()
                .and_then(|u| u.as_ref())
                .and_then(|u| u.name.clone())
                .unwrap_or_default()
        })
    };

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <header class="border-b">
                <div class="mx-auto flex w-full max-w-6xl items-center justify-between gap-3 px-4 py-3">
                    <div class="flex items-center gap-2">
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            class="h-8 w-8"
                            attr:title=move || app_state.tr("nav.toggle_sidebar")
                            on:click=move |_| toggle_sidebar()
                        >
                            <span class="text-xs text-muted-foreground">
                                {move || if sidebar_collapsed.get() { ">" } else { "<" }}
                            </span>
                        </Button>
                        <a href="/entries" class="text-sm font-semibold">
                            {move || app_state.tr("app.title")}
                        </a>
                    </div>

                    <nav class="flex items-center gap-1">
                        <LinkButton href="/entries">
                            {move || app_state.tr("nav.entries")}
                        </LinkButton>
                        <LinkButton href="/entries/new" primary=true>
                            <Plus />
                            {move || app_state.tr("entry.new")}
                        </LinkButton>
                        <LinkButton href="/settings" class="w-8 px-0" title=app_state.tr_untracked("nav.settings")>
                            <Settings />
                        </LinkButton>
                        <span class="hidden px-2 text-xs text-muted-foreground md:inline">{user_name}</span>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            attr:title=move || app_state.tr("nav.logout")
                            attr:disabled=move || logout_loading.get()
                            on:click=on_logout
                        >
                            <LogOut />
                        </Button>
                    </nav>
                </div>
            </header>

            <div class="mx-auto flex w-full max-w-6xl gap-6 px-4 py-6">
                <Show when=move || !sidebar_collapsed.get() fallback=|| ().into_view()>
                    <aside class="w-60 shrink-0">
                        <div class="sticky top-6">
                            <HobbySidebar selected=selected />
                        </div>
                    </aside>
                </Show>

                <main class="min-w-0 flex-1">{move || children()}</main>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hobby_route_selects_its_hobby() {
        assert_eq!(selected_hobby("/hobbies/7", None), Some(7));
        assert_eq!(selected_hobby("/hobbies/7", Some("3")), Some(7));
        assert_eq!(selected_hobby("/hobbies/abc", None), None);
    }

    #[test]
    fn entries_route_uses_the_filter() {
        assert_eq!(selected_hobby("/entries", Some("3")), Some(3));
        assert_eq!(selected_hobby("/entries", None), None);
        assert_eq!(selected_hobby("/entries/5", Some("3")), None);
        assert_eq!(selected_hobby("/settings", Some("3")), None);
    }
}
