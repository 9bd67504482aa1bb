use crate::components::ui::{Button, ButtonSize, ButtonVariant, ErrorBanner, Input, Spinner};
use crate::models::{Hobby, HobbyCreate};
use crate::state::AppContext;
use crate::storage::{load_expanded_hobbies, save_expanded_hobbies};
use crate::tree::{flatten_forest, ExpandedSet, HobbyArena, TreeRow};
use icons::{ChevronDown, ChevronRight, Plus};
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;

pub(crate) const DEFAULT_HOBBY_COLOR: &str = "#6366f1";
pub(crate) const DEFAULT_HOBBY_ICON: &str = "folder";
const FALLBACK_DOT_COLOR: &str = "#6b7280";

/// Category tree navigation with expand/collapse and an inline "add hobby" form.
///
/// New hobbies are created under the selected hobby, or at the top level when none is selected.
#[component]
pub fn HobbySidebar(#[prop(into)] selected: Signal<Option<i64>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let hobbies: RwSignal<Vec<Hobby>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(false);
    let error_msg: RwSignal<Option<String>> = RwSignal::new(None);
    let expanded: RwSignal<ExpandedSet> = RwSignal::new(load_expanded_hobbies());

    let adding: RwSignal<bool> = RwSignal::new(false);
    let new_name: RwSignal<String> = RwSignal::new(String::new());
    let add_loading: RwSignal<bool> = RwSignal::new(false);

    // Ignore responses from superseded loads.
    let request_id: RwSignal<u64> = RwSignal::new(0);

    let arena = Memo::new(move |_| HobbyArena::new(hobbies.get()));

    Effect::new(move |_| {
        let _version = app_state.hobbies_version.get();
        let rid = request_id.get_untracked().wrapping_add(1);
        request_id.set(rid);

        let api = app_state.client();
        loading.set(true);
        spawn_local(async move {
            let res = api.hobby_tree().await;
            if request_id.get_untracked() != rid {
                return;
            }
            match res {
                Ok(forest) => {
                    let flat = flatten_forest(&forest);
                    log!("[sidebar] loaded {} hobbies", flat.len());
                    hobbies.set(flat);
                    error_msg.set(None);
                }
                Err(e) => {
                    error!("[sidebar] hobby tree load failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            loading.set(false);
        });
    });

    // Keep the selected hobby visible.
    Effect::new(move |_| {
        let Some(id) = selected.get() else {
            return;
        };
        let ancestors = arena.with(|a| a.ancestors(id));
        if ancestors
            .iter()
            .any(|a| !expanded.with_untracked(|e| e.contains(*a)))
        {
            expanded.update(|e| e.expand_all(ancestors));
            save_expanded_hobbies(&expanded.get_untracked());
        }
    });

    let toggle = move |id: i64| {
        expanded.update(|e| e.toggle(id));
        save_expanded_hobbies(&expanded.get_untracked());
    };

    let rows = move || arena.with(|a| a.visible_rows(&expanded.get()));

    let submit_new = move || {
        if add_loading.get_untracked() {
            return;
        }
        let name = new_name.get_untracked().trim().to_string();
        if name.is_empty() {
            error_msg.set(Some(app_state.tr("hobby.name_required")));
            return;
        }

        let parent_id = selected.get_untracked();
        let api = app_state.client();
        add_loading.set(true);
        error_msg.set(None);

        spawn_local(async move {
            let req = HobbyCreate {
                name,
                color: Some(DEFAULT_HOBBY_COLOR.to_string()),
                icon: Some(DEFAULT_HOBBY_ICON.to_string()),
                parent_id,
            };
            match api.create_hobby(&req).await {
                Ok(created) => {
                    log!("[sidebar] created hobby {}", created.id);
                    if let Some(pid) = parent_id {
                        expanded.update(|e| e.expand(pid));
                        save_expanded_hobbies(&expanded.get_untracked());
                    }
                    new_name.set(String::new());
                    adding.set(false);
                    app_state.hobbies_changed();
                }
                Err(e) => {
                    error!("[sidebar] create hobby failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            add_loading.set(false);
        });
    };

    view! {
        <nav class="space-y-1" aria-label="Hobbies">
            <div class="flex items-center justify-between px-2 pb-1">
                <span class="text-xs font-medium uppercase tracking-wide text-muted-foreground">
                    {move || app_state.tr("nav.hobbies")}
                </span>
                <div class="flex items-center gap-1">
                    <Show when=move || loading.get() fallback=|| ().into_view()>
                        <Spinner class="size-3" />
                    </Show>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Icon
                        class="size-6"
                        attr:title=move || app_state.tr("hobby.add")
                        on:click=move |_| adding.update(|v| *v = !*v)
                    >
                        <Plus class="size-3" />
                    </Button>
                </div>
            </div>

            <a
                href="/entries"
                class=move || row_class(selected.get().is_none())
            >
                {move || app_state.tr("nav.all_entries")}
            </a>

            <Show when=move || adding.get() fallback=|| ().into_view()>
                <div class="space-y-1 px-2 py-1">
                    <Input
                        bind_value=new_name
                        placeholder=app_state.tr_untracked("hobby.name_placeholder")
                        class="h-8 text-sm"
                        autofocus=true
                        disabled=add_loading
                        on_enter=Callback::new(move |_| submit_new())
                    />
                    <p class="text-[11px] text-muted-foreground">
                        {move || match selected.get().and_then(|id| arena.with(|a| a.get(id).map(|h| h.name.clone()))) {
                            Some(parent) => app_state.tr_with("hobby.add_under", &[("parent", parent.as_str())]),
                            None => app_state.tr("hobby.add_top_level"),
                        }}
                    </p>
                </div>
            </Show>

            <ErrorBanner message=error_msg dismissible=true />

            <ul class="space-y-0.5">
                <For
                    each=rows
                    key=|row: &TreeRow| (row.hobby.id, row.depth, row.expanded, row.has_children, row.hobby.name.clone(), row.hobby.color.clone())
                    children=move |row: TreeRow| {
                        let id = row.hobby.id;
                        let is_selected = move || selected.get() == Some(id);
                        let dot = row
                            .hobby
                            .color
                            .clone()
                            .unwrap_or_else(|| FALLBACK_DOT_COLOR.to_string());
                        let indent = format!("padding-left: {}rem", 0.5 + row.depth as f32 * 0.75);
                        view! {
                            <li class="flex items-center gap-1" style=indent>
                                {if row.has_children {
                                    view! {
                                        <button
                                            type="button"
                                            class="flex size-5 items-center justify-center rounded text-muted-foreground hover:bg-accent"
                                            aria-expanded=row.expanded.to_string()
                                            on:click=move |_| toggle(id)
                                        >
                                            {if row.expanded {
                                                view! { <ChevronDown class="size-3" /> }.into_any()
                                            } else {
                                                view! { <ChevronRight class="size-3" /> }.into_any()
                                            }}
                                        </button>
                                    }
                                    .into_any()
                                } else {
                                    view! { <span class="size-5" /> }.into_any()
                                }}
                                <a
                                    href=format!("/hobbies/{id}")
                                    class=move || format!("flex min-w-0 flex-1 items-center gap-2 {}", row_class(is_selected()))
                                >
                                    <span class="size-2 shrink-0 rounded-full" style=format!("background-color: {dot}") />
                                    <span class="truncate">{row.hobby.name.clone()}</span>
                                </a>
                            </li>
                        }
                    }
                />
            </ul>

            <Show
                when=move || !loading.get() && arena.with(|a| a.is_empty())
                fallback=|| ().into_view()
            >
                <p class="px-2 text-xs text-muted-foreground">{move || app_state.tr("hobby.empty")}</p>
            </Show>
        </nav>
    }
}

fn row_class(active: bool) -> &'static str {
    if active {
        "block rounded-md bg-accent px-2 py-1 text-sm font-medium text-accent-foreground"
    } else {
        "block rounded-md px-2 py-1 text-sm text-foreground hover:bg-surface-hover"
    }
}
