use crate::api::query::{
    KEY_HOBBY_ID, KEY_INCLUDE_DESCENDANTS, KEY_LIMIT, KEY_OFFSET, KEY_Q, KEY_TAG, KEY_TYPE_KEY,
};
use crate::api::{ApiClient, ApiResult, EntryQuery};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Checkbox, ErrorBanner, Input, LinkButton, LoadingBlock,
    NativeSelect, Spinner,
};
use crate::components::EntryCard;
use crate::models::{EntryListItem, HobbyType, Page};
use crate::pages::layout::SEARCH_INPUT_ID;
use crate::state::AppContext;
use crate::tree::HobbyArena;
use icons::{Plus, Search, X};
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_query_map};

/// Page size for full-text search results.
pub(crate) const SEARCH_PAGE_SIZE: i64 = 20;

const FILTER_KEYS: [&str; 7] = [
    KEY_Q,
    KEY_HOBBY_ID,
    KEY_TYPE_KEY,
    KEY_TAG,
    KEY_INCLUDE_DESCENDANTS,
    KEY_LIMIT,
    KEY_OFFSET,
];

/// `/entries` link with one filter changed. Paging restarts whenever a filter changes.
pub(crate) fn filter_href(current: &EntryQuery, key: &str, value: Option<&str>) -> String {
    let mut next = current.clone().with(key, value);
    next.offset = None;
    format!("/entries{}", next.to_query_string())
}

/// Request for one page of the listing. A search query routes through `/search`.
pub(crate) fn page_request(filters: &EntryQuery, offset: i64) -> EntryQuery {
    let mut req = filters.clone();
    req.offset = (offset > 0).then_some(offset);
    if req.is_search() && req.limit.is_none() {
        req.limit = Some(SEARCH_PAGE_SIZE);
    }
    req
}

async fn fetch_page(api: &ApiClient, req: &EntryQuery) -> ApiResult<Page<EntryListItem>> {
    if req.is_search() {
        api.search(req).await
    } else {
        api.entries(req).await
    }
}

/// Removable chip for one active filter.
#[derive(Clone, Debug, PartialEq)]
struct FilterChip {
    key: &'static str,
    label: String,
}

#[component]
pub fn EntriesPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());
    let query = use_query_map();

    let filters = Memo::new(move |_| {
        query.with(|q| {
            let mut f = EntryQuery::default();
            for key in FILTER_KEYS {
                f.set(key, q.get(key).as_deref());
            }
            f
        })
    });

    let items: RwSignal<Vec<EntryListItem>> = RwSignal::new(vec![]);
    let total: RwSignal<i64> = RwSignal::new(0);
    let has_more: RwSignal<bool> = RwSignal::new(false);
    let loading: RwSignal<bool> = RwSignal::new(false);
    let more_loading: RwSignal<bool> = RwSignal::new(false);
    let error_msg: RwSignal<Option<String>> = RwSignal::new(None);

    let hobby_types: RwSignal<Vec<HobbyType>> = RwSignal::new(vec![]);
    let hobby_arena: RwSignal<HobbyArena> = RwSignal::new(HobbyArena::default());

    // Edit buffers, synced from the URL.
    let search_text: RwSignal<String> = RwSignal::new(String::new());
    let type_sel: RwSignal<String> = RwSignal::new(String::new());
    let tag_text: RwSignal<String> = RwSignal::new(String::new());
    let include_desc: RwSignal<bool> = RwSignal::new(false);

    // Ignore responses from superseded loads.
    let request_id: RwSignal<u64> = RwSignal::new(0);

    let go = move |href: String| navigate.with_value(|nav| nav(&href, Default::default()));
    let update_param = move |key: &str, value: Option<String>| {
        go(filter_href(&filters.get_untracked(), key, value.as_deref()));
    };

    // Lookups for type titles and hobby names.
    Effect::new(move |_| {
        let api = app_state.client();
        spawn_local(async move {
            let (types, tree) = futures::join!(api.hobby_types(), api.hobby_tree());
            match types {
                Ok(types) => hobby_types.set(types),
                Err(e) => error!("[entries] hobby types load failed: {e}"),
            }
            match tree {
                Ok(forest) => hobby_arena.set(HobbyArena::from_forest(&forest)),
                Err(e) => error!("[entries] hobby tree load failed: {e}"),
            }
        });
    });

    Effect::new(move |_| {
        let f = filters.get();
        search_text.set(f.q.clone().unwrap_or_default());
        type_sel.set(f.type_key.clone().unwrap_or_default());
        tag_text.set(f.tag.clone().unwrap_or_default());
        include_desc.set(f.include_descendants);

        let rid = request_id.get_untracked().wrapping_add(1);
        request_id.set(rid);

        let api = app_state.client();
        let req = page_request(&f, 0);
        loading.set(true);
        error_msg.set(None);

        spawn_local(async move {
            let res = fetch_page(&api, &req).await;
            if request_id.get_untracked() != rid {
                return;
            }
            match res {
                Ok(page) => {
                    log!("[entries] loaded {} of {}", page.items.len(), page.total);
                    total.set(page.total);
                    has_more.set(page.has_more);
                    items.set(page.items);
                }
                Err(e) => {
                    error!("[entries] load failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            loading.set(false);
        });
    });

    // Select and checkbox apply immediately.
    Effect::new(move |_| {
        let selected = type_sel.get();
        let current = filters.with_untracked(|f| f.type_key.clone().unwrap_or_default());
        if selected != current {
            update_param(KEY_TYPE_KEY, Some(selected));
        }
    });
    Effect::new(move |_| {
        let checked = include_desc.get();
        if checked != filters.with_untracked(|f| f.include_descendants) {
            update_param(KEY_INCLUDE_DESCENDANTS, checked.then(|| "true".to_string()));
        }
    });

    let load_more = move |_| {
        if more_loading.get_untracked() {
            return;
        }
        let rid = request_id.get_untracked();
        let req = page_request(&filters.get_untracked(), items.with_untracked(|i| i.len()) as i64);
        let api = app_state.client();
        more_loading.set(true);
        spawn_local(async move {
            let res = fetch_page(&api, &req).await;
            if request_id.get_untracked() != rid {
                more_loading.set(false);
                return;
            }
            match res {
                Ok(page) => {
                    has_more.set(page.has_more);
                    total.set(page.total);
                    items.update(|list| list.extend(page.items));
                }
                Err(e) => {
                    error!("[entries] next page failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            more_loading.set(false);
        });
    };

    let type_title = move |key: &str| {
        hobby_types.with(|types| {
            types
                .iter()
                .find(|t| t.key == key)
                .map(|t| t.title.clone())
        })
    };

    let type_options = Signal::derive(move || {
        hobby_types.with(|types| {
            types
                .iter()
                .map(|t| (t.key.clone(), t.title.clone()))
                .collect::<Vec<_>>()
        })
    });

    let chips = move || {
        let f = filters.get();
        let mut out = Vec::new();
        if let Some(q) = f.q {
            out.push(FilterChip {
                key: KEY_Q,
                label: format!("{}: {q}", app_state.tr("filter.query")),
            });
        }
        if let Some(id) = f.hobby_id {
            let name = hobby_arena
                .with(|a| a.get(id).map(|h| h.name.clone()))
                .unwrap_or_else(|| format!("#{id}"));
            out.push(FilterChip {
                key: KEY_HOBBY_ID,
                label: format!("{}: {name}", app_state.tr("filter.hobby")),
            });
        }
        if let Some(key) = f.type_key {
            let title = type_title(&key).unwrap_or(key);
            out.push(FilterChip {
                key: KEY_TYPE_KEY,
                label: format!("{}: {title}", app_state.tr("filter.type")),
            });
        }
        if let Some(tag) = f.tag {
            out.push(FilterChip {
                key: KEY_TAG,
                label: format!("{}: #{tag}", app_state.tr("filter.tag")),
            });
        }
        if f.include_descendants {
            out.push(FilterChip {
                key: KEY_INCLUDE_DESCENDANTS,
                label: app_state.tr("filter.include_descendants"),
            });
        }
        out
    };

    view! {
        <div class="space-y-4">
            <div class="flex items-center justify-between gap-3">
                <div>
                    <h1 class="text-lg font-semibold">{move || app_state.tr("entries.title")}</h1>
                    <p class="text-xs text-muted-foreground">
                        {move || app_state.tr_with("entries.count", &[("count", total.get().to_string().as_str())])}
                    </p>
                </div>
                <LinkButton href="/entries/new" primary=true>
                    <Plus />
                    {move || app_state.tr("entry.new")}
                </LinkButton>
            </div>

            <div class="grid gap-2 md:grid-cols-[1fr_auto_auto_auto] md:items-center">
                <div class="relative">
                    <Search class="pointer-events-none absolute left-3 top-1/2 size-4 -translate-y-1/2 text-muted-foreground" />
                    <Input
                        id=SEARCH_INPUT_ID
                        r#type="search"
                        class="pl-9"
                        placeholder=app_state.tr_untracked("search.placeholder")
                        bind_value=search_text
                        on_enter=Callback::new(move |_| update_param(KEY_Q, Some(search_text.get_untracked())))
                    />
                </div>
                <NativeSelect
                    class="md:w-44"
                    options=type_options
                    placeholder=Signal::derive(move || app_state.tr("filter.all_types"))
                    bind_value=type_sel
                />
                <Input
                    class="md:w-36"
                    placeholder=app_state.tr_untracked("filter.tag")
                    bind_value=tag_text
                    on_enter=Callback::new(move |_| update_param(KEY_TAG, Some(tag_text.get_untracked())))
                />
                <Checkbox bind_checked=include_desc>
                    {move || app_state.tr("filter.include_descendants")}
                </Checkbox>
            </div>

            <div class="flex flex-wrap gap-2">
                <For
                    each=chips
                    key=|chip| (chip.key, chip.label.clone())
                    children=move |chip: FilterChip| {
                        let key = chip.key;
                        view! {
                            <Button
                                variant=ButtonVariant::Secondary
                                size=ButtonSize::Xs
                                on:click=move |_| update_param(key, None)
                            >
                                {chip.label}
                                <X class="size-3" />
                            </Button>
                        }
                    }
                />
            </div>

            <ErrorBanner message=error_msg dismissible=true />

            {move || {
                if loading.get() && items.with(|i| i.is_empty()) {
                    return view! { <LoadingBlock label=Signal::derive(move || app_state.tr("common.loading")) /> }.into_any();
                }
                if items.with(|i| i.is_empty()) {
                    return view! {
                        <p class="py-8 text-center text-sm text-muted-foreground">{app_state.tr("entries.empty")}</p>
                    }
                    .into_any();
                }
                view! {
                    <div class="grid grid-cols-1 gap-3 md:grid-cols-2">
                        <For
                            each=move || items.get()
                            key=|item| item.id
                            children=move |item: EntryListItem| {
                                let title = type_title(&item.type_key);
                                view! { <EntryCard item=item type_title=title /> }
                            }
                        />
                    </div>
                }
                .into_any()
            }}

            <Show when=move || has_more.get() fallback=|| ().into_view()>
                <div class="flex justify-center">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || more_loading.get()
                        on:click=load_more
                    >
                        <Show when=move || more_loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || app_state.tr("entries.load_more")}
                    </Button>
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_href_sets_and_clears_keys() {
        let current = EntryQuery::for_hobby(3).with(KEY_TAG, Some("film"));
        assert_eq!(
            filter_href(&current, KEY_TYPE_KEY, Some("photo")),
            "/entries?hobby_id=3&type_key=photo&tag=film"
        );
        assert_eq!(filter_href(&current, KEY_TAG, None), "/entries?hobby_id=3");
        assert_eq!(filter_href(&EntryQuery::default(), KEY_Q, Some("  ")), "/entries");
    }

    #[test]
    fn filter_change_resets_paging() {
        let current = EntryQuery::default().with(KEY_OFFSET, Some("40"));
        assert_eq!(filter_href(&current, KEY_TAG, Some("bw")), "/entries?tag=bw");
    }

    #[test]
    fn search_requests_are_paged() {
        let filters = EntryQuery::default().with(KEY_Q, Some("dune"));
        let first = page_request(&filters, 0);
        assert_eq!(first.limit, Some(SEARCH_PAGE_SIZE));
        assert_eq!(first.offset, None);
        assert_eq!(page_request(&filters, 20).offset, Some(20));
    }

    #[test]
    fn plain_listing_keeps_server_default_limit() {
        let filters = EntryQuery::for_hobby(3);
        assert_eq!(page_request(&filters, 0).limit, None);
        assert!(!page_request(&filters, 0).is_search());
    }
}
