use crate::api::{ApiError, ApiResult, EntryQuery};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle, ErrorBanner,
    Input, Label, LinkButton, LoadingBlock, Spinner,
};
use crate::components::{EntryCard, DEFAULT_HOBBY_COLOR};
use crate::models::{EntryCreate, EntryListItem, Hobby, HobbyUpdate, PropValue};
use crate::pages::IdRouteParams;
use crate::state::AppContext;
use crate::util::{confirm, non_blank, normalize_tags, parse_id};
use icons::{Plus, Trash2};
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params, use_query_map};
use std::collections::BTreeMap;
use std::future::Future;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum HobbyTab {
    #[default]
    Entries,
    Library,
    Links,
}

impl HobbyTab {
    /// Unknown or missing `?tab=` values fall back to the entries tab.
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    fn query(self, hobby_id: i64) -> EntryQuery {
        let base = EntryQuery::for_hobby(hobby_id);
        match self {
            Self::Library => EntryQuery {
                type_key: Some(QuickAdd::Book.type_key().to_string()),
                ..base
            },
            Self::Entries | Self::Links => base,
        }
    }

    /// Client-side narrowing the list endpoint cannot express with a single type key.
    pub fn keeps(self, item: &EntryListItem) -> bool {
        match self {
            Self::Links => {
                item.type_key == QuickAdd::Bookmark.type_key()
                    || item.type_key == QuickAdd::BrandLink.type_key()
            }
            Self::Entries | Self::Library => true,
        }
    }

    fn forms(self) -> &'static [QuickAdd] {
        match self {
            Self::Entries => &[],
            Self::Library => &[QuickAdd::Book],
            Self::Links => &[QuickAdd::Bookmark, QuickAdd::BrandLink],
        }
    }
}

/// Compact creation forms for the common entry types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum QuickAdd {
    Book,
    Bookmark,
    BrandLink,
}

impl QuickAdd {
    pub fn type_key(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Bookmark => "bookmark",
            Self::BrandLink => "brand_link",
        }
    }

    /// Form inputs in display order.
    pub fn form_fields(self) -> &'static [&'static str] {
        match self {
            Self::Book => &[
                "title", "author", "isbn", "publisher", "year", "cover_url", "link", "rating",
                "notes", "tags",
            ],
            Self::Bookmark => &["url", "title", "notes", "tags"],
            Self::BrandLink => &["brand", "url", "category", "notes", "tags"],
        }
    }

    /// Keys written as properties after the entry exists.
    pub fn prop_keys(self) -> &'static [&'static str] {
        match self {
            Self::Book => &["author", "isbn", "publisher", "year", "cover_url", "link", "rating"],
            Self::Bookmark => &["url", "title", "notes"],
            Self::BrandLink => &["brand", "url", "category", "notes"],
        }
    }

    /// Field that becomes the entry title.
    pub fn title_field(self) -> &'static str {
        match self {
            Self::Book | Self::Bookmark => "title",
            Self::BrandLink => "brand",
        }
    }

    fn label_key(self) -> &'static str {
        match self {
            Self::Book => "quick_add.book",
            Self::Bookmark => "quick_add.bookmark",
            Self::BrandLink => "quick_add.brand_link",
        }
    }

    /// Create request plus the full property list. Errors are translation keys.
    pub fn build(
        self,
        hobby_id: i64,
        values: &BTreeMap<String, String>,
    ) -> Result<(EntryCreate, Vec<PropValue>), &'static str> {
        let value = |key: &str| values.get(key).map(String::as_str).unwrap_or_default();

        let title = non_blank(value(self.title_field())).ok_or("quick_add.title_required")?;
        let entry = EntryCreate {
            hobby_id,
            type_key: self.type_key().to_string(),
            title: Some(title),
            description: non_blank(value("notes")),
            tags: normalize_tags(value("tags")),
        };
        let props = self
            .prop_keys()
            .iter()
            .map(|key| PropValue::new(*key, value(key).trim()))
            .collect();
        Ok((entry, props))
    }
}

#[component]
pub fn HobbyPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let params = use_params::<IdRouteParams>();
    let query = use_query_map();
    let navigate = StoredValue::new(use_navigate());

    let hobby_id = Memo::new(move |_| {
        params
            .get()
            .ok()
            .and_then(|p| p.id)
            .and_then(|id| parse_id(&id))
    });
    let tab = Memo::new(move |_| HobbyTab::from_param(query.with(|q| q.get("tab")).as_deref()));

    let hobby: RwSignal<Option<Hobby>> = RwSignal::new(None);
    let items: RwSignal<Vec<EntryListItem>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(false);
    let error_msg: RwSignal<Option<String>> = RwSignal::new(None);

    let rename_value: RwSignal<String> = RwSignal::new(String::new());
    let color_value: RwSignal<String> = RwSignal::new(DEFAULT_HOBBY_COLOR.to_string());
    let saving: RwSignal<bool> = RwSignal::new(false);
    let deleting: RwSignal<bool> = RwSignal::new(false);

    // Ignore responses from superseded loads.
    let request_id: RwSignal<u64> = RwSignal::new(0);
    // Bumped after a quick-add so the list reloads.
    let list_version: RwSignal<u64> = RwSignal::new(0);

    Effect::new(move |_| {
        let Some(id) = hobby_id.get() else {
            error_msg.set(Some(app_state.tr_untracked("hobby.not_found")));
            return;
        };
        let api = app_state.client();
        spawn_local(async move {
            match api.hobby(id).await {
                Ok(h) => {
                    rename_value.set(h.name.clone());
                    color_value.set(h.color.clone().unwrap_or_else(|| DEFAULT_HOBBY_COLOR.to_string()));
                    hobby.set(Some(h));
                }
                Err(e) => {
                    error!("[hobby] load {id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
        });
    });

    Effect::new(move |_| {
        let _version = list_version.get();
        let (Some(id), current) = (hobby_id.get(), tab.get()) else {
            return;
        };
        let rid = request_id.get_untracked().wrapping_add(1);
        request_id.set(rid);

        let api = app_state.client();
        loading.set(true);
        spawn_local(async move {
            let res = api.entries(&current.query(id)).await;
            if request_id.get_untracked() != rid {
                return;
            }
            match res {
                Ok(page) => {
                    let list: Vec<EntryListItem> =
                        page.items.into_iter().filter(|i| current.keeps(i)).collect();
                    log!("[hobby] {current} tab of {id}: {} entries", list.len());
                    items.set(list);
                }
                Err(e) => {
                    error!("[hobby] {current} tab of {id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            loading.set(false);
        });
    });

    let set_tab = move |next: HobbyTab| {
        if let Some(id) = hobby_id.get_untracked() {
            navigate.with_value(|nav| nav(&format!("/hobbies/{id}?tab={next}"), Default::default()));
        }
    };

    let on_save = move |_| {
        let Some(id) = hobby_id.get_untracked() else {
            return;
        };
        if saving.get_untracked() {
            return;
        }
        let Some(name) = non_blank(&rename_value.get_untracked()) else {
            error_msg.set(Some(app_state.tr_untracked("hobby.name_required")));
            return;
        };
        let req = HobbyUpdate {
            name: Some(name),
            color: non_blank(&color_value.get_untracked()),
            ..HobbyUpdate::default()
        };
        let api = app_state.client();
        saving.set(true);
        error_msg.set(None);
        spawn_local(async move {
            match api.update_hobby(id, &req).await {
                Ok(updated) => {
                    log!("[hobby] updated {id}");
                    hobby.set(Some(updated));
                    app_state.hobbies_changed();
                }
                Err(e) => {
                    error!("[hobby] update {id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            saving.set(false);
        });
    };

    let on_delete = move |_| {
        let Some(id) = hobby_id.get_untracked() else {
            return;
        };
        if deleting.get_untracked() || !confirm(&app_state.tr_untracked("hobby.delete_confirm")) {
            return;
        }
        let api = app_state.client();
        deleting.set(true);
        error_msg.set(None);
        spawn_local(async move {
            match api.delete_hobby(id).await {
                Ok(_) => {
                    log!("[hobby] deleted {id}");
                    app_state.hobbies_changed();
                    navigate.with_value(|nav| nav("/entries", Default::default()));
                }
                Err(e) => {
                    error!("[hobby] delete {id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            deleting.set(false);
        });
    };

    let hobby_name = move || hobby.with(|h| h.as_ref().map(|h| h.name.clone()).unwrap_or_default());
    let hobby_color = move || {
        hobby.with(|h| {
            h.as_ref()
                .and_then(|h| h.color.clone())
                .unwrap_or_else(|| DEFAULT_HOBBY_COLOR.to_string())
        })
    };

    view! {
        <div class="space-y-4">
            <div class="flex flex-wrap items-center justify-between gap-3">
                <h1 class="flex items-center gap-2 text-lg font-semibold">
                    <span class="size-3 rounded-full" style=move || format!("background-color: {}", hobby_color()) />
                    {hobby_name}
                </h1>
                {move || {
                    let (all_href, new_href) = match hobby_id.get() {
                        Some(id) => (
                            format!("/entries?hobby_id={id}&include_descendants=true"),
                            format!("/entries/new?hobby_id={id}"),
                        ),
                        None => ("/entries".to_string(), "/entries/new".to_string()),
                    };
                    view! {
                        <div class="flex items-center gap-1">
                            <LinkButton href=all_href>{app_state.tr("hobby.view_all")}</LinkButton>
                            <LinkButton href=new_href primary=true>
                                <Plus />
                                {app_state.tr("entry.new")}
                            </LinkButton>
                        </div>
                    }
                }}
            </div>

            <ErrorBanner message=error_msg dismissible=true />

            <div class="flex gap-1 border-b pb-2" role="tablist">
                {move || {
                    let current = tab.get();
                    HobbyTab::iter()
                        .map(|t| {
                            let variant = if current == t { ButtonVariant::Active } else { ButtonVariant::Ghost };
                            view! {
                                <Button
                                    variant=variant
                                    size=ButtonSize::Sm
                                    attr:role="tab"
                                    on:click=move |_| set_tab(t)
                                >
                                    {app_state.tr(&format!("tabs.{t}"))}
                                </Button>
                            }
                        })
                        .collect_view()
                }}
            </div>

            {move || {
                let (Some(id), current) = (hobby_id.get(), tab.get()) else {
                    return ().into_any();
                };
                current
                    .forms()
                    .iter()
                    .map(|kind| {
                        view! {
                            <QuickAddForm
                                kind=*kind
                                hobby_id=id
                                on_created=Callback::new(move |_| list_version.update(|v| *v = v.wrapping_add(1)))
                            />
                        }
                    })
                    .collect_view()
                    .into_any()
            }}

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
                            children=move |item: EntryListItem| view! { <EntryCard item=item /> }
                        />
                    </div>
                }
                .into_any()
            }}

            <Card>
                <CardHeader>
                    <CardTitle class="text-base">{move || app_state.tr("hobby.manage")}</CardTitle>
                </CardHeader>
                <CardContent class="flex flex-wrap items-end gap-3">
                    <div class="flex min-w-48 flex-1 flex-col gap-1.5">
                        <Label html_for="hobby-name">{move || app_state.tr("hobby.name")}</Label>
                        <Input id="hobby-name" bind_value=rename_value disabled=saving />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="hobby-color">{move || app_state.tr("hobby.color")}</Label>
                        <Input id="hobby-color" r#type="color" class="w-16 p-1" bind_value=color_value disabled=saving />
                    </div>
                    <Button size=ButtonSize::Sm attr:disabled=move || saving.get() on:click=on_save>
                        <Show when=move || saving.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || app_state.tr("common.save")}
                    </Button>
                    <Button
                        variant=ButtonVariant::Destructive
                        size=ButtonSize::Sm
                        attr:disabled=move || deleting.get()
                        on:click=on_delete
                    >
                        <Trash2 />
                        {move || app_state.tr("common.delete")}
                    </Button>
                </CardContent>
            </Card>
        </div>
    }
}

/// How a quick-add settled. Once the create succeeded the entry exists, whatever the property
/// write did.
#[derive(Debug, PartialEq)]
pub(crate) enum QuickAddOutcome {
    Created(i64),
    PropsFailed(i64, ApiError),
    Failed(ApiError),
}

impl QuickAddOutcome {
    pub(crate) async fn settle<C, P, W>(create: C, write_props: impl FnOnce(i64) -> P) -> Self
    where
        C: Future<Output = ApiResult<i64>>,
        P: Future<Output = ApiResult<W>>,
    {
        let id = match create.await {
            Ok(id) => id,
            Err(e) => return Self::Failed(e),
        };
        match write_props(id).await {
            Ok(_) => Self::Created(id),
            Err(e) => Self::PropsFailed(id, e),
        }
    }

    /// The entry exists: clear the form and reload the list.
    pub(crate) fn created(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Create an entry of a fixed type, then write its properties in one full replacement.
#[component]
fn QuickAddForm(kind: QuickAdd, hobby_id: i64, on_created: Callback<()>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let fields: Vec<(&'static str, RwSignal<String>)> = kind
        .form_fields()
        .iter()
        .map(|f| (*f, RwSignal::new(String::new())))
        .collect();
    let fields = StoredValue::new(fields);
    let submitting: RwSignal<bool> = RwSignal::new(false);
    let error_msg: RwSignal<Option<String>> = RwSignal::new(None);

    let snapshot = move || {
        fields.with_value(|fs| {
            fs.iter()
                .map(|(k, v)| (k.to_string(), v.get_untracked()))
                .collect::<BTreeMap<_, _>>()
        })
    };
    let clear = move || fields.with_value(|fs| fs.iter().for_each(|(_, v)| v.set(String::new())));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let (entry, props) = match kind.build(hobby_id, &snapshot()) {
            Ok(built) => built,
            Err(key) => {
                error_msg.set(Some(app_state.tr_untracked(key)));
                return;
            }
        };

        let api = app_state.client();
        submitting.set(true);
        error_msg.set(None);
        spawn_local(async move {
            let outcome = QuickAddOutcome::settle(
                async { api.create_entry(&entry).await.map(|created| created.id) },
                |id| api.set_entry_props(id, &props),
            )
            .await;
            match &outcome {
                QuickAddOutcome::Created(id) => {
                    log!("[hobby] quick-added {} entry {id}", kind.type_key());
                }
                QuickAddOutcome::PropsFailed(id, e) => {
                    error!("[hobby] props of quick-added entry {id} failed: {e}");
                    let message = app_state.error_text(e);
                    let text = app_state
                        .locale
                        .get_untracked()
                        .bundle()
                        .text_with("quick_add.props_failed", &[("message", message.as_str())]);
                    error_msg.set(Some(text));
                }
                QuickAddOutcome::Failed(e) => {
                    error!("[hobby] quick-add {} failed: {e}", kind.type_key());
                    error_msg.set(Some(app_state.error_text(e)));
                }
            }
            if outcome.created() {
                clear();
                on_created.run(());
            }
            submitting.set(false);
        });
    };

    view! {
        <Card class="gap-3 py-4">
            <CardContent class="px-4">
                <form class="grid gap-3 md:grid-cols-3" on:submit=on_submit>
                    {fields.with_value(|fs| {
                        fs.iter()
                            .map(|(field, value)| {
                                let wide = matches!(*field, "tags" | "notes");
                                view! {
                                    <Input
                                        class=if wide { "md:col-span-2" } else { "" }
                                        placeholder=app_state.tr_untracked(&format!("quick_add.field.{field}"))
                                        bind_value=*value
                                        disabled=submitting
                                    />
                                }
                            })
                            .collect_view()
                    })}
                    <div class="md:col-span-3">
                        <ErrorBanner message=error_msg />
                    </div>
                    <div class="flex justify-end md:col-span-3">
                        <Button size=ButtonSize::Sm attr:disabled=move || submitting.get()>
                            <Show when=move || submitting.get() fallback=|| view! { <Plus /> }>
                                <Spinner />
                            </Show>
                            {move || app_state.tr(kind.label_key())}
                        </Button>
                    </div>
                </form>
            </CardContent>
        </Card>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LocaleCode;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::future::ready;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn item(type_key: &str) -> EntryListItem {
        EntryListItem {
            id: 1,
            hobby_id: 3,
            type_key: type_key.to_string(),
            title: None,
            description: None,
            tags: None,
            created_at: String::new(),
            updated_at: None,
            media_count: 0,
            thumbnail_url: None,
            props: Default::default(),
        }
    }

    #[test]
    fn tab_param_falls_back_to_entries() {
        assert_eq!(HobbyTab::from_param(Some("library")), HobbyTab::Library);
        assert_eq!(HobbyTab::from_param(Some("links")), HobbyTab::Links);
        assert_eq!(HobbyTab::from_param(Some("nope")), HobbyTab::Entries);
        assert_eq!(HobbyTab::from_param(None), HobbyTab::Entries);
    }

    #[test]
    fn library_tab_lists_books_only() {
        let q = HobbyTab::Library.query(3);
        assert_eq!(q.hobby_id, Some(3));
        assert_eq!(q.type_key.as_deref(), Some("book"));
        assert!(!q.include_descendants);
    }

    #[test]
    fn links_tab_keeps_bookmarks_and_brand_links() {
        assert!(HobbyTab::Links.keeps(&item("bookmark")));
        assert!(HobbyTab::Links.keeps(&item("brand_link")));
        assert!(!HobbyTab::Links.keeps(&item("photo")));
        assert!(HobbyTab::Entries.keeps(&item("photo")));
    }

    #[test]
    fn book_quick_add_writes_every_book_prop() {
        let form = values(&[
            ("title", "Dune"),
            ("author", "Frank Herbert"),
            ("notes", "Reread"),
            ("tags", "SciFi, classics"),
        ]);
        let (entry, props) = QuickAdd::Book.build(3, &form).expect("valid form");
        assert_eq!(entry.type_key, "book");
        assert_eq!(entry.title.as_deref(), Some("Dune"));
        assert_eq!(entry.description.as_deref(), Some("Reread"));
        assert_eq!(entry.tags.as_deref(), Some("scifi,classics"));

        let keys: Vec<&str> = props.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(
            keys,
            ["author", "isbn", "publisher", "year", "cover_url", "link", "rating"]
        );
        assert_eq!(props[0].value_text, "Frank Herbert");
        assert_eq!(props[1].value_text, "");
    }

    #[test]
    fn brand_link_title_comes_from_brand() {
        let form = values(&[("brand", "Leica"), ("url", "https://leica.com")]);
        let (entry, props) = QuickAdd::BrandLink.build(3, &form).expect("valid form");
        assert_eq!(entry.type_key, "brand_link");
        assert_eq!(entry.title.as_deref(), Some("Leica"));
        assert_eq!(props[0], PropValue::new("brand", "Leica"));
        assert_eq!(props[1], PropValue::new("url", "https://leica.com"));
    }

    #[test]
    fn quick_add_requires_a_title() {
        let form = values(&[("url", "https://example.com")]);
        assert_eq!(
            QuickAdd::Bookmark.build(3, &form),
            Err("quick_add.title_required")
        );
    }

    #[test]
    fn quick_add_reloads_even_when_props_fail() {
        let outcome = block_on(QuickAddOutcome::settle(ready(Ok(41)), |id| {
            assert_eq!(id, 41);
            ready(Err::<(), _>(ApiError::Network("offline".to_string())))
        }));
        assert_eq!(
            outcome,
            QuickAddOutcome::PropsFailed(41, ApiError::Network("offline".to_string()))
        );
        assert!(outcome.created());
    }

    #[test]
    fn failed_create_skips_the_prop_write() {
        let wrote = Cell::new(false);
        let outcome = block_on(QuickAddOutcome::settle(
            ready(Err(ApiError::Network("offline".to_string()))),
            |_| {
                wrote.set(true);
                ready(Ok(()))
            },
        ));
        assert!(!outcome.created());
        assert!(!wrote.get());
    }

    #[test]
    fn quick_add_succeeds_when_both_writes_do() {
        let outcome = block_on(QuickAddOutcome::settle(ready(Ok(7)), |_| ready(Ok(()))));
        assert_eq!(outcome, QuickAddOutcome::Created(7));
    }

    #[test]
    fn props_failure_message_carries_the_cause() {
        for locale in [LocaleCode::En, LocaleCode::Tr] {
            let text = locale
                .bundle()
                .text_with("quick_add.props_failed", &[("message", "HTTP 500")]);
            assert!(text.contains("HTTP 500"), "{text}");
            assert!(!text.contains("{message}"), "{text}");
        }
    }
}
