use crate::components::ui::{
    Button, ButtonSize, Card, CardContent, CardHeader, CardTitle, ErrorBanner, Input, Label,
    LoadingBlock, NativeSelect, Spinner, Textarea,
};
use crate::models::{EntryCreate, HobbyType};
use crate::state::AppContext;
use crate::tree::HobbyArena;
use crate::util::{non_blank, normalize_tags, parse_id};
use icons::{ArrowLeft, Save};
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_query_map};

/// Preselected hobby: the requested one when it exists, else the first option.
pub(crate) fn default_hobby(options: &[(i64, String)], requested: Option<i64>) -> Option<i64> {
    requested
        .filter(|id| options.iter().any(|(o, _)| o == id))
        .or_else(|| options.first().map(|(id, _)| *id))
}

/// Validate the form into a create request. Errors are translation keys.
pub(crate) fn entry_create(
    hobby: &str,
    type_key: &str,
    title: &str,
    description: &str,
    tags: &str,
) -> Result<EntryCreate, &'static str> {
    let hobby_id = parse_id(hobby).ok_or("entry.hobby_required")?;
    let type_key = non_blank(type_key).ok_or("entry.type_required")?;
    Ok(EntryCreate {
        hobby_id,
        type_key,
        title: non_blank(title),
        description: non_blank(description),
        tags: normalize_tags(tags),
    })
}

#[component]
pub fn NewEntryPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());
    let query = use_query_map();

    let hobby_options: RwSignal<Vec<(String, String)>> = RwSignal::new(vec![]);
    let hobby_types: RwSignal<Vec<HobbyType>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let submitting: RwSignal<bool> = RwSignal::new(false);
    let error_msg: RwSignal<Option<String>> = RwSignal::new(None);

    let hobby_sel: RwSignal<String> = RwSignal::new(String::new());
    let type_sel: RwSignal<String> = RwSignal::new(String::new());
    let title: RwSignal<String> = RwSignal::new(String::new());
    let description: RwSignal<String> = RwSignal::new(String::new());
    let tags: RwSignal<String> = RwSignal::new(String::new());

    Effect::new(move |_| {
        let requested = query
            .get_untracked()
            .get("hobby_id")
            .as_deref()
            .and_then(parse_id);
        let api = app_state.client();
        spawn_local(async move {
            let (tree, types) = futures::join!(api.hobby_tree(), api.hobby_types());
            match (tree, types) {
                (Ok(forest), Ok(types)) => {
                    let options = HobbyArena::from_forest(&forest).select_options();
                    if let Some(id) = default_hobby(&options, requested) {
                        hobby_sel.set(id.to_string());
                    }
                    if let Some(first) = types.first() {
                        type_sel.set(first.key.clone());
                    }
                    hobby_options.set(
                        options
                            .into_iter()
                            .map(|(id, label)| (id.to_string(), label))
                            .collect(),
                    );
                    hobby_types.set(types);
                }
                (Err(e), _) | (_, Err(e)) => {
                    error!("[new-entry] form data load failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            loading.set(false);
        });
    });

    let type_options = Signal::derive(move || {
        hobby_types.with(|types| {
            types
                .iter()
                .map(|t| (t.key.clone(), t.title.clone()))
                .collect::<Vec<_>>()
        })
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }

        let req = match entry_create(
            &hobby_sel.get_untracked(),
            &type_sel.get_untracked(),
            &title.get_untracked(),
            &description.get_untracked(),
            &tags.get_untracked(),
        ) {
            Ok(req) => req,
            Err(key) => {
                error_msg.set(Some(app_state.tr_untracked(key)));
                return;
            }
        };

        let api = app_state.client();
        submitting.set(true);
        error_msg.set(None);

        spawn_local(async move {
            match api.create_entry(&req).await {
                Ok(created) => {
                    log!("[new-entry] created entry {}", created.id);
                    navigate.with_value(|nav| nav(&format!("/entries/{}", created.id), Default::default()));
                }
                Err(e) => {
                    error!("[new-entry] create failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            submitting.set(false);
        });
    };

    view! {
        <div class="mx-auto max-w-2xl space-y-4">
            <a href="/entries" class="inline-flex items-center gap-1 text-xs text-muted-foreground hover:text-foreground">
                <ArrowLeft class="size-3" />
                {move || app_state.tr("entry.back")}
            </a>

            <Card>
                <CardHeader>
                    <CardTitle>{move || app_state.tr("entry.new")}</CardTitle>
                </CardHeader>
                <CardContent>
                    <Show
                        when=move || !loading.get()
                        fallback=move || view! { <LoadingBlock label=Signal::derive(move || app_state.tr("common.loading")) /> }
                    >
                        <form class="flex flex-col gap-4" on:submit=on_submit>
                            <ErrorBanner message=error_msg />

                            <div class="grid gap-4 md:grid-cols-2">
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="entry-hobby" required=true>{move || app_state.tr("entry.hobby")}</Label>
                                    <NativeSelect
                                        id="entry-hobby"
                                        options=Signal::derive(move || hobby_options.get())
                                        placeholder=Signal::derive(move || app_state.tr("entry.select_hobby"))
                                        bind_value=hobby_sel
                                    />
                                </div>
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="entry-type" required=true>{move || app_state.tr("entry.type")}</Label>
                                    <NativeSelect
                                        id="entry-type"
                                        options=type_options
                                        placeholder=Signal::derive(move || app_state.tr("entry.select_type"))
                                        bind_value=type_sel
                                    />
                                </div>
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="entry-title">{move || app_state.tr("entry.title")}</Label>
                                <Input id="entry-title" bind_value=title />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="entry-description">{move || app_state.tr("entry.description")}</Label>
                                <Textarea id="entry-description" rows=4 bind_value=description />
                            </div>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="entry-tags">{move || app_state.tr("entry.tags")}</Label>
                                <Input
                                    id="entry-tags"
                                    placeholder=app_state.tr_untracked("entry.tags_placeholder")
                                    bind_value=tags
                                />
                            </div>

                            <div class="flex justify-end">
                                <Button size=ButtonSize::Sm attr:disabled=move || submitting.get()>
                                    <Show when=move || submitting.get() fallback=|| view! { <Save /> }>
                                        <Spinner />
                                    </Show>
                                    {move || app_state.tr("common.create")}
                                </Button>
                            </div>
                        </form>
                    </Show>
                </CardContent>
            </Card>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<(i64, String)> {
        vec![(1, "Photography".to_string()), (2, "• Film".to_string())]
    }

    #[test]
    fn requested_hobby_wins_when_known() {
        assert_eq!(default_hobby(&options(), Some(2)), Some(2));
        assert_eq!(default_hobby(&options(), Some(9)), Some(1));
        assert_eq!(default_hobby(&options(), None), Some(1));
        assert_eq!(default_hobby(&[], Some(2)), None);
    }

    #[test]
    fn create_request_requires_hobby_and_type() {
        assert_eq!(entry_create("", "photo", "", "", ""), Err("entry.hobby_required"));
        assert_eq!(entry_create("3", " ", "", "", ""), Err("entry.type_required"));
    }

    #[test]
    fn create_request_drops_blank_optionals() {
        let req = entry_create("3", "book", " Dune ", "  ", "SciFi, classics,").expect("valid form");
        assert_eq!(req.hobby_id, 3);
        assert_eq!(req.type_key, "book");
        assert_eq!(req.title.as_deref(), Some("Dune"));
        assert_eq!(req.description, None);
        assert_eq!(req.tags.as_deref(), Some("scifi,classics"));
    }
}
