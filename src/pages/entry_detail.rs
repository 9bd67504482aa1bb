use crate::api::{media_url, write_then_reload, UploadFile};
use crate::components::ui::{
    Badge, Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle,
    ErrorBanner, Input, Label, LoadingBlock, NativeSelect, Spinner, Textarea,
};
use crate::components::{PropertyList, SchemaForm, TagBadges};
use crate::models::{Entry, EntryMedia, EntryProp, EntryUpdate, HobbyType, MediaKind};
use crate::pages::IdRouteParams;
use crate::schema::{PropertyDraft, SchemaError, TypeSchema};
use crate::state::AppContext;
use crate::util::{begin_busy, confirm, date_part, first_selected_file, non_blank, normalize_tags, parse_id, reset_file_input};
use icons::{ArrowLeft, Trash2, Upload, X};
use leptos::logging::{error, log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params};

/// Schema of the entry's type. An unknown type key yields an empty schema.
pub(crate) fn schema_for(types: &[HobbyType], type_key: &str) -> Result<TypeSchema, SchemaError> {
    match types.iter().find(|t| t.key == type_key) {
        Some(t) => TypeSchema::parse(&t.schema_json),
        None => Ok(TypeSchema::default()),
    }
}

/// Details edit buffer as a partial update. Blank fields are left unchanged.
pub(crate) fn details_update(title: &str, description: &str, tags: &str) -> EntryUpdate {
    EntryUpdate {
        title: non_blank(title),
        description: non_blank(description),
        tags: normalize_tags(tags),
    }
}

#[component]
pub fn EntryDetailPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let params = use_params::<IdRouteParams>();
    let navigate = StoredValue::new(use_navigate());

    let entry_id = Memo::new(move |_| {
        params
            .get()
            .ok()
            .and_then(|p| p.id)
            .and_then(|id| parse_id(&id))
    });

    let entry: RwSignal<Option<Entry>> = RwSignal::new(None);
    let props: RwSignal<Vec<EntryProp>> = RwSignal::new(vec![]);
    let media: RwSignal<Vec<EntryMedia>> = RwSignal::new(vec![]);
    let hobby_types: RwSignal<Vec<HobbyType>> = RwSignal::new(vec![]);

    let loading: RwSignal<bool> = RwSignal::new(false);
    let error_msg: RwSignal<Option<String>> = RwSignal::new(None);

    // Details edit mode.
    let editing_details: RwSignal<bool> = RwSignal::new(false);
    let edit_title: RwSignal<String> = RwSignal::new(String::new());
    let edit_description: RwSignal<String> = RwSignal::new(String::new());
    let edit_tags: RwSignal<String> = RwSignal::new(String::new());
    let details_saving: RwSignal<bool> = RwSignal::new(false);
    let deleting: RwSignal<bool> = RwSignal::new(false);

    // Properties edit mode.
    let editing_props: RwSignal<bool> = RwSignal::new(false);
    let draft: RwSignal<PropertyDraft> = RwSignal::new(PropertyDraft::default());
    let props_saving: RwSignal<bool> = RwSignal::new(false);

    let upload_kind: RwSignal<String> = RwSignal::new(MediaKind::Image.to_string());
    let uploading: RwSignal<bool> = RwSignal::new(false);
    let deleting_media: RwSignal<bool> = RwSignal::new(false);

    let schema = Signal::derive(move || {
        let type_key = entry.with(|e| e.as_ref().map(|e| e.type_key.clone()));
        match type_key {
            Some(key) => hobby_types.with(|types| schema_for(types, &key)),
            None => Ok(TypeSchema::default()),
        }
    });

    let load = move |id: i64| {
        let api = app_state.client();
        loading.set(true);
        error_msg.set(None);
        spawn_local(async move {
            let (entry_res, props_res, media_res) =
                futures::join!(api.entry(id), api.entry_props(id), api.entry_media(id));
            let loaded = match (entry_res, props_res, media_res) {
                (Ok(e), Ok(p), Ok(m)) => {
                    edit_title.set(e.title.clone().unwrap_or_default());
                    edit_description.set(e.description.clone().unwrap_or_default());
                    edit_tags.set(e.tags.clone().unwrap_or_default());
                    entry.set(Some(e));
                    props.set(p);
                    media.set(m);
                    true
                }
                (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                    error!("[entry] load {id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                    false
                }
            };

            // The schema depends on the entry's type key.
            if loaded {
                match api.hobby_types().await {
                    Ok(types) => hobby_types.set(types),
                    Err(e) => {
                        error!("[entry] hobby types load failed: {e}");
                        error_msg.set(Some(app_state.error_text(&e)));
                    }
                }
            }
            loading.set(false);
        });
    };

    Effect::new(move |_| {
        editing_details.set(false);
        editing_props.set(false);
        match entry_id.get() {
            Some(id) => load(id),
            None => {
                entry.set(None);
                error_msg.set(Some(app_state.tr_untracked("entry.not_found")));
            }
        }
    });

    let on_save_details = move |_| {
        let Some(id) = entry_id.get_untracked() else {
            return;
        };
        if details_saving.get_untracked() {
            return;
        }
        let req = details_update(
            &edit_title.get_untracked(),
            &edit_description.get_untracked(),
            &edit_tags.get_untracked(),
        );
        let api = app_state.client();
        details_saving.set(true);
        error_msg.set(None);
        spawn_local(async move {
            let res = match api.update_entry(id, &req).await {
                Ok(_) => api.entry(id).await,
                Err(e) => Err(e),
            };
            match res {
                Ok(updated) => {
                    log!("[entry] saved details of {id}");
                    edit_title.set(updated.title.clone().unwrap_or_default());
                    edit_description.set(updated.description.clone().unwrap_or_default());
                    edit_tags.set(updated.tags.clone().unwrap_or_default());
                    entry.set(Some(updated));
                    editing_details.set(false);
                }
                Err(e) => {
                    error!("[entry] save details of {id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            details_saving.set(false);
        });
    };

    let on_cancel_details = move |_| {
        entry.with_untracked(|e| {
            if let Some(e) = e {
                edit_title.set(e.title.clone().unwrap_or_default());
                edit_description.set(e.description.clone().unwrap_or_default());
                edit_tags.set(e.tags.clone().unwrap_or_default());
            }
        });
        editing_details.set(false);
    };

    let on_delete_entry = move |_| {
        let Some(id) = entry_id.get_untracked() else {
            return;
        };
        if deleting.get_untracked() || !confirm(&app_state.tr_untracked("entry.delete_confirm")) {
            return;
        }
        let api = app_state.client();
        deleting.set(true);
        error_msg.set(None);
        spawn_local(async move {
            match api.delete_entry(id).await {
                Ok(_) => {
                    log!("[entry] deleted {id}");
                    navigate.with_value(|nav| nav("/entries", Default::default()));
                }
                Err(e) => {
                    error!("[entry] delete {id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            deleting.set(false);
        });
    };

    let on_edit_props = move |_| {
        let schema = schema.get_untracked().unwrap_or_default();
        draft.set(props.with_untracked(|p| PropertyDraft::new(&schema, p)));
        editing_props.set(true);
    };

    let on_save_props = move |_| {
        let Some(id) = entry_id.get_untracked() else {
            return;
        };
        if props_saving.get_untracked() {
            return;
        }
        let replacement = draft.with_untracked(|d| d.to_props());
        let api = app_state.client();
        props_saving.set(true);
        error_msg.set(None);
        spawn_local(async move {
            let res =
                write_then_reload(api.set_entry_props(id, &replacement), |_| api.entry_props(id))
                    .await;
            match res {
                Ok(p) => {
                    log!("[entry] replaced {} props of {id}", replacement.len());
                    props.set(p);
                    editing_props.set(false);
                }
                Err(e) => {
                    error!("[entry] save props of {id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            props_saving.set(false);
        });
    };

    let on_file_change = move |ev: web_sys::Event| {
        let Some(id) = entry_id.get_untracked() else {
            return;
        };
        if uploading.get_untracked() {
            return;
        }
        let Some(file) = first_selected_file(&ev) else {
            return;
        };
        reset_file_input(&ev);
        let kind = upload_kind.get_untracked().parse::<MediaKind>().ok();
        let api = app_state.client();
        uploading.set(true);
        error_msg.set(None);
        spawn_local(async move {
            let upload = async {
                let file = UploadFile::from_web_file(&file).await?;
                api.upload_media(id, file, kind).await
            };
            let res = write_then_reload(upload, |m| {
                log!("[entry] uploaded media {} to {id}", m.id);
                api.entry_media(id)
            })
            .await;
            match res {
                Ok(m) => media.set(m),
                Err(e) => {
                    error!("[entry] upload to {id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            uploading.set(false);
        });
    };

    let on_delete_media = move |media_id: i64| {
        let Some(id) = entry_id.get_untracked() else {
            return;
        };
        if deleting_media.get_untracked()
            || !confirm(&app_state.tr_untracked("media.delete_confirm"))
            || !begin_busy(deleting_media)
        {
            return;
        }
        let api = app_state.client();
        error_msg.set(None);
        spawn_local(async move {
            let res =
                write_then_reload(api.delete_media(id, media_id), |_| api.entry_media(id)).await;
            match res {
                Ok(m) => media.set(m),
                Err(e) => {
                    warn!("[entry] delete media {media_id} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            deleting_media.set(false);
        });
    };

    let kind_options = Signal::derive(move || {
        MediaKind::UPLOADABLE
            .iter()
            .map(|k| (k.to_string(), app_state.tr(&format!("media.kind.{k}"))))
            .collect::<Vec<_>>()
    });

    let type_title = move || {
        entry.with(|e| {
            e.as_ref().map(|e| {
                hobby_types
                    .with(|types| types.iter().find(|t| t.key == e.type_key).map(|t| t.title.clone()))
                    .unwrap_or_else(|| e.type_key.clone())
            })
        })
    };

    let base_url = app_state.client().base_url().to_string();
    let base_url = StoredValue::new(base_url);

    view! {
        <div class="space-y-4">
            <a href="/entries" class="inline-flex items-center gap-1 text-xs text-muted-foreground hover:text-foreground">
                <ArrowLeft class="size-3" />
                {move || app_state.tr("entry.back")}
            </a>

            <ErrorBanner message=error_msg dismissible=true />

            <Show
                when=move || entry.with(|e| e.is_some())
                fallback=move || view! {
                    <Show when=move || loading.get() fallback=|| ().into_view()>
                        <LoadingBlock label=Signal::derive(move || app_state.tr("common.loading")) />
                    </Show>
                }
            >
                // Details
                <Card>
                    <CardHeader class="flex flex-row items-start justify-between gap-3">
                        <div class="min-w-0 space-y-1">
                            <CardTitle class="truncate">
                                {move || entry.with(|e| {
                                    e.as_ref()
                                        .and_then(|e| e.title.clone())
                                        .filter(|t| !t.trim().is_empty())
                                })
                                .unwrap_or_else(|| app_state.tr("entry.untitled"))}
                            </CardTitle>
                            <div class="flex items-center gap-2 text-xs text-muted-foreground">
                                <Badge>{type_title}</Badge>
                                <span>
                                    {move || entry.with(|e| e.as_ref().map(|e| date_part(&e.created_at).to_string()))}
                                </span>
                            </div>
                        </div>
                        <div class="flex shrink-0 items-center gap-1">
                            <Show when=move || !editing_details.get() fallback=|| ().into_view()>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| editing_details.set(true)
                                >
                                    {move || app_state.tr("common.edit")}
                                </Button>
                            </Show>
                            <Button
                                variant=ButtonVariant::Destructive
                                size=ButtonSize::Sm
                                attr:disabled=move || deleting.get()
                                on:click=on_delete_entry
                            >
                                <Trash2 />
                                {move || app_state.tr("common.delete")}
                            </Button>
                        </div>
                    </CardHeader>
                    <CardContent class="space-y-3">
                        <Show
                            when=move || editing_details.get()
                            fallback=move || view! {
                                <div class="space-y-2">
                                    <p class="whitespace-pre-wrap text-sm">
                                        {move || entry.with(|e| e.as_ref().and_then(|e| e.description.clone()).unwrap_or_default())}
                                    </p>
                                    {move || {
                                        let tags = entry.with(|e| e.as_ref().and_then(|e| e.tags.clone()));
                                        view! { <TagBadges tags=tags linked=true /> }
                                    }}
                                </div>
                            }
                        >
                            <div class="flex flex-col gap-3">
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="edit-title">{move || app_state.tr("entry.title")}</Label>
                                    <Input id="edit-title" bind_value=edit_title disabled=details_saving />
                                </div>
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="edit-description">{move || app_state.tr("entry.description")}</Label>
                                    <Textarea id="edit-description" rows=4 bind_value=edit_description disabled=details_saving />
                                </div>
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="edit-tags">{move || app_state.tr("entry.tags")}</Label>
                                    <Input
                                        id="edit-tags"
                                        placeholder=app_state.tr_untracked("entry.tags_placeholder")
                                        bind_value=edit_tags
                                        disabled=details_saving
                                    />
                                </div>
                                <div class="flex justify-end gap-2">
                                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_cancel_details>
                                        {move || app_state.tr("common.cancel")}
                                    </Button>
                                    <Button size=ButtonSize::Sm attr:disabled=move || details_saving.get() on:click=on_save_details>
                                        <Show when=move || details_saving.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        {move || app_state.tr("common.save")}
                                    </Button>
                                </div>
                            </div>
                        </Show>
                    </CardContent>
                </Card>

                // Properties
                <Card>
                    <CardHeader class="flex flex-row items-center justify-between">
                        <CardTitle class="text-base">{move || app_state.tr("entry.properties")}</CardTitle>
                        <Show when=move || !editing_props.get() fallback=|| ().into_view()>
                            <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_edit_props>
                                {move || app_state.tr("common.edit")}
                            </Button>
                        </Show>
                    </CardHeader>
                    <CardContent>
                        <Show
                            when=move || editing_props.get()
                            fallback=move || view! { <PropertyList schema=schema props=Signal::derive(move || props.get()) /> }
                        >
                            <div class="flex flex-col gap-3">
                                <SchemaForm schema=schema draft=draft disabled=props_saving />
                                <div class="flex justify-end gap-2">
                                    <Button
                                        variant=ButtonVariant::Ghost
                                        size=ButtonSize::Sm
                                        on:click=move |_| editing_props.set(false)
                                    >
                                        {move || app_state.tr("common.cancel")}
                                    </Button>
                                    <Button
                                        size=ButtonSize::Sm
                                        attr:disabled=move || props_saving.get() || schema.with(|s| s.is_err())
                                        on:click=on_save_props
                                    >
                                        <Show when=move || props_saving.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        {move || app_state.tr("common.save")}
                                    </Button>
                                </div>
                            </div>
                        </Show>
                    </CardContent>
                </Card>

                // Media
                <Card>
                    <CardHeader class="flex flex-row items-center justify-between gap-2">
                        <CardTitle class="text-base">{move || app_state.tr("entry.media")}</CardTitle>
                        <div class="flex items-center gap-2">
                            <NativeSelect class="h-8 w-28 text-xs" options=kind_options bind_value=upload_kind />
                            <label
                                for="media-upload"
                                class="inline-flex h-8 cursor-pointer items-center gap-1.5 rounded-md bg-primary px-3 text-sm font-medium text-primary-foreground hover:bg-primary/90"
                            >
                                <Show when=move || uploading.get() fallback=|| view! { <Upload class="size-4" /> }>
                                    <Spinner />
                                </Show>
                                {move || app_state.tr("media.upload")}
                            </label>
                            <input
                                id="media-upload"
                                type="file"
                                class="hidden"
                                disabled=move || uploading.get()
                                on:change=on_file_change
                            />
                        </div>
                    </CardHeader>
                    <CardContent>
                        <Show
                            when=move || media.with(|m| !m.is_empty())
                            fallback=move || view! {
                                <p class="py-6 text-center text-xs text-muted-foreground">{move || app_state.tr("media.empty")}</p>
                            }
                        >
                            <div class="grid grid-cols-2 gap-3 md:grid-cols-3">
                                <For
                                    each=move || media.get()
                                    key=|m| m.id
                                    children=move |m: EntryMedia| {
                                        let src = base_url.with_value(|b| media_url(b, &m.file_path));
                                        let media_id = m.id;
                                        view! {
                                            <div class="group relative overflow-hidden rounded-md border bg-muted">
                                                <MediaPreview kind=m.kind.unwrap_or(MediaKind::Unknown) src=src />
                                                <button
                                                    type="button"
                                                    class="absolute right-2 top-2 rounded bg-destructive p-1 text-white opacity-0 transition-opacity group-hover:opacity-100"
                                                    aria-label=move || app_state.tr("common.delete")
                                                    disabled=move || deleting_media.get()
                                                    on:click=move |_| on_delete_media(media_id)
                                                >
                                                    <X class="size-3" />
                                                </button>
                                            </div>
                                        }
                                    }
                                />
                            </div>
                        </Show>
                    </CardContent>
                </Card>
            </Show>
        </div>
    }
}

#[component]
fn MediaPreview(kind: MediaKind, src: String) -> impl IntoView {
    match kind {
        MediaKind::Image => view! {
            <img src=src alt="" class="aspect-square w-full object-cover" />
        }
        .into_any(),
        MediaKind::Video => view! {
            <video src=src controls=true class="aspect-square w-full bg-black object-contain" />
        }
        .into_any(),
        MediaKind::Audio => view! {
            <div class="flex aspect-square items-center justify-center p-2">
                <audio src=src controls=true class="w-full" />
            </div>
        }
        .into_any(),
        MediaKind::Doc | MediaKind::Unknown => view! {
            <a
                href=src
                target="_blank"
                rel="noopener"
                class="flex aspect-square items-center justify-center text-xs uppercase text-muted-foreground hover:text-foreground"
            >
                {kind.to_string()}
            </a>
        }
        .into_any(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_type() -> HobbyType {
        HobbyType {
            id: 1,
            key: "book".to_string(),
            title: "Book".to_string(),
            schema_json: r#"{"type":"object","properties":{"author":{"type":"string"}}}"#.to_string(),
        }
    }

    #[test]
    fn schema_resolves_by_type_key() {
        let schema = schema_for(&[book_type()], "book").expect("valid schema");
        assert!(schema.field("author").is_some());
    }

    #[test]
    fn unknown_type_has_empty_schema() {
        let schema = schema_for(&[book_type()], "bookmark").expect("empty schema");
        assert!(schema.is_empty());
    }

    #[test]
    fn broken_schema_surfaces_as_error() {
        let mut broken = book_type();
        broken.schema_json = "{not json".to_string();
        assert!(schema_for(&[broken], "book").is_err());
    }

    #[test]
    fn details_update_skips_blank_fields() {
        let update = details_update(" Dune ", "", "Sci-Fi , ");
        assert_eq!(update.title.as_deref(), Some("Dune"));
        assert_eq!(update.description, None);
        assert_eq!(update.tags.as_deref(), Some("sci-fi"));
    }
}
