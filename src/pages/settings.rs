use crate::api::{media_url, write_then_reload, UploadFile};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, ErrorBanner, Input, Label, LoadingBlock, Spinner,
    Textarea,
};
use crate::i18n::LocaleCode;
use crate::models::{ExportFormat, HobbyType, HobbyTypeCreate, HobbyTypeUpdate, UserUpdate};
use crate::schema::{pretty_schema, SchemaError, TypeSchema};
use crate::state::AppContext;
use crate::storage::Theme;
use crate::util::{begin_busy, confirm, first_selected_file, non_blank, reset_file_input};
use icons::{Trash2, Upload};
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;

pub(crate) const EMPTY_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {}
}"#;

#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum TypeFormError {
    #[error("type key is required")]
    KeyRequired,
    #[error("type key must not contain whitespace")]
    KeyWhitespace,
    #[error("title is required")]
    TitleRequired,
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl TypeFormError {
    fn describe(&self, locale: LocaleCode) -> String {
        let bundle = locale.bundle();
        match self {
            Self::KeyRequired => bundle.text("types.key_required"),
            Self::KeyWhitespace => bundle.text("types.key_whitespace"),
            Self::TitleRequired => bundle.text("types.title_required"),
            Self::Schema(e) => bundle.text_with("types.schema_invalid", &[("message", e.to_string().as_str())]),
        }
    }
}

/// Validate a new type. The schema must parse before it is sent.
pub(crate) fn hobby_type_create(
    key: &str,
    title: &str,
    schema_json: &str,
) -> Result<HobbyTypeCreate, TypeFormError> {
    let key = non_blank(key).ok_or(TypeFormError::KeyRequired)?;
    if key.chars().any(char::is_whitespace) {
        return Err(TypeFormError::KeyWhitespace);
    }
    let title = non_blank(title).ok_or(TypeFormError::TitleRequired)?;
    TypeSchema::parse(schema_json)?;
    Ok(HobbyTypeCreate {
        key,
        title,
        schema_json: schema_json.trim().to_string(),
    })
}

pub(crate) fn hobby_type_update(title: &str, schema_json: &str) -> Result<HobbyTypeUpdate, TypeFormError> {
    let title = non_blank(title).ok_or(TypeFormError::TitleRequired)?;
    TypeSchema::parse(schema_json)?;
    Ok(HobbyTypeUpdate {
        title: Some(title),
        schema_json: Some(schema_json.trim().to_string()),
    })
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    view! {
        <div class="mx-auto max-w-3xl space-y-4">
            <h1 class="text-lg font-semibold">{move || app_state.tr("settings.title")}</h1>
            <ProfileSection />
            <AppearanceSection />
            <HobbyTypesSection />
            <ExportSection />
        </div>
    }
}

#[component]
fn ProfileSection() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let name: RwSignal<String> = RwSignal::new(String::new());
    let bio: RwSignal<String> = RwSignal::new(String::new());
    let saving: RwSignal<bool> = RwSignal::new(false);
    let uploading: RwSignal<bool> = RwSignal::new(false);
    let error_msg: RwSignal<Option<String>> = RwSignal::new(None);
    let notice: RwSignal<Option<String>> = RwSignal::new(None);

    // Fill the form once the session user is known.
    Effect::new(move |filled: Option<bool>| {
        if filled == Some(true) {
            return true;
        }
        app_state.current_user.with(|u| match u {
            Some(Some(user)) => {
                name.set(user.name.clone().unwrap_or_default());
                bio.set(user.bio.clone().unwrap_or_default());
                true
            }
            _ => false,
        })
    });

    let avatar_src = move || {
        let base = app_state.api_client.with_value(|c| c.base_url().to_string());
        app_state.current_user.with(|u| {
            u.as_ref()
                .and_then(|u| u.as_ref())
                .and_then(|u| u.avatar_path.clone())
                .map(|p| media_url(&base, &p))
        })
    };

    let on_save = move |_| {
        if saving.get_untracked() {
            return;
        }
        let req = UserUpdate {
            name: Some(name.get_untracked().trim().to_string()),
            bio: Some(bio.get_untracked().trim().to_string()),
            ..UserUpdate::default()
        };
        let api = app_state.client();
        saving.set(true);
        error_msg.set(None);
        notice.set(None);
        spawn_local(async move {
            match write_then_reload(api.update_current_user(&req), |_| api.current_user()).await {
                Ok(user) => {
                    log!("[settings] profile saved");
                    app_state.current_user.set(Some(Some(user)));
                    notice.set(Some(app_state.tr_untracked("toast.saved")));
                }
                Err(e) => {
                    error!("[settings] profile save failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            saving.set(false);
        });
    };

    let on_avatar_change = move |ev: web_sys::Event| {
        if uploading.get_untracked() {
            return;
        }
        let Some(file) = first_selected_file(&ev) else {
            return;
        };
        reset_file_input(&ev);
        let api = app_state.client();
        uploading.set(true);
        error_msg.set(None);
        notice.set(None);
        spawn_local(async move {
            let upload = async {
                let file = UploadFile::from_web_file(&file).await?;
                api.upload_avatar(file).await
            };
            match write_then_reload(upload, |_| api.current_user()).await {
                Ok(user) => {
                    log!("[settings] avatar uploaded");
                    app_state.current_user.set(Some(Some(user)));
                    notice.set(Some(app_state.tr_untracked("toast.saved")));
                }
                Err(e) => {
                    error!("[settings] avatar upload failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            uploading.set(false);
        });
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-base">{move || app_state.tr("settings.profile")}</CardTitle>
            </CardHeader>
            <CardContent class="flex flex-col gap-3">
                <Show when=move || notice.get().is_some() fallback=|| ().into_view()>
                    <Alert class="border-emerald-500/30">
                        <AlertDescription class="text-xs text-emerald-600 dark:text-emerald-400">
                            {move || notice.get().unwrap_or_default()}
                        </AlertDescription>
                    </Alert>
                </Show>
                <ErrorBanner message=error_msg dismissible=true />

                <div class="grid gap-4 md:grid-cols-2">
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="profile-name">{move || app_state.tr("settings.name")}</Label>
                        <Input id="profile-name" bind_value=name disabled=saving />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="avatar-upload">{move || app_state.tr("settings.avatar")}</Label>
                        <div class="flex items-center gap-3">
                            {move || avatar_src().map(|src| view! {
                                <img src=src alt="" class="size-10 rounded-full object-cover" />
                            })}
                            <label
                                for="avatar-upload"
                                class="inline-flex h-8 cursor-pointer items-center gap-1.5 rounded-md border px-3 text-sm hover:bg-accent"
                            >
                                <Show when=move || uploading.get() fallback=|| view! { <Upload class="size-4" /> }>
                                    <Spinner />
                                </Show>
                                {move || app_state.tr("media.upload")}
                            </label>
                            <input
                                id="avatar-upload"
                                type="file"
                                accept="image/*"
                                class="hidden"
                                disabled=move || uploading.get()
                                on:change=on_avatar_change
                            />
                        </div>
                    </div>
                </div>
                <div class="flex flex-col gap-1.5">
                    <Label html_for="profile-bio">{move || app_state.tr("settings.bio")}</Label>
                    <Textarea id="profile-bio" rows=4 bind_value=bio disabled=saving />
                </div>
                <div class="flex justify-end">
                    <Button size=ButtonSize::Sm attr:disabled=move || saving.get() on:click=on_save>
                        <Show when=move || saving.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || app_state.tr("common.save")}
                    </Button>
                </div>
            </CardContent>
        </Card>
    }
}

#[component]
fn AppearanceSection() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-base">{move || app_state.tr("settings.appearance")}</CardTitle>
            </CardHeader>
            <CardContent class="flex flex-col gap-4">
                <div class="flex items-center justify-between gap-3">
                    <span class="text-sm">{move || app_state.tr("settings.theme")}</span>
                    <div class="flex gap-1">
                        {move || {
                            let current = app_state.theme.get();
                            [Theme::Dark, Theme::Light]
                                .into_iter()
                                .map(|theme| {
                                    let variant = if theme == current { ButtonVariant::Active } else { ButtonVariant::Ghost };
                                    view! {
                                        <Button variant=variant size=ButtonSize::Sm on:click=move |_| app_state.set_theme(theme)>
                                            {app_state.tr(&format!("settings.theme_{theme}"))}
                                        </Button>
                                    }
                                })
                                .collect_view()
                        }}
                    </div>
                </div>
                <div class="flex items-center justify-between gap-3">
                    <span class="text-sm">{move || app_state.tr("settings.language")}</span>
                    <div class="flex gap-1">
                        {move || {
                            let current = app_state.locale.get();
                            LocaleCode::iter()
                                .map(|locale| {
                                    let variant = if locale == current { ButtonVariant::Active } else { ButtonVariant::Ghost };
                                    view! {
                                        <Button variant=variant size=ButtonSize::Sm on:click=move |_| app_state.set_locale(locale)>
                                            {locale.label()}
                                        </Button>
                                    }
                                })
                                .collect_view()
                        }}
                    </div>
                </div>
            </CardContent>
        </Card>
    }
}

#[component]
fn HobbyTypesSection() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let types: RwSignal<Vec<HobbyType>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(false);
    let saving: RwSignal<bool> = RwSignal::new(false);
    let error_msg: RwSignal<Option<String>> = RwSignal::new(None);

    // `Some(key)` while editing an existing type, `None` for a new one.
    let editing: RwSignal<Option<String>> = RwSignal::new(None);
    let key_value: RwSignal<String> = RwSignal::new(String::new());
    let title_value: RwSignal<String> = RwSignal::new(String::new());
    let schema_value: RwSignal<String> = RwSignal::new(EMPTY_SCHEMA.to_string());

    let reload = move || {
        let api = app_state.client();
        loading.set(true);
        spawn_local(async move {
            match api.hobby_types().await {
                Ok(list) => types.set(list),
                Err(e) => {
                    error!("[settings] hobby types load failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            loading.set(false);
        });
    };

    Effect::new(move |_| reload());

    let reset_form = move || {
        editing.set(None);
        key_value.set(String::new());
        title_value.set(String::new());
        schema_value.set(EMPTY_SCHEMA.to_string());
    };

    let start_edit = move |t: HobbyType| {
        editing.set(Some(t.key.clone()));
        key_value.set(t.key);
        title_value.set(t.title);
        schema_value.set(pretty_schema(&t.schema_json));
        error_msg.set(None);
    };

    let on_submit = move |_| {
        if saving.get_untracked() {
            return;
        }
        let locale = app_state.locale.get_untracked();
        let title = title_value.get_untracked();
        let schema_json = schema_value.get_untracked();
        let target = editing.get_untracked();
        let api = app_state.client();

        let pending = match &target {
            Some(_) => hobby_type_update(&title, &schema_json).map(|u| (None, Some(u))),
            None => hobby_type_create(&key_value.get_untracked(), &title, &schema_json).map(|c| (Some(c), None)),
        };
        let (create, update) = match pending {
            Ok(p) => p,
            Err(e) => {
                error_msg.set(Some(e.describe(locale)));
                return;
            }
        };

        saving.set(true);
        error_msg.set(None);
        spawn_local(async move {
            let res = match (target, create, update) {
                (Some(key), _, Some(update)) => api.update_hobby_type(&key, &update).await,
                (_, Some(create), _) => api.create_hobby_type(&create).await,
                _ => {
                    saving.set(false);
                    return;
                }
            };
            match res {
                Ok(t) => {
                    log!("[settings] saved hobby type {}", t.key);
                    reset_form();
                    reload();
                }
                Err(e) => {
                    error!("[settings] hobby type save failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            saving.set(false);
        });
    };

    let deleting_type: RwSignal<bool> = RwSignal::new(false);
    let on_delete = move |key: String| {
        let prompt = app_state
            .locale
            .get_untracked()
            .bundle()
            .text_with("types.delete_confirm", &[("key", key.as_str())]);
        if deleting_type.get_untracked() || !confirm(&prompt) || !begin_busy(deleting_type) {
            return;
        }
        let api = app_state.client();
        error_msg.set(None);
        spawn_local(async move {
            match api.delete_hobby_type(&key).await {
                Ok(_) => {
                    log!("[settings] deleted hobby type {key}");
                    if editing.get_untracked().as_deref() == Some(key.as_str()) {
                        reset_form();
                    }
                    reload();
                }
                Err(e) => {
                    error!("[settings] delete hobby type {key} failed: {e}");
                    error_msg.set(Some(app_state.error_text(&e)));
                }
            }
            deleting_type.set(false);
        });
    };

    // Live parse feedback under the schema editor.
    let schema_status = move || schema_value.with(|s| TypeSchema::parse(s));

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-base">{move || app_state.tr("types.title")}</CardTitle>
                <CardDescription class="text-xs">{move || app_state.tr("types.subtitle")}</CardDescription>
            </CardHeader>
            <CardContent class="flex flex-col gap-4">
                <ErrorBanner message=error_msg dismissible=true />

                <Show
                    when=move || !(loading.get() && types.with(|t| t.is_empty()))
                    fallback=move || view! { <LoadingBlock label=Signal::derive(move || app_state.tr("common.loading")) /> }
                >
                    <ul class="divide-y rounded-md border">
                        <For
                            each=move || types.get()
                            key=|t| (t.id, t.title.clone(), t.schema_json.clone())
                            children=move |t: HobbyType| {
                                let key = t.key.clone();
                                let field_count = TypeSchema::parse(&t.schema_json)
                                    .map(|s| s.fields.len())
                                    .ok();
                                let for_edit = t.clone();
                                view! {
                                    <li class="flex items-center justify-between gap-3 px-3 py-2">
                                        <div class="min-w-0">
                                            <div class="truncate text-sm font-medium">{t.title.clone()}</div>
                                            <div class="text-xs text-muted-foreground">
                                                <code>{t.key.clone()}</code>
                                                " · "
                                                {move || match field_count {
                                                    Some(n) => app_state.tr_with("types.field_count", &[("count", n.to_string().as_str())]),
                                                    None => app_state.tr("schema.invalid"),
                                                }}
                                            </div>
                                        </div>
                                        <div class="flex shrink-0 gap-1">
                                            <Button
                                                variant=ButtonVariant::Outline
                                                size=ButtonSize::Xs
                                                on:click=move |_| start_edit(for_edit.clone())
                                            >
                                                {move || app_state.tr("common.edit")}
                                            </Button>
                                            <Button
                                                variant=ButtonVariant::Ghost
                                                size=ButtonSize::Xs
                                                attr:disabled=move || deleting_type.get()
                                                on:click=move |_| on_delete(key.clone())
                                            >
                                                <Trash2 class="size-3" />
                                            </Button>
                                        </div>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </Show>

                <div class="flex flex-col gap-3 rounded-md border p-3">
                    <div class="text-sm font-medium">
                        {move || match editing.get() {
                            Some(key) => app_state.tr_with("types.editing", &[("key", key.as_str())]),
                            None => app_state.tr("types.new"),
                        }}
                    </div>
                    <div class="grid gap-3 md:grid-cols-2">
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="type-key" required=true>{move || app_state.tr("types.key")}</Label>
                            <Input
                                id="type-key"
                                placeholder="book"
                                bind_value=key_value
                                disabled=Signal::derive(move || saving.get() || editing.with(|e| e.is_some()))
                            />
                        </div>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="type-title" required=true>{move || app_state.tr("types.name")}</Label>
                            <Input id="type-title" placeholder="Book" bind_value=title_value disabled=saving />
                        </div>
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="type-schema">{move || app_state.tr("types.schema")}</Label>
                        <Textarea id="type-schema" class="font-mono text-xs" rows=10 bind_value=schema_value disabled=saving />
                        <p class="text-xs text-muted-foreground">
                            {move || match schema_status() {
                                Ok(s) => app_state.tr_with("types.field_count", &[("count", s.fields.len().to_string().as_str())]),
                                Err(e) => format!("{}: {e}", app_state.tr("schema.invalid")),
                            }}
                        </p>
                    </div>
                    <div class="flex justify-end gap-2">
                        <Show when=move || editing.with(|e| e.is_some()) fallback=|| ().into_view()>
                            <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=move |_| reset_form()>
                                {move || app_state.tr("common.cancel")}
                            </Button>
                        </Show>
                        <Button size=ButtonSize::Sm attr:disabled=move || saving.get() on:click=on_submit>
                            <Show when=move || saving.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            {move || if editing.with(|e| e.is_some()) {
                                app_state.tr("common.save")
                            } else {
                                app_state.tr("common.create")
                            }}
                        </Button>
                    </div>
                </div>
            </CardContent>
        </Card>
    }
}

#[component]
fn ExportSection() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let api = app_state.client();

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-base">{move || app_state.tr("export.title")}</CardTitle>
                <CardDescription class="text-xs">{move || app_state.tr("export.subtitle")}</CardDescription>
            </CardHeader>
            <CardContent class="flex gap-2">
                {ExportFormat::iter()
                    .map(|format| {
                        let href = api.export_url(format);
                        view! {
                            <a
                                href=href
                                download=""
                                class="inline-flex h-8 items-center rounded-md border px-3 text-sm hover:bg-accent"
                            >
                                {move || app_state.tr(&format!("export.{format}"))}
                            </a>
                        }
                    })
                    .collect_view()}
            </CardContent>
        </Card>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK_SCHEMA: &str = r#"{"type":"object","properties":{"author":{"type":"string"}}}"#;

    #[test]
    fn create_trims_key_and_title() {
        let req = hobby_type_create(" book ", " Book ", BOOK_SCHEMA).expect("valid form");
        assert_eq!(req.key, "book");
        assert_eq!(req.title, "Book");
        assert_eq!(req.schema_json, BOOK_SCHEMA);
    }

    #[test]
    fn create_rejects_missing_or_spaced_key() {
        assert_eq!(
            hobby_type_create("  ", "Book", BOOK_SCHEMA),
            Err(TypeFormError::KeyRequired)
        );
        assert_eq!(
            hobby_type_create("brand link", "Brand", BOOK_SCHEMA),
            Err(TypeFormError::KeyWhitespace)
        );
    }

    #[test]
    fn schema_must_parse_before_submit() {
        assert!(matches!(
            hobby_type_create("book", "Book", "{\"type\":"),
            Err(TypeFormError::Schema(SchemaError::InvalidJson(_)))
        ));
        assert!(matches!(
            hobby_type_update("Book", "[]"),
            Err(TypeFormError::Schema(SchemaError::NotAnObject))
        ));
    }

    #[test]
    fn default_schema_is_valid_and_empty() {
        let schema = TypeSchema::parse(EMPTY_SCHEMA).expect("valid schema");
        assert!(schema.is_empty());
    }

    #[test]
    fn update_requires_title() {
        assert_eq!(hobby_type_update(" ", BOOK_SCHEMA), Err(TypeFormError::TitleRequired));
        let update = hobby_type_update("Books", BOOK_SCHEMA).expect("valid form");
        assert_eq!(update.title.as_deref(), Some("Books"));
    }

    #[test]
    fn form_errors_are_localized() {
        let en = TypeFormError::TitleRequired.describe(LocaleCode::En);
        let tr = TypeFormError::TitleRequired.describe(LocaleCode::Tr);
        assert_ne!(en, tr);
    }
}
