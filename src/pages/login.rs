use crate::components::ui::{
    Button, ButtonSize, Card, CardContent, CardDescription, CardHeader, CardTitle, ErrorBanner,
    Input, Label, Spinner,
};
use crate::state::AppContext;
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_location, use_navigate};

/// Password-only sign-in. Also rendered in place of any route whose session check failed.
#[component]
pub fn LoginPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let password: RwSignal<String> = RwSignal::new(String::new());
    let error_msg: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let navigate = StoredValue::new(use_navigate());
    let location = use_location();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let password_val = password.get_untracked();
        if password_val.is_empty() {
            error_msg.set(Some(app_state.tr_untracked("login.password_required")));
            return;
        }

        let api = app_state.client();
        loading.set(true);
        error_msg.set(None);

        spawn_local(async move {
            match api.login(&password_val).await {
                Ok(_) => {
                    log!("[login] signed in");
                    password.set(String::new());
                    // Re-run the session check.
                    app_state.current_user.set(None);
                    if location.pathname.get_untracked() == "/login" {
                        navigate.with_value(|nav| nav("/entries", Default::default()));
                    }
                }
                Err(e) => {
                    error!("[login] sign-in failed: {e}");
                    let message = if e.is_unauthorized() {
                        app_state.tr_untracked("login.invalid")
                    } else {
                        app_state.error_text(&e)
                    };
                    error_msg.set(Some(message));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <span class="text-sm font-medium text-foreground">{move || app_state.tr("app.title")}</span>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">{move || app_state.tr("login.title")}</CardTitle>
                        <CardDescription class="text-xs">{move || app_state.tr("login.subtitle")}</CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password">{move || app_state.tr("login.password")}</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                    autofocus=true
                                    class="h-8 text-sm"
                                />
                            </div>

                            <ErrorBanner message=error_msg />

                            <Button
                                class="w-full"
                                size=ButtonSize::Sm
                                attr:disabled=move || loading.get()
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() {
                                        app_state.tr("login.submitting")
                                    } else {
                                        app_state.tr("login.submit")
                                    }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}
