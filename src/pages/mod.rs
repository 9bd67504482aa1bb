mod entries;
mod entry_detail;
mod hobby;
mod layout;
mod login;
mod new_entry;
mod settings;

pub use entries::EntriesPage;
pub use entry_detail::EntryDetailPage;
pub use hobby::HobbyPage;
pub use layout::AppLayout;
pub use login::LoginPage;
pub use new_entry::NewEntryPage;
pub use settings::SettingsPage;

use crate::components::ui::LoadingBlock;
use crate::state::AppContext;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::params::Params;

#[derive(Params, PartialEq, Clone, Debug)]
pub struct IdRouteParams {
    pub id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthStatus {
    Probing,
    SignedOut,
    SignedIn,
}

/// Gate for every route except `/login`. The session is a cookie, so the
/// only way to know whether we're signed in is to ask for the current user.
#[component]
pub fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    Effect::new(move |_| {
        if app_state.current_user.get().is_some() {
            return;
        }
        let api = app_state.client();
        spawn_local(async move {
            match api.current_user().await {
                Ok(user) => {
                    log!("[auth] session active for user {}", user.id);
                    app_state.current_user.set(Some(Some(user)));
                }
                Err(e) => {
                    warn!("[auth] no session: {e}");
                    app_state.current_user.set(Some(None));
                }
            }
        });
    });

    let status = Memo::new(move |_| {
        app_state.current_user.with(|u| match u {
            None => AuthStatus::Probing,
            Some(None) => AuthStatus::SignedOut,
            Some(Some(_)) => AuthStatus::SignedIn,
        })
    });

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    move || match status.get() {
        AuthStatus::Probing => view! {
            <div class="flex min-h-screen items-center justify-center">
                <LoadingBlock label=Signal::derive(move || app_state.tr("common.loading")) />
            </div>
        }
        .into_any(),
        AuthStatus::SignedOut => view! { <LoginPage /> }.into_any(),
        AuthStatus::SignedIn => view! {
            <AppLayout>
                {move || children.with_value(|c| c())}
            </AppLayout>
        }
        .into_any(),
    }
}

#[component]
pub fn RootPage() -> impl IntoView {
    view! {
        <RootAuthed>
            <EntriesPage />
        </RootAuthed>
    }
}
