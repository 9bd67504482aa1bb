use crate::pages::{
    EntriesPage, EntryDetailPage, HobbyPage, LoginPage, NewEntryPage, RootAuthed, RootPage,
    SettingsPage,
};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // `entries/new` is declared before `entries/:id` so the literal segment wins.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("entries") view=move || view! {
                    <RootAuthed>
                        <EntriesPage />
                    </RootAuthed>
                } />
                <Route path=path!("entries/new") view=move || view! {
                    <RootAuthed>
                        <NewEntryPage />
                    </RootAuthed>
                } />
                <Route path=path!("entries/:id") view=move || view! {
                    <RootAuthed>
                        <EntryDetailPage />
                    </RootAuthed>
                } />
                <Route path=path!("hobbies/:id") view=move || view! {
                    <RootAuthed>
                        <HobbyPage />
                    </RootAuthed>
                } />
                <Route path=path!("settings") view=move || view! {
                    <RootAuthed>
                        <SettingsPage />
                    </RootAuthed>
                } />
                <Route path=path!("") view=RootPage />
            </Routes>
        </Router>
    }
}
