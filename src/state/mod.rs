use crate::api::{ApiClient, ApiError};
use crate::i18n::LocaleCode;
use crate::models::User;
use crate::storage::{apply_theme, load_locale, load_theme, save_locale, save_theme, Theme};
use leptos::prelude::*;

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: StoredValue<ApiClient>,

    /// `None` until the session check answers; `Some(None)` when signed out.
    pub current_user: RwSignal<Option<Option<User>>>,

    pub locale: RwSignal<LocaleCode>,
    pub theme: RwSignal<Theme>,

    /// Bumped after hobby mutations so the sidebar tree reloads.
    pub hobbies_version: RwSignal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        let theme = load_theme();
        apply_theme(theme);

        Self {
            api_client: StoredValue::new(ApiClient::from_env()),
            current_user: RwSignal::new(None),
            locale: RwSignal::new(load_locale()),
            theme: RwSignal::new(theme),
            hobbies_version: RwSignal::new(0),
        }
    }

    pub fn client(&self) -> ApiClient {
        self.api_client.get_value()
    }

    pub fn set_locale(&self, locale: LocaleCode) {
        save_locale(locale);
        self.locale.set(locale);
    }

    pub fn set_theme(&self, theme: Theme) {
        save_theme(theme);
        apply_theme(theme);
        self.theme.set(theme);
    }

    pub fn hobbies_changed(&self) {
        self.hobbies_version.update(|v| *v = v.wrapping_add(1));
    }

    /// Translate a key in the active locale. Tracks the locale signal.
    pub fn tr(&self, key: &str) -> String {
        self.locale.get().bundle().text(key)
    }

    /// Like [`tr`](Self::tr) without subscribing, for static attributes.
    pub fn tr_untracked(&self, key: &str) -> String {
        self.locale.get_untracked().bundle().text(key)
    }

    pub fn tr_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.locale.get().bundle().text_with(key, args)
    }

    /// Route-boundary error handling: a 401 drops the session, everything becomes display text.
    pub fn error_text(&self, e: &ApiError) -> String {
        if e.is_unauthorized() {
            self.current_user.set(Some(None));
        }
        describe_error(self.locale.get_untracked(), e)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

/// Localized one-line description of an API failure.
pub(crate) fn describe_error(locale: LocaleCode, e: &ApiError) -> String {
    let bundle = locale.bundle();
    match e {
        ApiError::Network(_) => bundle.text("errors.network"),
        ApiError::Http { status: 401, .. } => bundle.text("errors.unauthorized"),
        ApiError::Http {
            status: 404,
            message,
            ..
        } => bundle.text_with("errors.not_found", &[("message", message.as_str())]),
        ApiError::Http {
            status, message, ..
        } if *status >= 500 => bundle.text_with("errors.server", &[("message", message.as_str())]),
        ApiError::Http { message, .. } => message.clone(),
        ApiError::Parse(_) => bundle.text("errors.parse"),
        ApiError::File(detail) => bundle.text_with("errors.file", &[("message", detail.as_str())]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, message: &str) -> ApiError {
        ApiError::Http {
            status,
            code: "X".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    #[test]
    fn validation_messages_pass_through() {
        assert_eq!(
            describe_error(LocaleCode::En, &http(422, "Unknown type key")),
            "Unknown type key"
        );
    }

    #[test]
    fn not_found_and_server_errors_are_wrapped() {
        let text = describe_error(LocaleCode::En, &http(404, "Entry not found"));
        assert!(text.contains("Entry not found"));
        let text = describe_error(LocaleCode::En, &http(503, "HTTP 503 Service Unavailable"));
        assert!(text.contains("503"));
    }

    #[test]
    fn network_errors_use_localized_text() {
        let en = describe_error(LocaleCode::En, &ApiError::Network("boom".to_string()));
        let tr = describe_error(LocaleCode::Tr, &ApiError::Network("boom".to_string()));
        assert_ne!(en, tr);
        assert!(!en.contains("boom"));
    }
}
