use crate::i18n::LocaleCode;
use crate::tree::ExpandedSet;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub(crate) const THEME_KEY: &str = "hobby_journal_theme";
pub(crate) const LOCALE_KEY: &str = "hobby_journal_locale";
pub(crate) const EXPANDED_HOBBIES_KEY: &str = "hobby_journal_expanded_hobbies";
pub(crate) const SIDEBAR_COLLAPSED_KEY: &str = "hobby_journal_sidebar_collapsed";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Theme {
    #[default]
    Dark,
    Light,
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_string_from_storage(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub(crate) fn save_string_to_storage(key: &str, value: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(key, value);
    }
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let json = load_string_from_storage(key)?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        save_string_to_storage(key, &json);
    }
}

pub(crate) fn load_theme() -> Theme {
    load_string_from_storage(THEME_KEY)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

pub(crate) fn save_theme(theme: Theme) {
    save_string_to_storage(THEME_KEY, &theme.to_string());
}

/// Reflect the theme on `<html>` as the `dark` class.
pub(crate) fn apply_theme(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    let classes = root.class_list();
    let _ = match theme {
        Theme::Dark => classes.add_1("dark"),
        Theme::Light => classes.remove_1("dark"),
    };
}

/// Stored choice first, then the browser language, then English.
pub(crate) fn load_locale() -> LocaleCode {
    load_string_from_storage(LOCALE_KEY)
        .and_then(|v| v.parse().ok())
        .or_else(|| {
            web_sys::window()
                .and_then(|w| w.navigator().language())
                .and_then(|tag| LocaleCode::from_lang_tag(&tag))
        })
        .unwrap_or_default()
}

pub(crate) fn save_locale(locale: LocaleCode) {
    save_string_to_storage(LOCALE_KEY, &locale.code());
}

pub(crate) fn load_expanded_hobbies() -> ExpandedSet {
    load_json_from_storage(EXPANDED_HOBBIES_KEY).unwrap_or_default()
}

pub(crate) fn save_expanded_hobbies(expanded: &ExpandedSet) {
    save_json_to_storage(EXPANDED_HOBBIES_KEY, expanded);
}

pub(crate) fn load_sidebar_collapsed() -> bool {
    load_string_from_storage(SIDEBAR_COLLAPSED_KEY).as_deref() == Some("1")
}

pub(crate) fn save_sidebar_collapsed(collapsed: bool) {
    save_string_to_storage(SIDEBAR_COLLAPSED_KEY, if collapsed { "1" } else { "0" });
}

// Browser-only: `web_sys::window()` is unavailable in native test runs.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn theme_roundtrip() {
        save_theme(Theme::Light);
        assert_eq!(load_theme(), Theme::Light);
        save_theme(Theme::Dark);
        assert_eq!(load_theme(), Theme::Dark);
    }

    #[wasm_bindgen_test]
    fn garbage_theme_falls_back_to_default() {
        save_string_to_storage(THEME_KEY, "sepia");
        assert_eq!(load_theme(), Theme::Dark);
    }

    #[wasm_bindgen_test]
    fn locale_roundtrip() {
        save_locale(LocaleCode::Tr);
        assert_eq!(load_locale(), LocaleCode::Tr);
        save_locale(LocaleCode::En);
        assert_eq!(load_locale(), LocaleCode::En);
    }

    #[wasm_bindgen_test]
    fn expanded_hobbies_roundtrip() {
        let mut expanded = ExpandedSet::default();
        expanded.expand_all([3, 1]);
        save_expanded_hobbies(&expanded);
        assert_eq!(load_expanded_hobbies(), expanded);
    }

    #[wasm_bindgen_test]
    fn sidebar_collapsed_roundtrip() {
        save_sidebar_collapsed(true);
        assert!(load_sidebar_collapsed());
        save_sidebar_collapsed(false);
        assert!(!load_sidebar_collapsed());
    }

    #[wasm_bindgen_test]
    fn apply_theme_toggles_dark_class() {
        apply_theme(Theme::Dark);
        let root = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
            .expect("document element");
        assert!(root.class_list().contains("dark"));
        apply_theme(Theme::Light);
        assert!(!root.class_list().contains("dark"));
    }
}
