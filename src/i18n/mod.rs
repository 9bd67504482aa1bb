//! JSON-backed UI strings with English fallback.

use serde_json::Value;
use std::sync::LazyLock;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum LocaleCode {
    #[default]
    En,
    Tr,
}

impl LocaleCode {
    pub fn code(self) -> String {
        self.to_string()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Tr => "Türkçe",
        }
    }

    /// Map a browser language tag such as `tr-TR` to a supported locale.
    pub fn from_lang_tag(tag: &str) -> Option<Self> {
        let lowered = tag.trim().to_ascii_lowercase();
        let base = lowered.split(['-', '_']).next().unwrap_or_default();
        Self::iter().find(|locale| locale.code() == base)
    }

    pub fn bundle(self) -> &'static TranslationBundle {
        match self {
            Self::En => &EN,
            Self::Tr => &TR,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TranslationBundle {
    pub locale: LocaleCode,
    tree: Value,
}

impl TranslationBundle {
    fn load(locale: LocaleCode) -> Self {
        let tree = serde_json::from_str(raw_locale(locale)).unwrap_or(Value::Null);
        Self { locale, tree }
    }

    /// Resolve a dotted path (`section.key`). Missing keys fall back to English, then to the path.
    pub fn text(&self, path: &str) -> String {
        resolve(&self.tree, path)
            .or_else(|| resolve(&EN.tree, path))
            .unwrap_or_else(|| path.to_string())
    }

    /// Like [`Self::text`], substituting `{name}` placeholders.
    pub fn text_with(&self, path: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.text(path), |acc, (name, value)| {
                acc.replace(&format!("{{{name}}}"), value)
            })
    }
}

static EN: LazyLock<TranslationBundle> = LazyLock::new(|| TranslationBundle::load(LocaleCode::En));
static TR: LazyLock<TranslationBundle> = LazyLock::new(|| TranslationBundle::load(LocaleCode::Tr));

fn resolve(tree: &Value, path: &str) -> Option<String> {
    let mut node = tree;
    for segment in path.split('.') {
        node = node.get(segment)?;
    }
    node.as_str().map(ToString::to_string)
}

const fn raw_locale(locale: LocaleCode) -> &'static str {
    match locale {
        LocaleCode::En => include_str!("../../i18n/en.json"),
        LocaleCode::Tr => include_str!("../../i18n/tr.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_paths(prefix: &str, node: &Value, out: &mut Vec<String>) {
        if let Some(obj) = node.as_object() {
            for (k, v) in obj {
                let path = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                leaf_paths(&path, v, out);
            }
        } else {
            out.push(prefix.to_string());
        }
    }

    #[test]
    fn bundles_parse() {
        for locale in LocaleCode::iter() {
            assert!(locale.bundle().tree.is_object(), "{locale} bundle must be an object");
        }
    }

    #[test]
    fn turkish_covers_every_english_key() {
        let mut paths = Vec::new();
        leaf_paths("", &EN.tree, &mut paths);
        assert!(!paths.is_empty());
        for path in paths {
            assert!(resolve(&TR.tree, &path).is_some(), "missing tr key: {path}");
        }
    }

    #[test]
    fn missing_key_falls_back_to_path() {
        assert_eq!(LocaleCode::Tr.bundle().text("nope.missing"), "nope.missing");
    }

    #[test]
    fn locale_specific_text_resolves() {
        assert_eq!(LocaleCode::En.bundle().text("nav.settings"), "Settings");
        assert_eq!(LocaleCode::Tr.bundle().text("nav.settings"), "Ayarlar");
    }

    #[test]
    fn placeholders_are_substituted() {
        let text = LocaleCode::En
            .bundle()
            .text_with("entries.count", &[("count", "3")]);
        assert_eq!(text, "3 entries");
    }

    #[test]
    fn lang_tags_map_to_supported_locales() {
        assert_eq!(LocaleCode::from_lang_tag("tr-TR"), Some(LocaleCode::Tr));
        assert_eq!(LocaleCode::from_lang_tag("EN_us"), Some(LocaleCode::En));
        assert_eq!(LocaleCode::from_lang_tag("de"), None);
        assert_eq!("tr".parse::<LocaleCode>().ok(), Some(LocaleCode::Tr));
    }
}
