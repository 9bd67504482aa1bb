use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_API_URL: &str = "/api";

/// Runtime configuration injected by the hosting page through `window.ENV`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        Self {
            api_url: Self::read_window_env().unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        }
    }

    // Both `window.ENV.API_URL` and the older `window.ENV.api_url` are honoured.
    #[cfg(target_arch = "wasm32")]
    fn read_window_env() -> Option<String> {
        let env = web_sys::window()?.get("ENV")?;
        if env.is_undefined() || !env.is_object() {
            return None;
        }

        ["API_URL", "api_url"].iter().find_map(|key| {
            js_sys::Reflect::get(&env, &(*key).into())
                .ok()
                .and_then(|v| v.as_string())
                .map(|s| normalize_base_url(&s))
                .filter(|s| !s.is_empty())
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read_window_env() -> Option<String> {
        None
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Trailing slashes are dropped so paths can always be appended as `/resource`.
pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

pub(crate) fn get_api_url() -> String {
    EnvConfig::new().api_url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_builds_fall_back_to_relative_api_path() {
        assert_eq!(EnvConfig::new().api_url, "/api");
    }

    #[test]
    fn normalize_base_url_strips_trailing_slashes() {
        assert_eq!(normalize_base_url(" http://localhost:8000/ "), "http://localhost:8000");
        assert_eq!(normalize_base_url("/api//"), "/api");
    }
}
