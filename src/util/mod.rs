use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Split a comma-joined tag string: trimmed, lowercased, empty and repeated tags dropped.
pub(crate) fn split_tags(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Normalized comma-joined form, or `None` when no tags remain.
pub(crate) fn normalize_tags(raw: &str) -> Option<String> {
    let tags = split_tags(raw);
    (!tags.is_empty()).then(|| tags.join(","))
}

/// Trimmed text, or `None` when blank. Used for optional form fields.
pub(crate) fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Date part of an ISO-8601 timestamp (`2024-05-01T10:00:00` -> `2024-05-01`).
pub(crate) fn date_part(iso: &str) -> &str {
    iso.split(['T', ' ']).next().unwrap_or(iso)
}

/// Parse a numeric route/query parameter.
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok().filter(|id: &i64| *id > 0)
}

/// First file picked in an `<input type="file">` change event.
pub(crate) fn first_selected_file(ev: &web_sys::Event) -> Option<web_sys::File> {
    ev.target()?
        .dyn_into::<web_sys::HtmlInputElement>()
        .ok()?
        .files()?
        .get(0)
}

/// Clear a file input so picking the same file again fires `change`.
pub(crate) fn reset_file_input(ev: &web_sys::Event) {
    if let Some(input) = ev
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
    {
        input.set_value("");
    }
}

pub(crate) fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Mark `busy` and return true, unless a previous action is still in flight.
pub(crate) fn begin_busy(busy: RwSignal<bool>) -> bool {
    if busy.get_untracked() {
        return false;
    }
    busy.set(true);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_tags_trims_lowercases_and_dedupes() {
        assert_eq!(split_tags(" Travel, film ,,TRAVEL, bw"), vec!["travel", "film", "bw"]);
        assert!(split_tags(" , ").is_empty());
    }

    #[test]
    fn normalize_tags_joins_or_clears() {
        assert_eq!(normalize_tags("a, b,,A").as_deref(), Some("a,b"));
        assert_eq!(normalize_tags("   "), None);
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank("  Dune ").as_deref(), Some("Dune"));
        assert_eq!(non_blank("\t"), None);
    }

    #[test]
    fn date_part_takes_calendar_date() {
        assert_eq!(date_part("2024-05-01T10:00:00"), "2024-05-01");
        assert_eq!(date_part("2024-05-01 10:00:00"), "2024-05-01");
        assert_eq!(date_part("2024-05-01"), "2024-05-01");
    }

    #[test]
    fn parse_id_rejects_non_positive_and_garbage() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn begin_busy_refuses_while_in_flight() {
        let busy = RwSignal::new(false);
        assert!(begin_busy(busy));
        assert!(busy.get_untracked());
        assert!(!begin_busy(busy));
        busy.set(false);
        assert!(begin_busy(busy));
    }
}
