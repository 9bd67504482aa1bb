/// Filter set for the entries and search endpoints.
///
/// The same mapping backs the `/entries` route's query string, so filters survive reloads
/// and can be shared as links.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryQuery {
    pub q: Option<String>,
    pub hobby_id: Option<i64>,
    pub type_key: Option<String>,
    pub tag: Option<String>,
    pub include_descendants: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub const KEY_Q: &str = "q";
pub const KEY_HOBBY_ID: &str = "hobby_id";
pub const KEY_TYPE_KEY: &str = "type_key";
pub const KEY_TAG: &str = "tag";
pub const KEY_INCLUDE_DESCENDANTS: &str = "include_descendants";
pub const KEY_LIMIT: &str = "limit";
pub const KEY_OFFSET: &str = "offset";

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl EntryQuery {
    pub fn for_hobby(hobby_id: i64) -> Self {
        Self {
            hobby_id: Some(hobby_id),
            ..Self::default()
        }
    }

    /// Build from raw key/value pairs. Unknown keys and unparseable numbers are ignored.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut out = Self::default();
        for (key, value) in pairs {
            out.set(key, Some(value));
        }
        out
    }

    /// Set one key; `None` or an empty value removes it.
    pub fn set(&mut self, key: &str, value: Option<&str>) {
        let value = non_empty(value);
        match key {
            KEY_Q => self.q = value,
            KEY_HOBBY_ID => self.hobby_id = value.and_then(|v| v.parse().ok()),
            KEY_TYPE_KEY => self.type_key = value,
            KEY_TAG => self.tag = value,
            KEY_INCLUDE_DESCENDANTS => self.include_descendants = value.as_deref() == Some("true"),
            KEY_LIMIT => self.limit = value.and_then(|v| v.parse().ok()),
            KEY_OFFSET => self.offset = value.and_then(|v| v.parse().ok()),
            _ => {}
        }
    }

    pub fn with(mut self, key: &str, value: Option<&str>) -> Self {
        self.set(key, value);
        self
    }

    /// A non-empty `q` routes the listing through full-text search.
    pub fn is_search(&self) -> bool {
        self.q.is_some()
    }

    /// Present keys in a stable order.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(q) = &self.q {
            out.push((KEY_Q, q.clone()));
        }
        if let Some(id) = self.hobby_id {
            out.push((KEY_HOBBY_ID, id.to_string()));
        }
        if let Some(t) = &self.type_key {
            out.push((KEY_TYPE_KEY, t.clone()));
        }
        if let Some(tag) = &self.tag {
            out.push((KEY_TAG, tag.clone()));
        }
        if self.include_descendants {
            out.push((KEY_INCLUDE_DESCENDANTS, "true".to_string()));
        }
        if let Some(limit) = self.limit {
            out.push((KEY_LIMIT, limit.to_string()));
        }
        if let Some(offset) = self.offset {
            out.push((KEY_OFFSET, offset.to_string()));
        }
        out
    }

    /// `?a=b&c=d`, or an empty string when no key is set.
    pub fn to_query_string(&self) -> String {
        let pairs = self.pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let joined = pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{joined}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_renders_nothing() {
        assert_eq!(EntryQuery::default().to_query_string(), "");
    }

    #[test]
    fn unset_keys_are_omitted_and_values_encoded() {
        let q = EntryQuery {
            q: Some("red fox".to_string()),
            hobby_id: Some(3),
            tag: Some("a&b".to_string()),
            ..EntryQuery::default()
        };
        assert_eq!(q.to_query_string(), "?q=red%20fox&hobby_id=3&tag=a%26b");
    }

    #[test]
    fn include_descendants_only_rendered_when_true() {
        let q = EntryQuery::for_hobby(1).with(KEY_INCLUDE_DESCENDANTS, Some("true"));
        assert_eq!(q.to_query_string(), "?hobby_id=1&include_descendants=true");
        let q = q.with(KEY_INCLUDE_DESCENDANTS, None);
        assert_eq!(q.to_query_string(), "?hobby_id=1");
    }

    #[test]
    fn from_pairs_ignores_unknown_and_bad_numbers() {
        let q = EntryQuery::from_pairs([
            ("q", "dune"),
            ("hobby_id", "abc"),
            ("type_key", "book"),
            ("tab", "library"),
            ("offset", "40"),
        ]);
        assert_eq!(q.q.as_deref(), Some("dune"));
        assert_eq!(q.hobby_id, None);
        assert_eq!(q.type_key.as_deref(), Some("book"));
        assert_eq!(q.offset, Some(40));
        assert!(q.is_search());
    }

    #[test]
    fn pairs_round_trip_through_from_pairs() {
        let q = EntryQuery {
            q: Some("film".to_string()),
            hobby_id: Some(2),
            type_key: Some("photo".to_string()),
            tag: Some("bw".to_string()),
            include_descendants: true,
            limit: Some(20),
            offset: Some(0),
        };
        let pairs = q.pairs();
        let back = EntryQuery::from_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        assert_eq!(back, q);
    }

    #[test]
    fn blank_value_removes_key() {
        let q = EntryQuery::default()
            .with(KEY_TAG, Some("travel"))
            .with(KEY_TAG, Some("  "));
        assert!(q.tag.is_none());
    }
}
