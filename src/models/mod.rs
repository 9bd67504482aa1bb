use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The single journal owner.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_path: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_path: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LoginRequest {
    pub password: String,
}

/// A hobby category. `children` is only populated by the tree endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Hobby {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub children: Vec<Hobby>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HobbyCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct HobbyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

/// Entry type definition. `schema_json` is a serialized JSON Schema object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HobbyType {
    pub id: i64,
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub schema_json: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HobbyTypeCreate {
    pub key: String,
    pub title: String,
    pub schema_json: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct HobbyTypeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_json: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EntryProp {
    pub id: i64,
    pub entry_id: i64,
    pub key: String,
    #[serde(default)]
    pub value_text: Option<String>,
}

/// Write shape for property replacement.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PropValue {
    pub key: String,
    pub value_text: String,
}

impl PropValue {
    pub fn new(key: impl Into<String>, value_text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_text: value_text.into(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub(crate) struct PropsReplace<'a> {
    pub props: &'a [PropValue],
}

#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Doc,
    /// Any kind string this client does not know about.
    #[serde(other)]
    Unknown,
}

impl MediaKind {
    /// Kinds offered by the upload form.
    pub const UPLOADABLE: [MediaKind; 4] = [Self::Image, Self::Video, Self::Audio, Self::Doc];
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EntryMedia {
    pub id: i64,
    pub entry_id: i64,
    #[serde(default)]
    pub kind: Option<MediaKind>,
    pub file_path: String,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub meta_json: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Entry {
    pub id: i64,
    pub hobby_id: i64,
    pub type_key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub media: Vec<EntryMedia>,
    #[serde(default)]
    pub props: Vec<EntryProp>,
}

/// List/search projection of an entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EntryListItem {
    pub id: i64,
    pub hobby_id: i64,
    pub type_key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub media_count: i64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub props: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EntryCreate {
    pub hobby_id: i64,
    pub type_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EntryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

/// Error payload. Every field is optional so partial bodies still decode.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    /// Framework-default error bodies carry only this.
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

/// Acknowledgement returned by logout/delete endpoints. Also the value of an empty (204) body.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Zip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hobby_tree_contract_deserialize() {
        let json = r##"[
            {"id": 1, "name": "Photography", "color": "#6366f1", "icon": "camera", "parent_id": null,
             "children": [{"id": 2, "name": "Film", "parent_id": 1, "children": []}]}
        ]"##;
        let parsed: Vec<Hobby> = serde_json::from_str(json).expect("tree should parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].children.len(), 1);
        assert_eq!(parsed[0].children[0].parent_id, Some(1));
        assert!(parsed[0].children[0].color.is_none());
    }

    #[test]
    fn flat_hobby_defaults_children_to_empty() {
        let parsed: Hobby =
            serde_json::from_str(r#"{"id": 3, "name": "Books"}"#).expect("hobby should parse");
        assert!(parsed.children.is_empty());
        assert!(parsed.parent_id.is_none());
    }

    #[test]
    fn entry_list_page_contract_deserialize() {
        let json = r#"{
            "items": [{
                "id": 7, "hobby_id": 1, "type_key": "book", "title": "Dune",
                "description": null, "tags": "scifi,classic",
                "created_at": "2024-05-01T10:00:00", "updated_at": null,
                "media_count": 2, "thumbnail_url": "/uploads/7/a.jpg",
                "props": {"author": "Frank Herbert"}
            }],
            "total": 1, "limit": 20, "offset": 0, "has_more": false
        }"#;
        let page: Page<EntryListItem> = serde_json::from_str(json).expect("page should parse");
        assert_eq!(page.total, 1);
        assert!(!page.has_more);
        let item = &page.items[0];
        assert_eq!(item.title.as_deref(), Some("Dune"));
        assert_eq!(item.media_count, 2);
        assert_eq!(item.props["author"], "Frank Herbert");
    }

    #[test]
    fn entry_contract_deserialize_with_media_and_props() {
        let json = r#"{
            "id": 9, "hobby_id": 2, "type_key": "photo", "title": null,
            "description": "Sunset", "tags": null,
            "created_at": "2024-05-01T10:00:00", "updated_at": "2024-05-02T10:00:00",
            "media": [{"id": 1, "entry_id": 9, "kind": "image", "file_path": "/u/1.jpg", "width": 800, "height": 600}],
            "props": [{"id": 4, "entry_id": 9, "key": "camera", "value_text": "Canon EOS R5"}]
        }"#;
        let entry: Entry = serde_json::from_str(json).expect("entry should parse");
        assert_eq!(entry.media[0].kind, Some(MediaKind::Image));
        assert_eq!(entry.media[0].width, Some(800));
        assert_eq!(entry.props[0].value_text.as_deref(), Some("Canon EOS R5"));
    }

    #[test]
    fn unknown_media_kind_does_not_fail_decoding() {
        let media: EntryMedia = serde_json::from_str(
            r#"{"id": 1, "entry_id": 2, "kind": "hologram", "file_path": "/u/x"}"#,
        )
        .expect("media should parse");
        assert_eq!(media.kind, Some(MediaKind::Unknown));
    }

    #[test]
    fn entry_create_omits_unset_fields() {
        let req = EntryCreate {
            hobby_id: 1,
            type_key: "book".to_string(),
            title: Some("Dune".to_string()),
            description: None,
            tags: None,
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["hobby_id"], 1);
        assert_eq!(v["title"], "Dune");
        assert!(v.get("description").is_none());
        assert!(v.get("tags").is_none());
    }

    #[test]
    fn props_replace_body_wraps_list() {
        let props = vec![PropValue::new("camera", "Canon EOS R5"), PropValue::new("lens", "")];
        let v = serde_json::to_value(PropsReplace { props: &props }).expect("should serialize");
        assert_eq!(
            v,
            serde_json::json!({"props": [
                {"key": "camera", "value_text": "Canon EOS R5"},
                {"key": "lens", "value_text": ""}
            ]})
        );
    }

    #[test]
    fn export_format_renders_lowercase() {
        assert_eq!(ExportFormat::Json.to_string(), "json");
        assert_eq!(ExportFormat::Zip.as_ref(), "zip");
    }
}
