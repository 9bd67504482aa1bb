//! Property schemas for hobby types.
//!
//! A type's `schema_json` is a JSON Schema object whose `properties` drive the per-entry
//! property form. Only the declared `type` of each property is read, and only to pick an
//! input affordance; values stay strings end to end.

use crate::models::{EntryProp, PropValue};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("schema must be a JSON object")]
    NotAnObject,
    #[error("schema `properties` must be an object")]
    PropertiesNotAnObject,
    #[error("property `{0}` must be an object")]
    FieldNotAnObject(String),
}

/// Input affordance for a property. Unknown declared types use [`FieldKind::Fallback`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Fallback,
}

impl FieldKind {
    pub fn from_declared(declared: Option<&str>) -> Self {
        match declared {
            Some("string") => Self::Text,
            Some("number") | Some("integer") => Self::Number,
            _ => Self::Fallback,
        }
    }

    pub fn input_type(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text | Self::Fallback => "text",
        }
    }

    pub fn input_mode(self) -> &'static str {
        match self {
            Self::Number => "decimal",
            Self::Text | Self::Fallback => "text",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: String,
    pub kind: FieldKind,
    pub title: Option<String>,
    pub description: Option<String>,
    pub required: bool,
}

impl FieldDescriptor {
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.key)
    }

    pub fn placeholder(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

fn text_member(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Parsed property schema. Field order is the declared key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSchema {
    pub fields: Vec<FieldDescriptor>,
}

impl TypeSchema {
    pub fn parse(schema_json: &str) -> Result<Self, SchemaError> {
        if schema_json.trim().is_empty() {
            return Ok(Self::default());
        }

        let root: Value = serde_json::from_str(schema_json)
            .map_err(|e| SchemaError::InvalidJson(e.to_string()))?;
        let root = root.as_object().ok_or(SchemaError::NotAnObject)?;

        let required: Vec<&str> = root
            .get("required")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let properties = match root.get("properties") {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Object(p)) => p,
            Some(_) => return Err(SchemaError::PropertiesNotAnObject),
        };

        let fields = properties
            .iter()
            .map(|(key, declared)| {
                let declared = declared
                    .as_object()
                    .ok_or_else(|| SchemaError::FieldNotAnObject(key.clone()))?;
                Ok(FieldDescriptor {
                    key: key.clone(),
                    kind: FieldKind::from_declared(declared.get("type").and_then(Value::as_str)),
                    title: text_member(declared, "title"),
                    description: text_member(declared, "description"),
                    required: required.contains(&key.as_str()),
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(Self { fields })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Pretty-print a schema for editing; input that is not JSON is returned as-is.
pub fn pretty_schema(schema_json: &str) -> String {
    serde_json::from_str::<Value>(schema_json)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| schema_json.to_string())
}

/// Edit buffer for an entry's properties.
///
/// Holds one value per schema field (schema order) followed by existing properties the
/// schema does not declare, so a full replacement never drops them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyDraft {
    values: Vec<(String, String)>,
}

impl PropertyDraft {
    pub fn new(schema: &TypeSchema, existing: &[EntryProp]) -> Self {
        let current = |key: &str| {
            existing
                .iter()
                .find(|p| p.key == key)
                .and_then(|p| p.value_text.clone())
                .unwrap_or_default()
        };

        let mut values: Vec<(String, String)> = schema
            .fields
            .iter()
            .map(|f| (f.key.clone(), current(&f.key)))
            .collect();

        for prop in existing {
            if schema.field(&prop.key).is_none() && !values.iter().any(|(k, _)| *k == prop.key) {
                values.push((prop.key.clone(), prop.value_text.clone().unwrap_or_default()));
            }
        }

        Self { values }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }

    pub fn value(&self, key: &str) -> &str {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    /// Set a known key. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        if let Some(slot) = self.values.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value.into();
        }
    }

    /// Complete replacement list, empty values included.
    pub fn to_props(&self) -> Vec<PropValue> {
        self.values
            .iter()
            .map(|(k, v)| PropValue::new(k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMERA_SCHEMA: &str =
        r#"{"type":"object","properties":{"camera":{"type":"string"},"lens":{"type":"string"}}}"#;

    fn prop(key: &str, value: Option<&str>) -> EntryProp {
        EntryProp {
            id: 1,
            entry_id: 1,
            key: key.to_string(),
            value_text: value.map(str::to_string),
        }
    }

    #[test]
    fn camera_schema_prefills_known_values_and_submits_all_fields() {
        let schema = TypeSchema::parse(CAMERA_SCHEMA).expect("schema should parse");
        let keys: Vec<&str> = schema.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["camera", "lens"]);

        let draft = PropertyDraft::new(&schema, &[prop("camera", Some("Canon EOS R5"))]);
        assert_eq!(draft.value("camera"), "Canon EOS R5");
        assert_eq!(draft.value("lens"), "");
        assert_eq!(
            draft.to_props(),
            vec![
                PropValue::new("camera", "Canon EOS R5"),
                PropValue::new("lens", ""),
            ]
        );
    }

    #[test]
    fn declared_key_order_is_preserved() {
        let schema = TypeSchema::parse(
            r#"{"properties":{"zeta":{"type":"string"},"alpha":{"type":"number"},"mid":{}}}"#,
        )
        .expect("schema should parse");
        let keys: Vec<&str> = schema.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn field_kinds_map_from_declared_type() {
        let schema = TypeSchema::parse(
            r#"{"properties":{
                "a":{"type":"string"},
                "b":{"type":"number"},
                "c":{"type":"integer"},
                "d":{"type":"boolean"},
                "e":{}
            }}"#,
        )
        .expect("schema should parse");
        let kinds: Vec<FieldKind> = schema.fields.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::Text,
                FieldKind::Number,
                FieldKind::Number,
                FieldKind::Fallback,
                FieldKind::Fallback,
            ]
        );
        assert_eq!(FieldKind::Number.input_type(), "number");
        assert_eq!(FieldKind::Fallback.input_type(), "text");
    }

    #[test]
    fn title_and_description_drive_label_and_placeholder() {
        let schema = TypeSchema::parse(
            r#"{"required":["isbn"],"properties":{
                "isbn":{"type":"string","title":"ISBN","description":"13 digits"},
                "year":{"type":"integer"}
            }}"#,
        )
        .expect("schema should parse");
        assert_eq!(schema.fields[0].label(), "ISBN");
        assert_eq!(schema.fields[0].placeholder(), "13 digits");
        assert!(schema.fields[0].required);
        assert_eq!(schema.fields[1].label(), "year");
        assert_eq!(schema.fields[1].placeholder(), "");
        assert!(!schema.fields[1].required);
    }

    #[test]
    fn missing_properties_yields_empty_schema() {
        assert!(TypeSchema::parse(r#"{"type":"object"}"#)
            .expect("schema should parse")
            .is_empty());
        assert!(TypeSchema::parse("").expect("blank schema").is_empty());
    }

    #[test]
    fn malformed_schemas_are_reported() {
        assert!(matches!(
            TypeSchema::parse("{not json"),
            Err(SchemaError::InvalidJson(_))
        ));
        assert_eq!(TypeSchema::parse("[1,2]"), Err(SchemaError::NotAnObject));
        assert_eq!(
            TypeSchema::parse(r#"{"properties":[]}"#),
            Err(SchemaError::PropertiesNotAnObject)
        );
        assert_eq!(
            TypeSchema::parse(r#"{"properties":{"a":"string"}}"#),
            Err(SchemaError::FieldNotAnObject("a".to_string()))
        );
    }

    #[test]
    fn undeclared_existing_props_survive_replacement() {
        let schema = TypeSchema::parse(CAMERA_SCHEMA).expect("schema should parse");
        let mut draft = PropertyDraft::new(
            &schema,
            &[prop("legacy", Some("keep me")), prop("lens", None)],
        );
        draft.set("lens", "50mm");
        draft.set("unknown", "ignored");

        let keys: Vec<&str> = draft.keys().collect();
        assert_eq!(keys, vec!["camera", "lens", "legacy"]);
        assert_eq!(
            draft.to_props(),
            vec![
                PropValue::new("camera", ""),
                PropValue::new("lens", "50mm"),
                PropValue::new("legacy", "keep me"),
            ]
        );
    }

    #[test]
    fn pretty_schema_leaves_invalid_text_alone() {
        assert_eq!(pretty_schema("{oops"), "{oops");
        assert!(pretty_schema(CAMERA_SCHEMA).contains('\n'));
    }
}
