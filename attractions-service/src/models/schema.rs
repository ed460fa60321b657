//! Explicit description of the model's response shape.
//!
//! The same description is rendered into Gemini's `responseSchema` format and
//! checked locally against the decoded response, so a response that slips
//! past the provider's own enforcement is still rejected here.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// JSON type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
}

impl FieldKind {
    fn provider_type(self) -> &'static str {
        match self {
            FieldKind::String => "STRING",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
        }
    }
}

/// A named, typed field of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn string_field(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::String,
    }
}

const ATTRACTION_FIELDS: &[FieldSpec] = &[
    string_field("Title"),
    string_field("Location"),
    string_field("Description"),
    string_field("Tags"),
    string_field("Hazards"),
    string_field("Considerations"),
    string_field("Alternatives"),
];

/// A root object holding one array of flat objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    root_field: &'static str,
    item_fields: &'static [FieldSpec],
}

/// Why a response failed local validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("response root is not a JSON object")]
    RootNotObject,

    #[error("`{field}` is not an array")]
    NotAnArray { field: &'static str },

    #[error("item {index} is not an object")]
    ItemNotObject { index: usize },

    #[error("item {index} is missing field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("item {index} field `{field}` has the wrong type")]
    WrongType { index: usize, field: &'static str },
}

impl ResponseSchema {
    /// `{"attractions": [Attraction, ...]}`.
    pub fn attraction_list() -> Self {
        Self {
            root_field: "attractions",
            item_fields: ATTRACTION_FIELDS,
        }
    }

    /// Render as a Gemini `responseSchema` (OpenAPI subset).
    pub fn to_provider_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .item_fields
            .iter()
            .map(|f| (f.name.to_string(), json!({ "type": f.kind.provider_type() })))
            .collect();
        let names: Vec<&str> = self.item_fields.iter().map(|f| f.name).collect();

        json!({
            "type": "OBJECT",
            "properties": {
                self.root_field: {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": properties,
                        "required": names,
                        "propertyOrdering": names,
                    }
                }
            },
            "required": [self.root_field],
        })
    }

    /// Check a decoded response.
    ///
    /// An absent root field is accepted (callers treat it as an empty list).
    /// Unknown extra keys are ignored.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        let root = value.as_object().ok_or(SchemaViolation::RootNotObject)?;

        let Some(items) = root.get(self.root_field) else {
            return Ok(());
        };
        let items = items.as_array().ok_or(SchemaViolation::NotAnArray {
            field: self.root_field,
        })?;

        for (index, item) in items.iter().enumerate() {
            let item = item
                .as_object()
                .ok_or(SchemaViolation::ItemNotObject { index })?;

            for field in self.item_fields {
                match item.get(field.name) {
                    None => {
                        return Err(SchemaViolation::MissingField {
                            index,
                            field: field.name,
                        })
                    }
                    Some(v) if !field.kind.matches(v) => {
                        return Err(SchemaViolation::WrongType {
                            index,
                            field: field.name,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_item() -> Value {
        json!({
            "Title": "A",
            "Location": "B",
            "Description": "C",
            "Tags": "t",
            "Hazards": "h",
            "Considerations": "c",
            "Alternatives": "alt"
        })
    }

    #[test]
    fn provider_schema_lists_every_field() {
        let schema = ResponseSchema::attraction_list().to_provider_schema();

        let items = &schema["properties"]["attractions"]["items"];
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["attractions"]["type"], "ARRAY");
        assert_eq!(items["required"].as_array().unwrap().len(), 7);
        assert_eq!(items["properties"]["Hazards"]["type"], "STRING");
        assert_eq!(items["propertyOrdering"][0], "Title");
    }

    #[test]
    fn accepts_well_formed_response() {
        let schema = ResponseSchema::attraction_list();
        let value = json!({ "attractions": [complete_item(), complete_item()] });

        assert_eq!(schema.validate(&value), Ok(()));
    }

    #[test]
    fn accepts_missing_root_field() {
        let schema = ResponseSchema::attraction_list();
        assert_eq!(schema.validate(&json!({ "other": 1 })), Ok(()));
    }

    #[test]
    fn rejects_non_object_root() {
        let schema = ResponseSchema::attraction_list();
        assert_eq!(
            schema.validate(&json!([complete_item()])),
            Err(SchemaViolation::RootNotObject)
        );
    }

    #[test]
    fn rejects_non_array_list() {
        let schema = ResponseSchema::attraction_list();
        assert_eq!(
            schema.validate(&json!({ "attractions": "none" })),
            Err(SchemaViolation::NotAnArray {
                field: "attractions"
            })
        );
    }

    #[test]
    fn reports_first_missing_field() {
        let schema = ResponseSchema::attraction_list();
        let mut item = complete_item();
        item.as_object_mut().unwrap().remove("Hazards");

        assert_eq!(
            schema.validate(&json!({ "attractions": [complete_item(), item] })),
            Err(SchemaViolation::MissingField {
                index: 1,
                field: "Hazards"
            })
        );
    }

    #[test]
    fn rejects_wrong_field_type() {
        let schema = ResponseSchema::attraction_list();
        let mut item = complete_item();
        item["Tags"] = json!(["a", "b"]);

        assert_eq!(
            schema.validate(&json!({ "attractions": [item] })),
            Err(SchemaViolation::WrongType {
                index: 0,
                field: "Tags"
            })
        );
    }
}
