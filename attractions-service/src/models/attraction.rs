//! Attraction records returned to callers.

use serde::{Deserialize, Serialize};

/// A single recommended place to visit.
///
/// Field names are PascalCase on the wire, matching the schema sent to the
/// model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attraction {
    pub title: String,
    pub location: String,
    pub description: String,
    pub tags: String,
    pub hazards: String,
    pub considerations: String,
    pub alternatives: String,
}

/// Root object of the model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttractionList {
    /// Absent in the response means no attractions.
    #[serde(default)]
    pub attractions: Vec<Attraction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uses_pascal_case_keys() {
        let attraction = Attraction {
            title: "Old Town".to_string(),
            location: "Tallinn".to_string(),
            description: "Medieval centre".to_string(),
            tags: "history".to_string(),
            hazards: "cobblestones".to_string(),
            considerations: "crowded in summer".to_string(),
            alternatives: "Kadriorg".to_string(),
        };

        let value = serde_json::to_value(&attraction).unwrap();
        assert_eq!(value["Title"], "Old Town");
        assert_eq!(value["Alternatives"], "Kadriorg");
        assert!(value.get("title").is_none());
    }

    #[test]
    fn missing_attractions_key_is_empty_list() {
        let list: AttractionList = serde_json::from_value(json!({})).unwrap();
        assert!(list.attractions.is_empty());
    }
}
