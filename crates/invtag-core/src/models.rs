//! Wire and domain models for inventory records.
//!
//! The inventory service is loose about shapes, so [`Record`] is decoded from
//! an arbitrary JSON value rather than derived field-by-field: a malformed item
//! must turn into a skippable record instead of failing the whole listing.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One catalog item as returned by the inventory service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "JsonValue")]
pub struct Record {
    /// Store identifier. `None` means the record cannot be updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Existing tags in store order.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Record {
    /// Create a record with only an identifier set.
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: Some(item_id.into()),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Identifier, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.item_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether the record already carries at least one tag.
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Decode a record from an inventory item.
    ///
    /// Anything that is not a JSON object decodes to an empty record.
    pub fn from_value(value: &JsonValue) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let item_id = obj
            .get("item_id")
            .and_then(scalar_to_string)
            .or_else(|| obj.get("id").and_then(scalar_to_string))
            .filter(|id| !id.trim().is_empty());

        let text = |key: &str| obj.get(key).and_then(text_field);

        let tags = match obj.get("tags") {
            Some(JsonValue::Array(values)) => values.iter().filter_map(scalar_to_string).collect(),
            _ => Vec::new(),
        };

        Self {
            item_id,
            category: text("category"),
            brand: text("brand"),
            condition: text("condition"),
            description: text("description"),
            tags,
        }
    }
}

impl From<JsonValue> for Record {
    fn from(value: JsonValue) -> Self {
        Self::from_value(&value)
    }
}

/// Free-text fields: strings verbatim, numbers in decimal form. Booleans and
/// null mean the field is absent.
fn text_field(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Render strings verbatim and numbers/booleans in their JSON form.
fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Envelope of `GET /api/inventory`.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryPage {
    pub items: Vec<Record>,
}

/// Body of `PATCH /api/inventory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPatch {
    pub item_id: String,
    pub tags: Vec<String>,
}
