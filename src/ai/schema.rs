use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Integer,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    fn of(kind: SchemaType) -> Self {
        Self {
            kind,
            description: None,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            items: None,
            required: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::of(SchemaType::Integer)
    }

    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    pub fn array(items: Schema) -> Self {
        let mut s = Self::of(SchemaType::Array);
        s.items = Some(Box::new(items));
        s
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// Adds a property; declaration order is kept in `propertyOrdering`.
    pub fn property(mut self, name: &str, schema: Schema) -> Self {
        if !self.property_ordering.iter().any(|p| p == name) {
            self.property_ordering.push(name.to_string());
        }
        self.properties.insert(name.to_string(), schema);
        self
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.required = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Checks types and required fields. Returns the JSON path of the first violation.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), String> {
        let type_ok = match self.kind {
            SchemaType::String => value.is_string(),
            SchemaType::Integer => value.is_i64() || value.is_u64(),
            SchemaType::Array => value.is_array(),
            SchemaType::Object => value.is_object(),
        };
        if !type_ok {
            return Err(format!("{path}: expected {:?}", self.kind));
        }

        match (self.kind, value) {
            (SchemaType::Object, Value::Object(map)) => {
                for name in &self.required {
                    if !map.contains_key(name) {
                        return Err(format!("{path}.{name}: required field missing"));
                    }
                }
                for (name, prop) in &self.properties {
                    match map.get(name) {
                        // An optional field sent as null counts as absent.
                        Some(Value::Null) if !self.required.contains(name) => {}
                        Some(v) => prop.validate_at(v, &format!("{path}.{name}"))?,
                        None => {}
                    }
                }
            }
            (SchemaType::Array, Value::Array(list)) => {
                if let Some(items) = &self.items {
                    for (i, v) in list.iter().enumerate() {
                        items.validate_at(v, &format!("{path}[{i}]"))?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quiz_schema() -> Schema {
        Schema::object()
            .property(
                "questions",
                Schema::array(
                    Schema::object()
                        .property("question", Schema::string())
                        .property("options", Schema::array(Schema::string()))
                        .property("answerIndex", Schema::integer())
                        .required(&["question", "options", "answerIndex"]),
                ),
            )
            .required(&["questions"])
    }

    #[test]
    fn serializes_in_endpoint_shape() {
        let value = serde_json::to_value(quiz_schema()).expect("serialize");
        assert_eq!(value["type"], "OBJECT");
        assert_eq!(value["required"], json!(["questions"]));
        assert_eq!(value["properties"]["questions"]["type"], "ARRAY");
        assert_eq!(
            value["properties"]["questions"]["items"]["propertyOrdering"],
            json!(["question", "options", "answerIndex"])
        );
        assert!(value.get("description").is_none());
    }

    #[test]
    fn validate_accepts_conforming_value() {
        let v = json!({"questions": [{"question": "2+2?", "options": ["3", "4"], "answerIndex": 1}]});
        assert_eq!(quiz_schema().validate(&v), Ok(()));
    }

    #[test]
    fn validate_reports_missing_required_field() {
        let v = json!({"questions": [{"question": "2+2?", "options": ["3", "4"]}]});
        assert_eq!(
            quiz_schema().validate(&v),
            Err("$.questions[0].answerIndex: required field missing".to_string())
        );
    }

    #[test]
    fn null_optional_field_is_treated_as_absent() {
        let schema = Schema::object()
            .property("question", Schema::string())
            .property("hint", Schema::string())
            .required(&["question"]);
        assert_eq!(schema.validate(&json!({"question": "2+2?", "hint": null})), Ok(()));
        assert_eq!(
            schema.validate(&json!({"question": null})),
            Err("$.question: expected String".to_string())
        );
        assert!(schema.validate(&json!({"question": "2+2?", "hint": 4})).is_err());
    }

    #[test]
    fn validate_reports_wrong_type() {
        let v = json!({"questions": "none"});
        assert!(quiz_schema().validate(&v).is_err());
        assert!(Schema::integer().validate(&json!(1.5)).is_err());
    }
}
