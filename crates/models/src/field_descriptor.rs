use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

/// Form control used to capture a custom member field
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    Text,
    Checkbox,
}

/// Attributes shared by every kind of custom field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct FieldSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>, // Assigned by the backend once persisted
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Administrator-defined custom field on member records.
///
/// Serialized with an inline `kind` tag so the backend sees
/// `{"kind": "checkbox", "name": "consent", ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldDescriptor {
    Text(FieldSpec),
    Checkbox(FieldSpec),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldNameError {
    #[error("field name cannot be empty")]
    Empty,
    #[error("field name '{0}' may only contain lowercase letters, digits and underscores")]
    InvalidCharacters(String),
    #[error("field name '{0}' must start with a letter")]
    InvalidStart(String),
}

impl FieldDescriptor {
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Text(FieldSpec::new(name, label))
    }

    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Checkbox(FieldSpec::new(name, label))
    }

    pub fn of_kind(kind: FieldKind, spec: FieldSpec) -> Self {
        match kind {
            FieldKind::Text => Self::Text(spec),
            FieldKind::Checkbox => Self::Checkbox(spec),
        }
    }

    /// Mark the field as mandatory
    pub fn required(mut self) -> Self {
        self.spec_mut().required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.spec_mut().placeholder = Some(placeholder.into());
        self
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Checkbox(_) => FieldKind::Checkbox,
        }
    }

    pub fn spec(&self) -> &FieldSpec {
        match self {
            Self::Text(spec) | Self::Checkbox(spec) => spec,
        }
    }

    fn spec_mut(&mut self) -> &mut FieldSpec {
        match self {
            Self::Text(spec) | Self::Checkbox(spec) => spec,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.spec().id
    }

    pub fn name(&self) -> &str {
        &self.spec().name
    }

    pub fn label(&self) -> &str {
        &self.spec().label
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.spec().placeholder.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.spec().required
    }
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            label: label.into(),
            placeholder: None,
            required: false,
        }
    }
}

/// Value held by one key of an editable record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    /// Initial value for a freshly rendered control of the given kind
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => Self::Text(String::new()),
            FieldKind::Checkbox => Self::Flag(false),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Flag(_) => FieldKind::Checkbox,
            Self::Text(_) => FieldKind::Text,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Text(_) => None,
        }
    }

    /// Converts a loosely typed backend value; `null` and non-scalar values yield `None`
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(flag) => Some(Self::Flag(*flag)),
            serde_json::Value::String(text) => Some(Self::Text(text.clone())),
            serde_json::Value::Number(n) => Some(Self::Text(n.to_string())),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag(true) => f.write_str("yes"),
            Self::Flag(false) => f.write_str("no"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Check that a name can be used as a record key
pub fn validate_field_name(name: &str) -> Result<(), FieldNameError> {
    let Some(first) = name.chars().next() else {
        return Err(FieldNameError::Empty);
    };
    if !first.is_ascii_lowercase() {
        return Err(FieldNameError::InvalidStart(name.to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(FieldNameError::InvalidCharacters(name.to_string()));
    }
    Ok(())
}

/// Derive a record key from a human label, e.g. "Baptism Date" -> "baptism_date"
pub fn field_name_from_label(label: &str) -> String {
    let mut name = String::with_capacity(label.len());
    for c in label.trim().chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.is_empty() && !name.ends_with('_') {
            name.push('_');
        }
    }
    name.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_wire_format_is_kind_tagged() {
        let descriptor = FieldDescriptor::checkbox("consent", "Consent").required();
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "checkbox",
                "name": "consent",
                "label": "Consent",
                "required": true
            })
        );
    }

    #[test]
    fn test_descriptor_from_backend_defaults_required_to_false() {
        let json = serde_json::json!({
            "id": "1b4e28ba-2fa1-11d2-883f-0016d3cca427",
            "kind": "text",
            "name": "nickname",
            "label": "Nickname",
            "placeholder": "e.g. Ben"
        });
        let descriptor: FieldDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(descriptor.kind(), FieldKind::Text);
        assert_eq!(descriptor.name(), "nickname");
        assert_eq!(descriptor.placeholder(), Some("e.g. Ben"));
        assert!(!descriptor.is_required());
        assert!(descriptor.id().is_some());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{"kind":"select","name":"x","label":"X"}"#;
        assert!(serde_json::from_str::<FieldDescriptor>(json).is_err());
    }

    #[test]
    fn test_field_value_untagged() {
        let values: Vec<FieldValue> = serde_json::from_str(r#"[true, "hello"]"#).unwrap();
        assert_eq!(values, vec![FieldValue::Flag(true), FieldValue::Text("hello".into())]);
        assert_eq!(FieldValue::from_json(&serde_json::Value::Null), None);
        assert_eq!(
            FieldValue::from_json(&serde_json::json!(42)),
            Some(FieldValue::Text("42".into()))
        );
    }

    #[test]
    fn test_field_name_from_label() {
        assert_eq!(field_name_from_label("Baptism Date"), "baptism_date");
        assert_eq!(field_name_from_label("  Emergency contact #2 "), "emergency_contact_2");
        assert_eq!(field_name_from_label("!!!"), "");
    }

    #[test]
    fn test_validate_field_name() {
        assert!(validate_field_name("baptism_date").is_ok());
        assert_eq!(validate_field_name(""), Err(FieldNameError::Empty));
        assert!(matches!(
            validate_field_name("2nd_phone"),
            Err(FieldNameError::InvalidStart(_))
        ));
        assert!(matches!(
            validate_field_name("Nick-name"),
            Err(FieldNameError::InvalidStart(_))
        ));
        assert!(matches!(
            validate_field_name("nick-name"),
            Err(FieldNameError::InvalidCharacters(_))
        ));
    }
}
