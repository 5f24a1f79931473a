//! Builds the validation contract and default values for member records from
//! the administrator-defined field descriptors.

use std::collections::BTreeMap;

use models::field_descriptor::{FieldDescriptor, FieldKind, FieldValue};
use thiserror::Error;

/// Editable record: one value per key, keyed by field name
pub type Record = BTreeMap<String, FieldValue>;

/// Constraint enforced on one record key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    /// Must be a non-empty string
    RequiredText { label: String },
    /// Must be exactly `true`
    RequiredChecked { label: String },
    /// String or absent
    OptionalText { label: String },
    /// Boolean or absent
    OptionalFlag { label: String },
}

impl FieldRule {
    pub fn for_descriptor(descriptor: &FieldDescriptor) -> Self {
        let label = descriptor.label().to_string();
        match (descriptor.kind(), descriptor.is_required()) {
            (FieldKind::Text, true) => Self::RequiredText { label },
            (FieldKind::Checkbox, true) => Self::RequiredChecked { label },
            (FieldKind::Text, false) => Self::OptionalText { label },
            (FieldKind::Checkbox, false) => Self::OptionalFlag { label },
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::RequiredText { label }
            | Self::RequiredChecked { label }
            | Self::OptionalText { label }
            | Self::OptionalFlag { label } => label,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::RequiredText { .. } | Self::OptionalText { .. } => FieldKind::Text,
            Self::RequiredChecked { .. } | Self::OptionalFlag { .. } => FieldKind::Checkbox,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::RequiredText { .. } | Self::RequiredChecked { .. })
    }

    /// Check a value, returning the user-facing message on failure
    pub fn check(&self, value: Option<&FieldValue>) -> Result<(), String> {
        let label = self.label();
        match (self, value) {
            (Self::RequiredText { .. }, Some(FieldValue::Text(text))) if !text.is_empty() => {
                Ok(())
            }
            (Self::RequiredText { .. }, None | Some(FieldValue::Text(_))) => {
                Err(format!("{} is required", label))
            }
            (Self::RequiredChecked { .. }, Some(FieldValue::Flag(true))) => Ok(()),
            (Self::RequiredChecked { .. }, None | Some(FieldValue::Flag(false))) => {
                Err(format!("{} must be checked", label))
            }
            (Self::OptionalText { .. }, None | Some(FieldValue::Text(_))) => Ok(()),
            (Self::OptionalFlag { .. }, None | Some(FieldValue::Flag(_))) => Ok(()),
            (Self::RequiredText { .. } | Self::OptionalText { .. }, Some(FieldValue::Flag(_))) => {
                Err(format!("{} must be text", label))
            }
            (
                Self::RequiredChecked { .. } | Self::OptionalFlag { .. },
                Some(FieldValue::Text(_)),
            ) => Err(format!("{} must be checked or unchecked", label)),
        }
    }
}

/// Validation failure on a single record key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message reported for one field, if it failed
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Per-key constraints for an editable record. Keys without a rule are
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldContract {
    rules: BTreeMap<String, FieldRule>,
}

impl FieldContract {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, rule: FieldRule) {
        self.rules.insert(name.into(), rule);
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.get(name)
    }

    pub fn rules(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Entries of `other` replace entries of `self` with the same name
    pub fn merge(&mut self, other: FieldContract) {
        self.rules.extend(other.rules);
    }

    pub fn check_field(&self, name: &str, value: Option<&FieldValue>) -> Result<(), FieldError> {
        match self.rules.get(name) {
            Some(rule) => rule.check(value).map_err(|message| FieldError {
                field: name.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }

    pub fn validate(&self, record: &Record) -> Result<(), ValidationErrors> {
        let errors: Vec<FieldError> = self
            .rules
            .keys()
            .filter_map(|name| self.check_field(name, record.get(name)).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }
}

/// Contract plus the values a new record starts from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    pub contract: FieldContract,
    pub defaults: Record,
}

impl FieldSchema {
    /// Fold descriptors into a schema. A later descriptor with the same name
    /// replaces the earlier one's rule and default.
    pub fn build(descriptors: &[FieldDescriptor]) -> Self {
        descriptors
            .iter()
            .fold(Self::default(), |mut schema, descriptor| {
                schema
                    .contract
                    .insert(descriptor.name(), FieldRule::for_descriptor(descriptor));
                schema.defaults.insert(
                    descriptor.name().to_string(),
                    FieldValue::default_for(descriptor.kind()),
                );
                schema
            })
    }

    /// Layer `overlay` on top of `self`; overlay entries win on name clashes
    pub fn merged(mut self, overlay: FieldSchema) -> Self {
        self.contract.merge(overlay.contract);
        self.defaults.extend(overlay.defaults);
        self
    }

    pub fn validate(&self, record: &Record) -> Result<(), ValidationErrors> {
        self.contract.validate(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[(&str, FieldValue)]) -> Record {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_descriptor_list_accepts_anything() {
        let schema = FieldSchema::build(&[]);
        assert!(schema.contract.is_empty());
        assert!(schema.defaults.is_empty());
        assert!(schema.validate(&Record::new()).is_ok());
        assert!(
            schema
                .validate(&record(&[("anything", FieldValue::Flag(false))]))
                .is_ok()
        );
    }

    #[test]
    fn test_required_checkbox_scenario() {
        let schema =
            FieldSchema::build(&[FieldDescriptor::checkbox("consent", "Consent").required()]);
        assert_eq!(schema.defaults, record(&[("consent", FieldValue::Flag(false))]));

        let err = schema
            .validate(&record(&[("consent", FieldValue::Flag(false))]))
            .unwrap_err();
        assert!(err.message_for("consent").unwrap().contains("Consent"));

        assert!(schema.validate(&record(&[("consent", FieldValue::Flag(true))])).is_ok());
        assert!(schema.validate(&Record::new()).is_err());
    }

    #[test]
    fn test_optional_text_scenario() {
        let schema = FieldSchema::build(&[FieldDescriptor::text("nickname", "Nickname")]);
        assert_eq!(schema.defaults, record(&[("nickname", FieldValue::Text(String::new()))]));
        assert!(schema.validate(&Record::new()).is_ok());
        assert!(schema.validate(&record(&[("nickname", "".into())])).is_ok());
    }

    #[test]
    fn test_required_text_rejects_empty() {
        let schema = FieldSchema::build(&[
            FieldDescriptor::text("baptism_date", "Baptism date").required()
        ]);
        let err = schema.validate(&record(&[("baptism_date", "".into())])).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.message_for("baptism_date"), Some("Baptism date is required"));

        assert!(schema.validate(&record(&[("baptism_date", "2019-04-21".into())])).is_ok());
    }

    #[test]
    fn test_optional_checkbox_accepts_false_and_absence() {
        let schema = FieldSchema::build(&[FieldDescriptor::checkbox("choir", "Sings in choir")]);
        assert!(schema.validate(&Record::new()).is_ok());
        assert!(schema.validate(&record(&[("choir", FieldValue::Flag(false))])).is_ok());
    }

    #[test]
    fn test_wrong_value_type_is_reported_with_label() {
        let schema = FieldSchema::build(&[
            FieldDescriptor::checkbox("choir", "Sings in choir"),
            FieldDescriptor::text("nickname", "Nickname"),
        ]);
        let err = schema
            .validate(&record(&[
                ("choir", "yes".into()),
                ("nickname", FieldValue::Flag(true)),
            ]))
            .unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.message_for("choir").unwrap().contains("Sings in choir"));
        assert_eq!(err.message_for("nickname"), Some("Nickname must be text"));
    }

    #[test]
    fn test_all_failures_are_collected() {
        let schema = FieldSchema::build(&[
            FieldDescriptor::checkbox("consent", "Consent").required(),
            FieldDescriptor::text("sponsor", "Sponsor").required(),
        ]);
        let err = schema.validate(&Record::new()).unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(err.to_string(), "Consent must be checked; Sponsor is required");
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let schema = FieldSchema::build(&[
            FieldDescriptor::text("status_note", "Status").required(),
            FieldDescriptor::checkbox("status_note", "Status flag"),
        ]);
        assert_eq!(schema.contract.len(), 1);
        assert_eq!(
            schema.contract.rule("status_note"),
            Some(&FieldRule::OptionalFlag {
                label: "Status flag".into()
            })
        );
        assert_eq!(schema.defaults.get("status_note"), Some(&FieldValue::Flag(false)));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let descriptors = vec![
            FieldDescriptor::checkbox("consent", "Consent").required(),
            FieldDescriptor::text("nickname", "Nickname").with_placeholder("Ben"),
        ];
        assert_eq!(FieldSchema::build(&descriptors), FieldSchema::build(&descriptors));
    }

    #[test]
    fn test_merged_overlay_wins() {
        let base = FieldSchema::build(&[FieldDescriptor::text("email", "Email")]);
        let overlay = FieldSchema::build(&[
            FieldDescriptor::text("email", "Work email").required(),
            FieldDescriptor::checkbox("consent", "Consent"),
        ]);
        let merged = base.merged(overlay);
        assert_eq!(merged.contract.len(), 2);
        assert!(merged.contract.rule("email").unwrap().is_required());
        assert_eq!(merged.contract.rule("email").unwrap().label(), "Work email");
    }

    #[test]
    fn test_unconstrained_keys_pass() {
        let contract = FieldContract::empty();
        assert!(contract.check_field("whatever", Some(&"x".into())).is_ok());
    }
}
