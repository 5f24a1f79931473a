//! Editable member record: fixed base fields merged with the organization's
//! custom fields, validated as one object and split apart again on submit.

use std::collections::BTreeMap;

use models::{
    field_descriptor::{FieldDescriptor, FieldValue},
    member::{Member, MemberPayload, MemberStatus},
};
use uuid::Uuid;

use super::field_schema::{FieldError, FieldSchema, Record, ValidationErrors};

pub const FIRST_NAME: &str = "first_name";
pub const LAST_NAME: &str = "last_name";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";
pub const ADDRESS: &str = "address";

/// The fixed part of every member record, expressed as descriptors so the
/// same builder produces its contract
pub fn base_member_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text(FIRST_NAME, "First name").required(),
        FieldDescriptor::text(LAST_NAME, "Last name").required(),
        FieldDescriptor::text(EMAIL, "Email").with_placeholder("name@example.org"),
        FieldDescriptor::text(PHONE, "Phone"),
        FieldDescriptor::text(ADDRESS, "Address"),
    ]
}

/// Package the values for exactly the given descriptors. Keys missing from
/// `values`, or holding the wrong kind of value, fall back to the kind's
/// default, so the result always has one entry per descriptor name.
pub fn extract_custom_fields(
    values: &Record,
    descriptors: &[FieldDescriptor],
) -> BTreeMap<String, FieldValue> {
    descriptors
        .iter()
        .map(|descriptor| {
            let value = values
                .get(descriptor.name())
                .filter(|value| value.kind() == descriptor.kind())
                .cloned()
                .unwrap_or_else(|| FieldValue::default_for(descriptor.kind()));
            (descriptor.name().to_string(), value)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct MemberForm {
    descriptors: Vec<FieldDescriptor>,
    schema: FieldSchema,
    values: Record,
}

impl MemberForm {
    /// Blank form for a new member
    pub fn new(descriptors: &[FieldDescriptor]) -> Self {
        let schema =
            FieldSchema::build(&base_member_fields()).merged(FieldSchema::build(descriptors));
        let values = schema.defaults.clone();
        Self {
            descriptors: descriptors.to_vec(),
            schema,
            values,
        }
    }

    /// Form prefilled from an existing member
    pub fn for_member(member: &Member, descriptors: &[FieldDescriptor]) -> Self {
        let mut form = Self::new(descriptors);
        form.set(FIRST_NAME, member.first_name.as_str());
        form.set(LAST_NAME, member.last_name.as_str());
        form.set(EMAIL, member.email.clone().unwrap_or_default());
        form.set(PHONE, member.phone.clone().unwrap_or_default());
        form.set(ADDRESS, member.address.clone().unwrap_or_default());

        for descriptor in descriptors {
            if let Some(value) = member
                .custom_value(descriptor.name())
                .filter(|value| value.kind() == descriptor.kind())
            {
                form.set(descriptor.name(), value);
            }
        }
        form
    }

    /// Custom field descriptors, in display order
    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Validate a candidate value for one key without storing it
    pub fn check(&self, key: &str, value: &FieldValue) -> Result<(), FieldError> {
        self.schema.contract.check_field(key, Some(&trimmed(value)))
    }

    /// Text is checked after trimming, so whitespace alone does not satisfy
    /// a required field
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.schema.validate(&self.normalized())
    }

    /// Validate and build the request body. The form is left untouched so a
    /// failed submission can be retried with the same values.
    pub fn submit(
        &self,
        status: MemberStatus,
        entity_id: Option<Uuid>,
    ) -> Result<MemberPayload, ValidationErrors> {
        let values = self.normalized();
        self.schema.validate(&values)?;

        let text = |key: &str| {
            values
                .get(key)
                .and_then(FieldValue::as_text)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };
        Ok(MemberPayload {
            entity_id,
            first_name: text(FIRST_NAME).unwrap_or_default(),
            last_name: text(LAST_NAME).unwrap_or_default(),
            email: text(EMAIL),
            phone: text(PHONE),
            address: text(ADDRESS),
            status,
            custom_fields: extract_custom_fields(&values, &self.descriptors),
        })
    }

    fn normalized(&self) -> Record {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), trimmed(value)))
            .collect()
    }
}

fn trimmed(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(text) => FieldValue::Text(text.trim().to_string()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn descriptors() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::checkbox("consent", "Consent").required(),
            FieldDescriptor::text("nickname", "Nickname"),
            FieldDescriptor::checkbox("choir", "Sings in choir"),
        ]
    }

    fn filled_form() -> MemberForm {
        let mut form = MemberForm::new(&descriptors());
        form.set(FIRST_NAME, "Ada");
        form.set(LAST_NAME, "Okafor");
        form.set("consent", true);
        form
    }

    #[test]
    fn test_new_form_starts_from_defaults() {
        let form = MemberForm::new(&descriptors());
        assert_eq!(form.get(FIRST_NAME), Some(&FieldValue::Text(String::new())));
        assert_eq!(form.get("consent"), Some(&FieldValue::Flag(false)));
        assert_eq!(form.get("nickname"), Some(&FieldValue::Text(String::new())));
        assert_eq!(form.values().len(), 8);
    }

    #[test]
    fn test_blank_form_reports_base_and_custom_errors() {
        let form = MemberForm::new(&descriptors());
        let err = form.validate().unwrap_err();
        assert_eq!(err.message_for(FIRST_NAME), Some("First name is required"));
        assert_eq!(err.message_for(LAST_NAME), Some("Last name is required"));
        assert_eq!(err.message_for("consent"), Some("Consent must be checked"));
        assert_eq!(err.message_for("nickname"), None);
    }

    #[test]
    fn test_submit_packages_exactly_the_descriptor_names() {
        let payload = filled_form().submit(MemberStatus::Active, None).unwrap();
        assert_eq!(payload.first_name, "Ada");
        assert_eq!(payload.email, None);
        assert_eq!(
            payload.custom_fields.keys().cloned().collect::<Vec<_>>(),
            vec!["choir", "consent", "nickname"]
        );
        assert_eq!(payload.custom_fields["nickname"], FieldValue::Text(String::new()));
        assert_eq!(payload.custom_fields["choir"], FieldValue::Flag(false));
        assert!(!payload.custom_fields.contains_key(FIRST_NAME));
    }

    #[test]
    fn test_submit_failure_keeps_values() {
        let mut form = filled_form();
        form.set("consent", false);
        form.set("nickname", "Dee");
        assert!(form.submit(MemberStatus::Active, None).is_err());
        assert_eq!(form.get("nickname"), Some(&FieldValue::Text("Dee".into())));
    }

    #[test]
    fn test_extract_fills_missing_and_mistyped_values() {
        let mut values = Record::new();
        values.insert("consent".into(), FieldValue::Text("yes".into()));
        values.insert("unrelated".into(), FieldValue::Flag(true));

        let extracted = extract_custom_fields(&values, &descriptors());
        assert_eq!(extracted.len(), 3);
        assert_eq!(extracted["consent"], FieldValue::Flag(false));
        assert!(!extracted.contains_key("unrelated"));
    }

    #[test]
    fn test_extract_with_no_descriptors_is_empty() {
        let extracted = extract_custom_fields(&filled_form().values().clone(), &[]);
        assert!(extracted.is_empty());
    }

    #[test]
    fn test_for_member_prefills_values() {
        let member = Member {
            id: Uuid::new_v4(),
            entity_id: None,
            first_name: "Ada".into(),
            last_name: "Okafor".into(),
            email: Some("ada@example.org".into()),
            phone: None,
            address: None,
            status: MemberStatus::Active,
            custom_fields: [
                ("consent".to_string(), serde_json::json!(true)),
                ("nickname".to_string(), serde_json::json!(false)),
                ("retired_field".to_string(), serde_json::json!("old")),
            ]
            .into_iter()
            .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let form = MemberForm::for_member(&member, &descriptors());
        assert_eq!(form.get(EMAIL), Some(&FieldValue::Text("ada@example.org".into())));
        assert_eq!(form.get("consent"), Some(&FieldValue::Flag(true)));
        // stored with the wrong type, so the default is kept
        assert_eq!(form.get("nickname"), Some(&FieldValue::Text(String::new())));
        assert_eq!(form.get("retired_field"), None);

        let payload = form.submit(member.status, member.entity_id).unwrap();
        assert!(!payload.custom_fields.contains_key("retired_field"));
    }

    #[test]
    fn test_custom_field_can_tighten_a_base_field() {
        let form = MemberForm::new(&[FieldDescriptor::text(EMAIL, "Email").required()]);
        let err = form.validate().unwrap_err();
        assert_eq!(err.message_for(EMAIL), Some("Email is required"));
    }

    #[test]
    fn test_check_single_value() {
        let form = MemberForm::new(&descriptors());
        assert!(form.check("consent", &FieldValue::Flag(true)).is_ok());
        let err = form.check(FIRST_NAME, &"".into()).unwrap_err();
        assert_eq!(err.message, "First name is required");
        assert!(form.check(LAST_NAME, &"  \t".into()).is_err());
    }

    #[test]
    fn test_whitespace_only_required_name_is_rejected() {
        let mut form = filled_form();
        form.set(FIRST_NAME, "   ");

        let err = form.submit(MemberStatus::Active, None).unwrap_err();
        assert_eq!(err.message_for(FIRST_NAME), Some("First name is required"));
        assert_eq!(err.message_for(LAST_NAME), None);
        assert_eq!(form.get(FIRST_NAME), Some(&FieldValue::Text("   ".into())));
    }

    #[test]
    fn test_submit_trims_text_values() {
        let mut form = filled_form();
        form.set(FIRST_NAME, "  Ada ");
        form.set("nickname", " Dee ");

        let payload = form.submit(MemberStatus::Active, None).unwrap();
        assert_eq!(payload.first_name, "Ada");
        assert_eq!(payload.custom_fields["nickname"], FieldValue::Text("Dee".into()));
    }
}
