//! Interactive prompts. The member form renders one control per field: text
//! fields become line inputs and checkboxes become yes/no confirmations.

use std::future::Future;

use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};
use models::{
    collection::CollectionKind,
    field_descriptor::{FieldDescriptor, FieldKind, FieldValue},
    member::{Member, MemberPayload, MemberStatus},
};
use services::services::{
    console_api::ConsoleApiError,
    member_form::{MemberForm, base_member_fields},
};
use strum::IntoEnumIterator;
use uuid::Uuid;

/// Fields in prompt order: base fields not redefined by a custom field, then
/// the custom fields. A name defined twice is asked once, using its last
/// definition.
pub fn form_fields(custom: &[FieldDescriptor]) -> Vec<FieldDescriptor> {
    let overridden = |name: &str| custom.iter().any(|d| d.name() == name);
    let base = base_member_fields()
        .into_iter()
        .filter(|d| !overridden(d.name()));

    let custom = custom.iter().enumerate().filter_map(|(i, d)| {
        let redefined_later = custom[i + 1..].iter().any(|later| later.name() == d.name());
        (!redefined_later).then(|| d.clone())
    });

    base.chain(custom).collect()
}

fn prompt_label(descriptor: &FieldDescriptor) -> String {
    let mut label = descriptor.label().to_string();
    if let Some(placeholder) = descriptor.placeholder() {
        label.push_str(&format!(" (e.g. {})", placeholder));
    }
    if descriptor.is_required() {
        label.push_str(" *");
    }
    label
}

fn prompt_field(
    theme: &ColorfulTheme,
    form: &MemberForm,
    descriptor: &FieldDescriptor,
) -> dialoguer::Result<FieldValue> {
    let name = descriptor.name();
    match descriptor.kind() {
        FieldKind::Text => {
            let current = form
                .get(name)
                .and_then(FieldValue::as_text)
                .unwrap_or_default()
                .to_string();
            let text = Input::<String>::with_theme(theme)
                .with_prompt(prompt_label(descriptor))
                .with_initial_text(current)
                .allow_empty(true)
                .validate_with(|input: &String| -> Result<(), String> {
                    form.check(name, &FieldValue::Text(input.clone()))
                        .map_err(|e| e.message)
                })
                .interact_text()?;
            Ok(FieldValue::Text(text))
        }
        FieldKind::Checkbox => {
            let current = form.get(name).and_then(FieldValue::as_flag).unwrap_or(false);
            loop {
                let answer = Confirm::with_theme(theme)
                    .with_prompt(prompt_label(descriptor))
                    .default(current)
                    .interact_opt()?;
                // Esc keeps the current value; the form check reports it on submit
                let Some(checked) = answer else {
                    return Ok(FieldValue::Flag(current));
                };
                match form.check(name, &FieldValue::Flag(checked)) {
                    Ok(()) => return Ok(FieldValue::Flag(checked)),
                    Err(e) => eprintln!("  {}", e.message),
                }
            }
        }
    }
}

/// Ask for every field, starting from the values already in the form
pub fn fill_member_form(form: &mut MemberForm) -> dialoguer::Result<()> {
    let theme = ColorfulTheme::default();
    for descriptor in form_fields(form.descriptors()) {
        let value = prompt_field(&theme, form, &descriptor)?;
        form.set(descriptor.name(), value);
    }
    Ok(())
}

/// Prompt, validate and save until the backend accepts the member or the
/// user gives up. Entered values survive a failed attempt.
pub async fn edit_until_saved<F, Fut>(
    form: &mut MemberForm,
    status: MemberStatus,
    entity_id: Option<Uuid>,
    save: F,
) -> anyhow::Result<Option<Member>>
where
    F: Fn(MemberPayload) -> Fut,
    Fut: Future<Output = Result<Member, ConsoleApiError>>,
{
    loop {
        fill_member_form(form)?;

        let failure = match form.submit(status, entity_id) {
            Ok(payload) => match save(payload).await {
                Ok(member) => return Ok(Some(member)),
                Err(e) if e.is_auth_failure() => return Err(e.into()),
                Err(e) => e.to_string(),
            },
            Err(errors) => errors.to_string(),
        };

        eprintln!("Could not save member: {}", failure);
        if !confirm("Edit the form again?", true)? {
            return Ok(None);
        }
    }
}

pub fn confirm(prompt: &str, default: bool) -> dialoguer::Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()
}

pub fn text(prompt: &str) -> dialoguer::Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()
}

pub fn password(prompt: &str) -> dialoguer::Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact()
}

pub fn new_password() -> dialoguer::Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
}

pub fn collection_kind() -> dialoguer::Result<CollectionKind> {
    let kinds: Vec<CollectionKind> = CollectionKind::iter().collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Kind")
        .items(&kinds)
        .default(0)
        .interact()?;
    Ok(kinds[index])
}
