use anyhow::bail;
use models::field_descriptor::{
    FieldDescriptor, FieldKind, FieldSpec, field_name_from_label, validate_field_name,
};
use services::services::{
    console_api::{ConsoleApiClient, ConsoleApiError},
    export::FieldTable,
    field_registry::FieldRegistry,
};
use uuid::Uuid;

use super::Context;
use crate::{cli::FieldsCommand, output};

pub async fn run(ctx: &Context, command: FieldsCommand) -> anyhow::Result<()> {
    match command {
        FieldsCommand::List => list(ctx).await,
        FieldsCommand::Add {
            label,
            name,
            kind,
            required,
            placeholder,
        } => {
            let descriptor = build_descriptor(label, name, kind, required, placeholder)?;
            add(ctx, descriptor).await
        }
        FieldsCommand::Remove { id } => remove(ctx, id).await,
    }
}

/// Load the current custom fields into a fresh registry
pub async fn load_registry(ctx: &Context) -> anyhow::Result<FieldRegistry> {
    let client = ctx.client()?;
    let registry = FieldRegistry::new();
    output::with_spinner(ctx.spinner(), "Loading custom fields...", registry.refresh(&client))
        .await?;
    Ok(registry)
}

async fn list(ctx: &Context) -> anyhow::Result<()> {
    let registry = load_registry(ctx).await?;
    let descriptors = registry.descriptors().await;
    output::print_table(&FieldTable(&descriptors), ctx.format)?;
    Ok(())
}

fn build_descriptor(
    label: String,
    name: Option<String>,
    kind: FieldKind,
    required: bool,
    placeholder: Option<String>,
) -> anyhow::Result<FieldDescriptor> {
    let label = label.trim().to_string();
    if label.is_empty() {
        bail!("Field label cannot be empty");
    }
    let name = name.unwrap_or_else(|| field_name_from_label(&label));
    validate_field_name(&name)?;

    Ok(FieldDescriptor::of_kind(
        kind,
        FieldSpec {
            required,
            placeholder: placeholder.filter(|p| !p.trim().is_empty()),
            ..FieldSpec::new(name, label)
        },
    ))
}

async fn add(ctx: &Context, descriptor: FieldDescriptor) -> anyhow::Result<()> {
    let registry = load_registry(ctx).await?;
    let client = ctx.client()?;

    let created = output::with_spinner(
        ctx.spinner(),
        "Saving field...",
        client.create_field(&descriptor),
    )
    .await?;
    let snapshot = registry.append(created.clone()).await;

    tracing::info!(field = created.name(), kind = %created.kind(), "Custom field added");
    println!(
        "Added {} field '{}' ({}). Member records now carry {} custom field(s).",
        created.kind(),
        created.label(),
        created.name(),
        snapshot.schema.defaults.len()
    );
    Ok(())
}

async fn remove(ctx: &Context, id: Uuid) -> anyhow::Result<()> {
    let registry = load_registry(ctx).await?;
    let client = ctx.client()?;

    output::with_spinner(
        ctx.spinner(),
        "Removing field...",
        remove_field(&client, &registry, id),
    )
    .await?;

    let remaining = registry.snapshot().await.schema.defaults.len();
    tracing::info!(field_id = %id, remaining, "Custom field removed");
    println!(
        "Removed field {}. Member records now carry {} custom field(s).",
        id, remaining
    );
    Ok(())
}

/// Delete on the backend first; the local schema only changes once the
/// backend has accepted the removal
async fn remove_field(
    client: &ConsoleApiClient,
    registry: &FieldRegistry,
    id: Uuid,
) -> Result<bool, ConsoleApiError> {
    client.delete_field(id).await?;
    let removed = registry.remove(id).await;
    if !removed {
        tracing::warn!(field_id = %id, "Removed field was not in the loaded list");
    }
    Ok(removed)
}
