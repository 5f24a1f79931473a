use anyhow::Context as _;
use models::{
    field_descriptor::FieldDescriptor,
    member::{Member, MemberQuery, MemberStatus},
};
use services::services::{export::MemberTable, member_form::MemberForm};
use uuid::Uuid;

use super::{Context, fields::load_registry};
use crate::{cli::MembersCommand, output, prompt};

pub async fn run(ctx: &Context, command: MembersCommand) -> anyhow::Result<()> {
    match command {
        MembersCommand::List {
            search,
            entity,
            status,
        } => {
            list(
                ctx,
                MemberQuery {
                    search,
                    entity_id: entity,
                    status,
                },
            )
            .await
        }
        MembersCommand::Show { id } => show(ctx, id).await,
        MembersCommand::Add { status, entity } => add(ctx, status, entity).await,
        MembersCommand::Edit { id, status } => edit(ctx, id, status).await,
        MembersCommand::Remove { id, yes } => remove(ctx, id, yes).await,
    }
}

async fn list(ctx: &Context, query: MemberQuery) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let registry = load_registry(ctx).await?;
    let members =
        output::with_spinner(ctx.spinner(), "Loading members...", client.list_members(&query))
            .await?;
    let descriptors = registry.descriptors().await;

    output::print_table(
        &MemberTable {
            members: &members,
            descriptors: &descriptors,
        },
        ctx.format,
    )?;
    Ok(())
}

fn member_details(member: &Member, descriptors: &[FieldDescriptor]) -> Vec<(String, String)> {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let mut rows = vec![
        ("ID".to_string(), member.id.to_string()),
        ("Name".to_string(), member.full_name()),
        ("Email".to_string(), optional(&member.email)),
        ("Phone".to_string(), optional(&member.phone)),
        ("Address".to_string(), optional(&member.address)),
        ("Status".to_string(), member.status.to_string()),
    ];
    rows.extend(descriptors.iter().map(|descriptor| {
        let value = member
            .custom_value(descriptor.name())
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        (descriptor.label().to_string(), value)
    }));
    rows
}

async fn show(ctx: &Context, id: Uuid) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let registry = load_registry(ctx).await?;
    let member = output::with_spinner(ctx.spinner(), "Loading member...", client.get_member(id))
        .await
        .with_context(|| format!("Cannot load member {}", id))?;

    output::print_details(&member_details(&member, &registry.descriptors().await));
    Ok(())
}

async fn add(ctx: &Context, status: MemberStatus, entity_id: Option<Uuid>) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let registry = load_registry(ctx).await?;
    let mut form = MemberForm::new(&registry.descriptors().await);

    let saved = prompt::edit_until_saved(&mut form, status, entity_id, |payload| {
        let client = client.clone();
        async move { client.create_member(&payload).await }
    })
    .await?;

    match saved {
        Some(member) => {
            tracing::info!(member_id = %member.id, "Member created");
            println!("Added {} ({})", member.full_name(), member.id);
        }
        None => println!("Member not saved"),
    }
    Ok(())
}

async fn edit(ctx: &Context, id: Uuid, status: Option<MemberStatus>) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let registry = load_registry(ctx).await?;
    let member = client
        .get_member(id)
        .await
        .with_context(|| format!("Cannot load member {}", id))?;
    let mut form = MemberForm::for_member(&member, &registry.descriptors().await);

    let saved = prompt::edit_until_saved(
        &mut form,
        status.unwrap_or(member.status),
        member.entity_id,
        |payload| {
            let client = client.clone();
            async move { client.update_member(id, &payload).await }
        },
    )
    .await?;

    match saved {
        Some(member) => {
            tracing::info!(member_id = %member.id, "Member updated");
            println!("Updated {}", member.full_name());
        }
        None => println!("Changes discarded"),
    }
    Ok(())
}

async fn remove(ctx: &Context, id: Uuid, yes: bool) -> anyhow::Result<()> {
    let client = ctx.client()?;
    if !yes && !prompt::confirm(&format!("Delete member {}?", id), false)? {
        return Ok(());
    }
    output::with_spinner(ctx.spinner(), "Deleting member...", client.delete_member(id)).await?;
    println!("Deleted member {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_details_include_custom_fields_in_descriptor_order() {
        let member = Member {
            id: Uuid::nil(),
            entity_id: None,
            first_name: "Ada".into(),
            last_name: "Okafor".into(),
            email: None,
            phone: Some("555-0101".into()),
            address: None,
            status: MemberStatus::Visitor,
            custom_fields: [("choir".to_string(), serde_json::json!(false))]
                .into_iter()
                .collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let descriptors = vec![
            FieldDescriptor::checkbox("choir", "Sings in choir"),
            FieldDescriptor::text("nickname", "Nickname"),
        ];

        let rows = member_details(&member, &descriptors);
        assert_eq!(rows[1], ("Name".to_string(), "Ada Okafor".to_string()));
        assert_eq!(rows[2].1, "-");
        assert_eq!(rows[5].1, "visitor");
        assert_eq!(rows[6], ("Sings in choir".to_string(), "no".to_string()));
        assert_eq!(rows[7], ("Nickname".to_string(), "-".to_string()));
    }
}
