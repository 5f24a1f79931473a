use models::entity::CreateEntity;
use services::services::{console_api::ConsoleApiClient, export::EntityTable};
use uuid::Uuid;

use super::Context;
use crate::{cli::EntitiesCommand, output, prompt};

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn run(ctx: &Context, command: EntitiesCommand) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match command {
        EntitiesCommand::List => {
            let entities =
                output::with_spinner(ctx.spinner(), "Loading entities...", client.list_entities())
                    .await?;
            output::print_table(&EntityTable(&entities), ctx.format)?;
        }
        EntitiesCommand::Add {
            name,
            kind,
            parent,
            address,
            phone,
            email,
        } => {
            let request = CreateEntity {
                name: name.trim().to_string(),
                kind,
                parent_id: parent,
                address: non_blank(address),
                phone: non_blank(phone),
                email: non_blank(email),
            };
            anyhow::ensure!(!request.name.is_empty(), "Entity name cannot be empty");

            let entity = output::with_spinner(
                ctx.spinner(),
                "Creating entity...",
                client.create_entity(&request),
            )
            .await?;
            tracing::info!(entity_id = %entity.id, kind = %entity.kind, "Entity created");
            println!("Created {} '{}' ({})", entity.kind, entity.name, entity.id);
        }
        EntitiesCommand::Remove { id, yes } => remove(ctx, &client, id, yes).await?,
    }
    Ok(())
}

async fn remove(
    ctx: &Context,
    client: &ConsoleApiClient,
    id: Uuid,
    yes: bool,
) -> anyhow::Result<()> {
    if !yes && !prompt::confirm(&format!("Delete entity {}?", id), false)? {
        return Ok(());
    }
    output::with_spinner(ctx.spinner(), "Deleting entity...", client.delete_entity(id)).await?;
    println!("Deleted entity {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" Lagos ".into())), Some("Lagos".into()));
        assert_eq!(non_blank(None), None);
    }
}
