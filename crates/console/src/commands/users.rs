use models::user::{CreateUser, UpdateUser};
use services::services::export::UserTable;

use super::Context;
use crate::{cli::UsersCommand, output, prompt};

pub async fn run(ctx: &Context, command: UsersCommand) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match command {
        UsersCommand::List => {
            let users =
                output::with_spinner(ctx.spinner(), "Loading users...", client.list_users())
                    .await?;
            output::print_table(&UserTable(&users), ctx.format)?;
        }
        UsersCommand::Add {
            name,
            email,
            role,
            entity,
        } => {
            let password = prompt::new_password()?;
            let request = CreateUser {
                name,
                email,
                password,
                role,
                entity_id: entity,
            };
            let user = output::with_spinner(
                ctx.spinner(),
                "Creating user...",
                client.create_user(&request),
            )
            .await?;
            tracing::info!(user_id = %user.id, role = %user.role, "User created");
            println!("Created {} <{}> as {}", user.name, user.email, user.role);
        }
        UsersCommand::Deactivate { id } => {
            let update = UpdateUser {
                active: Some(false),
                ..Default::default()
            };
            let user = output::with_spinner(
                ctx.spinner(),
                "Deactivating user...",
                client.update_user(id, &update),
            )
            .await?;
            println!("Deactivated {} <{}>", user.name, user.email);
        }
    }
    Ok(())
}
