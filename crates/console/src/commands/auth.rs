use anyhow::Context as _;
use chrono::Utc;
use services::services::console_api::ConsoleApiError;

use super::Context;
use crate::{credentials::StoredCredentials, output, prompt};

pub async fn login(ctx: &Context, email: Option<String>) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt::text("Email")?,
    };
    let password = prompt::password("Password")?;

    let client = ctx.anonymous_client()?;
    let response = output::with_spinner(
        ctx.spinner(),
        "Signing in...",
        client.login(&email, &password),
    )
    .await
    .map_err(|e| match e {
        ConsoleApiError::Unauthorized => anyhow::anyhow!("Invalid email or password"),
        other => anyhow::Error::new(other).context("Sign in failed"),
    })?;

    let name = response
        .user
        .as_ref()
        .map(|user| user.name.clone())
        .unwrap_or_else(|| email.clone());
    ctx.store
        .save(&StoredCredentials {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            email: Some(email),
            server_url: ctx.server_url.clone(),
            saved_at: Utc::now(),
        })
        .context("Signed in, but the session could not be saved")?;

    tracing::info!(server = %ctx.server_url, "Signed in");
    println!("Signed in as {}", name);
    Ok(())
}

pub fn logout(ctx: &Context) -> anyhow::Result<()> {
    if ctx.store.clear()? {
        println!("Signed out");
    } else {
        println!("No stored session");
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> anyhow::Result<()> {
    match ctx.store.load()? {
        Some(credentials) => output::print_details(&[
            (
                "Email".to_string(),
                credentials.email.clone().unwrap_or_else(|| "unknown".to_string()),
            ),
            ("Server".to_string(), credentials.server_url.clone()),
            ("Signed in".to_string(), credentials.saved_at.to_rfc3339()),
            ("Credentials".to_string(), ctx.store.path().display().to_string()),
        ]),
        None => println!("Not signed in"),
    }
    Ok(())
}
