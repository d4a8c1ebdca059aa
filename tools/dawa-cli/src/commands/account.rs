//! Login, signup and session commands.

use anyhow::{bail, Result};
use dawa_auth::{AuthError, CredentialField};
use dawa_commerce::checkout::ValidationErrors;
use dialoguer::{Input, Password};

use super::{LoginArgs, SignupArgs};
use crate::context::Context;

fn prompt_text(label: &str) -> Result<String> {
    Ok(Input::<String>::new().with_prompt(label).interact_text()?)
}

fn report_invalid(ctx: &Context, errors: &ValidationErrors<CredentialField>) {
    for (_, message) in errors.iter() {
        ctx.output.error(message);
    }
}

/// Turn an auth failure into the message shown to the shopper.
fn explain(ctx: &Context, err: AuthError) -> anyhow::Error {
    match err {
        AuthError::Invalid(errors) => {
            report_invalid(ctx, &errors);
            anyhow::anyhow!("Please fix the highlighted fields")
        }
        other => other.into(),
    }
}

/// Sign in with email and password.
pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let auth = ctx.auth_api()?;
    if let Some(user) = auth.store().user() {
        ctx.output
            .info(&format!("Already logged in as {}; logging in again", user.email));
    }

    let email = match args.email {
        Some(email) => email,
        None => prompt_text("Email")?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let spinner = ctx.output.spinner("Logging in...");
    let result = auth.login(&email, &password).await;
    spinner.finish_and_clear();

    let user = result.map_err(|e| explain(ctx, e))?;
    ctx.output
        .success(&format!("Welcome back, {}!", user.first_name()));
    Ok(())
}

/// Create an account and sign in with it.
pub async fn signup(args: SignupArgs, ctx: &Context) -> Result<()> {
    let auth = ctx.auth_api()?;

    let name = match args.name {
        Some(name) => name,
        None => prompt_text("Full name")?,
    };
    let email = match args.email {
        Some(email) => email,
        None => prompt_text("Email")?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let spinner = ctx.output.spinner("Creating account...");
    let result = auth.signup(&name, &email, &password).await;
    spinner.finish_and_clear();

    let user = result.map_err(|e| explain(ctx, e))?;
    ctx.output.success(&format!(
        "Account created. Welcome, {}!",
        user.first_name()
    ));
    Ok(())
}

/// Sign out locally and on the server.
pub async fn logout(ctx: &Context) -> Result<()> {
    let auth = ctx.auth_api()?;
    if !auth.store().is_authenticated() {
        ctx.output.info("Not logged in");
        return Ok(());
    }
    auth.logout().await?;
    ctx.output.success("Logged out");
    Ok(())
}

/// Show the signed-in user.
pub async fn whoami(ctx: &Context) -> Result<()> {
    let store = ctx.auth_store()?;
    let Some(user) = store.user() else {
        bail!("Not logged in (`dawa login`)");
    };

    if ctx.output.is_json() {
        ctx.output.json(&user);
        return Ok(());
    }
    ctx.output.kv("Name", &user.name);
    ctx.output.kv("Email", &user.email);
    ctx.output.kv("Role", user.role().as_str());
    Ok(())
}
