//! Auth command handlers (register, login, logout, whoami).

use anyhow::Result;
use pomi_client::api::AuthApi;
use pomi_client::session::Session;
use pomi_client::types::RegisterRequest;

pub async fn register(api: AuthApi, request: &RegisterRequest) -> Result<()> {
    let mut session = Session::new(api);
    session.register(request).await?;

    if let Some(user) = session.user() {
        println!("Registered and signed in as {} <{}>", user.username, user.email);
        if user.email_verified == Some(false) {
            println!("Check your inbox to verify your email address.");
        }
    }
    Ok(())
}

pub async fn login(api: AuthApi, email: &str, password: &str) -> Result<()> {
    let mut session = Session::new(api);
    session.login(email, password).await?;

    if let Some(user) = session.user() {
        println!("Signed in as {} <{}>", user.username, user.email);
    }
    Ok(())
}

pub async fn logout(api: AuthApi) -> Result<()> {
    let mut session = Session::new(api);
    session.logout().await;

    // Local teardown always succeeds; a server-side failure is only logged.
    if let Some(err) = session.error() {
        tracing::warn!(error = %err, "server-side logout failed, local session cleared");
    }
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(api: AuthApi) -> Result<()> {
    if !api.token_store().has_access_token() {
        anyhow::bail!("Not signed in. Run 'pomi login' first.");
    }

    let mut session = Session::new(api);
    session.restore().await;

    match session.user() {
        Some(user) => {
            println!("{} <{}>", user.display_name(), user.email);
            println!("id: {}", user.id);
            Ok(())
        }
        None => anyhow::bail!("Session expired. Run 'pomi login' again."),
    }
}
