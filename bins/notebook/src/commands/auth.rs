//! Session token commands

use crate::context::Context;
use crate::output::Status;
use anyhow::Result;
use owo_colors::OwoColorize;

/// `auth login --token <t>`
pub fn login(ctx: &Context, token: &str) -> Result<()> {
    ctx.auth.set_token(token)?;
    if ctx.is_json() {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": "Token stored"})
        );
    } else {
        Status::success(&format!("Token stored in {}", ctx.state_path.display()));
    }
    Ok(())
}

/// `auth logout`
pub fn logout(ctx: &Context) -> Result<()> {
    ctx.auth.clear()?;
    if ctx.is_json() {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": "Signed out"})
        );
    } else {
        Status::success("Signed out");
    }
    Ok(())
}

/// `auth status`
pub fn status(ctx: &Context) -> Result<()> {
    let signed_in = ctx.auth.token()?.is_some();
    if ctx.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "data": {"signedIn": signed_in, "stateFile": ctx.state_path.display().to_string()},
            })
        );
    } else if signed_in {
        Status::success(&format!("Signed in ({})", ctx.state_path.display().dimmed()));
    } else {
        Status::warning("Not signed in");
    }
    Ok(())
}
