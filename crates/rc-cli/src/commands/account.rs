use anyhow::Result;
use colored::Colorize;

use super::Context;

pub async fn whoami(ctx: &Context) {
    match ctx.account_service().restore().await {
        Some(auth) => {
            println!("{} <{}>", auth.user.name.bold(), auth.user.email);
            println!("{}", format!("id: {}", auth.user.id).bright_black());
        }
        None => println!("{}", "Not signed in".bright_black()),
    }
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.account_service().sign_out()?;
    println!("Signed out");
    Ok(())
}
