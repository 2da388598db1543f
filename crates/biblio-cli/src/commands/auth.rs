//! Login, register, and logout command handlers

use std::io::{self, Write};

use anyhow::{Context, Result};

use biblio_core::Session;

use crate::output::Output;

/// Log in and persist the session token
pub async fn login(session: &mut Session, email: String, output: &Output) -> Result<()> {
    let password = read_password()?;

    session
        .login(&email, &password)
        .await
        .context("Login failed. Check the email/password and that the API is running.")?;

    finish_auth(session, &email, output);
    Ok(())
}

/// Create an account, then log in with the same credentials
pub async fn register(session: &mut Session, email: String, output: &Output) -> Result<()> {
    let password = read_password()?;

    session
        .register(&email, &password)
        .await
        .context("Registration failed. Check the email/password and that the API is running.")?;

    finish_auth(session, &email, output);
    Ok(())
}

/// Log out and clear local session state
pub fn logout(session: &mut Session, output: &Output) -> Result<()> {
    session.logout();
    output.success("Logged out");
    Ok(())
}

fn finish_auth(session: &Session, email: &str, output: &Output) {
    output.success(&format!("Logged in as {}", email));

    // The login bootstrap may have failed without invalidating the token
    if let Some(err) = session.error() {
        output.message(err);
        return;
    }

    output.message(&format!(
        "  Books: {}, Authors: {}",
        session.books().len(),
        session.authors().len()
    ));
}

/// Read the password from the terminal or piped stdin
fn read_password() -> Result<String> {
    if atty::is(atty::Stream::Stdin) {
        print!("Password: ");
        io::stdout().flush()?;
    }

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches('\n').trim_end_matches('\r').to_string())
}
