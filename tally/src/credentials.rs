use anyhow::{bail, Result};
use secrecy::{ExposeSecret, SecretString};
use std::io::{self, BufRead, IsTerminal, Write};
use tally_auth::{Credentials, LoginEmailStore, Settings};

/// Where missing login details are asked for
pub trait Prompt {
    fn line(&mut self, prompt: &str) -> io::Result<String>;

    /// Like [`Prompt::line`], but the answer is not echoed
    fn secret(&mut self, prompt: &str) -> io::Result<SecretString>;
}

/// Prompts on stderr and reads from stdin.
///
/// Passwords are read with echo off when stdin is a terminal. Piped input is
/// read as a plain line.
pub struct Terminal;

impl Prompt for Terminal {
    fn line(&mut self, prompt: &str) -> io::Result<String> {
        show(prompt)?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn secret(&mut self, prompt: &str) -> io::Result<SecretString> {
        if !io::stdin().is_terminal() {
            return self.line(prompt).map(SecretString::from);
        }
        show(prompt)?;
        Ok(SecretString::from(rpassword::read_password()?))
    }
}

fn show(prompt: &str) -> io::Result<()> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", prompt)?;
    stderr.flush()
}

/// Work out who to log in as.
///
/// Settings (`TALLY__EMAIL` / `TALLY__PASSWORD` or the config file) win.
/// Anything missing is asked for, offering the remembered email as the
/// default.
pub fn resolve(
    settings: &Settings,
    email_store: &LoginEmailStore,
    prompt: &mut impl Prompt,
) -> Result<Credentials> {
    let email = match &settings.email {
        Some(email) => email.clone(),
        None => {
            let remembered = email_store.load()?;
            let typed = match &remembered {
                Some(email) => prompt.line(&format!("Email [{}]: ", email))?,
                None => prompt.line("Email: ")?,
            };
            match (typed.is_empty(), remembered) {
                (false, _) => typed,
                (true, Some(email)) => email,
                (true, None) => bail!("An email is required to log in"),
            }
        }
    };

    let password = match &settings.password {
        Some(password) => password.clone(),
        None => prompt.secret(&format!("Password for {}: ", email))?,
    };
    if password.expose_secret().is_empty() {
        bail!("A password is required to log in");
    }

    Ok(Credentials::new(email, password))
}
