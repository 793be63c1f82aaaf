use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

/// Environment variable that supplies the password non-interactively.
pub const PASSWORD_ENV: &str = "BCRYPT_SQL_PASSWORD";

/// Reads the password to check against a stored hash.
///
/// An empty password is a valid password here.
pub fn read_password() -> Result<Zeroizing<String>> {
    //  BCRYPT_SQL_PASSWORD="supersecret" bcrypt-sql check '$2b$12$...'
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    //  printf '%s\n' "$PW" | bcrypt-sql check '$2b$12$...'
    if !io::stdin().is_terminal() {
        return read_piped_line();
    }

    Ok(Zeroizing::new(rpassword::prompt_password("Password: ")?))
}

/// Reads a password that is about to be hashed, confirming it on a TTY.
pub fn read_new_password_with_confirmation() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    if !io::stdin().is_terminal() {
        return read_piped_line();
    }

    let pw1 = Zeroizing::new(rpassword::prompt_password("New password: ")?);
    let pw2 = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);

    if pw1 != pw2 {
        bail!("passwords do not match");
    }

    Ok(pw1)
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV).ok().map(Zeroizing::new)
}

fn read_piped_line() -> Result<Zeroizing<String>> {
    let mut pw = Zeroizing::new(String::new());
    if io::stdin().lock().read_line(&mut pw)? == 0 {
        bail!("No password provided");
    }
    trim_newline(&mut pw);
    Ok(pw)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
