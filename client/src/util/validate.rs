//! Form validation run before any remote call.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_DISPLAY_NAME_CHARS: usize = 50;
pub const MAX_BIO_CHARS: usize = 280;

/// Trimmed email and untouched password.
pub fn validate_credentials(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = validate_email(email)?;
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err("Password must be at least 8 characters.");
    }
    Ok((email, password.to_owned()))
}

pub fn validate_email(email: &str) -> Result<String, &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Enter an email first.");
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email.to_owned()),
        _ => Err("Enter a valid email address."),
    }
}

pub fn validate_display_name(name: &str) -> Result<String, &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Display name is required.");
    }
    if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err("Display name must be 50 characters or fewer.");
    }
    Ok(name.to_owned())
}

/// Blank bios are stored as `None`.
pub fn validate_bio(bio: &str) -> Result<Option<String>, &'static str> {
    let bio = bio.trim();
    if bio.chars().count() > MAX_BIO_CHARS {
        return Err("Bio must be 280 characters or fewer.");
    }
    Ok(Some(bio.to_owned()).filter(|b| !b.is_empty()))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

pub fn validate_registration(
    email: &str,
    password: &str,
    confirm: &str,
    display_name: &str,
) -> Result<Registration, &'static str> {
    let display_name = validate_display_name(display_name)?;
    let (email, password) = validate_credentials(email, password)?;
    if password != confirm {
        return Err("Passwords do not match.");
    }
    Ok(Registration { email, password, display_name })
}
