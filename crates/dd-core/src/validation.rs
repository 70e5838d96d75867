//! Input checks shared by the services.

use crate::error::{AppError, Result};

/// Basic `local@domain.tld` shape check. Not an RFC 5322 parser.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // At least two labels, none of them empty
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

/// Username and email come back trimmed.
pub fn check_registration(username: &str, email: &str, password: &str) -> Result<(String, String)> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username, email and password are required".to_string(),
        ));
    }
    if !is_valid_email(email) {
        return Err(AppError::Validation("Email address is not valid".to_string()));
    }
    Ok((username.to_string(), email.to_string()))
}

pub fn check_post(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(AppError::Validation("Title and content are required".to_string()));
    }
    Ok(())
}

pub fn check_reply(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("a.b+tag@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "",
            "alice",
            "alice@",
            "@x.com",
            "alice@x",
            "alice@x.",
            "alice@.com",
            "alice@x..com",
            "alice@x.com.",
            "a@b@c.com",
            "al ice@x.com",
        ] {
            assert!(!is_valid_email(bad), "accepted {bad:?}");
        }
    }

    #[test]
    fn registration_requires_every_field() {
        assert!(matches!(check_registration("", "a@b.co", "pw"), Err(AppError::Validation(_))));
        assert!(matches!(check_registration("alice", "   ", "pw"), Err(AppError::Validation(_))));
        assert!(matches!(check_registration("alice", "a@b.co", ""), Err(AppError::Validation(_))));
    }

    #[test]
    fn registration_trims_identifiers() {
        let (username, email) = check_registration("  alice ", " alice@x.com ", "pw123").unwrap();
        assert_eq!(username, "alice");
        assert_eq!(email, "alice@x.com");
    }

    #[test]
    fn post_and_reply_need_text() {
        assert!(check_post("T", "C").is_ok());
        assert!(check_post("T", " ").is_err());
        assert!(check_post("", "C").is_err());
        assert!(check_reply("hi").is_ok());
        assert!(check_reply("").is_err());
    }
}
