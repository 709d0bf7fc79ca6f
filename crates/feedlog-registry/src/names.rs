//! Feed name validation.
//!
//! Valid feed names:
//! - Must be non-empty and not only whitespace
//! - Must not contain `://` (that would read as a URI)
//! - Must not contain control characters

use crate::error::{RegistryError, Result};

/// Validate a feed name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use feedlog_registry::names::validate_feed_name;
///
/// assert!(validate_feed_name("my-feed").is_ok());
/// assert!(validate_feed_name("team/alerts").is_ok());
/// assert!(validate_feed_name("").is_err());
/// assert!(validate_feed_name("feed://abc").is_err());
/// ```
pub fn validate_feed_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(RegistryError::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        })
    };

    if name.trim().is_empty() {
        return invalid("feed name must not be empty");
    }
    if name.contains("://") {
        return invalid("must not contain '://'");
    }
    if name.chars().any(char::is_control) {
        return invalid("must not contain control characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        for name in ["alerts", "team/alerts", "with space", "ünïcode", "a.b-c_d"] {
            assert!(validate_feed_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(validate_feed_name("").is_err());
        assert!(validate_feed_name("   ").is_err());
    }

    #[test]
    fn rejects_uri_like_names() {
        assert!(validate_feed_name("feed://abc").is_err());
        assert!(validate_feed_name("sha1://abc").is_err());
    }

    #[test]
    fn rejects_control_characters() {
        assert!(validate_feed_name("a\nb").is_err());
        assert!(validate_feed_name("a\0").is_err());
    }

    #[test]
    fn error_names_the_input() {
        let err = validate_feed_name("x://y").unwrap_err();
        assert!(err.to_string().contains("x://y"));
    }
}
