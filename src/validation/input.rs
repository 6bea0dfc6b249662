//! Input checks shared by several model types.

use super::error::Violation;

/// Validate a URL used as a support channel or authoritative definition.
///
/// Only `http` and `https` URLs are accepted, and credentials embedded in the
/// host part are rejected.
///
/// # Examples
///
/// ```
/// use odcs_sheets::validation::validate_url;
///
/// assert!(validate_url("https://wiki.example.com/orders").is_ok());
/// assert!(validate_url("ftp://files.example.com").is_err());
/// ```
pub fn validate_url(url: &str) -> Result<(), Violation> {
    if url.trim().is_empty() {
        return Err(Violation::Empty);
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(Violation::Invalid(format!("'{}' is not an absolute URL", url)));
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(Violation::Invalid(format!(
            "scheme '{}' is not allowed, use http or https",
            scheme
        )));
    }

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() {
        return Err(Violation::Invalid(format!("'{}' has no host", url)));
    }
    if authority.contains('@') {
        return Err(Violation::Invalid(
            "URLs with embedded credentials are not allowed".to_string(),
        ));
    }

    Ok(())
}
