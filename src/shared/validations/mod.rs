/// Clamp raw pagination input to sane bounds.
pub fn validate_pagination(page: Option<u32>, page_size: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(10).clamp(1, 100);
    (page, page_size)
}

/// Minimal structural check. Real verification of an address is the
/// email-change confirmation loop, not this.
pub fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}
