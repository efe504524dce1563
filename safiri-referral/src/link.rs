use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

const REFERRAL_CODE_LEN: usize = 8;

/// Only verified hosts may generate trackable referral links.
pub fn can_generate_link(is_host: bool, is_verified: bool) -> bool {
    is_host && is_verified
}

/// Random alphanumeric referral code embedded in shared links.
pub fn generate_referral_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFERRAL_CODE_LEN)
        .map(char::from)
        .collect()
}

/// Append the referral code (and optionally the item) to a listing URL.
pub fn referral_link(base_url: &str, code: &str, item_id: Option<Uuid>) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    match item_id {
        Some(item_id) => format!("{}{}ref={}&item={}", base_url, separator, code, item_id),
        None => format!("{}{}ref={}", base_url, separator, code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_verified_hosts_generate_links() {
        assert!(can_generate_link(true, true));
        assert!(!can_generate_link(true, false));
        assert!(!can_generate_link(false, true));
    }

    #[test]
    fn test_referral_code_shape() {
        let code = generate_referral_code();
        assert_eq!(code.len(), REFERRAL_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_link_separator_depends_on_existing_query() {
        let code = "Ab3dE9xZ";
        assert_eq!(
            referral_link("https://safiri.example/listings/42", code, None),
            "https://safiri.example/listings/42?ref=Ab3dE9xZ"
        );
        assert!(
            referral_link("https://safiri.example/listings?tab=all", code, None)
                .contains("&ref=Ab3dE9xZ")
        );
    }
}
