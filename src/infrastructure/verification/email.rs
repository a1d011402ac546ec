//! Verification email composition

use crate::domain::{DomainError, OutgoingMail, Recipients};

pub const VERIFICATION_SUBJECT: &str = "Verify your email address";

/// Landing page URL for a token
pub fn verification_link(public_url: &str, token: &str) -> String {
    format!(
        "{}/mail/verify?token={}",
        public_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

/// Build the verification email for `to`
pub fn verification_email(
    sender: impl Into<String>,
    to: Recipients,
    link: &str,
) -> Result<OutgoingMail, DomainError> {
    let html = format!(
        r#"<a href="{}">Click here to verify</a>"#,
        html_escape::encode_double_quoted_attribute(link)
    );

    OutgoingMail::new(sender, to, VERIFICATION_SUBJECT, html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_link() {
        assert_eq!(
            verification_link("https://mail.example.com/", "abc_-1"),
            "https://mail.example.com/mail/verify?token=abc_-1"
        );
    }

    #[test]
    fn test_verification_link_encodes_token() {
        assert_eq!(
            verification_link("http://localhost:8080", "a b&c"),
            "http://localhost:8080/mail/verify?token=a%20b%26c"
        );
    }

    #[test]
    fn test_verification_email() {
        let link = verification_link("https://mail.example.com", "tok");
        let mail = verification_email(
            "verify.alice@mail.example.com",
            Recipients::from("bob@example.com"),
            &link,
        )
        .unwrap();

        assert_eq!(mail.from, "verify.alice@mail.example.com");
        assert_eq!(mail.to, vec!["bob@example.com"]);
        assert_eq!(mail.subject, VERIFICATION_SUBJECT);
        assert_eq!(
            mail.html,
            r#"<a href="https://mail.example.com/mail/verify?token=tok">Click here to verify</a>"#
        );
    }
}
