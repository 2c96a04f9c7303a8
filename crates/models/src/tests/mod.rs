
/// Pure validation helpers; no database needed
mod validation_tests {
    use crate::user::{validate_email, validate_name};

    #[test]
    fn name_must_be_present_and_bounded() {
        assert!(validate_name("Ada").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"x".repeat(100)).is_ok());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn whitespace_only_name_is_accepted() {
        assert!(validate_name("   ").is_ok());
        assert!(validate_name(" é ").is_ok());
    }

    #[test]
    fn email_needs_an_at_sign() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada.example.com").is_err());
    }
}
