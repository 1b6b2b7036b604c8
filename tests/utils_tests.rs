use openerp_rs::utils::{validate_range, StringValidator};

#[test]
fn not_empty_rejects_blank_strings() {
    assert!(StringValidator::not_empty("admin", "login").is_ok());
    assert!(StringValidator::not_empty("", "login").is_err());
    assert!(StringValidator::not_empty("   ", "login").is_err());
}

#[test]
fn max_length_bounds_strings() {
    assert!(StringValidator::max_length("MO", 2, "state").is_ok());
    assert!(StringValidator::max_length("Missouri", 2, "state").is_err());
}

#[test]
fn validate_range_bounds_numbers() {
    assert_eq!(validate_range(300u64, 1, 3600, "timeout_secs").unwrap(), 300);
    assert!(validate_range(0u64, 1, 3600, "timeout_secs").is_err());
    assert!(validate_range(4000u64, 1, 3600, "timeout_secs").is_err());
}
