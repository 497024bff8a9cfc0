use cabinetry_backend::util::password::*;
use std::collections::HashSet;

fn get_test_passwords() -> Vec<(&'static str, bool)> {
    vec![
        ("Workshop2024", true),
        ("cabinet99", true),
        ("short1", false),       // too short
        ("nodigitshere", false), // no digit
        ("1234567890", false),   // no letter
        ("", false),
        ("Oak-veneer-7", true),
    ]
}

#[test]
fn test_hash_password_success() {
    let password = "test_password_123";
    let hash = PasswordUtilsImpl::hash_password(password).unwrap();

    assert!(!hash.is_empty());
    assert_ne!(hash, password);
    assert!(hash.starts_with("$argon2"));
    let parts: Vec<&str> = hash.split('$').collect();
    assert!(parts.len() >= 5, "Hash should have at least 5 parts separated by $");
}

#[test]
fn test_hashes_are_salted() {
    let hashes: HashSet<String> = (0..5)
        .map(|_| PasswordUtilsImpl::hash_password("same_password_1").unwrap())
        .collect();
    assert_eq!(hashes.len(), 5);
}

#[test]
fn test_verify_password() {
    let hash = PasswordUtilsImpl::hash_password("correct_horse_1").unwrap();
    assert!(PasswordUtilsImpl::verify_password("correct_horse_1", &hash).unwrap());
    assert!(!PasswordUtilsImpl::verify_password("wrong_horse_1", &hash).unwrap());
}

#[test]
fn test_verify_password_invalid_hash() {
    let result = PasswordUtilsImpl::verify_password("anything1", "not-a-hash");
    assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
}

#[test]
fn test_password_strength_rules() {
    for (password, valid) in get_test_passwords() {
        assert_eq!(
            PasswordUtilsImpl::validate_password_strength(password).is_ok(),
            valid,
            "unexpected strength verdict for {:?}",
            password
        );
    }
}

#[test]
fn test_password_strength_reports_every_rule() {
    let errors = PasswordUtilsImpl::validate_password_strength("").unwrap_err();
    assert_eq!(errors.len(), 3);
}
