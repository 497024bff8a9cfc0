use cabinetry_backend::config::JwtConfig;
use cabinetry_backend::util::jwt::*;
use chrono::Utc;

fn create_test_jwt_utils() -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig::default())
}

#[test]
fn test_session_token_round_trip() {
    let jwt = create_test_jwt_utils();
    let token = jwt
        .generate_session_token("65f0c0ffee0000000000abcd", "maria", "Manager", "session-1")
        .unwrap();
    assert_eq!(token.split('.').count(), 3);

    let claims = jwt.validate_token(&token).unwrap();
    assert_eq!(claims.sub, "65f0c0ffee0000000000abcd");
    assert_eq!(claims.username, "maria");
    assert_eq!(claims.role, "Manager");
    assert_eq!(claims.jti, "session-1");
    assert_eq!(claims.iss.as_deref(), Some("cabinetry-backend"));
    assert!(claims.exp > Utc::now().timestamp());
    assert_eq!(claims.exp - claims.iat, jwt.expires_in());
}

#[test]
fn test_expires_in_follows_config() {
    let jwt = create_test_jwt_utils();
    assert_eq!(jwt.expires_in(), 480 * 60);
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let jwt = create_test_jwt_utils();
    let other = JwtTokenUtilsImpl::new(JwtConfig {
        jwt_secret: "another_secret_that_is_also_long_enough_for_hs256".to_string(),
        ..JwtConfig::default()
    });
    let token = other.generate_session_token("id", "user", "Fitter", "s").unwrap();
    assert!(matches!(jwt.validate_token(&token), Err(JwtError::DecodingFailed(_))));
}

#[test]
fn test_wrong_issuer_is_rejected() {
    let jwt = create_test_jwt_utils();
    let other = JwtTokenUtilsImpl::new(JwtConfig {
        jwt_issuer: Some("someone-else".to_string()),
        ..JwtConfig::default()
    });
    let token = other.generate_session_token("id", "user", "Admin", "s").unwrap();
    assert!(jwt.validate_token(&token).is_err());
}

#[test]
fn test_expired_token_is_rejected() {
    let jwt = JwtTokenUtilsImpl::new(JwtConfig {
        session_expiration: -10,
        ..JwtConfig::default()
    });
    let token = jwt.generate_session_token("id", "user", "Admin", "s").unwrap();
    assert_eq!(jwt.validate_token(&token), Err(JwtError::TokenExpired));
}

#[test]
fn test_garbage_token_is_rejected() {
    let jwt = create_test_jwt_utils();
    assert!(jwt.validate_token("not.a.token").is_err());
    assert!(jwt.validate_token("").is_err());
}

#[test]
fn test_extract_token_from_header() {
    let jwt = create_test_jwt_utils();
    assert_eq!(jwt.extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    assert_eq!(jwt.extract_token_from_header("Basic abc"), Err(JwtError::InvalidToken));
    assert_eq!(jwt.extract_token_from_header("Bearer "), Err(JwtError::InvalidToken));
    assert_eq!(jwt.extract_token_from_header("abc.def.ghi"), Err(JwtError::InvalidToken));
}
