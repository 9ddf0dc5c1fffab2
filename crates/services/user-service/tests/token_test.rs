//! Token issuance and validation across every supported algorithm.

use chrono::{Duration, Utc};
use common::{AppError, JwtConfig};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use user_service_lib::token::{Claims, SigningAlgorithm, TokenConfig};

const SECRET: &str = "an-hmac-secret-that-is-long-enough-for-tests";
const PRIVATE_PEM: &str = include_str!("fixtures/rsa_private.pem");
const PUBLIC_PEM: &str = include_str!("fixtures/rsa_public.pem");
const OTHER_PUBLIC_PEM: &str = include_str!("fixtures/rsa_other_public.pem");

fn settings(algorithm: SigningAlgorithm) -> JwtConfig {
    match algorithm {
        SigningAlgorithm::RS256 | SigningAlgorithm::RS384 | SigningAlgorithm::RS512 => JwtConfig {
            algorithm: algorithm.to_string(),
            signing_key: PRIVATE_PEM.to_string(),
            verification_key: Some(PUBLIC_PEM.to_string()),
            ..JwtConfig::default()
        },
        _ => JwtConfig {
            algorithm: algorithm.to_string(),
            signing_key: SECRET.to_string(),
            ..JwtConfig::default()
        },
    }
}

#[test]
fn test_every_algorithm_round_trips() {
    for algorithm in SigningAlgorithm::ALL {
        let config = TokenConfig::from_settings(&settings(algorithm)).unwrap();
        let now = Utc::now();
        let subject = Uuid::new_v4();

        let pair = config.build_issuer().issue_pair(subject, now).unwrap();
        let validator = config.build_validator();

        let access = validator.validate(&pair.access_token, now).unwrap();
        let refresh = validator.validate(&pair.refresh_token, now).unwrap();

        assert_eq!(access.sub, subject, "{}", algorithm);
        assert_eq!(refresh.sub, subject, "{}", algorithm);
        assert!(access.exp < refresh.exp, "{}", algorithm);
    }
}

#[test]
fn test_access_token_expires_before_refresh_token() {
    let config = TokenConfig::from_settings(&settings(SigningAlgorithm::HS256)).unwrap();
    let now = Utc::now();
    let pair = config.build_issuer().issue_pair(Uuid::new_v4(), now).unwrap();
    let validator = config.build_validator();

    let later = now + Duration::hours(30);
    assert!(matches!(
        validator.validate(&pair.access_token, later),
        Err(AppError::InvalidToken(_))
    ));
    assert!(validator.validate(&pair.refresh_token, later).is_ok());
}

#[test]
fn test_hmac_variant_mismatch_rejected() {
    let hs384 = TokenConfig::from_settings(&settings(SigningAlgorithm::HS384)).unwrap();
    let hs256 = TokenConfig::from_settings(&settings(SigningAlgorithm::HS256)).unwrap();
    let now = Utc::now();

    let pair = hs384.build_issuer().issue_pair(Uuid::new_v4(), now).unwrap();
    assert!(matches!(
        hs256.build_validator().validate(&pair.access_token, now),
        Err(AppError::InvalidToken(_))
    ));
}

#[test]
fn test_hmac_token_keyed_with_public_key_rejected_under_rsa() {
    let rs256 = TokenConfig::from_settings(&settings(SigningAlgorithm::RS256)).unwrap();
    let now = Utc::now();
    let claims = Claims {
        sub: Uuid::new_v4(),
        iss: "user-service".to_string(),
        iat: now.timestamp(),
        exp: now.timestamp() + 600,
        nbf: None,
        aud: None,
    };
    let forged = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(PUBLIC_PEM.as_bytes()),
    )
    .unwrap();

    assert!(matches!(
        rs256.build_validator().validate(&forged, now),
        Err(AppError::InvalidToken(_))
    ));
}

#[test]
fn test_wrong_public_key_rejected() {
    let signer = TokenConfig::from_settings(&settings(SigningAlgorithm::RS512)).unwrap();
    let verifier = TokenConfig::from_settings(&JwtConfig {
        verification_key: Some(OTHER_PUBLIC_PEM.to_string()),
        ..settings(SigningAlgorithm::RS512)
    })
    .unwrap();
    let now = Utc::now();

    let pair = signer.build_issuer().issue_pair(Uuid::new_v4(), now).unwrap();
    assert!(matches!(
        verifier.build_validator().validate(&pair.access_token, now),
        Err(AppError::InvalidToken(_))
    ));
}

#[test]
fn test_foreign_issuer_rejected() {
    let theirs = TokenConfig::from_settings(&JwtConfig {
        issuer: "billing-service".to_string(),
        ..settings(SigningAlgorithm::HS512)
    })
    .unwrap();
    let ours = TokenConfig::from_settings(&settings(SigningAlgorithm::HS512)).unwrap();
    let now = Utc::now();

    let pair = theirs.build_issuer().issue_pair(Uuid::new_v4(), now).unwrap();
    assert!(matches!(
        ours.build_validator().validate(&pair.access_token, now),
        Err(AppError::InvalidToken(reason)) if reason == "issuer mismatch"
    ));
}

#[test]
fn test_short_hmac_secret_rejected() {
    let result = TokenConfig::from_settings(&JwtConfig {
        signing_key: "too-short".to_string(),
        ..JwtConfig::default()
    });
    assert!(matches!(result, Err(AppError::Configuration(_))));
}
