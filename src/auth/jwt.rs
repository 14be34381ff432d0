use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::google::GoogleUser;

/// Validity window for self-issued bearer tokens.
const TOKEN_VALIDITY_DAYS: i64 = 7;

/// Claims carried by a self-issued bearer token. `iat`/`exp` are Unix
/// timestamps in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues an HS256 token over the verified identity claims, valid for
/// seven days from now.
pub fn issue(user: &GoogleUser, secret: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        email: user.email.clone(),
        name: user.name.clone(),
        picture: user.picture.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Verifies signature and expiry. Expiry is strict: a token is rejected
/// from its `exp` instant onwards, with no leeway.
pub fn verify(token: &str, secret: &[u8]) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
    // jsonwebtoken only rejects exp strictly in the past; the exact
    // expiry second must be rejected too.
    if Utc::now().timestamp() >= data.claims.exp {
        return Err(jsonwebtoken::errors::ErrorKind::ExpiredSignature.into());
    }
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret";

    fn user() -> GoogleUser {
        GoogleUser {
            email: "a@b.com".into(),
            name: "A".into(),
            picture: "http://x/p.png".into(),
            sub: "123".into(),
        }
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let token = issue(&user(), SECRET).unwrap();
        let claims = verify(&token, SECRET).unwrap();
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.name, "A");
        assert_eq!(claims.picture, "http://x/p.png");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = issue(&user(), SECRET).unwrap();
        assert!(verify(&token, b"another-secret").is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(verify("not.a.token", SECRET).is_err());
        assert!(verify("", SECRET).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let now = Utc::now();
        let claims = Claims {
            email: "a@b.com".into(),
            name: String::new(),
            picture: String::new(),
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(verify(&token, SECRET).is_err());
    }

    #[test]
    fn verify_rejects_token_at_exact_expiry_second() {
        let now = Utc::now();
        let claims = Claims {
            email: "a@b.com".into(),
            name: String::new(),
            picture: String::new(),
            iat: (now - Duration::days(7)).timestamp(),
            exp: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(verify(&token, SECRET).is_err());
    }
}
