use serde::Deserialize;
use thiserror::Error;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// The two issuer strings Google uses for ID tokens.
const ACCEPTED_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Identity claims extracted from a verified Google ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleUser {
    pub email: String,
    pub name: String,
    pub picture: String,
    pub sub: String,
}

#[derive(Debug, Error)]
pub enum GoogleAuthError {
    #[error("provider request failed: {0}")]
    Provider(#[from] reqwest::Error),
    #[error("token rejected by provider")]
    Rejected,
    #[error("wrong audience")]
    WrongAudience,
    #[error("wrong issuer")]
    WrongIssuer,
}

/// Payload of Google's tokeninfo endpoint for a structurally valid token.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    iss: String,
    aud: String,
    sub: String,
    email: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    picture: String,
}

/// Verifies a Google ID token. Signature verification is delegated to the
/// provider's tokeninfo endpoint (checked against Google's own keys); the
/// audience and issuer claims are enforced here.
pub async fn verify_google_token(
    http: &reqwest::Client,
    client_id: &str,
    token: &str,
) -> Result<GoogleUser, GoogleAuthError> {
    let response = http
        .get(TOKENINFO_URL)
        .query(&[("id_token", token)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(GoogleAuthError::Rejected);
    }

    let info: TokenInfo = response.json().await.map_err(GoogleAuthError::Provider)?;
    validate_token_info(info, client_id)
}

fn validate_token_info(info: TokenInfo, client_id: &str) -> Result<GoogleUser, GoogleAuthError> {
    if info.aud != client_id {
        return Err(GoogleAuthError::WrongAudience);
    }
    if !ACCEPTED_ISSUERS.contains(&info.iss.as_str()) {
        return Err(GoogleAuthError::WrongIssuer);
    }
    Ok(GoogleUser {
        email: info.email,
        name: info.name,
        picture: info.picture,
        sub: info.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(iss: &str, aud: &str) -> TokenInfo {
        TokenInfo {
            iss: iss.into(),
            aud: aud.into(),
            sub: "123".into(),
            email: "a@b.com".into(),
            name: "A".into(),
            picture: "http://x/p.png".into(),
        }
    }

    #[test]
    fn accepts_both_google_issuers() {
        for iss in ["accounts.google.com", "https://accounts.google.com"] {
            let user = validate_token_info(info(iss, "client-1"), "client-1").unwrap();
            assert_eq!(user.email, "a@b.com");
            assert_eq!(user.sub, "123");
        }
    }

    #[test]
    fn rejects_foreign_issuer() {
        let result = validate_token_info(info("evil.example.com", "client-1"), "client-1");
        assert!(matches!(result, Err(GoogleAuthError::WrongIssuer)));
    }

    #[test]
    fn rejects_wrong_audience() {
        let result = validate_token_info(info("accounts.google.com", "other"), "client-1");
        assert!(matches!(result, Err(GoogleAuthError::WrongAudience)));
    }

    #[test]
    fn tokeninfo_parses_with_missing_optional_fields() {
        let info: TokenInfo = serde_json::from_str(
            r#"{"iss":"accounts.google.com","aud":"client-1","sub":"123","email":"a@b.com"}"#,
        )
        .unwrap();
        assert_eq!(info.name, "");
        assert_eq!(info.picture, "");
    }
}
