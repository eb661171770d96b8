// Token exchanges against the DHL Parcel auth endpoints

use serde::Serialize;

use super::transport::AuthTransport;
use super::types::{ApiKeyRequest, RawResponse, RefreshTokenRequest, TokenBundle};
use crate::error::AuthError;

/// Exchange user id + key for a brand-new token pair
pub async fn full_authentication(
    transport: &dyn AuthTransport,
    url: &str,
    user_id: &str,
    key: &str,
) -> Result<TokenBundle, AuthError> {
    tracing::info!("Requesting new DHL Parcel tokens for user {}", user_id);

    let request = ApiKeyRequest { user_id, key };
    let response = post(transport, url, &request).await?;
    let bundle = parse_exchange_response(response)?;

    tracing::info!(
        "Authenticated user {}, access token expires at {}",
        user_id,
        bundle.access_token_expiration
    );
    Ok(bundle)
}

/// Exchange a refresh token for a new token pair
pub async fn refresh_exchange(
    transport: &dyn AuthTransport,
    url: &str,
    refresh_token: &str,
) -> Result<TokenBundle, AuthError> {
    tracing::info!("Refreshing DHL Parcel tokens via refresh token...");

    let request = RefreshTokenRequest { refresh_token };
    let response = post(transport, url, &request).await?;
    let bundle = parse_exchange_response(response)?;

    tracing::info!(
        "Tokens refreshed, access token expires at {}",
        bundle.access_token_expiration
    );
    Ok(bundle)
}

async fn post<T: Serialize>(
    transport: &dyn AuthTransport,
    url: &str,
    request: &T,
) -> Result<RawResponse, AuthError> {
    let body = serde_json::to_value(request)
        .map_err(|e| AuthError::Transport(anyhow::Error::new(e)))?;
    transport
        .post_json(url, &body)
        .await
        .map_err(AuthError::Transport)
}

/// Map an exchange response onto a bundle or the matching error
pub fn parse_exchange_response(response: RawResponse) -> Result<TokenBundle, AuthError> {
    let RawResponse { status, body } = response;

    if status == 401 {
        tracing::error!("Authentication rejected with 401 Unauthorized");
        return Err(AuthError::InvalidCredentials);
    }

    if !(200..300).contains(&status) {
        tracing::error!(
            "Authentication failed: status={}, body={}",
            status,
            body
        );
        return Err(AuthError::AuthenticationFailed { status, body });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Failed to parse authentication response: {}", e);
        AuthError::MalformedAuthResponse(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_parse_success() {
        let bundle = parse_exchange_response(response(
            200,
            r#"{"accessToken":"A","accessTokenExpiration":10,"refreshToken":"R","refreshTokenExpiration":20}"#,
        ))
        .unwrap();
        assert_eq!(bundle.access_token, "A");
        assert_eq!(bundle.refresh_token_expiration, 20);
    }

    #[test]
    fn test_parse_unauthorized() {
        let err = parse_exchange_response(response(401, "")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_parse_other_failure_keeps_body() {
        let err = parse_exchange_response(response(503, "upstream down")).unwrap_err();
        match err {
            AuthError::AuthenticationFailed { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_failure_status_wins_over_bad_json() {
        let err = parse_exchange_response(response(400, "<html>bad request</html>")).unwrap_err();
        assert!(matches!(err, AuthError::AuthenticationFailed { status: 400, .. }));
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_exchange_response(response(200, "not json")).unwrap_err();
        assert!(matches!(err, AuthError::MalformedAuthResponse(_)));

        let err = parse_exchange_response(response(200, r#"{"accessToken":"A"}"#)).unwrap_err();
        assert!(matches!(err, AuthError::MalformedAuthResponse(_)));
    }
}
