use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;

use crate::models::account::Role;
use crate::services::account::AccountService;
use crate::AppState;

/// The resolved caller identity, inserted by `require_basic_auth` and read by
/// every authenticated handler.
#[derive(Debug, Clone)]
pub struct Caller {
    pub username: String,
    pub roles: Vec<Role>,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

fn parse_basic(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Resolve `Authorization: Basic` to an account and verify the credential.
/// Unknown username and wrong password produce the identical response.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let uri = req.uri().path().to_string();

    let credentials = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic);

    let Some((username, password)) = credentials else {
        tracing::warn!(
            method = %method,
            uri = %uri,
            "Auth middleware: rejected — missing or malformed Authorization header"
        );
        return (StatusCode::UNAUTHORIZED, "Missing credentials").into_response();
    };

    let account = match state.accounts.find_by_username(&username).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            tracing::warn!(
                method = %method,
                uri = %uri,
                username = %username,
                "Auth middleware: rejected — unknown account"
            );
            return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
        }
        Err(e) => return e.into_response(),
    };

    if !AccountService::verify_password(&account, &password) {
        tracing::warn!(
            method = %method,
            uri = %uri,
            username = %username,
            "Auth middleware: rejected — bad credential"
        );
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    }

    tracing::debug!(
        username = %account.username,
        method = %method,
        uri = %uri,
        "Auth middleware: credential verified, forwarding to handler"
    );
    req.extensions_mut().insert(Caller {
        username: account.username,
        roles: account.roles,
    });
    next.run(req).await
}

/// Layered inside `require_basic_auth`; requires the ADMIN role.
pub async fn require_admin(req: Request, next: Next) -> Response {
    let caller = req.extensions().get::<Caller>().cloned();
    match caller {
        Some(caller) if caller.is_admin() => next.run(req).await,
        Some(caller) => {
            tracing::warn!(
                username = %caller.username,
                uri = %req.uri().path(),
                "Admin guard: rejected — caller lacks ADMIN role"
            );
            (StatusCode::FORBIDDEN, "Admin role required").into_response()
        }
        None => (StatusCode::UNAUTHORIZED, "Missing credentials").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_basic_credentials() {
        // base64("alice:secret")
        let parsed = parse_basic("Basic YWxpY2U6c2VjcmV0").unwrap();
        assert_eq!(parsed, ("alice".to_string(), "secret".to_string()));
    }

    #[test]
    fn password_may_contain_colons() {
        // base64("alice:a:b:c")
        let parsed = parse_basic("Basic YWxpY2U6YTpiOmM=").unwrap();
        assert_eq!(parsed, ("alice".to_string(), "a:b:c".to_string()));
    }

    #[test]
    fn rejects_other_schemes_and_bad_base64() {
        assert!(parse_basic("Bearer abc").is_none());
        assert!(parse_basic("Basic !!!").is_none());
    }
}
