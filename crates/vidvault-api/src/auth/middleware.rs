use crate::auth::jwt::JwtService;
use crate::auth::models::UserContext;
use crate::constants::ACCESS_TOKEN_QUERY_PARAM;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use vidvault_core::AppError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
}

/// Bearer token from the Authorization header, or from `?access_token=` on GET.
fn extract_token(request: &Request) -> Result<String, AppError> {
    if let Some(auth_header) = request.headers().get("Authorization") {
        let value = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;
        return value
            .strip_prefix("Bearer ")
            .map(|token| token.trim().to_string())
            .ok_or_else(|| {
                AppError::Unauthorized(
                    "Invalid authorization header format. Expected: Bearer <token>".to_string(),
                )
            });
    }

    if request.method() == Method::GET {
        if let Some(token) = request.uri().query().and_then(query_access_token) {
            return Ok(token);
        }
    }

    Err(AppError::Unauthorized(
        "Missing authorization header".to_string(),
    ))
}

fn query_access_token(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == ACCESS_TOKEN_QUERY_PARAM)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|token| token.into_owned())
        .filter(|token| !token.is_empty())
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(&request) {
        Ok(token) => token,
        Err(e) => return HttpAppError(e).into_response(),
    };

    let claims = match auth_state.jwt.validate(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            return HttpAppError(e).into_response();
        }
    };

    tracing::debug!(user_id = %claims.sub, "Authenticated request");

    request.extensions_mut().insert(UserContext::from(claims));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(method: Method, uri: &str, auth: Option<&str>) -> Request {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_header() {
        let req = request(Method::POST, "/finalize_upload", Some("Bearer abc.def.ghi"));
        assert_eq!(extract_token(&req).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_non_bearer_scheme_is_rejected() {
        let req = request(Method::GET, "/api/library", Some("Basic dXNlcjpwdw=="));
        assert!(matches!(
            extract_token(&req),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_query_token_only_on_get() {
        let get = request(Method::GET, "/stream/movie/1?foo=1&access_token=abc.def", None);
        assert_eq!(extract_token(&get).unwrap(), "abc.def");

        let post = request(Method::POST, "/delete/movie/1?access_token=abc.def", None);
        assert!(extract_token(&post).is_err());
    }

    #[test]
    fn test_missing_token() {
        let req = request(Method::GET, "/api/library?access_token=", None);
        assert!(extract_token(&req).is_err());
    }
}
