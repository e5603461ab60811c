use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::services::token_service;

/// Routes reachable without a token. Everything else goes through
/// signature verification and gets `Claims` attached to the request.
pub fn is_public(method: &Method, path: &str) -> bool {
    match *method {
        Method::GET => {
            if path == "/"
                || path == "/health"
                || path.starts_with("/swagger-ui")
                || path.starts_with("/api-docs")
            {
                return true;
            }
            // Catalog reads are public, request/serve/admin listings are not
            if path == "/meals" || path.starts_with("/meals/") {
                return !matches!(path, "/meals/request" | "/meals/serve" | "/meals/admin");
            }
            false
        }
        Method::POST => path == "/jwt" || path == "/users",
        _ => false,
    }
}

/// Bearer header takes precedence over the `token` cookie.
pub fn extract_token(auth_header: Option<&str>, cookie: Option<&str>) -> Option<String> {
    if let Some(header) = auth_header {
        if let Some(token) = header.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
        return None;
    }
    cookie.filter(|t| !t.is_empty()).map(String::from)
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res)
            });
        }

        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let cookie = req.cookie("token").map(|c| c.value().to_string());

        let token = match extract_token(auth_header.as_deref(), cookie.as_deref()) {
            Some(token) => token,
            None => {
                return Box::pin(async move {
                    Err(actix_web::error::ErrorUnauthorized("unauthorized access"))
                });
            }
        };

        match token_service::verify_token(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(e) => {
                log::warn!("⚠️ Token verification failed: {}", e);
                Box::pin(async move {
                    Err(actix_web::error::ErrorUnauthorized("unauthorized access"))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes() {
        assert!(is_public(&Method::GET, "/"));
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::POST, "/jwt"));
        assert!(is_public(&Method::POST, "/users"));
        assert!(is_public(&Method::GET, "/meals"));
        assert!(is_public(&Method::GET, "/meals/65a1b2c3d4e5f6a7b8c9d0e1"));
        assert!(is_public(&Method::GET, "/meals/category/Lunch"));
        assert!(is_public(&Method::GET, "/meals/upcoming"));
    }

    #[test]
    fn test_protected_routes() {
        assert!(!is_public(&Method::GET, "/meals/request"));
        assert!(!is_public(&Method::GET, "/meals/serve"));
        assert!(!is_public(&Method::GET, "/meals/admin"));
        assert!(!is_public(&Method::GET, "/users"));
        assert!(!is_public(&Method::GET, "/users/profile"));
        assert!(!is_public(&Method::GET, "/payment/history"));
        assert!(!is_public(&Method::POST, "/meals"));
        assert!(!is_public(&Method::PUT, "/meals/123/like"));
        assert!(!is_public(&Method::DELETE, "/meals/123"));
        assert!(!is_public(&Method::POST, "/payments"));
    }

    #[test]
    fn test_extract_token_prefers_bearer_header() {
        assert_eq!(
            extract_token(Some("Bearer abc123"), Some("cookie-token")),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_token(None, Some("cookie-token")),
            Some("cookie-token".to_string())
        );
        assert_eq!(extract_token(None, None), None);
    }

    #[test]
    fn test_extract_token_rejects_malformed_header() {
        // A malformed header is not silently replaced by the cookie
        assert_eq!(extract_token(Some("abc123"), Some("cookie-token")), None);
        assert_eq!(extract_token(Some("Bearer "), None), None);
    }
}
