//! Bearer-token authentication, enforced only when running in
//! production (spec §7 / the Python original's `require_api_key`,
//! which only checks the header outside of local development).

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use assistsupport_core::Error;

use crate::state::AppState;
use crate::ServerError;

pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let (is_production, expected_key) = {
        let config = state.get_config();
        (config.environment.is_production(), config.server.auth.api_key.clone())
    };

    if !is_production {
        return Ok(next.run(req).await);
    }

    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected_key => Ok(next.run(req).await),
        _ => Err(Error::Unauthenticated.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use assistsupport_config::RuntimeEnvironment;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::Method;
    use std::net::SocketAddr;
    use tower::ServiceExt;

    fn get(uri: &str) -> Request {
        let mut req = Request::builder().method(Method::GET).uri(uri).body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 0))));
        req
    }

    #[tokio::test]
    async fn development_requests_skip_the_auth_check() {
        let state = test_state(RuntimeEnvironment::Development, "secret");
        let router = crate::http::create_router(state);

        let response = router.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn production_rejects_requests_without_a_bearer_token() {
        let state = test_state(RuntimeEnvironment::Production, "secret");
        let router = crate::http::create_router(state);

        let response = router.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn production_accepts_the_configured_bearer_token() {
        let state = test_state(RuntimeEnvironment::Production, "secret");
        let router = crate::http::create_router(state);

        let mut req = get("/health");
        req.headers_mut().insert(AUTHORIZATION, "Bearer secret".parse().unwrap());
        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
