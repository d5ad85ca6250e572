//! Per-caller request rate limiting (spec §5 / the Python original's
//! "100 requests per minute" flask-limiter rule), keyed by the caller's
//! IP address using `governor`'s in-memory keyed limiter. Only the
//! `memory://` backend is implemented; `RateLimitConfig::storage_uri`
//! exists so a future distributed backend (Redis) has somewhere to
//! plug in, but production deployments must still set a non-default
//! URI per `Settings::validate`.

use std::net::IpAddr;
use std::num::NonZeroU32;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use governor::{DefaultKeyedRateLimiter, Quota};

use assistsupport_config::RateLimitConfig;
use assistsupport_core::Error;

use crate::state::AppState;
use crate::ServerError;

#[derive(thiserror::Error, Debug)]
pub enum RateLimitError {
    #[error("rate limit exceeded")]
    Exceeded,
}

pub struct RateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let per_minute = NonZeroU32::new(config.requests_per_minute.max(1)).unwrap();
        Self {
            limiter: DefaultKeyedRateLimiter::keyed(Quota::per_minute(per_minute)),
        }
    }

    pub fn check(&self, caller: IpAddr) -> Result<(), RateLimitError> {
        self.limiter.check_key(&caller).map_err(|_| RateLimitError::Exceeded)
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if !state.get_config().server.rate_limit.enabled {
        return Ok(next.run(req).await);
    }

    state
        .rate_limiter
        .check(addr.ip())
        .map_err(|_| Error::RateLimited)?;

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_requests_within_quota_and_rejects_beyond_it() {
        let config = RateLimitConfig {
            enabled: true,
            requests_per_minute: 2,
            storage_uri: "memory://".into(),
        };
        let limiter = RateLimiter::new(&config);
        let caller: IpAddr = "127.0.0.1".parse().unwrap();

        assert!(limiter.check(caller).is_ok());
        assert!(limiter.check(caller).is_ok());
        assert!(limiter.check(caller).is_err());
    }

    #[test]
    fn tracks_callers_independently() {
        let config = RateLimitConfig {
            enabled: true,
            requests_per_minute: 1,
            storage_uri: "memory://".into(),
        };
        let limiter = RateLimiter::new(&config);
        let a: IpAddr = "127.0.0.1".parse().unwrap();
        let b: IpAddr = "127.0.0.2".parse().unwrap();

        assert!(limiter.check(a).is_ok());
        assert!(limiter.check(a).is_err());
        assert!(limiter.check(b).is_ok());
    }
}
