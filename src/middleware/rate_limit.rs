use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue, RETRY_AFTER},
    Error, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::{
    collections::HashMap,
    future::{ready, Ready},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

struct Window {
    count: u32,
    started: Instant,
}

struct Clients {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Fixed-window request counter keyed by client address
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<Clients>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(Clients {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .windows
            .len()
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        let window = self.window;

        // Expired entries are dropped at most once per window
        if now.saturating_duration_since(clients.last_sweep) >= window {
            clients
                .windows
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
            clients.last_sweep = now;
        }

        let entry = clients.windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });
        if now.saturating_duration_since(entry.started) >= window {
            entry.count = 0;
            entry.started = now;
        }

        if entry.count >= self.max_requests {
            let elapsed = now.saturating_duration_since(entry.started);
            return Decision::Limited {
                retry_after: window.saturating_sub(elapsed),
            };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }
}

pub struct RateLimit {
    limiter: Arc<RateLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let remaining = match self.limiter.check(&key) {
            Decision::Allowed { remaining } => remaining,
            Decision::Limited { retry_after } => {
                log::warn!("⚠️  Rate limit exceeded for {} on {}", key, req.path());

                let secs = (retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0)).max(1);
                let response = HttpResponse::TooManyRequests()
                    .insert_header((RETRY_AFTER, secs.to_string()))
                    .json(serde_json::json!({
                        "err": "Too many requests, please try again later."
                    }));

                let res = req.into_response(response).map_into_right_body();
                return Box::pin(async move { Ok(res) });
            }
        };

        let limit = self.limiter.max_requests();
        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;

            let headers = res.headers_mut();
            headers.insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(limit),
            );
            headers.insert(
                HeaderName::from_static("x-ratelimit-remaining"),
                HeaderValue::from(remaining),
            );

            Ok(res.map_into_left_body())
        })
    }
}
