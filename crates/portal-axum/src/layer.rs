//! Tower middleware enforcing a route policy.
//!
//! [`AccessLayer`] validates the session cookie, asks the [`AccessGuard`]
//! for a decision and either redirects with `303 See Other` or forwards the
//! request with a [`SessionContext`] attached. When validation cleared an
//! unusable session, the response also expires the cookie.
//!
//! ```ignore
//! let workspace = Router::new()
//!     .route("/workspace", get(dashboard))
//!     .route_layer(AccessLayer::new(settings, guard, require_roles(RoleTag::WORKSPACE)));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Response, StatusCode};
use pin_project_lite::pin_project;
use portal_auth_core::AccessGuard;
use portal_types::{AccessDecision, RoutePolicy};
use tower::{Layer, Service};

use crate::context::SessionContext;
use crate::session::SessionSettings;

/// Tower layer that guards routes with a [`RoutePolicy`].
#[derive(Debug, Clone)]
pub struct AccessLayer {
    settings: SessionSettings,
    guard: AccessGuard,
    policy: Arc<RoutePolicy>,
}

impl AccessLayer {
    #[must_use]
    pub fn new(settings: SessionSettings, guard: AccessGuard, policy: RoutePolicy) -> Self {
        Self {
            settings,
            guard,
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }
}

impl<S> Layer<S> for AccessLayer {
    type Service = AccessService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessService {
            inner,
            settings: self.settings.clone(),
            guard: self.guard.clone(),
            policy: self.policy.clone(),
        }
    }
}

/// The access-control service.
#[derive(Debug, Clone)]
pub struct AccessService<S> {
    inner: S,
    settings: SessionSettings,
    guard: AccessGuard,
    policy: Arc<RoutePolicy>,
}

impl<S, ResBody> Service<Request<Body>> for AccessService<S>
where
    S: Service<Request<Body>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ResBody: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = AccessFuture<S::Future, ResBody>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let session = self.settings.session_for(req.headers());
        let result = session.validate();

        let uri = req.uri();
        let current = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
        // Profile data lives on the client, so a denied consumer is sent to
        // the profile route; that page forwards complete profiles onward.
        let decision = self.guard.decide(result.as_ref().ok(), &self.policy, current);
        let set_cookie = session
            .store()
            .backend()
            .set_cookie_header(self.settings.cookie());

        if !decision.is_allowed() {
            tracing::debug!(
                path = current,
                outcome = ?decision.outcome(),
                location = decision.target_path(),
                "Request redirected by access policy"
            );
            return AccessFuture {
                state: FutureState::Redirect {
                    response: Some(redirect_response(&decision, set_cookie)),
                },
            };
        }

        req.extensions_mut()
            .insert(SessionContext::from_validation(result, decision));

        // Call the instance that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        AccessFuture {
            state: FutureState::Calling {
                future: inner.call(req),
                set_cookie,
            },
        }
    }
}

fn redirect_response<ResBody: Default>(
    decision: &AccessDecision,
    set_cookie: Option<HeaderValue>,
) -> Response<ResBody> {
    let mut response = Response::new(ResBody::default());
    *response.status_mut() = StatusCode::SEE_OTHER;

    let location = decision
        .target_path()
        .and_then(|target| HeaderValue::from_str(target).ok());
    match location {
        Some(location) => {
            response.headers_mut().insert(header::LOCATION, location);
        }
        None => {
            tracing::error!(location = decision.target_path(), "Redirect target is not a valid header");
            *response.status_mut() = StatusCode::FORBIDDEN;
        }
    }

    if let Some(cookie) = set_cookie {
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    response
}

pin_project! {
    /// Future for [`AccessService`].
    pub struct AccessFuture<F, ResBody> {
        #[pin]
        state: FutureState<F, ResBody>,
    }
}

pin_project! {
    #[project = FutureStateProj]
    enum FutureState<F, ResBody> {
        Redirect {
            response: Option<Response<ResBody>>,
        },
        Calling {
            #[pin]
            future: F,
            set_cookie: Option<HeaderValue>,
        },
    }
}

impl<F, ResBody, E> Future for AccessFuture<F, ResBody>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project().state.project() {
            FutureStateProj::Redirect { response } => {
                Poll::Ready(Ok(response.take().expect("polled after completion")))
            }
            FutureStateProj::Calling { future, set_cookie } => {
                let mut response = ready!(future.poll(cx))?;
                if let Some(cookie) = set_cookie.take() {
                    response.headers_mut().append(header::SET_COOKIE, cookie);
                }
                Poll::Ready(Ok(response))
            }
        }
    }
}
