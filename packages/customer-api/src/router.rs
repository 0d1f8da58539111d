//! Matchit routing configuration.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use matchit::Router as MatchitRouter;
use thiserror::Error;

use crate::handlers;
use customer_core::{config::ServiceConfig, CustomerStore, StoreError};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Customer record store
    pub store: Arc<CustomerStore>,
    /// Service configuration
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(store: CustomerStore, config: ServiceConfig) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a new router with the customer routes.
    ///
    /// # Errors
    /// Returns the matchit insert error if a route pattern conflicts.
    pub fn new(state: AppState) -> Result<Self, matchit::InsertError> {
        let mut router = MatchitRouter::new();

        router.insert("/", RouteHandler::Welcome)?;
        router.insert("/customers", RouteHandler::Customers)?;
        router.insert("/customers/{id}", RouteHandler::Customer)?;

        Ok(Self {
            inner: router,
            state,
        })
    }

    /// Returns the shared state handed to every handler.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Routes an incoming request to the appropriate handler.
    ///
    /// # Returns
    /// `Result<Response<Bytes>, RouterError>` containing the response or an error.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<Bytes>, RouterError>
    where
        B: Body,
        B::Error: Display,
    {
        let path = req.uri().path().to_string();

        let (handler, segment) = match self.inner.at(&path) {
            Ok(matched) => (
                *matched.value,
                matched.params.get("id").map(str::to_string),
            ),
            Err(_) => return Err(RouterError::NotFound),
        };

        handler
            .handle(req, &path, segment.as_deref(), self.state.clone())
            .await
    }

    /// Routes a request and renders any error as its HTTP response.
    pub async fn respond<B>(&self, req: Request<B>) -> Response<Bytes>
    where
        B: Body,
        B::Error: Display,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let started = Instant::now();

        let response = match self.route(req).await {
            Ok(response) => response,
            Err(err) => {
                if let RouterError::InternalError(msg) = &err {
                    tracing::error!(%method, %path, "internal error: {}", msg);
                }
                Response::from(err)
            }
        };

        tracing::debug!(
            %method,
            %path,
            status = response.status().as_u16(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "request handled"
        );
        response
    }
}

/// Route handler function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteHandler {
    Welcome,
    Customers,
    Customer,
}

impl RouteHandler {
    /// Handles a request with the given route parameters.
    async fn handle<B>(
        &self,
        req: Request<B>,
        path: &str,
        segment: Option<&str>,
        state: AppState,
    ) -> Result<Response<Bytes>, RouterError>
    where
        B: Body,
        B::Error: Display,
    {
        let method = req.method().clone();
        match (self, segment) {
            (RouteHandler::Welcome, _) if method == Method::GET => handlers::welcome(),
            (RouteHandler::Customers, _) if method == Method::GET => {
                handlers::list_customers(state)
            }
            (RouteHandler::Customers, _) if method == Method::POST => {
                handlers::create_customer(req, state).await
            }
            (RouteHandler::Customer, Some(segment)) if method == Method::GET => {
                handlers::read_customer(segment, state)
            }
            (RouteHandler::Customer, Some(segment)) if method == Method::PUT => {
                handlers::update_customer(req, segment, state).await
            }
            (RouteHandler::Customer, Some(segment)) if method == Method::DELETE => {
                handlers::delete_customer(segment, state)
            }
            (RouteHandler::Customer, None) => Err(RouterError::NotFound),
            _ => {
                tracing::warn!(%method, %path, "unsupported method");
                Err(RouterError::MethodNotAllowed)
            }
        }
    }
}

/// Router error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Request Timeout")]
    Timeout,
    #[error("Response deadline exceeded")]
    DeadlineExceeded,
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl From<StoreError> for RouterError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CustomerNotFound { .. } => RouterError::NotFound,
            StoreError::DuplicateId { .. } | StoreError::LockPoisoned => {
                RouterError::InternalError(format!("Store error: {}", err))
            }
        }
    }
}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let (status, message) = match &err {
            RouterError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, None),
            RouterError::NotFound => (StatusCode::NOT_FOUND, None),
            RouterError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Some(msg.as_str())),
            RouterError::Timeout => (StatusCode::REQUEST_TIMEOUT, Some("request timeout")),
            RouterError::DeadlineExceeded => (
                StatusCode::SERVICE_UNAVAILABLE,
                Some("response deadline exceeded"),
            ),
            RouterError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some("internal server error"))
            }
        };

        let mut response = match message {
            Some(message) => {
                let mut response = Response::new(Bytes::from(format!("{}\n", message)));
                response.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                response
            }
            None => Response::new(Bytes::new()),
        };
        *response.status_mut() = status;
        response
    }
}
