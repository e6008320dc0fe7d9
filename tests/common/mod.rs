#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;

use link_shortener::application::services::auth_service::hash_token;
use link_shortener::application::services::{AuthService, RateLimitPolicy};
use link_shortener::infrastructure::persistence::InMemoryStore;
use link_shortener::routes::app_routes;
use link_shortener::state::AppState;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const BASE_URL: &str = "https://s.example.com";

pub fn admin_bearer() -> String {
    format!("Bearer {ADMIN_TOKEN}")
}

pub fn create_test_state(store: Arc<InMemoryStore>) -> AppState {
    create_test_state_with_policy(store, RateLimitPolicy::default())
}

pub fn create_test_state_with_policy(store: Arc<InMemoryStore>, policy: RateLimitPolicy) -> AppState {
    let auth_service = AuthService::new(
        SIGNING_SECRET.to_string(),
        &hash_token(SIGNING_SECRET, ADMIN_TOKEN),
    )
    .unwrap();

    AppState::new(store.clone(), store, auth_service, policy, 20)
        .with_public_base_url(Some(BASE_URL.to_string()))
}

/// Full application router over a fresh in-memory store.
pub fn make_server() -> (TestServer, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let server = server_for(create_test_state(store.clone()));
    (server, store)
}

pub fn server_for(state: AppState) -> TestServer {
    let app = app_routes(state, false).layer(MockConnectInfoLayer);
    TestServer::new(app).unwrap()
}

/// Inserts the peer address the per-IP throttle keys on.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
