//! In-process stand-in for the attendance backend, used by tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::Value;

#[derive(Clone)]
pub enum MockReply {
    Json(StatusCode, Value),
    Raw(StatusCode, &'static str),
}

impl MockReply {
    pub fn json(status: StatusCode, body: Value) -> Self {
        MockReply::Json(status, body)
    }

    pub fn raw(status: StatusCode, body: &'static str) -> Self {
        MockReply::Raw(status, body)
    }
}

#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

struct MockState {
    replies: HashMap<String, MockReply>,
    hits: Mutex<Vec<Hit>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start(routes: Vec<(&str, MockReply)>) -> Self {
        let state = Arc::new(MockState {
            replies: routes
                .into_iter()
                .map(|(path, reply)| (path.to_string(), reply))
                .collect(),
            hits: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(respond).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.hits.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.hits().into_iter().map(|h| h.path).collect()
    }
}

async fn respond(State(state): State<Arc<MockState>>, uri: Uri, headers: HeaderMap) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.hits.lock().unwrap().push(Hit {
        path: uri.path().to_string(),
        authorization: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
    });

    match state.replies.get(uri.path()) {
        Some(MockReply::Json(status, body)) => (*status, Json(body.clone())).into_response(),
        Some(MockReply::Raw(status, body)) => (*status, *body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A base URL nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
