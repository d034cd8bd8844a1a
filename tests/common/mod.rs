//! In-memory stand-ins for the cloud clients.

#![allow(dead_code, clippy::panic)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use cloud_fanout_gateway::api;
use cloud_fanout_gateway::app_state::{AppState, ResourceTargets};
use cloud_fanout_gateway::clients::{
    Analytics, ClientRegistry, DatabaseAdmin, DatabaseInfo, JobError, JobReference, JobStatus,
    Page, QueryRequest, Row, TextTranslator, TranslateRequest, Translation, Transport,
};
use cloud_fanout_gateway::error::GatewayError;
use cloud_fanout_gateway::service::passthrough::QueryStage;

pub const INSTANCE: &str = "projects/demo/instances/test-instance";
pub const TRANSLATE_PARENT: &str = "projects/demo/locations/us-central1";

/// Translates to `<lang>(<text>)`; sentences in `failing` are rejected.
#[derive(Debug)]
pub struct FakeTranslator {
    transport: Transport,
    failing: HashSet<String>,
    pub requests: Mutex<Vec<TranslateRequest>>,
}

impl FakeTranslator {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            failing: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(transport: Transport, sentences: &[&str]) -> Self {
        Self {
            failing: sentences.iter().map(|s| (*s).to_string()).collect(),
            ..Self::new(transport)
        }
    }

    pub fn recorded(&self) -> Vec<TranslateRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TextTranslator for FakeTranslator {
    async fn translate_text(
        &self,
        request: TranslateRequest,
    ) -> Result<Vec<Translation>, GatewayError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let text = request.contents.join(" ");
        if self.failing.contains(&text) {
            return Err(GatewayError::Api {
                status: 400,
                message: format!("cannot translate {text}"),
            });
        }
        Ok(request
            .contents
            .iter()
            .map(|c| Translation {
                translated_text: format!("{}({c})", request.target_language_code),
                detected_language_code: Some("en".to_string()),
            })
            .collect())
    }

    fn transport(&self) -> Transport {
        self.transport
    }
}

/// Serves scripted pages of databases in order.
#[derive(Debug, Default)]
pub struct FakeAdmin {
    pages: Mutex<VecDeque<Result<Page<DatabaseInfo>, GatewayError>>>,
    pub calls: AtomicUsize,
}

impl FakeAdmin {
    pub fn with_pages(pages: Vec<Result<Page<DatabaseInfo>, GatewayError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

pub fn databases(names: &[&str], next: Option<&str>) -> Page<DatabaseInfo> {
    Page::new(
        names
            .iter()
            .map(|n| DatabaseInfo {
                name: format!("{INSTANCE}/databases/{n}"),
            })
            .collect(),
        next.map(str::to_string),
    )
}

#[async_trait]
impl DatabaseAdmin for FakeAdmin {
    async fn list_databases_page(
        &self,
        parent: &str,
        _page_token: Option<String>,
    ) -> Result<Page<DatabaseInfo>, GatewayError> {
        assert_eq!(parent, INSTANCE);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(Page::last(Vec::new())))
    }
}

/// Query job that fails at `fail_at`, otherwise returns `pages` of rows.
#[derive(Debug, Default)]
pub struct FakeAnalytics {
    pub fail_at: Option<QueryStage>,
    pub pages: Vec<Vec<Row>>,
    pub run_calls: AtomicUsize,
    pub wait_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
}

impl FakeAnalytics {
    pub fn failing_at(stage: QueryStage) -> Self {
        Self {
            fail_at: Some(stage),
            pages: vec![vec![vec![serde_json::json!("unread")]]],
            ..Self::default()
        }
    }
}

#[async_trait]
impl Analytics for FakeAnalytics {
    async fn run_query(&self, request: &QueryRequest) -> Result<JobReference, GatewayError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(request.location, "US");
        if self.fail_at == Some(QueryStage::Run) {
            return Err(GatewayError::Api {
                status: 403,
                message: "Access Denied".to_string(),
            });
        }
        Ok(JobReference {
            project_id: "demo".to_string(),
            job_id: "job_1".to_string(),
            location: request.location.clone(),
        })
    }

    async fn wait_for_job(&self, _job: &JobReference) -> Result<JobStatus, GatewayError> {
        self.wait_calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_at {
            Some(QueryStage::Wait) => Err(GatewayError::Api {
                status: 503,
                message: "backend unavailable".to_string(),
            }),
            Some(QueryStage::Status) => Ok(JobStatus {
                state: "DONE".to_string(),
                error: Some(JobError {
                    reason: "invalidQuery".to_string(),
                    message: "Unrecognized name: rank".to_string(),
                }),
            }),
            _ => Ok(JobStatus {
                state: "DONE".to_string(),
                error: None,
            }),
        }
    }

    async fn read_rows_page(
        &self,
        _job: &JobReference,
        page_token: Option<String>,
    ) -> Result<Page<Row>, GatewayError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let index: usize = page_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        if self.fail_at == Some(QueryStage::Read) && index > 0 {
            return Err(GatewayError::InvalidResponse("page expired".to_string()));
        }
        let rows = self.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(Page::new(rows, next))
    }
}

/// Handles to the fakes behind a router.
pub struct Harness {
    pub admin: Arc<FakeAdmin>,
    pub analytics: Arc<FakeAnalytics>,
    pub grpc: Arc<FakeTranslator>,
    pub rest: Arc<FakeTranslator>,
    pub state: AppState,
    pub app: Router,
}

impl Harness {
    pub fn new(
        admin: FakeAdmin,
        analytics: FakeAnalytics,
        grpc: FakeTranslator,
        rest: FakeTranslator,
    ) -> Self {
        let admin = Arc::new(admin);
        let analytics = Arc::new(analytics);
        let grpc = Arc::new(grpc);
        let rest = Arc::new(rest);
        let clients = ClientRegistry::new(
            Arc::clone(&admin) as Arc<dyn DatabaseAdmin>,
            Arc::clone(&analytics) as Arc<dyn Analytics>,
            Arc::clone(&grpc) as Arc<dyn TextTranslator>,
            Arc::clone(&rest) as Arc<dyn TextTranslator>,
        );
        let targets = ResourceTargets {
            spanner_instance: INSTANCE.to_string(),
            translate_parent: TRANSLATE_PARENT.to_string(),
            bigquery_location: "US".to_string(),
        };
        let state = AppState::new(clients, targets);
        Self {
            admin,
            analytics,
            grpc,
            rest,
            app: api::app(state.clone()),
            state,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            FakeAdmin::default(),
            FakeAnalytics::default(),
            FakeTranslator::new(Transport::Grpc),
            FakeTranslator::new(Transport::Rest),
        )
    }

    /// Sends one request and returns the status and body text.
    pub async fn call(&self, method: &str, path: &str) -> (StatusCode, String) {
        let Ok(request) = Request::builder().method(method).uri(path).body(Body::empty()) else {
            panic!("valid request");
        };
        let Ok(response) = self.app.clone().oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body must be readable");
        };
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        self.call("GET", path).await
    }
}
