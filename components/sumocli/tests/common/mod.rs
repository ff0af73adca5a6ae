//! Fake Sumo Logic API served on a loopback port. Routes answer with canned
//! status/body pairs and every request is recorded for later assertions.
#![allow(dead_code)]

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{
    Method, Request, Response, StatusCode,
    body::Incoming,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    service::service_fn,
};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder as HyperServerBuilder,
};
use std::{
    collections::HashMap,
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use sumocli::{Config, SumoApiClient, helpers::load_config::Credentials};
use tokio::net::TcpListener;

pub const ACCESS_ID: &str = "suABCDEF";
pub const ACCESS_KEY: &str = "secretkey";
/// base64 of `suABCDEF:secretkey`
pub const BASIC_AUTH: &str = "Basic c3VBQkNERUY6c2VjcmV0a2V5";
pub const ORG_ID: &str = "0000000000ABCDEF";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub extra: HashMap<String, String>,
    pub body: String,
}

#[derive(Default)]
struct State {
    routes: HashMap<(Method, String), (StatusCode, String)>,
    requests: Vec<RecordedRequest>,
}

pub struct FakeSumoApi {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
}

impl FakeSumoApi {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(State::default()));

        let server_state = state.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let io = TokioIo::new(stream);
                let state = server_state.clone();
                let service = service_fn(move |req: Request<Incoming>| handle(state.clone(), req));

                tokio::spawn(async move {
                    let _ = HyperServerBuilder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await;
                });
            }
        });

        Self { addr, state }
    }

    /// Answer `method /api<path>` with `status` and `body`
    pub fn route(&self, method: Method, path: &str, status: StatusCode, body: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert((method, format!("/api{path}")), (status, body.into()));
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn client(&self) -> SumoApiClient {
        SumoApiClient::with_base_url(ACCESS_ID, ACCESS_KEY, &self.base_url()).unwrap()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// `(method, path)` of every request received so far
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }
}

async fn handle(
    state: Arc<Mutex<State>>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => Bytes::new(),
    };

    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let extra = parts
        .headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-"))
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();

    let recorded = RecordedRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: header(AUTHORIZATION.as_str()),
        content_type: header(CONTENT_TYPE.as_str()),
        accept: header(ACCEPT.as_str()),
        extra,
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (status, body) = {
        let mut state = state.lock().unwrap();
        state.requests.push(recorded);
        state
            .routes
            .get(&(parts.method.clone(), parts.uri.path().to_string()))
            .cloned()
            .unwrap_or((
                StatusCode::NOT_FOUND,
                r#"{"status":404,"code":"not.found","message":"Not Found"}"#.to_string(),
            ))
    };

    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap())
}

/// Cmdlet configuration pointing backups at `backup_dir`
pub fn config(backup_dir: PathBuf, parent_id: &str, myself_id: &str) -> Config {
    Config {
        credentials: Credentials {
            access_id: ACCESS_ID.to_string(),
            access_key: ACCESS_KEY.to_string(),
        },
        deployment: "us2".to_string(),
        org_id: ORG_ID.to_string(),
        tag: Some(format!("us2_{ORG_ID}")),
        endpoint: "us2".to_string(),
        myself_id: myself_id.to_string(),
        parent_id: parent_id.to_string(),
        backup_dir,
    }
}
