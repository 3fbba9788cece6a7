//! Fakes for the worker's seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, Url, header};

use foliocache_core::{
    AppConfig, CacheDb, CacheStorage, Error, NotificationOptions, RequestDescriptor, ResponseType, ShownNotification,
    StoredResponse, WindowClient,
};

use super::{Worker, WorkerConfig};
use crate::fetch::{FetchResponse, Network};
use crate::host::{SessionHost, WorkerHost};

pub(crate) const ORIGIN: &str = "https://yourportfolio.com";

pub(crate) fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

#[derive(Clone)]
enum Route {
    Respond { status: u16, response_type: ResponseType, body: String, final_url: Option<String> },
    Fail,
    Timeout,
    Reject,
}

/// Scripted network. Unknown URLs fail like an offline connection.
#[derive(Default)]
pub(crate) struct FakeNetwork {
    routes: Mutex<HashMap<String, Route>>,
    calls: AtomicUsize,
}

impl FakeNetwork {
    pub(crate) fn respond(&self, url: &str, status: u16, body: &str) {
        self.respond_typed(url, status, ResponseType::Basic, body);
    }

    pub(crate) fn respond_typed(&self, url: &str, status: u16, response_type: ResponseType, body: &str) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Route::Respond { status, response_type, body: body.to_string(), final_url: None },
        );
    }

    pub(crate) fn redirect(&self, url: &str, final_url: &str, body: &str) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Route::Respond {
                status: 200,
                response_type: ResponseType::Basic,
                body: body.to_string(),
                final_url: Some(final_url.to_string()),
            },
        );
    }

    pub(crate) fn fail(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Fail);
    }

    /// Fail like a request that exceeded the configured timeout.
    pub(crate) fn time_out(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Timeout);
    }

    /// Refuse the request before it is sent.
    pub(crate) fn reject(&self, url: &str) {
        self.routes.lock().unwrap().insert(url.to_string(), Route::Reject);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<FetchResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let route = self.routes.lock().unwrap().get(&request.url).cloned();
        match route {
            Some(Route::Respond { status, response_type, body, final_url }) => {
                let requested = Url::parse(&request.url).unwrap();
                let final_url = final_url.map(|u| Url::parse(&u).unwrap()).unwrap_or_else(|| requested.clone());
                let mut headers = header::HeaderMap::new();
                headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/html"));
                Ok(FetchResponse {
                    url: requested,
                    final_url,
                    status: StatusCode::from_u16(status).unwrap(),
                    response_type,
                    headers,
                    bytes: Bytes::from(body),
                    fetch_ms: 1,
                })
            }
            Some(Route::Timeout) => Err(Error::FetchTimeout(format!("{} after 5000ms", request.url))),
            Some(Route::Reject) => Err(Error::InvalidInput(format!("invalid method: {}", request.method))),
            Some(Route::Fail) | None => Err(Error::Network(format!("offline: {}", request.url))),
        }
    }
}

/// In-memory store that counts lookups and writes and can be told to fail.
pub(crate) struct CountingStorage {
    inner: CacheDb,
    matches: AtomicUsize,
    puts: AtomicUsize,
    pub(crate) fail_open: AtomicBool,
    pub(crate) fail_put: AtomicBool,
    pub(crate) fail_match: AtomicBool,
}

impl CountingStorage {
    pub(crate) async fn new() -> Self {
        Self {
            inner: CacheDb::open_in_memory().await.unwrap(),
            matches: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            fail_open: AtomicBool::new(false),
            fail_put: AtomicBool::new(false),
            fail_match: AtomicBool::new(false),
        }
    }

    pub(crate) fn matches(&self) -> usize {
        self.matches.load(Ordering::SeqCst)
    }

    pub(crate) fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStorage for CountingStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable(format!("{name}: quota exceeded")));
        }
        self.inner.open(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.inner.delete(name).await
    }

    async fn match_request(&self, name: &str, request: &RequestDescriptor) -> Result<Option<StoredResponse>, Error> {
        self.matches.fetch_add(1, Ordering::SeqCst);
        if self.fail_match.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable(format!("{name}: read failed")));
        }
        self.inner.match_request(name, request).await
    }

    async fn put(&self, name: &str, request: &RequestDescriptor, response: &StoredResponse) -> Result<(), Error> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable(format!("{name}: disk full")));
        }
        self.inner.put(name, request, response).await
    }

    async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        self.inner.entry_count(name).await
    }
}

/// Session host whose focus and show calls can be made to fail.
#[derive(Default)]
pub(crate) struct FlakyHost {
    pub(crate) session: SessionHost,
    pub(crate) fail_focus: AtomicBool,
    pub(crate) fail_show: AtomicBool,
}

#[async_trait]
impl WorkerHost for FlakyHost {
    async fn claim(&self) -> Result<usize, Error> {
        self.session.claim().await
    }

    async fn show_notification(&self, title: &str, options: NotificationOptions) -> Result<ShownNotification, Error> {
        if self.fail_show.load(Ordering::SeqCst) {
            return Err(Error::NotificationFailed("permission denied".into()));
        }
        self.session.show_notification(title, options).await
    }

    async fn close_notification(&self, id: &str) -> Result<(), Error> {
        self.session.close_notification(id).await
    }

    async fn window_clients(&self) -> Result<Vec<WindowClient>, Error> {
        self.session.window_clients().await
    }

    async fn focus(&self, client_id: &str) -> Result<WindowClient, Error> {
        if self.fail_focus.load(Ordering::SeqCst) {
            return Err(Error::ClientNotFound(client_id.to_string()));
        }
        self.session.focus(client_id).await
    }

    async fn open_window(&self, url: &str) -> Result<WindowClient, Error> {
        self.session.open_window(url).await
    }
}

pub(crate) fn config() -> WorkerConfig {
    WorkerConfig::from_app(&AppConfig { origin: ORIGIN.into(), ..Default::default() }).unwrap()
}

/// A worker over fresh fakes.
pub(crate) async fn worker() -> (Worker, Arc<FakeNetwork>, Arc<CountingStorage>, Arc<FlakyHost>) {
    let network = Arc::new(FakeNetwork::default());
    let storage = Arc::new(CountingStorage::new().await);
    let host = Arc::new(FlakyHost::default());
    let worker = Worker::register(config(), storage.clone(), network.clone(), host.clone());
    (worker, network, storage, host)
}

/// A worker over fresh fakes that already controls pages, as after a
/// completed activation. The store is empty and no request has been made.
pub(crate) async fn active_worker() -> (Worker, Arc<FakeNetwork>, Arc<CountingStorage>, Arc<FlakyHost>) {
    let (worker, network, storage, host) = worker().await;
    worker.set_state(super::WorkerState::Activated).await;
    (worker, network, storage, host)
}

/// Serve the application shell and its assets.
pub(crate) fn serve_site(network: &FakeNetwork) {
    network.respond(&url("/"), 200, "<html>shell</html>");
    network.respond(&url("/index.html"), 200, "<html>shell</html>");
    network.respond(&url("/favicon.ico"), 200, "ico");
    network.respond(&url("/manifest.json"), 200, "{}");
}
