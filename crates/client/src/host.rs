//! Host-runtime seam: page clients and notifications.
//!
//! `WorkerHost` is what the worker calls back into. `SessionHost` is an
//! in-process implementation that tracks open pages and shown
//! notifications for one host session.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use foliocache_core::{Error, NotificationOptions, ShownNotification, WindowClient};

/// Notification and client API consumed by the worker.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Become the controller of every open page. Returns how many pages are controlled.
    async fn claim(&self) -> Result<usize, Error>;

    async fn show_notification(&self, title: &str, options: NotificationOptions) -> Result<ShownNotification, Error>;

    async fn close_notification(&self, id: &str) -> Result<(), Error>;

    /// All open window clients, in the order they were opened.
    async fn window_clients(&self) -> Result<Vec<WindowClient>, Error>;

    async fn focus(&self, client_id: &str) -> Result<WindowClient, Error>;

    async fn open_window(&self, url: &str) -> Result<WindowClient, Error>;
}

#[derive(Debug, Default)]
struct SessionState {
    clients: Vec<WindowClient>,
    notifications: Vec<ShownNotification>,
    claimed: bool,
    next_id: u64,
}

impl SessionState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn add_client(&mut self, url: &str, focused: bool) -> WindowClient {
        if focused {
            self.clients.iter_mut().for_each(|c| c.focused = false);
        }
        let client =
            WindowClient { id: self.next_id("client"), url: url.to_string(), focused, controlled: self.claimed };
        self.clients.push(client.clone());
        client
    }
}

/// In-memory host for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionHost {
    state: Arc<Mutex<SessionState>>,
}

impl SessionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page the user opened. It is controlled only once the
    /// worker has claimed the session.
    pub async fn attach_client(&self, url: &str) -> WindowClient {
        self.state.lock().await.add_client(url, false)
    }

    pub async fn clients(&self) -> Vec<WindowClient> {
        self.state.lock().await.clients.clone()
    }

    /// Notifications that are still shown.
    pub async fn notifications(&self) -> Vec<ShownNotification> {
        self.state.lock().await.notifications.clone()
    }
}

#[async_trait]
impl WorkerHost for SessionHost {
    async fn claim(&self) -> Result<usize, Error> {
        let mut state = self.state.lock().await;
        state.claimed = true;
        state.clients.iter_mut().for_each(|c| c.controlled = true);
        Ok(state.clients.len())
    }

    async fn show_notification(&self, title: &str, options: NotificationOptions) -> Result<ShownNotification, Error> {
        let mut state = self.state.lock().await;
        let shown = ShownNotification { id: state.next_id("notification"), title: title.to_string(), options };
        state.notifications.push(shown.clone());
        Ok(shown)
    }

    async fn close_notification(&self, id: &str) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        let before = state.notifications.len();
        state.notifications.retain(|n| n.id != id);
        if state.notifications.len() == before {
            return Err(Error::NotificationFailed(format!("no notification {id}")));
        }
        Ok(())
    }

    async fn window_clients(&self) -> Result<Vec<WindowClient>, Error> {
        Ok(self.clients().await)
    }

    async fn focus(&self, client_id: &str) -> Result<WindowClient, Error> {
        let mut state = self.state.lock().await;
        if !state.clients.iter().any(|c| c.id == client_id) {
            return Err(Error::ClientNotFound(client_id.to_string()));
        }
        for client in state.clients.iter_mut() {
            client.focused = client.id == client_id;
        }
        state
            .clients
            .iter()
            .find(|c| c.id == client_id)
            .cloned()
            .ok_or_else(|| Error::ClientNotFound(client_id.to_string()))
    }

    async fn open_window(&self, url: &str) -> Result<WindowClient, Error> {
        Ok(self.state.lock().await.add_client(url, true))
    }
}
