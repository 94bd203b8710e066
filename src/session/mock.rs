//! Mock session implementation for testing
//!
//! Scripted pages for exercising the extraction pipeline without a browser,
//! plus a launcher that hands out mock CDP browsers.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::routing::RequestPolicy;
use super::traits::{
    ElementHandle, NavigationOptions, NavigationResult, PageContext, PageOptions, RenderingSession,
    SessionManager,
};
use crate::cdp::launcher::BrowserLauncher;
use crate::cdp::mock::{MockCdpBrowser, MockCdpConnection};
use crate::cdp::traits::CdpBrowser;
use crate::Error;

/// How a mock page reacts to navigation
#[derive(Debug, Clone, PartialEq)]
pub enum MockNavigation {
    /// DOM content is ready immediately
    Ready,
    /// Never becomes ready; fails once the timeout elapses
    Hang,
    /// The engine rejects the navigation with this text
    EngineError(String),
    /// The connection drops mid-navigation
    Disconnected,
}

/// How a mock element reacts to attribute evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum MockElement {
    /// Evaluation returns this raw attribute object
    Attributes(Value),
    /// The node was removed from the document
    Detached,
    /// Evaluation never returns
    Hang,
}

/// Raw attribute object as the in-page extractor reports it
pub fn element_json(tag: &str, attributes: &[(&str, &str)]) -> Value {
    let mut object = serde_json::Map::new();
    object.insert("tag".to_string(), Value::String(tag.to_string()));
    for (name, value) in attributes {
        object.insert((*name).to_string(), Value::String((*value).to_string()));
    }
    Value::Object(object)
}

/// Script shared by every page a mock session opens
#[derive(Debug, Clone)]
pub struct MockPageScript {
    navigation: MockNavigation,
    elements: Vec<MockElement>,
    query_error: Option<String>,
}

impl MockPageScript {
    /// A page that loads and has no elements
    pub fn new() -> Self {
        Self {
            navigation: MockNavigation::Ready,
            elements: Vec::new(),
            query_error: None,
        }
    }

    /// Set navigation behaviour
    pub fn navigation(mut self, navigation: MockNavigation) -> Self {
        self.navigation = navigation;
        self
    }

    /// Append an element
    pub fn element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Append an element with the given attributes
    pub fn with(self, tag: &str, attributes: &[(&str, &str)]) -> Self {
        self.element(MockElement::Attributes(element_json(tag, attributes)))
    }

    /// Append many elements
    pub fn elements<I: IntoIterator<Item = MockElement>>(mut self, elements: I) -> Self {
        self.elements.extend(elements);
        self
    }

    /// Make the selector query fail
    pub fn query_error<S: Into<String>>(mut self, message: S) -> Self {
        self.query_error = Some(message.into());
        self
    }
}

impl Default for MockPageScript {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock page
#[derive(Debug)]
pub struct MockPage {
    id: String,
    session_id: String,
    script: MockPageScript,
    closed: AtomicBool,
    close_calls: AtomicUsize,
    evaluations: AtomicUsize,
    navigations: Mutex<Vec<String>>,
    policy: Mutex<Option<RequestPolicy>>,
}

impl MockPage {
    /// Create a new mock page
    pub fn new<S: Into<String>>(session_id: S, script: MockPageScript) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            script,
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
            evaluations: AtomicUsize::new(0),
            navigations: Mutex::new(Vec::new()),
            policy: Mutex::new(None),
        }
    }

    /// Whether the page has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of `close` calls, including no-op repeats
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::Relaxed)
    }

    /// Attribute evaluations started
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// URLs navigated to
    pub async fn navigations(&self) -> Vec<String> {
        self.navigations.lock().await.clone()
    }

    /// Installed routing policy
    pub async fn request_policy(&self) -> Option<RequestPolicy> {
        self.policy.lock().await.clone()
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.is_closed() {
            Err(Error::page_closed(&self.id))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageContext for MockPage {
    fn id(&self) -> &str {
        &self.id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn navigate(&self, url: &str, options: NavigationOptions) -> Result<NavigationResult, Error> {
        self.ensure_open()?;
        self.navigations.lock().await.push(url.to_string());

        match &self.script.navigation {
            MockNavigation::Ready => Ok(NavigationResult {
                url: url.to_string(),
                ready_state: "complete".to_string(),
            }),
            MockNavigation::Hang => {
                tokio::time::sleep(Duration::from_millis(options.timeout)).await;
                Err(Error::navigation_timeout(format!(
                    "{} not ready after {}ms",
                    url, options.timeout
                )))
            }
            MockNavigation::EngineError(text) => Err(Error::cdp(format!("{} ({})", text, url))),
            MockNavigation::Disconnected => Err(Error::websocket("Connection is not active")),
        }
    }

    async fn query_all(&self, _selector: &str, _limit: usize) -> Result<Vec<ElementHandle>, Error> {
        self.ensure_open()?;
        if let Some(message) = &self.script.query_error {
            return Err(Error::script_execution_failed(message.clone()));
        }

        // The limit is left to the caller so truncation can be observed
        Ok((0..self.script.elements.len())
            .map(|index| ElementHandle::new(format!("mock-element-{}", index), index))
            .collect())
    }

    async fn evaluate_on(
        &self,
        element: &ElementHandle,
        _function: &str,
        _args: Vec<Value>,
    ) -> Result<Value, Error> {
        self.ensure_open()?;
        self.evaluations.fetch_add(1, Ordering::Relaxed);

        match self.script.elements.get(element.index()) {
            Some(MockElement::Attributes(value)) => Ok(value.clone()),
            Some(MockElement::Hang) => futures::future::pending().await,
            Some(MockElement::Detached) | None => Err(Error::cdp(
                "Runtime.callFunctionOn: Could not find object with given id (code: -32000)",
            )),
        }
    }

    async fn apply_request_policy(&self, policy: RequestPolicy) -> Result<(), Error> {
        self.ensure_open()?;
        *self.policy.lock().await = Some(policy);
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        self.close_calls.fetch_add(1, Ordering::Relaxed);
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.is_closed()
    }
}

/// Mock rendering session
#[derive(Debug)]
pub struct MockSession {
    id: String,
    script: MockPageScript,
    pages: Mutex<Vec<Arc<MockPage>>>,
    active: AtomicBool,
}

impl MockSession {
    /// Create a session whose pages follow `script`
    pub fn new(script: MockPageScript) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            script,
            pages: Mutex::new(Vec::new()),
            active: AtomicBool::new(true),
        }
    }

    /// Pages opened so far
    pub async fn pages(&self) -> Vec<Arc<MockPage>> {
        self.pages.lock().await.clone()
    }
}

#[async_trait]
impl RenderingSession for MockSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn new_page(&self, _options: PageOptions) -> Result<Arc<dyn PageContext>, Error> {
        if !self.is_active() {
            return Err(Error::browser_init_failure("Mock session closed"));
        }
        let page = Arc::new(MockPage::new(self.id.clone(), self.script.clone()));
        self.pages.lock().await.push(Arc::clone(&page));
        Ok(page)
    }

    async fn close(&self) -> Result<(), Error> {
        self.active.store(false, Ordering::Release);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Mock session manager
#[derive(Debug)]
pub struct MockSessionManager {
    session: Arc<MockSession>,
    failures_left: AtomicUsize,
    acquisitions: AtomicUsize,
}

impl MockSessionManager {
    /// Create a manager whose pages follow `script`
    pub fn new(script: MockPageScript) -> Self {
        Self {
            session: Arc::new(MockSession::new(script)),
            failures_left: AtomicUsize::new(0),
            acquisitions: AtomicUsize::new(0),
        }
    }

    /// Fail the first `count` session acquisitions with `BrowserInitFailure`
    pub fn failing(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::Relaxed);
        self
    }

    /// Pages opened so far
    pub async fn pages(&self) -> Vec<Arc<MockPage>> {
        self.session.pages().await
    }

    /// Session acquisitions attempted
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SessionManager for MockSessionManager {
    async fn acquire_session(&self) -> Result<Arc<dyn RenderingSession>, Error> {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        let failing = self
            .failures_left
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::browser_init_failure("mock engine refused to start"));
        }
        Ok(Arc::clone(&self.session) as Arc<dyn RenderingSession>)
    }

    async fn shutdown(&self) -> Result<(), Error> {
        self.session.close().await
    }

    fn session_count(&self) -> usize {
        usize::from(self.session.is_active())
    }
}

/// Launcher that hands out [`MockCdpBrowser`]s
#[derive(Debug)]
pub struct MockLauncher {
    page_connection: Option<Arc<MockCdpConnection>>,
    launch_delay: Option<Duration>,
    failures_left: AtomicUsize,
    launches: AtomicUsize,
    browsers: Mutex<Vec<Arc<MockCdpBrowser>>>,
}

impl MockLauncher {
    /// Create a launcher that always succeeds
    pub fn new() -> Self {
        Self {
            page_connection: None,
            launch_delay: None,
            failures_left: AtomicUsize::new(0),
            launches: AtomicUsize::new(0),
            browsers: Mutex::new(Vec::new()),
        }
    }

    /// Pages of launched browsers talk to `connection`
    pub fn with_page_connection(mut self, connection: Arc<MockCdpConnection>) -> Self {
        self.page_connection = Some(connection);
        self
    }

    /// Every launch takes `delay` before it resolves
    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = Some(delay);
        self
    }

    /// Fail the first `count` launches
    pub fn failing(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::Relaxed);
        self
    }

    /// Launch attempts so far, failed ones included
    pub fn launch_attempts(&self) -> usize {
        self.launches.load(Ordering::Relaxed)
    }

    /// Browsers launched successfully
    pub async fn browsers(&self) -> Vec<Arc<MockCdpBrowser>> {
        self.browsers.lock().await.clone()
    }
}

impl Default for MockLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    async fn launch(&self) -> Result<Arc<dyn CdpBrowser>, Error> {
        self.launches.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.launch_delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::browser_init_failure("mock launch failure"));
        }

        let browser = Arc::new(match &self.page_connection {
            Some(connection) => MockCdpBrowser::with_page_connection(Arc::clone(connection)),
            None => MockCdpBrowser::new(),
        });
        self.browsers.lock().await.push(Arc::clone(&browser));
        Ok(browser)
    }
}
