//! Session manager implementation
//!
//! Holds the single shared rendering session. The engine is started on first
//! use; concurrent first callers wait on the same start-up, a failed start-up
//! leaves the slot empty, and a session whose connection died is replaced.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::cdp::launcher::BrowserLauncher;
use crate::session::browser::RenderingSessionImpl;
use crate::session::traits::{RenderingSession, SessionManager};
use crate::Error;

type SessionSlot = Arc<OnceCell<Arc<dyn RenderingSession>>>;

/// Session manager implementation
pub struct SessionManagerImpl {
    launcher: Arc<dyn BrowserLauncher>,
    slot: RwLock<SessionSlot>,
    launches: AtomicU64,
}

impl SessionManagerImpl {
    /// Create a new session manager; nothing is started until the first request
    pub fn new(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            launcher,
            slot: RwLock::new(Arc::new(OnceCell::new())),
            launches: AtomicU64::new(0),
        }
    }

    /// Create a session manager over a mock CDP browser for testing
    pub fn mock() -> Self {
        Self::new(Arc::new(crate::session::mock::MockLauncher::new()))
    }

    /// Successful engine start-ups so far
    pub fn launch_count(&self) -> u64 {
        self.launches.load(Ordering::Relaxed)
    }

    fn current_slot(&self) -> Result<SessionSlot, Error> {
        self.slot
            .read()
            .map(|slot| Arc::clone(&slot))
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))
    }

    /// Swap in an empty slot unless someone already replaced `stale`
    fn reset_slot(&self, stale: &SessionSlot) -> Result<(), Error> {
        let mut slot = self
            .slot
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;
        if Arc::ptr_eq(&slot, stale) {
            *slot = Arc::new(OnceCell::new());
        }
        Ok(())
    }

    async fn start_session(&self) -> Result<Arc<dyn RenderingSession>, Error> {
        let browser = self.launcher.launch().await?;
        let session = RenderingSessionImpl::new(browser);
        let launches = self.launches.fetch_add(1, Ordering::Relaxed) + 1;
        match session.version().await {
            Ok(version) => info!(
                session = %session.id(),
                launches,
                product = %version.product,
                protocol = %version.protocol_version,
                "Rendering session started"
            ),
            Err(e) => {
                warn!(session = %session.id(), launches, "Rendering session started; engine version unavailable: {}", e)
            }
        }
        Ok(Arc::new(session))
    }

    async fn session_in(&self, slot: &SessionSlot) -> Result<Arc<dyn RenderingSession>, Error> {
        slot.get_or_try_init(|| self.start_session())
            .await
            .map(Arc::clone)
    }
}

#[async_trait]
impl SessionManager for SessionManagerImpl {
    async fn acquire_session(&self) -> Result<Arc<dyn RenderingSession>, Error> {
        let slot = self.current_slot()?;
        let session = self.session_in(&slot).await?;
        if session.is_active() {
            return Ok(session);
        }

        warn!(session = %session.id(), "Rendering session lost its connection; starting a new one");
        self.reset_slot(&slot)?;
        let slot = self.current_slot()?;
        self.session_in(&slot).await
    }

    async fn shutdown(&self) -> Result<(), Error> {
        let slot = self.current_slot()?;
        if let Some(session) = slot.get() {
            info!(session = %session.id(), "Closing rendering session");
            session.close().await?;
        }
        self.reset_slot(&slot)
    }

    fn session_count(&self) -> usize {
        self.current_slot()
            .ok()
            .and_then(|slot| slot.get().map(|session| session.is_active()))
            .map_or(0, usize::from)
    }
}
