//! Scoped ownership of the system clipboard for one invocation.
//!
//! [`ClipboardLease::acquire`] snapshots the clipboard and clears it.
//! [`ClipboardLease::release`] writes the snapshot back.  If a lease is
//! dropped without being released (early return, panic, or the invocation
//! future being cancelled) the snapshot is written back from `Drop`.

use std::sync::Arc;

use crate::inject::{ClipboardAccess, InjectError};

use super::runner::{blocking, WorkflowError};

/// Clipboard text captured before an invocation touched the clipboard.
///
/// `None` when the clipboard held no text; restoring such a snapshot clears
/// the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSnapshot(Option<String>);

impl ClipboardSnapshot {
    pub fn text(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Exclusive, self-restoring hold on the clipboard.
pub struct ClipboardLease {
    clipboard: Arc<dyn ClipboardAccess>,
    snapshot: ClipboardSnapshot,
    restored: bool,
}

impl ClipboardLease {
    /// Snapshot the current clipboard, then clear it.
    ///
    /// Clearing turns a copy gesture that silently does nothing into an
    /// empty read instead of a stale one.
    ///
    /// # Errors
    ///
    /// Fails if the clipboard cannot be read or cleared.  When only the clear
    /// fails the lease is dropped, which writes the snapshot back.
    pub async fn acquire(clipboard: Arc<dyn ClipboardAccess>) -> Result<Self, WorkflowError> {
        let reader = Arc::clone(&clipboard);
        let text = blocking(move || reader.read_text()).await?;

        let lease = Self {
            clipboard,
            snapshot: ClipboardSnapshot(text),
            restored: false,
        };

        let clearer = Arc::clone(&lease.clipboard);
        blocking(move || clearer.clear()).await?;

        Ok(lease)
    }

    pub fn snapshot(&self) -> &ClipboardSnapshot {
        &self.snapshot
    }

    /// Write the snapshot back and end the lease.
    ///
    /// Restoring is attempted once; a failure is returned, not retried.
    pub async fn release(mut self) -> Result<(), WorkflowError> {
        self.restored = true;
        let clipboard = Arc::clone(&self.clipboard);
        let snapshot = self.snapshot.clone();
        blocking(move || restore(clipboard.as_ref(), &snapshot)).await
    }
}

impl Drop for ClipboardLease {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        log::warn!("workflow: clipboard lease dropped early, restoring");
        if let Err(e) = restore(self.clipboard.as_ref(), &self.snapshot) {
            log::error!("workflow: clipboard restore failed: {e}");
        }
    }
}

fn restore(clipboard: &dyn ClipboardAccess, snapshot: &ClipboardSnapshot) -> Result<(), InjectError> {
    match snapshot.text() {
        Some(text) => clipboard.write_text(text),
        None => clipboard.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::{DesktopEvent, FakeDesktop};

    #[tokio::test]
    async fn acquire_snapshots_then_clears() {
        let desktop = FakeDesktop::new("", Some("original"));
        let lease = ClipboardLease::acquire(Arc::new(desktop.clone())).await.unwrap();

        assert_eq!(lease.snapshot().text(), Some("original"));
        assert_eq!(desktop.clipboard(), None);
        assert_eq!(
            desktop.events(),
            vec![DesktopEvent::ClipboardRead, DesktopEvent::ClipboardClear]
        );
        lease.release().await.unwrap();
    }

    #[tokio::test]
    async fn release_writes_snapshot_back() {
        let desktop = FakeDesktop::new("", Some("original"));
        let lease = ClipboardLease::acquire(Arc::new(desktop.clone())).await.unwrap();
        desktop.write_text("scratch").unwrap();

        lease.release().await.unwrap();
        assert_eq!(desktop.clipboard().as_deref(), Some("original"));
    }

    #[tokio::test]
    async fn empty_snapshot_restores_to_empty() {
        let desktop = FakeDesktop::new("", None);
        let lease = ClipboardLease::acquire(Arc::new(desktop.clone())).await.unwrap();
        desktop.write_text("scratch").unwrap();

        lease.release().await.unwrap();
        assert_eq!(desktop.clipboard(), None);
    }

    #[tokio::test]
    async fn drop_without_release_restores() {
        let desktop = FakeDesktop::new("", Some("original"));
        {
            let _lease = ClipboardLease::acquire(Arc::new(desktop.clone())).await.unwrap();
            desktop.write_text("scratch").unwrap();
        }
        assert_eq!(desktop.clipboard().as_deref(), Some("original"));
    }

    #[tokio::test]
    async fn release_restores_only_once() {
        let desktop = FakeDesktop::new("", Some("original"));
        let lease = ClipboardLease::acquire(Arc::new(desktop.clone())).await.unwrap();
        lease.release().await.unwrap();

        let writes = desktop
            .events()
            .into_iter()
            .filter(|e| matches!(e, DesktopEvent::ClipboardWrite(_)))
            .count();
        assert_eq!(writes, 1);
    }

    #[tokio::test]
    async fn failed_clear_restores_snapshot_on_the_way_out() {
        let desktop = FakeDesktop::new("", Some("original")).failing_clipboard_clears();

        let err = ClipboardLease::acquire(Arc::new(desktop.clone()))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, WorkflowError::Inject(InjectError::ClipboardSet(_))));
        assert_eq!(desktop.clipboard().as_deref(), Some("original"));
        assert_eq!(
            desktop.events(),
            vec![
                DesktopEvent::ClipboardRead,
                DesktopEvent::ClipboardWrite("original".into()),
            ]
        );
    }

    #[tokio::test]
    async fn failed_read_touches_nothing() {
        let desktop = FakeDesktop::new("", Some("original")).failing_clipboard_reads();

        assert!(ClipboardLease::acquire(Arc::new(desktop.clone())).await.is_err());
        assert!(desktop.events().is_empty());
        assert_eq!(desktop.clipboard().as_deref(), Some("original"));
    }
}
