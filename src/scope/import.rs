//! Epoch-guarded scope file imports.
//!
//! Reading an uploaded file completes asynchronously. By then the user may
//! have left the form, and applying the decoded document would silently
//! overwrite whatever the form holds now. Each import therefore captures the
//! current epoch when it starts; the owner of the form advances the epoch
//! whenever the form context ends, and completed imports from an older epoch
//! are discarded.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use iam_console::scope::{ImportEpoch, ScopeForm};
//!
//! # async fn example() {
//! let epoch = ImportEpoch::new();
//! let mut form = ScopeForm::new();
//!
//! let import = epoch.begin().load("scope.json");
//! let completed = import.await;
//! if let Some(Ok(patch)) = epoch.accept(completed) {
//!     form.apply(patch);
//! }
//! # }
//! ```

use super::codec::{self, ScopePatch};
use crate::error::{ConsoleError, ConsoleResult};
use log::debug;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared generation counter for one form context.
#[derive(Debug, Clone, Default)]
pub struct ImportEpoch {
    current: Arc<AtomicU64>,
}

impl ImportEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current epoch value.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Start an import in the current epoch.
    pub fn begin(&self) -> ImportTicket {
        ImportTicket {
            epoch: self.current(),
        }
    }

    /// End the current form context; imports started before now go stale.
    pub fn advance(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether a ticket still belongs to the live context.
    pub fn is_current(&self, ticket: ImportTicket) -> bool {
        ticket.epoch == self.current()
    }

    /// Unwrap a completed import, or `None` if it went stale.
    pub fn accept(&self, completed: CompletedImport) -> Option<ConsoleResult<ScopePatch>> {
        if self.is_current(completed.ticket) {
            Some(completed.result)
        } else {
            debug!(
                "Discarding scope import from epoch {} (current {})",
                completed.ticket.epoch,
                self.current()
            );
            None
        }
    }
}

/// Epoch captured when an import started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket {
    epoch: u64,
}

impl ImportTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Read and decode a scope file under this ticket.
    ///
    /// The returned future owns everything it needs, so it can be awaited
    /// or spawned independently of the form it will be applied to.
    pub fn load(
        self,
        path: impl Into<PathBuf>,
    ) -> impl Future<Output = CompletedImport> + Send + 'static {
        let path = path.into();
        async move {
            CompletedImport {
                ticket: self,
                result: read_scope_file(&path).await,
            }
        }
    }

    /// Decode already loaded scope text under this ticket.
    pub fn complete(self, text: &str) -> CompletedImport {
        CompletedImport {
            ticket: self,
            result: codec::decode(text).map_err(ConsoleError::from),
        }
    }
}

/// The outcome of an import, tagged with the epoch it started in.
#[derive(Debug)]
pub struct CompletedImport {
    ticket: ImportTicket,
    result: ConsoleResult<ScopePatch>,
}

impl CompletedImport {
    pub fn ticket(&self) -> ImportTicket {
        self.ticket
    }
}

/// Read a scope file from disk and decode it.
pub async fn read_scope_file(path: &Path) -> ConsoleResult<ScopePatch> {
    let text = tokio::fs::read_to_string(path).await?;
    debug!("Read {} bytes of scope JSON from {}", text.len(), path.display());
    Ok(codec::decode(&text)?)
}
