use crate::catalog::Catalog;
use crate::config::SearchConfig;
use crate::distribution::{BudgetTable, CdfCache};
use crate::error::{GfResult, GizmoError};
use crate::protocol::{GizmoRequest, GizmoResult, StatusMessage};
use crate::search::{ProgressCallback, SearchPlan, SearchRunner};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// Shared, read-only state every search runs against.
///
/// The budget table is built here, once; the CDF cache fills as searches run.
pub struct GizmoEngine {
    catalog: Arc<Catalog>,
    budget: Arc<BudgetTable>,
    cache: Arc<CdfCache>,
    config: SearchConfig,
    next_request_id: AtomicU64,
}

impl GizmoEngine {
    pub fn new(catalog: Catalog, config: SearchConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            budget: Arc::new(BudgetTable::new()),
            cache: Arc::new(CdfCache::new()),
            config,
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Service: load the game data file and build the engine around it.
    pub fn load<P: AsRef<Path>>(data_path: P, config: SearchConfig) -> GfResult<Self> {
        let catalog = Catalog::load_from_file(data_path)?;
        Ok(Self::new(catalog, config))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Validates a request without searching.
    pub fn plan(&self, request: &GizmoRequest) -> GfResult<SearchPlan> {
        request.to_plan(&self.catalog, &self.config)
    }

    /// Service: run a search on the calling thread.
    pub fn run<CB: ProgressCallback>(
        &self,
        request: &GizmoRequest,
        callback: &CB,
    ) -> GfResult<Vec<GizmoResult>> {
        let plan = self.plan(request)?;
        info!(
            "🔍 Searching {} {} gizmo for {} ({:?})",
            plan.variant, plan.gizmo_type, plan.primary, plan.secondary
        );
        let runner = SearchRunner::new(&self.catalog, &self.budget, &self.cache, &plan);
        let ranked = runner.run(callback)?;
        Ok(ranked.into_iter().map(GizmoResult::from).collect())
    }

    /// Service: run a search on a background thread, streaming status messages.
    pub fn spawn(&self, request: GizmoRequest) -> SearchHandle {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        let job = SearchJob {
            request_id,
            request,
            catalog: Arc::clone(&self.catalog),
            budget: Arc::clone(&self.budget),
            cache: Arc::clone(&self.cache),
            config: self.config.clone(),
            sender,
            cancelled: Arc::clone(&cancelled),
        };
        let worker = thread::Builder::new()
            .name(format!("gizmo-search-{}", request_id))
            .spawn(move || job.execute());
        if let Err(e) = &worker {
            error!("Could not start search worker: {}", e);
        }

        SearchHandle {
            request_id,
            receiver,
            cancelled,
            spawn_error: worker.err().map(|e| e.to_string()),
        }
    }
}

struct SearchJob {
    request_id: u64,
    request: GizmoRequest,
    catalog: Arc<Catalog>,
    budget: Arc<BudgetTable>,
    cache: Arc<CdfCache>,
    config: SearchConfig,
    sender: Sender<StatusMessage>,
    cancelled: Arc<AtomicBool>,
}

impl SearchJob {
    fn execute(self) {
        let id = self.request_id;
        let plan = match self.request.to_plan(&self.catalog, &self.config) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Request {} rejected: {}", id, e);
                let _ = self.sender.send(StatusMessage::rejected(id, e.to_string()));
                return;
            }
        };

        let progress = |percent: u8| {
            if self.cancelled.load(Ordering::SeqCst) {
                return false;
            }
            self.sender
                .send(StatusMessage::in_progress(id, percent))
                .is_ok()
        };
        let outcome = SearchRunner::new(&self.catalog, &self.budget, &self.cache, &plan)
            .with_cancel_flag(&self.cancelled)
            .run(&progress);

        if self.cancelled.load(Ordering::SeqCst) {
            debug!("Request {} cancelled", id);
            return;
        }
        let message = match outcome {
            Ok(ranked) => {
                StatusMessage::complete(id, ranked.into_iter().map(GizmoResult::from).collect())
            }
            Err(GizmoError::Cancelled) => return,
            Err(e) if e.is_validation() => StatusMessage::rejected(id, e.to_string()),
            Err(e) => {
                error!("Request {} failed: {}", id, e);
                StatusMessage::failed(id, e.to_string())
            }
        };
        let _ = self.sender.send(message);
    }
}

/// Caller's end of a background search.
///
/// After [`SearchHandle::cancel`] no further message is ever returned, even
/// ones the worker queued before it noticed.
pub struct SearchHandle {
    request_id: u64,
    receiver: Receiver<StatusMessage>,
    cancelled: Arc<AtomicBool>,
    spawn_error: Option<String>,
}

impl SearchHandle {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Blocks for the next message; `None` once the search is over or cancelled.
    pub fn recv(&mut self) -> Option<StatusMessage> {
        if let Some(reason) = self.spawn_error.take() {
            return Some(StatusMessage::failed(self.request_id, reason));
        }
        if self.is_cancelled() {
            return None;
        }
        let message = self.receiver.recv().ok()?;
        (!self.is_cancelled()).then_some(message)
    }

    pub fn try_recv(&mut self) -> Option<StatusMessage> {
        if let Some(reason) = self.spawn_error.take() {
            return Some(StatusMessage::failed(self.request_id, reason));
        }
        if self.is_cancelled() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    pub fn iter(&mut self) -> impl Iterator<Item = StatusMessage> + '_ {
        std::iter::from_fn(move || self.recv())
    }

    /// Drains progress and returns the terminal message, if any arrives.
    pub fn wait(&mut self) -> Option<StatusMessage> {
        self.iter().find(StatusMessage::is_terminal)
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
