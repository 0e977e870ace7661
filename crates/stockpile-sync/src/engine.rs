//! # Sync Engine
//!
//! Main orchestrator for the sync engine. Reconciles the device's local
//! snapshot with the signed-in owner's remote rows.
//!
//! ## Engine Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SyncEngine Architecture                          │
//! │                                                                         │
//! │  UI mutation                                                            │
//! │     │ edit_snapshot(|s| ...)   (snapshot lock: read → mutate → write)   │
//! │     ▼                                                                   │
//! │  queue_sync() ──► debounce task (restarted on every call)               │
//! │                        │ window elapses                                 │
//! │                        ▼                                                │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 operation lock (one at a time)                   │  │
//! │  │                                                                  │  │
//! │  │  push()             pull()               migrate_to_cloud()      │  │
//! │  │  items in batches   items, profile,      guard on metadata,      │  │
//! │  │  then profile ║     pins → merge →       then push               │  │
//! │  │  pins (joined)      persist                                      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │         │ every remote call: timeout + owner re-check                   │
//! │         ▼                                                               │
//! │  RemoteTables / LocalStore / Reachability                               │
//! │                                                                         │
//! │  STATUS: local → syncing → synced | error, offline when unreachable     │
//! │  Every transition goes to the registered StatusObserver.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Handling
//! The sync operations never return errors. A failure is logged and shows
//! up as `SyncStatus::Error` (and `None` from `push`/`pull`). The profile
//! update and pin upsert inside a push are non-fatal: they are logged and
//! reported in [`PushReport`], and the push still succeeds.
//!
//! ## Owner Changes
//! Each operation captures the owner when it starts. If `set_user` changes
//! the owner while the operation is suspended on a remote call, the
//! operation is abandoned: nothing is persisted and the status `set_user`
//! chose is left alone.

use chrono::Utc;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use stockpile_core::validation::validate_snapshot;
use stockpile_core::{ItemRow, LocalSnapshot, PinRow, ProfilePatch, SyncMetadata, Table};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::local::LocalStore;
use crate::merge::{merge_snapshot, RemoteState};
use crate::reachability::{AlwaysReachable, Reachability};
use crate::remote::RemoteTables;
use crate::status::{NoOpObserver, SharedObserver, StatusObserver, SyncStatus};

// =============================================================================
// Operation Results
// =============================================================================

/// What a successful push sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Item rows upserted.
    pub items: usize,

    /// Upsert calls those rows took.
    pub batches: usize,

    /// Whether the profile update succeeded.
    pub profile_synced: bool,

    /// Whether pins were upserted. False when there were none or the
    /// upsert failed.
    pub pins_synced: bool,
}

/// Result of [`SyncEngine::migrate_to_cloud`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No owner is signed in.
    NoOwner,

    /// This device already synced for this owner.
    AlreadyMigrated,

    /// The local snapshot has no items.
    NothingToMigrate,

    /// The local items were pushed.
    Migrated(PushReport),

    /// The migration push failed. It runs again on the next attempt.
    Failed,
}

// =============================================================================
// Engine State
// =============================================================================

struct PendingPush {
    ticket: u64,
    handle: JoinHandle<()>,
}

struct EngineState {
    owner: Option<String>,
    status: SyncStatus,
    dirty: bool,
    /// Bumped by every queued change; a push only clears `dirty` if no
    /// change was queued while it ran.
    generation: u64,
    pending: Option<PendingPush>,
}

struct EngineInner {
    config: SyncConfig,
    remote: Arc<dyn RemoteTables>,
    local: Arc<dyn LocalStore>,
    reachability: Arc<dyn Reachability>,
    state: Mutex<EngineState>,
    observer: RwLock<SharedObserver>,
    op_lock: tokio::sync::Mutex<()>,
    snapshot_lock: tokio::sync::Mutex<()>,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(pending) = state.pending.take() {
            pending.handle.abort();
        }
    }
}

// =============================================================================
// Sync Engine
// =============================================================================

/// Offline-first sync engine. Cheap to clone; clones share all state.
///
/// Constructed and owned by the host; there is no global instance.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SyncEngine")
            .field("owner", &state.owner)
            .field("status", &state.status)
            .field("dirty", &state.dirty)
            .finish()
    }
}

impl SyncEngine {
    /// Creates a new engine. Status starts at `local` with no owner.
    ///
    /// Fails with a configuration error if `config` does not validate.
    pub fn new(
        config: SyncConfig,
        remote: Arc<dyn RemoteTables>,
        local: Arc<dyn LocalStore>,
        reachability: Arc<dyn Reachability>,
    ) -> SyncResult<Self> {
        config.validate()?;

        Ok(SyncEngine {
            inner: Arc::new(EngineInner {
                config,
                remote,
                local,
                reachability,
                state: Mutex::new(EngineState {
                    owner: None,
                    status: SyncStatus::Local,
                    dirty: false,
                    generation: 0,
                    pending: None,
                }),
                observer: RwLock::new(Arc::new(NoOpObserver)),
                op_lock: tokio::sync::Mutex::new(()),
                snapshot_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn status(&self) -> SyncStatus {
        self.state().status
    }

    pub fn owner(&self) -> Option<String> {
        self.state().owner.clone()
    }

    /// True while local changes are waiting to be pushed.
    pub fn is_dirty(&self) -> bool {
        self.state().dirty
    }

    /// True while a debounced push is scheduled.
    pub fn has_pending_push(&self) -> bool {
        self.state().pending.is_some()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Registers the status observer, replacing any previous one.
    pub fn set_observer(&self, observer: Arc<dyn StatusObserver>) {
        let mut slot = self
            .inner
            .observer
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = observer;
    }

    /// Reads the sync metadata. Read failures are logged and yield `None`.
    pub async fn metadata(&self) -> Option<SyncMetadata> {
        match self.read_metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                warn!(error = %e, "Failed to read sync metadata");
                None
            }
        }
    }

    /// Reads the local snapshot as currently persisted.
    pub async fn load_snapshot(&self) -> SyncResult<Option<LocalSnapshot>> {
        self.read_snapshot().await
    }

    // =========================================================================
    // Owner
    // =========================================================================

    /// Sets or clears the signed-in owner.
    ///
    /// `Some` with the network reachable pulls and returns the merged
    /// snapshot. `None` cancels any scheduled push and returns to `local`
    /// without network activity. Never triggers migration.
    pub async fn set_user(&self, owner: Option<String>) -> Option<LocalSnapshot> {
        let changed = self.replace_owner(owner.clone());

        match owner {
            None => {
                info!("Owner cleared");
                self.set_status(SyncStatus::Local);
                None
            }
            Some(owner) => {
                info!(owner = %owner, changed, "Owner set");
                if !self.is_reachable() {
                    self.set_status(SyncStatus::Offline);
                    return None;
                }
                self.pull().await
            }
        }
    }

    /// First-login flow: sets the owner without pulling, migrates any
    /// pre-account local data, then pulls.
    pub async fn sign_in(
        &self,
        owner: impl Into<String>,
    ) -> (MigrationOutcome, Option<LocalSnapshot>) {
        let owner = owner.into();
        self.replace_owner(Some(owner.clone()));
        info!(owner = %owner, "Signing in");

        let migration = self.migrate_to_cloud().await;
        let snapshot = self.pull().await;
        (migration, snapshot)
    }

    /// Sets the owner without any network activity, for a host restoring
    /// a persisted session. The next push or pull runs for this owner.
    pub fn restore_owner(&self, owner: impl Into<String>) {
        let owner = owner.into();
        info!(owner = %owner, "Owner restored");
        self.replace_owner(Some(owner));
    }

    /// Swaps the owner. A scheduled push belongs to the previous owner's
    /// session and is cancelled on any change.
    fn replace_owner(&self, owner: Option<String>) -> bool {
        let mut state = self.state();
        let changed = state.owner != owner;
        state.owner = owner;
        if changed {
            if let Some(pending) = state.pending.take() {
                pending.handle.abort();
            }
        }
        changed
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Records a local change and schedules a debounced push.
    ///
    /// Every call restarts the window; only the push at the end of the last
    /// window runs. With no owner the status becomes `local`; with the
    /// network unreachable it becomes `offline` and the change stays dirty
    /// until reachability returns. Must be called within a Tokio runtime.
    pub fn queue_sync(&self) {
        let reachable = self.is_reachable();

        if self.owner().is_none() {
            self.set_status(if reachable {
                SyncStatus::Local
            } else {
                SyncStatus::Offline
            });
            return;
        }

        if !reachable {
            {
                let mut state = self.state();
                state.dirty = true;
                state.generation += 1;
            }
            debug!("Change queued while offline");
            self.set_status(SyncStatus::Offline);
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "queue_sync called outside a Tokio runtime");
                return;
            }
        };

        let delay = self.inner.config.debounce();
        let mut state = self.state();
        state.dirty = true;
        state.generation += 1;
        let ticket = state.generation;

        if let Some(previous) = state.pending.take() {
            previous.handle.abort();
        }

        let handle = runtime.spawn(Self::debounced_push(
            Arc::downgrade(&self.inner),
            ticket,
            delay,
        ));
        state.pending = Some(PendingPush { ticket, handle });

        debug!(ticket, delay_ms = delay.as_millis() as u64, "Push scheduled");
    }

    async fn debounced_push(inner: Weak<EngineInner>, ticket: u64, delay: Duration) {
        tokio::time::sleep(delay).await;

        let Some(inner) = inner.upgrade() else {
            return;
        };
        let engine = SyncEngine { inner };

        // Detach before pushing, so a later queue_sync can no longer abort
        // this task mid-push.
        {
            let mut state = engine.state();
            if state.pending.as_ref().map(|p| p.ticket) != Some(ticket) {
                return;
            }
            state.pending = None;
        }

        debug!(ticket, "Debounce window elapsed");
        engine.push().await;
    }

    /// Cancels any scheduled push. Idempotent.
    pub fn destroy(&self) {
        let cancelled = self.state().pending.take();
        if let Some(pending) = cancelled {
            pending.handle.abort();
            debug!("Scheduled push cancelled");
        }
    }

    /// Tells the engine the reachability signal changed.
    ///
    /// Going offline moves the status to `offline`. Coming back with an
    /// owner and unpushed changes queues a push; otherwise an `offline`
    /// status falls back to `local`.
    pub fn reachability_changed(&self, online: bool) {
        if !online {
            info!("Network unreachable");
            self.set_status(SyncStatus::Offline);
            return;
        }

        let (has_owner, dirty, status) = {
            let state = self.state();
            (state.owner.is_some(), state.dirty, state.status)
        };

        info!(dirty, "Network reachable");
        if has_owner && dirty {
            self.queue_sync();
        } else if status == SyncStatus::Offline {
            self.set_status(SyncStatus::Local);
        }
    }

    // =========================================================================
    // Snapshot Editing
    // =========================================================================

    /// Runs `edit` against the persisted snapshot and writes the result.
    ///
    /// The read, the edit, and the write happen under the snapshot lock, so
    /// no pull merge can interleave. An edit that leaves the snapshot invalid
    /// is rejected and nothing is written. On success `saved_at` is stamped
    /// and a sync is queued.
    pub async fn edit_snapshot<F>(&self, edit: F) -> SyncResult<LocalSnapshot>
    where
        F: FnOnce(&mut LocalSnapshot),
    {
        let snapshot = {
            let _guard = self.inner.snapshot_lock.lock().await;

            let mut snapshot = self.read_snapshot().await?.unwrap_or_default();
            edit(&mut snapshot);
            validate_snapshot(&snapshot)?;
            snapshot.saved_at = Some(Utc::now());
            self.write_snapshot(&snapshot).await?;
            snapshot
        };

        self.queue_sync();
        Ok(snapshot)
    }

    // =========================================================================
    // Push
    // =========================================================================

    /// Pushes the local snapshot to the owner's remote rows.
    ///
    /// Returns `None` when there is no owner, the network is unreachable,
    /// or the push failed or was abandoned.
    pub async fn push(&self) -> Option<PushReport> {
        let _op = self.inner.op_lock.lock().await;
        self.push_locked().await
    }

    async fn push_locked(&self) -> Option<PushReport> {
        let Some(owner) = self.owner() else {
            warn!("Push skipped: no owner");
            self.set_status(SyncStatus::Local);
            return None;
        };

        if !self.is_reachable() {
            info!(owner = %owner, "Push skipped: offline");
            self.set_status(SyncStatus::Offline);
            return None;
        }

        let generation = self.state().generation;
        self.set_status(SyncStatus::Syncing);
        info!(owner = %owner, "Push started");

        match self.run_push(&owner).await {
            Ok(report) => {
                {
                    let mut state = self.state();
                    if state.generation == generation {
                        state.dirty = false;
                    }
                }
                info!(
                    owner = %owner,
                    items = report.items,
                    batches = report.batches,
                    profile = report.profile_synced,
                    pins = report.pins_synced,
                    "Push complete"
                );
                self.set_status(SyncStatus::Synced);
                Some(report)
            }
            Err(e) if !self.owner_is(&owner) => {
                info!(owner = %owner, reason = %e, "Push abandoned: owner changed");
                None
            }
            Err(e) => {
                error!(owner = %owner, error = %e, retryable = e.is_retryable(), "Push failed");
                self.set_status(SyncStatus::Error);
                None
            }
        }
    }

    async fn run_push(&self, owner: &str) -> SyncResult<PushReport> {
        let Some(snapshot) = self.read_snapshot().await? else {
            debug!("No local snapshot, nothing to push");
            return Ok(PushReport::default());
        };

        let now = Utc::now();
        let remote = &self.inner.remote;

        // Items: fatal, strictly sequential batches.
        let rows: Vec<ItemRow> = snapshot
            .items
            .iter()
            .map(|item| ItemRow::for_push(item, owner, now))
            .collect();

        let mut report = PushReport {
            items: rows.len(),
            ..Default::default()
        };

        for (index, batch) in rows.chunks(self.inner.config.batch_size()).enumerate() {
            debug!(batch = index, rows = batch.len(), "Upserting item batch");
            self.call(Table::Items, remote.upsert_items(batch)).await?;
            self.ensure_owner(owner)?;
            report.batches += 1;
        }

        // Profile and pins: non-fatal, concurrent.
        let patch = ProfilePatch::from_snapshot(&snapshot, &self.inner.config.profile_defaults, now);
        let pin_rows: Vec<PinRow> = snapshot
            .pins
            .iter()
            .map(|pin| PinRow::for_push(pin, owner, now))
            .collect();

        let (profile_result, pins_result) = tokio::join!(
            self.call(Table::Profiles, remote.update_profile(owner, &patch)),
            async {
                if pin_rows.is_empty() {
                    return Ok(false);
                }
                self.call(Table::MapPins, remote.upsert_pins(&pin_rows))
                    .await
                    .map(|_| true)
            }
        );
        self.ensure_owner(owner)?;

        report.profile_synced = match profile_result {
            Ok(()) => true,
            Err(e) => {
                warn!(owner = %owner, error = %e, "Profile update failed, continuing");
                false
            }
        };

        report.pins_synced = match pins_result {
            Ok(sent) => sent,
            Err(e) => {
                warn!(owner = %owner, pins = pin_rows.len(), error = %e, "Pin upsert failed, continuing");
                false
            }
        };

        let previous = self.read_metadata().await?;
        self.write_metadata(&SyncMetadata::record_push(previous, owner, now))
            .await?;

        Ok(report)
    }

    // =========================================================================
    // Pull
    // =========================================================================

    /// Pulls the owner's remote rows, merges them into the local snapshot,
    /// persists, and returns the merged snapshot.
    pub async fn pull(&self) -> Option<LocalSnapshot> {
        let _op = self.inner.op_lock.lock().await;

        let Some(owner) = self.owner() else {
            warn!("Pull skipped: no owner");
            return None;
        };

        if !self.is_reachable() {
            info!(owner = %owner, "Pull skipped: offline");
            self.set_status(SyncStatus::Offline);
            return None;
        }

        self.set_status(SyncStatus::Syncing);
        info!(owner = %owner, "Pull started");

        match self.run_pull(&owner).await {
            Ok(snapshot) => {
                info!(
                    owner = %owner,
                    items = snapshot.items.len(),
                    pins = snapshot.pins.len(),
                    "Pull complete"
                );
                self.set_status(SyncStatus::Synced);
                Some(snapshot)
            }
            Err(e) if !self.owner_is(&owner) => {
                info!(owner = %owner, reason = %e, "Pull abandoned: owner changed");
                None
            }
            Err(e) => {
                error!(owner = %owner, error = %e, retryable = e.is_retryable(), "Pull failed");
                self.set_status(SyncStatus::Error);
                None
            }
        }
    }

    async fn run_pull(&self, owner: &str) -> SyncResult<LocalSnapshot> {
        let remote = &self.inner.remote;

        let item_rows = self.call(Table::Items, remote.select_items(owner)).await?;
        self.ensure_owner(owner)?;

        let profile = self
            .call(Table::Profiles, remote.select_profile(owner))
            .await?;
        self.ensure_owner(owner)?;
        if profile.is_none() {
            debug!(owner = %owner, "No remote profile row");
        }

        let pin_rows = self.call(Table::MapPins, remote.select_pins(owner)).await?;
        self.ensure_owner(owner)?;

        let fetched = RemoteState {
            items: item_rows
                .into_iter()
                .filter(|row| row.is_live_for(owner))
                .map(ItemRow::into_item)
                .collect(),
            profile: profile.filter(|p| p.id == owner),
            pins: pin_rows
                .into_iter()
                .filter(|row| row.is_live_for(owner))
                .map(PinRow::into_pin)
                .collect(),
        };

        debug!(
            items = fetched.items.len(),
            pins = fetched.pins.len(),
            "Remote rows fetched"
        );

        let now = Utc::now();
        let merged = {
            let _guard = self.inner.snapshot_lock.lock().await;

            let local = self.read_snapshot().await?.unwrap_or_default();
            let merged = merge_snapshot(
                local,
                fetched,
                self.inner.config.merge_policy(),
                &self.inner.config.profile_defaults,
                now,
            );

            self.ensure_owner(owner)?;
            self.write_snapshot(&merged).await?;
            merged
        };

        let previous = self.read_metadata().await?;
        self.write_metadata(&SyncMetadata::record_pull(previous, owner, now))
            .await?;

        Ok(merged)
    }

    // =========================================================================
    // First-Login Migration
    // =========================================================================

    /// Pushes pre-account local data the first time an owner syncs from
    /// this device. Call before the first pull.
    pub async fn migrate_to_cloud(&self) -> MigrationOutcome {
        let _op = self.inner.op_lock.lock().await;

        let Some(owner) = self.owner() else {
            warn!("Migration skipped: no owner");
            return MigrationOutcome::NoOwner;
        };

        let metadata = match self.read_metadata().await {
            Ok(meta) => meta,
            Err(e) => {
                error!(owner = %owner, error = %e, "Migration failed reading metadata");
                self.set_status(SyncStatus::Error);
                return MigrationOutcome::Failed;
            }
        };

        if metadata.is_some_and(|m| m.belongs_to(&owner)) {
            debug!(owner = %owner, "Already synced for this owner, skipping migration");
            return MigrationOutcome::AlreadyMigrated;
        }

        let has_items = match self.read_snapshot().await {
            Ok(snapshot) => snapshot.is_some_and(|s| !s.items.is_empty()),
            Err(e) => {
                error!(owner = %owner, error = %e, "Migration failed reading snapshot");
                self.set_status(SyncStatus::Error);
                return MigrationOutcome::Failed;
            }
        };

        if !has_items {
            info!(owner = %owner, "No local items to migrate");
            return MigrationOutcome::NothingToMigrate;
        }

        info!(owner = %owner, "Migrating local data to cloud");
        match self.push_locked().await {
            Some(report) => MigrationOutcome::Migrated(report),
            None => MigrationOutcome::Failed,
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_status(&self, status: SyncStatus) {
        let previous = std::mem::replace(&mut self.state().status, status);
        if previous != status {
            debug!(from = %previous, to = %status, "Sync status changed");
        }

        let observer = self
            .inner
            .observer
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        observer.on_status(status);
    }

    fn is_reachable(&self) -> bool {
        self.inner.reachability.is_reachable()
    }

    fn owner_is(&self, owner: &str) -> bool {
        self.state().owner.as_deref() == Some(owner)
    }

    fn ensure_owner(&self, owner: &str) -> SyncResult<()> {
        if self.owner_is(owner) {
            Ok(())
        } else {
            Err(SyncError::OwnerChanged)
        }
    }

    /// Bounds one remote call by the configured timeout.
    async fn call<T, F>(&self, table: Table, call: F) -> SyncResult<T>
    where
        F: Future<Output = SyncResult<T>>,
    {
        let limit = self.inner.config.remote_timeout();
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout {
                table,
                secs: limit.as_secs(),
            }),
        }
    }

    async fn read_snapshot(&self) -> SyncResult<Option<LocalSnapshot>> {
        let key = &self.inner.config.storage.snapshot_key;
        match self.inner.local.read(key).await? {
            Some(blob) => Ok(Some(LocalSnapshot::from_json(&blob)?)),
            None => Ok(None),
        }
    }

    async fn write_snapshot(&self, snapshot: &LocalSnapshot) -> SyncResult<()> {
        let key = &self.inner.config.storage.snapshot_key;
        self.inner.local.write(key, &snapshot.to_json()?).await
    }

    async fn read_metadata(&self) -> SyncResult<Option<SyncMetadata>> {
        let key = &self.inner.config.storage.metadata_key;
        match self.inner.local.read(key).await? {
            Some(blob) => Ok(Some(SyncMetadata::from_json(&blob)?)),
            None => Ok(None),
        }
    }

    async fn write_metadata(&self, metadata: &SyncMetadata) -> SyncResult<()> {
        let key = &self.inner.config.storage.metadata_key;
        self.inner.local.write(key, &metadata.to_json()?).await
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a SyncEngine with options.
pub struct SyncEngineBuilder {
    config: SyncConfig,
    remote: Option<Arc<dyn RemoteTables>>,
    local: Option<Arc<dyn LocalStore>>,
    reachability: Option<Arc<dyn Reachability>>,
    observer: Option<Arc<dyn StatusObserver>>,
}

impl SyncEngineBuilder {
    /// Creates a new builder with the given config.
    pub fn new(config: SyncConfig) -> Self {
        SyncEngineBuilder {
            config,
            remote: None,
            local: None,
            reachability: None,
            observer: None,
        }
    }

    /// Sets the remote tables.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteTables>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Sets the local store.
    pub fn with_local(mut self, local: Arc<dyn LocalStore>) -> Self {
        self.local = Some(local);
        self
    }

    /// Sets the reachability signal. Defaults to always reachable.
    pub fn with_reachability(mut self, reachability: Arc<dyn Reachability>) -> Self {
        self.reachability = Some(reachability);
        self
    }

    /// Sets the status observer.
    pub fn with_observer(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Validates the config and builds the SyncEngine.
    pub fn build(self) -> SyncResult<SyncEngine> {
        let remote = self
            .remote
            .ok_or_else(|| SyncError::InvalidConfig("Remote tables required".into()))?;
        let local = self
            .local
            .ok_or_else(|| SyncError::InvalidConfig("Local store required".into()))?;
        let reachability = self
            .reachability
            .unwrap_or_else(|| Arc::new(AlwaysReachable));

        let engine = SyncEngine::new(self.config, remote, local, reachability)?;
        if let Some(observer) = self.observer {
            engine.set_observer(observer);
        }
        Ok(engine)
    }
}
