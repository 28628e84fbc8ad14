// Shared animation cache with a background loader
//
// Config files are loaded at most once per path. Loading runs on a single
// worker thread; the update loop calls `poll` to install finished tables.
// Until then every handle onto that file reports "not loaded yet".

use super::loader::AssetLoader;
use super::table::{AnimationTable, ClipSet, FrameSource};
use super::AssetError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;

/// Progress of one config file load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Ready,
    /// The file was missing or malformed; the table is empty
    Failed,
}

/// One config file: load status plus the table once it exists
#[derive(Debug)]
struct ConfigSlot {
    path: PathBuf,
    status: Mutex<LoadStatus>,
    table: OnceLock<Arc<AnimationTable>>,
}

impl ConfigSlot {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            status: Mutex::new(LoadStatus::Pending),
            table: OnceLock::new(),
        }
    }

    fn status(&self) -> LoadStatus {
        self.status
            .lock()
            .map(|status| *status)
            .unwrap_or(LoadStatus::Failed)
    }

    /// Install a load result. The first result wins.
    fn install(&self, result: Result<AnimationTable, AssetError>) {
        let (table, status) = match result {
            Ok(table) => (table, LoadStatus::Ready),
            Err(e) => {
                log::warn!("Animation config {} unavailable: {}", self.path.display(), e);
                (AnimationTable::empty(), LoadStatus::Failed)
            }
        };

        if self.table.set(Arc::new(table)).is_err() {
            return;
        }
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
        log::info!("Animation config {} -> {:?}", self.path.display(), status);
    }
}

/// Handle onto one preset of a (possibly still loading) config file
///
/// Cheap to clone; every entity of a preset holds one.
#[derive(Debug, Clone)]
pub struct PresetHandle {
    slot: Arc<ConfigSlot>,
    preset: Arc<str>,
}

impl PresetHandle {
    /// Handle onto an in-memory preset that is available immediately
    pub fn ready(preset: &str, clips: ClipSet) -> Self {
        let slot = ConfigSlot::new(PathBuf::from(format!("<memory:{}>", preset)));
        slot.install(Ok(AnimationTable::empty().with_preset(preset, clips)));
        Self {
            slot: Arc::new(slot),
            preset: Arc::from(preset),
        }
    }

    /// Handle whose table never arrives
    pub fn pending(preset: &str) -> Self {
        Self {
            slot: Arc::new(ConfigSlot::new(PathBuf::from(format!("<pending:{}>", preset)))),
            preset: Arc::from(preset),
        }
    }

    /// Clips of this preset, or `None` while the config is still loading
    /// (or when the config does not define the preset)
    pub fn clips(&self) -> Option<Arc<ClipSet>> {
        self.slot.table.get()?.preset(&self.preset)
    }

    pub fn name(&self) -> &str {
        &self.preset
    }

    pub fn status(&self) -> LoadStatus {
        self.slot.status()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.table.get().is_some()
    }
}

/// Completion handle returned by [`AnimationCache::load`]
#[derive(Debug, Clone)]
pub struct LoadTicket {
    slot: Arc<ConfigSlot>,
}

impl LoadTicket {
    pub fn status(&self) -> LoadStatus {
        self.slot.status()
    }

    /// True once the load finished, successfully or not
    pub fn is_done(&self) -> bool {
        self.status() != LoadStatus::Pending
    }

    pub fn table(&self) -> Option<Arc<AnimationTable>> {
        self.slot.table.get().cloned()
    }

    pub fn path(&self) -> &Path {
        &self.slot.path
    }
}

struct LoadJob {
    slot: Arc<ConfigSlot>,
}

struct LoadOutcome {
    slot: Arc<ConfigSlot>,
    result: Result<AnimationTable, AssetError>,
}

/// Process-wide cache of animation tables keyed by config path
pub struct AnimationCache {
    slots: Mutex<HashMap<PathBuf, Arc<ConfigSlot>>>,
    jobs: Option<Sender<LoadJob>>,
    outcomes: Receiver<LoadOutcome>,
    worker: Option<JoinHandle<()>>,
    loader: AssetLoader,
    frames: Arc<dyn FrameSource>,
}

impl AnimationCache {
    /// Create the cache and start its loader worker
    pub fn init(loader: AssetLoader, frames: Arc<dyn FrameSource>) -> Result<Self, AssetError> {
        let (job_tx, job_rx) = unbounded::<LoadJob>();
        let (outcome_tx, outcome_rx) = unbounded::<LoadOutcome>();

        let worker_loader = loader.clone();
        let worker_frames = Arc::clone(&frames);
        let worker = std::thread::Builder::new()
            .name("animation-loader".to_string())
            .spawn(move || {
                for job in job_rx.iter() {
                    let result = load_table(&worker_loader, worker_frames.as_ref(), &job.slot.path);
                    if outcome_tx.send(LoadOutcome { slot: job.slot, result }).is_err() {
                        break;
                    }
                }
                log::debug!("Animation loader worker stopped");
            })
            .map_err(AssetError::WorkerSpawn)?;

        Ok(Self {
            slots: Mutex::new(HashMap::new()),
            jobs: Some(job_tx),
            outcomes: outcome_rx,
            worker: Some(worker),
            loader,
            frames,
        })
    }

    /// Start loading a config file unless it is already loading or loaded
    pub fn load<P: AsRef<Path>>(&self, path: P) -> LoadTicket {
        let (slot, is_new) = self.slot_for(path.as_ref());

        if is_new {
            let queued = self
                .jobs
                .as_ref()
                .map(|jobs| jobs.send(LoadJob { slot: Arc::clone(&slot) }).is_ok())
                .unwrap_or(false);
            if !queued {
                // Worker gone: load inline rather than leave the slot pending forever
                slot.install(load_table(&self.loader, self.frames.as_ref(), &slot.path));
            }
        }

        LoadTicket { slot }
    }

    /// Handle onto `preset` from the config at `path`, starting the load if needed
    pub fn lookup_or_load<P: AsRef<Path>>(&self, path: P, preset: &str) -> PresetHandle {
        let ticket = self.load(path);
        PresetHandle {
            slot: ticket.slot,
            preset: Arc::from(preset),
        }
    }

    /// Load a config file on the calling thread and wait for it
    pub fn load_blocking<P: AsRef<Path>>(&self, path: P) -> LoadTicket {
        let (slot, is_new) = self.slot_for(path.as_ref());

        if is_new {
            slot.install(load_table(&self.loader, self.frames.as_ref(), &slot.path));
        } else {
            // Already queued on the worker: drain results until ours lands
            while slot.status() == LoadStatus::Pending {
                match self.outcomes.recv() {
                    Ok(outcome) => outcome.slot.install(outcome.result),
                    Err(_) => break,
                }
            }
        }

        LoadTicket { slot }
    }

    /// Install every finished load. Never blocks; returns how many were installed.
    pub fn poll(&self) -> usize {
        let mut installed = 0;
        for outcome in self.outcomes.try_iter() {
            outcome.slot.install(outcome.result);
            installed += 1;
        }
        installed
    }

    /// Number of config files known to the cache
    pub fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop the worker and drop every table the cache owns
    ///
    /// Handles held by entities keep their tables alive until they are dropped.
    pub fn teardown(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Animation loader worker panicked");
            }
        }
        if let Ok(mut slots) = self.slots.lock() {
            slots.clear();
        }
    }

    fn slot_for(&self, path: &Path) -> (Arc<ConfigSlot>, bool) {
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(slot) = slots.get(path) {
            return (Arc::clone(slot), false);
        }

        let slot = Arc::new(ConfigSlot::new(path.to_path_buf()));
        slots.insert(path.to_path_buf(), Arc::clone(&slot));
        (slot, true)
    }
}

impl Drop for AnimationCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load_table(
    loader: &AssetLoader,
    frames: &dyn FrameSource,
    path: &Path,
) -> Result<AnimationTable, AssetError> {
    let json = loader.load_text(path)?;
    AnimationTable::parse(&json, &path.to_string_lossy(), frames)
}
