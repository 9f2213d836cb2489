//! Background threads for the CPU-heavy pixel algorithms.
//!
//! One long-lived thread per [`JobKind`] (each index composite is its own
//! kind). Every submitted job gets a
//! generation number; submitting a new job of a kind supersedes whatever
//! was outstanding for that kind. Superseded jobs are skipped by the thread
//! if they have not started yet, and their results are rejected by the pool
//! if they have. Jobs that stay outstanding past the timeout are abandoned
//! the same way.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use rslabel_raster::{IndexKind, NormType, RawScene, Rgba8Raster};
use web_time::{Duration, Instant};

use crate::error::EditorError;
use crate::kmeans::{self, Clustering};
use crate::pixel_buffer::PixelBuffer;
use crate::tools::{FillRequest, flood_fill};

/// Algorithm families; at most one job of each kind is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// True-colour normalization
    Normalize,
    /// One index composite
    Index(IndexKind),
    /// Bucket fill
    BucketFill,
    /// k-means discretization
    Kmeans,
}

impl JobKind {
    /// Get all job kinds.
    pub fn all() -> &'static [JobKind] {
        &[
            JobKind::Normalize,
            JobKind::Index(IndexKind::Ndvi),
            JobKind::Index(IndexKind::Ndwi),
            JobKind::Index(IndexKind::Agriculture),
            JobKind::BucketFill,
            JobKind::Kmeans,
        ]
    }

    /// Thread / log name.
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Normalize => "normalize",
            JobKind::Index(IndexKind::Ndvi) => "ndvi",
            JobKind::Index(IndexKind::Ndwi) => "ndwi",
            JobKind::Index(IndexKind::Agriculture) => "agriculture",
            JobKind::BucketFill => "bucket-fill",
            JobKind::Kmeans => "kmeans",
        }
    }
}

/// Work to run off the editor thread.
#[derive(Debug, Clone)]
pub enum Job {
    /// Render the Source Image
    Normalize {
        /// Scene to render
        scene: Arc<RawScene>,
        /// Stretch strategy
        norm: NormType,
    },
    /// Render an index composite
    Index {
        /// Scene to render
        scene: Arc<RawScene>,
        /// Composite to compute
        kind: IndexKind,
    },
    /// Grow and paint a bucket fill region
    BucketFill(Box<FillRequest>),
    /// Cluster pixel colours
    Kmeans {
        /// RGB of every pixel
        pixels: Vec<[u8; 3]>,
        /// Requested cluster count
        k: usize,
        /// Initialization seed
        seed: u64,
    },
}

impl Job {
    /// Kind of this job.
    pub fn kind(&self) -> JobKind {
        match self {
            Job::Normalize { .. } => JobKind::Normalize,
            Job::Index { kind, .. } => JobKind::Index(*kind),
            Job::BucketFill(_) => JobKind::BucketFill,
            Job::Kmeans { .. } => JobKind::Kmeans,
        }
    }

    fn run(self) -> Result<JobOutput, String> {
        match self {
            Job::Normalize { scene, norm } => scene
                .render_true_color(norm)
                .map(JobOutput::Image)
                .map_err(|e| e.to_string()),
            Job::Index { scene, kind } => scene
                .render_index(kind)
                .map(JobOutput::Image)
                .map_err(|e| e.to_string()),
            Job::BucketFill(request) => Ok(JobOutput::Buffer(flood_fill(&request))),
            Job::Kmeans { pixels, k, seed } => {
                Ok(JobOutput::Clusters(kmeans::cluster(&pixels, k, seed)))
            }
        }
    }
}

/// Payload of a finished job.
#[derive(Debug, Clone)]
pub enum JobOutput {
    /// Rendered raster (normalize / index)
    Image(Rgba8Raster),
    /// Updated layer buffer (bucket fill)
    Buffer(PixelBuffer),
    /// Cluster assignment (k-means)
    Clusters(Clustering),
}

/// A finished job as delivered to the editor.
#[derive(Debug, Clone)]
pub struct JobResult {
    /// Job kind
    pub kind: JobKind,
    /// Generation the job was submitted with
    pub generation: u64,
    /// Layer the result is meant for
    pub target: String,
    /// Output, or the error text of a failed job
    pub output: Result<JobOutput, String>,
}

struct WorkRequest {
    generation: u64,
    target: String,
    job: Job,
}

enum ThreadMessage {
    Job(WorkRequest),
    Shutdown,
}

struct WorkerThread {
    request_tx: Sender<ThreadMessage>,
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerThread {
    fn spawn(kind: JobKind, result_tx: Sender<JobResult>) -> Result<Self, EditorError> {
        let (request_tx, request_rx) = mpsc::channel::<ThreadMessage>();
        let latest = Arc::new(AtomicU64::new(0));
        let thread_latest = Arc::clone(&latest);

        let handle = thread::Builder::new()
            .name(format!("{}-worker", kind.name()))
            .spawn(move || {
                log::debug!("{} worker started", kind.name());
                Self::thread_loop(kind, request_rx, result_tx, thread_latest);
                log::debug!("{} worker exiting", kind.name());
            })
            .map_err(|e| EditorError::WorkerSpawn {
                kind: kind.name(),
                message: e.to_string(),
            })?;

        Ok(Self {
            request_tx,
            latest,
            handle: Some(handle),
        })
    }

    fn thread_loop(
        kind: JobKind,
        request_rx: Receiver<ThreadMessage>,
        result_tx: Sender<JobResult>,
        latest: Arc<AtomicU64>,
    ) {
        loop {
            match request_rx.recv() {
                Ok(ThreadMessage::Job(request)) => {
                    if request.generation < latest.load(Ordering::Acquire) {
                        log::debug!(
                            "{} job {} superseded before start",
                            kind.name(),
                            request.generation
                        );
                        continue;
                    }
                    let output = request.job.run();
                    let result = JobResult {
                        kind,
                        generation: request.generation,
                        target: request.target,
                        output,
                    };
                    if result_tx.send(result).is_err() {
                        log::warn!("Result channel closed, {} worker exiting", kind.name());
                        break;
                    }
                }
                Ok(ThreadMessage::Shutdown) => {
                    log::debug!("{} worker received shutdown signal", kind.name());
                    break;
                }
                Err(_) => break,
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    generation: u64,
    target: String,
    started: Instant,
}

/// Owns one worker thread per job kind and filters their results.
pub struct WorkerPool {
    workers: HashMap<JobKind, WorkerThread>,
    result_rx: Receiver<JobResult>,
    pending: HashMap<JobKind, Pending>,
    next_generation: u64,
    timeout: Duration,
}

impl WorkerPool {
    /// Spawn one thread per job kind.
    pub fn spawn(timeout: Duration) -> Result<Self, EditorError> {
        let (result_tx, result_rx) = mpsc::channel::<JobResult>();
        let mut workers = HashMap::new();
        for &kind in JobKind::all() {
            workers.insert(kind, WorkerThread::spawn(kind, result_tx.clone())?);
        }
        log::info!("Spawned {} worker threads", workers.len());

        Ok(Self {
            workers,
            result_rx,
            pending: HashMap::new(),
            next_generation: 0,
            timeout,
        })
    }

    /// Submit a job whose result is meant for layer `target`.
    ///
    /// Supersedes any outstanding job of the same kind. Returns the job's
    /// generation.
    pub fn submit(&mut self, job: Job, target: &str) -> u64 {
        let kind = job.kind();
        self.next_generation += 1;
        let generation = self.next_generation;

        let Some(worker) = self.workers.get(&kind) else {
            log::error!("No {} worker available", kind.name());
            return generation;
        };
        worker.latest.store(generation, Ordering::Release);
        if let Some(previous) = self.pending.get(&kind) {
            log::debug!(
                "{} job {} superseded by {}",
                kind.name(),
                previous.generation,
                generation
            );
        }

        let request = WorkRequest {
            generation,
            target: target.to_string(),
            job,
        };
        if worker.request_tx.send(ThreadMessage::Job(request)).is_err() {
            log::error!("Failed to send {} job: channel closed", kind.name());
            self.pending.remove(&kind);
            return generation;
        }

        self.pending.insert(
            kind,
            Pending {
                generation,
                target: target.to_string(),
                started: Instant::now(),
            },
        );
        log::debug!("Sent {} job {} for '{}'", kind.name(), generation, target);
        generation
    }

    /// Abandon the outstanding job of a kind.
    pub fn cancel(&mut self, kind: JobKind) {
        if let Some(pending) = self.pending.remove(&kind) {
            log::debug!("{} job {} cancelled", kind.name(), pending.generation);
            if let Some(worker) = self.workers.get(&kind) {
                worker.latest.store(pending.generation + 1, Ordering::Release);
            }
        }
    }

    /// Abandon every outstanding job.
    pub fn cancel_all(&mut self) {
        for &kind in JobKind::all() {
            self.cancel(kind);
        }
    }

    /// True if a job of this kind is outstanding.
    pub fn is_pending(&self, kind: JobKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Number of outstanding jobs.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Target layer of the outstanding job of a kind.
    pub fn pending_target(&self, kind: JobKind) -> Option<&str> {
        self.pending.get(&kind).map(|p| p.target.as_str())
    }

    /// Take every current result that has arrived. Non-blocking.
    pub fn poll(&mut self) -> Vec<JobResult> {
        let mut results = Vec::new();
        loop {
            match self.result_rx.try_recv() {
                Ok(result) => results.extend(self.accept(result)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Worker result channel disconnected");
                    break;
                }
            }
        }
        self.expire();
        results
    }

    /// Block until every outstanding job has delivered or `max_wait` elapsed.
    pub fn wait(&mut self, max_wait: Duration) -> Vec<JobResult> {
        let deadline = Instant::now() + max_wait;
        let mut results = Vec::new();

        while !self.pending.is_empty() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.result_rx.recv_timeout(deadline - now) {
                Ok(result) => results.extend(self.accept(result)),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("Worker result channel disconnected");
                    break;
                }
            }
            self.expire();
        }
        results
    }

    fn accept(&mut self, result: JobResult) -> Option<JobResult> {
        let current = self
            .pending
            .get(&result.kind)
            .is_some_and(|p| p.generation == result.generation);
        if !current {
            log::warn!(
                "Discarding stale {} result (generation {})",
                result.kind.name(),
                result.generation
            );
            return None;
        }
        self.pending.remove(&result.kind);
        Some(result)
    }

    fn expire(&mut self) {
        let timeout = self.timeout;
        let expired: Vec<JobKind> = self
            .pending
            .iter()
            .filter(|(_, p)| p.started.elapsed() > timeout)
            .map(|(&kind, _)| kind)
            .collect();
        for kind in expired {
            log::warn!(
                "{} job timed out after {:?}, abandoning",
                kind.name(),
                timeout
            );
            self.cancel(kind);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        log::debug!("Shutting down worker threads");
        for worker in self.workers.values() {
            let _ = worker.request_tx.send(ThreadMessage::Shutdown);
        }
        for (kind, worker) in self.workers.iter_mut() {
            if let Some(handle) = worker.handle.take() {
                if let Err(e) = handle.join() {
                    log::warn!("{} worker panicked: {:?}", kind.name(), e);
                }
            }
        }
    }
}
