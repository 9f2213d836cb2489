//! Global constants for rslabel

/// Name of the true-colour reference layer
pub const SOURCE_IMAGE_LAYER: &str = "Source Image";

/// Prefix shared by all paintable layers (`Drawing Layer N`)
pub const DRAWING_LAYER_PREFIX: &str = "Drawing Layer";

/// Layer reported by colour lookups when nothing opaque is found
pub const FIRST_DRAWING_LAYER: &str = "Drawing Layer 1";

/// Colour reported by colour lookups when nothing opaque is found
pub const DEFAULT_HEX_COLOR: &str = "#000000";

/// Default brush edge length in pixels
pub const DEFAULT_PEN_SIZE: u32 = 10;

/// Largest brush edge length accepted
pub const MAX_PEN_SIZE: u32 = 1024;

/// Default bucket fill tolerance (Euclidean RGB distance)
pub const DEFAULT_BUCKET_TOLERANCE: f64 = 80.0;

/// Default number of history checkpoints kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default cluster count for discretization
pub const DEFAULT_KMEANS_K: usize = 6;

/// Upper bound on clusters (k-means labels are stored as `u8`)
pub const MAX_KMEANS_K: usize = 255;

/// k-means iteration cap
pub const KMEANS_MAX_ITERATIONS: usize = 20;

/// k-means convergence threshold
pub const KMEANS_CONVERGENCE: f32 = 1e-4;

/// Default time after which an outstanding worker job is abandoned
pub const DEFAULT_WORKER_TIMEOUT_MS: u64 = 30_000;
