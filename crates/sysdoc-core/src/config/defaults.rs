//! Default values for every config section.

// Chunking
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1024;
pub const DEFAULT_OVERLAP_CHARS: usize = 0;

// Extraction
pub const DEFAULT_LINK_ENDPOINT_RESOURCES: bool = true;

// Retrieval
pub const DEFAULT_FAN_OUT: usize = 2;
pub const DEFAULT_DENSE_WEIGHT: f64 = 0.7;
pub const DEFAULT_SPARSE_WEIGHT: f64 = 0.3;
pub const DEFAULT_BM25_K1: f64 = 1.2;
pub const DEFAULT_BM25_B: f64 = 0.75;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MAX_TOP_K: usize = 20;

// Rerank
pub const DEFAULT_RERANK_TOP_N: usize = 20;
pub const DEFAULT_RERANK_BATCH_SIZE: usize = 8;
pub const DEFAULT_RERANK_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_COOLDOWN_SECS: u64 = 30;

// Cross-reference
pub const DEFAULT_MAX_EXTRA_PER_RESULT: usize = 3;
pub const DEFAULT_MIN_RELEVANCE: f64 = 0.2;

// Embedding
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_QUERY_CACHE_SIZE: u64 = 10_000;

// Index
pub const DEFAULT_CONSISTENCY_CHECK_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_WRITE_GRACE_MS: u64 = 250;

// Observability
pub const DEFAULT_LOG_LEVEL: &str = "info";
