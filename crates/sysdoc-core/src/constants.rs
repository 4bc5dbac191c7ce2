/// sysdoc system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix for content-derived chunk identifiers.
pub const CHUNK_ID_PREFIX: &str = "chk_";

/// Number of hex characters kept from the blake3 digest in a chunk id.
pub const CHUNK_ID_HEX_LEN: usize = 24;

/// Separator used when several leaves are accumulated into one chunk.
pub const LEAF_SEPARATOR: &str = "\n";

/// Separator used when rendering a section path as a single line.
pub const SECTION_PATH_SEPARATOR: &str = " > ";

/// Maximum number of candidates a single query may ask for.
pub const MAX_TOP_K: usize = 100;

/// Number of primary scores averaged into the answer confidence.
pub const CONFIDENCE_TOP_N: usize = 3;
