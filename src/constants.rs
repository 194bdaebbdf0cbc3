/// HTTP path every node exposes its system telemetry on
pub const API_SYSTEM_INFO_PATH: &str = "/api/system/info";

/// Per-probe timeout for the full subnet scan
pub const SCAN_TIMEOUT_MS: u64 = 1000;

/// Per-probe timeout for re-validating already known nodes
pub const REFRESH_TIMEOUT_MS: u64 = 2000;

/// Port nodes serve their HTTP API on
pub const DEFAULT_NODE_PORT: u16 = 80;

/// Host part range probed inside a /24
pub const FIRST_HOST: u8 = 1;
pub const LAST_HOST: u8 = 255;

/// Keys used with the persistence collaborator
pub const KEY_SAVED_BASE_IP: &str = "savedBaseIP";
pub const KEY_STORED_RESULTS: &str = "storedResults";

/// Difficulty suffixes in ascending order, each step is a factor of 1000
pub const DIFFICULTY_SUFFIXES: [&str; 6] = ["", "k", "M", "G", "T", "P"];

/// Telemetry body fields recognised by the probe
pub mod fields {
    pub const HASH_RATE_1H: &str = "hashRate_1h";
    pub const HASH_RATE: &str = "hashRate";
    pub const TEMPERATURE: &str = "temp";
    pub const POWER: &str = "power";
    pub const BEST_DIFF: &str = "bestDiff";
}
