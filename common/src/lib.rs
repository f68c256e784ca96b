pub mod config;
pub mod summary;
pub mod util;

/// Stem of the summary log written next to the fio result documents.
pub const SUMMARY_STEM: &str = "fio_summary";
/// Extension of the summary log (JSON Lines).
pub const SUMMARY_EXTENSION: &str = "jsonl";
