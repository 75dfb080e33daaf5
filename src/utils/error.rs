use crate::utils::formatter::format_file_size;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModKitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    // === 호출 단위 입력 오류 ===
    #[error("Missing archive file(s)")]
    EmptyBatch,

    #[error("File must be an archive (.zip, .7z, .tar, .tar.gz, .tar.zst): {name}")]
    NotAnArchive { name: String },

    // === 리소스 한도 (zip bomb 대응) ===
    #[error("Archive has too many entries (limit {limit})")]
    TooManyEntries { limit: usize },

    #[error("Archive entry too large (limit {limit} bytes, {}): {entry}", size_label(.limit))]
    EntryTooLarge { entry: String, size: u64, limit: u64 },

    #[error("Uncompressed total too large (limit {limit} bytes, {})", size_label(.limit))]
    TotalTooLarge { limit: u64 },

    #[error("Archive entry produced more data than it declared ({declared} bytes): {entry}")]
    SizeMismatch { entry: String, declared: u64 },

    // === 구조 안전성 위반 ===
    #[error("Unsafe path in archive entry: {entry}")]
    UnsafePath { entry: String },

    #[error("Archive entry not under expected folder '{expected}': {entry}")]
    NotUnderExpectedFolder { entry: String, expected: String },

    #[error("Unexpected root file for top-level extraction: {entry}")]
    UnexpectedRootFile { entry: String },

    #[error("Unsupported entry type (link) in archive: {entry}")]
    UnsupportedEntry { entry: String },

    // === 충돌 ===
    #[error("Destination already exists: {} (enable force overwrite)", .path.display())]
    DestinationExists { path: PathBuf },

    #[error("File already exists: {name} (enable force overwrite)")]
    FileExists { name: String },

    // === 아카이브 / 파일 I/O ===
    #[error("Failed to read archive {}: {reason}", .path.display())]
    ArchiveReadFailed { path: PathBuf, reason: String },

    #[error("Failed to extract '{}': {source}", .path.display())]
    ExtractionFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    // === config.blk / 설치 항목 관리 ===
    #[error("config.blk not found at {}; check that the game folder is correct", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Path not found: {}", .path.display())]
    PathNotFound { path: PathBuf },

    #[error("Failed to delete {}: {reason}", .path.display())]
    DeleteFailed { path: PathBuf, reason: String },
}

fn size_label(bytes: &u64) -> String {
    format_file_size(*bytes)
}

pub type Result<T> = std::result::Result<T, ModKitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_messages_name_the_ceiling() {
        let err = ModKitError::EntryTooLarge {
            entry: "big.dds".to_string(),
            size: 600,
            limit: 512 * 1024 * 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("536870912"));
        assert!(msg.contains("512.0 MB"));
        assert!(msg.contains("big.dds"));

        let err = ModKitError::TotalTooLarge {
            limit: 1024 * 1024 * 1024,
        };
        assert!(err.to_string().contains("1.0 GB"));

        let err = ModKitError::TooManyEntries { limit: 5000 };
        assert!(err.to_string().contains("5000"));
    }
}
