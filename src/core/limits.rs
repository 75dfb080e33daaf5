//! 아카이브 리소스 한도 (zip bomb 대응)
//!
//! 한도는 아카이브가 선언한 비압축 크기를 기준으로 검사한다. 스캔과 추출은
//! 같은 입력을 두 번 읽는 별도 패스이므로 각 패스가 [`LimitTracker`]를
//! 새로 만들어 독립적으로 검사한다.

use crate::system::archive::ArchiveEntry;
use crate::utils::error::{ModKitError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ENTRIES: usize = 5000;
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 512 * 1024 * 1024;
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 1024 * 1024 * 1024;

/// 실제로 쓴 바이트가 선언 크기를 넘어도 허용하는 여유분
pub const MEASURED_SLACK_BYTES: u64 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractLimits {
    pub max_entries: usize,
    pub max_entry_bytes: u64,
    pub max_total_bytes: u64,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
        }
    }
}

/// 한 패스 동안의 누적 카운터
///
/// 메타데이터 폴더(`__MACOSX/`)나 이름이 빈 엔트리도 건너뛰기 전에 반드시
/// [`admit`](Self::admit)을 거친다. 그래야 한도 자체를 우회할 수 없다.
#[derive(Debug)]
pub struct LimitTracker {
    limits: ExtractLimits,
    entries: usize,
    declared_total: u64,
    written_total: u64,
}

impl LimitTracker {
    pub fn new(limits: ExtractLimits) -> Self {
        Self {
            limits,
            entries: 0,
            declared_total: 0,
            written_total: 0,
        }
    }

    /// 엔트리 하나를 받아들이기 전에 개수/단일 크기/누적 크기 검사
    pub fn admit(&mut self, entry: &ArchiveEntry) -> Result<()> {
        self.entries += 1;
        if self.entries > self.limits.max_entries {
            return Err(ModKitError::TooManyEntries {
                limit: self.limits.max_entries,
            });
        }

        if entry.size > self.limits.max_entry_bytes {
            return Err(ModKitError::EntryTooLarge {
                entry: entry.path.clone(),
                size: entry.size,
                limit: self.limits.max_entry_bytes,
            });
        }

        self.declared_total = self.declared_total.saturating_add(entry.size);
        if self.declared_total > self.limits.max_total_bytes {
            return Err(ModKitError::TotalTooLarge {
                limit: self.limits.max_total_bytes,
            });
        }
        Ok(())
    }

    /// 실제 기록된 바이트 누적 (선언값을 믿지 않는 2차 검사)
    pub fn record_written(&mut self, bytes: u64) -> Result<()> {
        self.written_total = self.written_total.saturating_add(bytes);
        if self.written_total > self.limits.max_total_bytes {
            return Err(ModKitError::TotalTooLarge {
                limit: self.limits.max_total_bytes,
            });
        }
        Ok(())
    }

    /// 엔트리 하나에 허용되는 최대 기록 바이트
    pub fn entry_allowance(&self, entry: &ArchiveEntry) -> u64 {
        entry
            .size
            .saturating_add(MEASURED_SLACK_BYTES)
            .min(self.limits.max_entry_bytes.saturating_add(MEASURED_SLACK_BYTES))
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn declared_total(&self) -> u64 {
        self.declared_total
    }

    pub fn written_total(&self) -> u64 {
        self.written_total
    }
}
