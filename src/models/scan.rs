//! 스캔/설치 계획 모델

use crate::system::archive::ArchiveFormat;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// 루트 파일 샘플 최대 개수
pub const ROOT_FILE_SAMPLE_LIMIT: usize = 10;

/// 아카이브 한 개를 읽기 전용으로 훑은 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub format: ArchiveFormat,
    /// 서로 다른 최상위 세그먼트
    pub top_levels: BTreeSet<String>,
    /// 아카이브 루트에 파일이 바로 있는지
    pub has_root_files: bool,
    pub root_file_samples: Vec<String>,
    /// 마커 확장자(`.blk` / `.bank`) 발견 여부
    pub has_marker: bool,
    /// 한도 검사에 포함된 엔트리 수 (건너뛴 엔트리 포함)
    pub entry_count: usize,
    pub declared_bytes: u64,
    pub warnings: Vec<String>,
}

impl ScanResult {
    pub fn new(format: ArchiveFormat) -> Self {
        Self {
            format,
            top_levels: BTreeSet::new(),
            has_root_files: false,
            root_file_samples: Vec::new(),
            has_marker: false,
            entry_count: 0,
            declared_bytes: 0,
            warnings: Vec::new(),
        }
    }

    /// 최상위 폴더 하나로 감싸진 아카이브면 그 이름
    pub fn single_top_level(&self) -> Option<&str> {
        if self.top_levels.len() == 1 && !self.has_root_files {
            self.top_levels.iter().next().map(String::as_str)
        } else {
            None
        }
    }
}

/// 스킨 설치 위치 결정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// 절대 경로
    pub install_dir: PathBuf,
    /// 추출 시 떼어낼 최상위 폴더 이름
    pub strip_top_level: Option<String>,
    pub warnings: Vec<String>,
}
