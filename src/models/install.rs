//! 설치 요청/결과 모델
//!
//! 호스트(CLI 등)로 그대로 내보내는 구조체는 camelCase JSON으로 직렬화된다.

use serde::Serialize;
use std::path::PathBuf;

/// 설치 종류 (마커 확장자와 추출 방식이 달라진다)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallKind {
    /// 폴더 구조를 유지하는 스킨 설치
    Skin,
    /// 파일만 평탄하게 푸는 사운드 팩 설치
    Sound,
}

impl InstallKind {
    /// 이 종류의 아카이브라면 들어 있어야 할 확장자
    pub fn marker_extension(&self) -> &'static str {
        match self {
            InstallKind::Skin => ".blk",
            InstallKind::Sound => ".bank",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InstallKind::Skin => "skin",
            InstallKind::Sound => "sound mod",
        }
    }
}

/// 설치 대상 아카이브 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveUpload {
    /// 실제로 읽을 파일 경로
    pub path: PathBuf,
    /// 사용자가 준 원래 파일 이름 (포맷 감지와 폴더 이름에만 사용)
    pub original_name: String,
    /// 업로드 임시 사본이면 처리 후 삭제
    pub temporary: bool,
}

impl ArchiveUpload {
    /// 로컬 파일 그대로 (삭제하지 않음)
    pub fn local(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let original_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            original_name,
            temporary: false,
        }
    }

    /// 업로드로 받은 임시 파일
    pub fn temporary(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
            temporary: true,
        }
    }
}

/// 아카이브 하나의 설치 성공 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallResult {
    pub file: String,
    pub installed_path: PathBuf,
    pub used_destination_root: PathBuf,
    pub warnings: Vec<String>,
}

/// 아카이브 하나의 설치 실패
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallError {
    pub file: String,
    pub error: String,
}

/// 배치 설치 결과 (results + errors = 입력 개수)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub results: Vec<InstallResult>,
    pub errors: Vec<InstallError>,
    pub used_destination_root: PathBuf,
}

impl BatchReport {
    pub fn new(used_destination_root: PathBuf) -> Self {
        Self {
            results: Vec::new(),
            errors: Vec::new(),
            used_destination_root,
        }
    }

    pub fn processed(&self) -> usize {
        self.results.len() + self.errors.len()
    }
}

/// 배치 진행 이벤트 (아카이브 처리 직전마다 전송)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallProgressEvent {
    /// 1부터 시작
    pub current: usize,
    pub total: usize,
    pub file: String,
    pub percent: u8,
}

impl InstallProgressEvent {
    pub fn new(current: usize, total: usize, file: impl Into<String>) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((current * 100) / total).min(100) as u8
        };
        Self {
            current,
            total,
            file: file.into(),
            percent,
        }
    }
}
