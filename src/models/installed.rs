//! 게임 폴더에 이미 설치된 항목 모델

use serde::Serialize;
use std::path::PathBuf;

/// 게임 폴더 검증 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFolderReport {
    pub valid: bool,
    pub message: String,
    pub path: PathBuf,
    pub has_executable: bool,
    pub executable_name: Option<String>,
    pub has_config: bool,
    pub has_user_skins: bool,
    pub has_sound_folder: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledSkin {
    pub name: String,
    pub path: PathBuf,
    /// 폴더 바로 아래에 `.blk` 파일이 있는지
    pub has_blk: bool,
    /// RFC 3339 (로컬 시간)
    pub modified_at: String,
    /// 하위 파일 전체 크기 (바이트)
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledSoundMod {
    pub name: String,
    pub path: PathBuf,
    pub modified_at: String,
    pub size: u64,
}

/// 설치 항목 삭제 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveMode {
    /// 휴지통으로 이동
    Trash,
    /// 영구 삭제
    Permanent,
}
