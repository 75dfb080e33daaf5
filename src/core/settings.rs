//! 사용자 설정 (TOML)
//!
//! 게임 폴더 기본값과 리소스 한도는 모두 여기서 읽어 각 호출에 명시적으로
//! 넘긴다. 모듈 전역 상태는 두지 않는다.

use crate::core::limits::ExtractLimits;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 설정 파일 경로를 덮어쓰는 환경 변수
pub const SETTINGS_ENV_VAR: &str = "WT_MODKIT_SETTINGS_FILE";

const APP_DIR_NAME: &str = "wt-modkit";
const SETTINGS_FILE_NAME: &str = "settings.toml";
const GAME_DIR_NAME: &str = "War Thunder";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 게임 설치 폴더
    pub game_folder: PathBuf,
    /// 스킨 설치 위치 (게임 폴더 기준)
    pub skins_subdir: PathBuf,
    /// 사운드 모드 설치 위치 (게임 폴더 기준)
    pub sound_mod_subdir: PathBuf,
    /// 게임 설정 파일 이름
    pub config_file: String,
    pub limits: ExtractLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_folder: default_game_folder(),
            skins_subdir: PathBuf::from("UserSkins"),
            sound_mod_subdir: Path::new("sound").join("mod"),
            config_file: "config.blk".to_string(),
            limits: ExtractLimits::default(),
        }
    }
}

impl Settings {
    /// 설정 파일 로드 (파일이 없으면 기본값)
    pub fn load() -> Result<Self, anyhow::Error> {
        match settings_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// TOML 파일에서 설정 로드
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// 게임 폴더를 바꾼 사본
    pub fn with_game_folder(mut self, game_folder: impl Into<PathBuf>) -> Self {
        self.game_folder = game_folder.into();
        self
    }

    pub fn skins_root(&self) -> PathBuf {
        self.game_folder.join(&self.skins_subdir)
    }

    pub fn sound_mod_root(&self) -> PathBuf {
        self.game_folder.join(&self.sound_mod_subdir)
    }
}

/// 설정 파일 위치
///
/// 우선순위: 환경 변수 > `<config_dir>/wt-modkit/settings.toml`
pub fn settings_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var(SETTINGS_ENV_VAR) {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// 플랫폼별 Steam 기본 라이브러리 안의 게임 폴더
fn default_game_folder() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\Program Files (x86)\\Steam\\steamapps\\common").join(GAME_DIR_NAME)
    } else {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Steam")
            .join("steamapps")
            .join("common")
            .join(GAME_DIR_NAME)
    }
}
