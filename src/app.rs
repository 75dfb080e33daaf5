//! 설치 도구 파사드
//!
//! 호스트(CLI, IPC, HTTP 등)는 [`ModKit`]만 통해 코어를 호출한다. 기본 경로와
//! 한도는 [`Settings`]에서 읽어 각 호출에 명시적으로 넘긴다.

use crate::core::settings::Settings;
use crate::models::install::{ArchiveUpload, InstallKind, InstallResult};
use crate::models::installed::{GameFolderReport, InstalledSkin, InstalledSoundMod, RemoveMode};
use crate::system::config_blk::{self, SoundModOutcome, SoundModStatus};
use crate::system::game_folder;
use crate::system::install::{install_skin_archive, install_sound_archive, InstallOptions};
use crate::utils::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

mod batch;

/// 설치 호출 옵션
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequest {
    /// 비어 있으면 설정의 기본 위치 (`UserSkins`, `sound/mod`)
    pub dest_root: Option<PathBuf>,
    pub force: bool,
}

impl InstallRequest {
    pub fn new(dest_root: Option<PathBuf>, force: bool) -> Self {
        Self { dest_root, force }
    }
}

#[derive(Debug, Clone)]
pub struct ModKit {
    settings: Settings,
}

impl ModKit {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn config_path(&self) -> PathBuf {
        self.settings.game_folder.join(&self.settings.config_file)
    }

    /// 요청에 대상 폴더가 없으면 설치 종류별 기본 위치
    fn destination_root(&self, kind: InstallKind, request: &InstallRequest) -> PathBuf {
        match (&request.dest_root, kind) {
            (Some(dest), _) => dest.clone(),
            (None, InstallKind::Skin) => self.settings.skins_root(),
            (None, InstallKind::Sound) => self.settings.sound_mod_root(),
        }
    }

    fn install_one(
        &self,
        kind: InstallKind,
        upload: &ArchiveUpload,
        dest_root: &Path,
        force: bool,
    ) -> Result<InstallResult> {
        let options = InstallOptions {
            dest_root,
            force,
            limits: self.settings.limits,
        };
        match kind {
            InstallKind::Skin => install_skin_archive(&upload.path, &upload.original_name, options),
            InstallKind::Sound => {
                install_sound_archive(&upload.path, &upload.original_name, options)
            }
        }
    }

    // === 단일 아카이브 ===

    /// 스킨 아카이브 하나 설치 (임시 업로드는 결과와 관계없이 삭제)
    pub fn install_skin(
        &self,
        upload: &ArchiveUpload,
        request: &InstallRequest,
    ) -> Result<InstallResult> {
        let dest = self.destination_root(InstallKind::Skin, request);
        let result = self.install_one(InstallKind::Skin, upload, &dest, request.force);
        discard_upload(upload);
        result
    }

    /// 사운드 팩 아카이브 하나 설치
    pub fn install_sound(
        &self,
        upload: &ArchiveUpload,
        request: &InstallRequest,
    ) -> Result<InstallResult> {
        let dest = self.destination_root(InstallKind::Sound, request);
        let result = self.install_one(InstallKind::Sound, upload, &dest, request.force);
        discard_upload(upload);
        result
    }

    // === config.blk ===

    pub fn sound_mod_status(&self) -> Result<SoundModStatus> {
        config_blk::sound_mod_status(&self.config_path())
    }

    pub fn enable_sound_mod(&self) -> Result<SoundModOutcome> {
        config_blk::enable_sound_mod(&self.config_path(), &self.settings.sound_mod_root())
    }

    pub fn disable_sound_mod(&self) -> Result<SoundModOutcome> {
        config_blk::disable_sound_mod(&self.config_path())
    }

    // === 게임 폴더 ===

    pub fn validate_game_folder(&self) -> GameFolderReport {
        game_folder::validate_game_folder(
            &self.settings.game_folder,
            &self.settings.config_file,
            &self.settings.skins_subdir,
        )
    }

    pub fn list_installed_skins(&self) -> Result<Vec<InstalledSkin>> {
        game_folder::list_installed_skins(&self.settings.skins_root())
    }

    pub fn list_installed_sound_mods(&self) -> Result<Vec<InstalledSoundMod>> {
        game_folder::list_installed_sound_mods(&self.settings.sound_mod_root())
    }

    pub fn remove_skin(&self, name: &str, mode: RemoveMode) -> Result<PathBuf> {
        game_folder::remove_installed(&self.settings.skins_root(), name, mode)
    }

    pub fn remove_sound_mod(&self, name: &str, mode: RemoveMode) -> Result<PathBuf> {
        game_folder::remove_installed(&self.settings.sound_mod_root(), name, mode)
    }
}

/// 임시 업로드 사본 삭제 (로컬 파일은 그대로 둔다)
fn discard_upload(upload: &ArchiveUpload) {
    if !upload.temporary {
        return;
    }
    match fs::remove_file(&upload.path) {
        Ok(()) => tracing::debug!(path = %upload.path.display(), "removed temporary upload"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %upload.path.display(),
            error = %e,
            "failed to remove temporary upload"
        ),
    }
}

#[cfg(test)]
mod tests;
