//! 게임 폴더 검증과 설치 항목 관리

use crate::models::installed::{GameFolderReport, InstalledSkin, InstalledSoundMod, RemoveMode};
use crate::utils::error::{ModKitError, Result};
use crate::utils::formatter::format_timestamp;
use crate::utils::path_guard::{absolute_normalized, resolve_within};
use std::cmp::Reverse;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 게임 폴더 판별에 쓰는 실행 파일 (앞에서부터 검사)
pub const GAME_EXECUTABLES: &[&str] = &["aces.exe", "aces_BE.exe", "launcher.exe"];

/// 게임 폴더 구성 확인
///
/// 실행 파일이 하나라도 있어야 유효하다. 설정 파일이나 스킨 폴더가 없는 것은
/// 경고로만 알린다.
pub fn validate_game_folder(
    folder: &Path,
    config_file: &str,
    skins_subdir: &Path,
) -> GameFolderReport {
    let mut report = GameFolderReport {
        valid: false,
        message: String::new(),
        path: folder.to_path_buf(),
        has_executable: false,
        executable_name: None,
        has_config: false,
        has_user_skins: false,
        has_sound_folder: false,
        warnings: Vec::new(),
    };

    if !folder.is_dir() {
        report.message = "Folder does not exist".to_string();
        return report;
    }

    report.executable_name = GAME_EXECUTABLES
        .iter()
        .find(|name| folder.join(name).is_file())
        .map(|name| name.to_string());
    report.has_executable = report.executable_name.is_some();
    report.has_config = folder.join(config_file).is_file();
    report.has_user_skins = folder.join(skins_subdir).is_dir();
    report.has_sound_folder = folder.join("sound").is_dir();

    let Some(exe) = report.executable_name.as_deref() else {
        report.message = format!(
            "War Thunder executable not found ({})",
            GAME_EXECUTABLES.join(", ")
        );
        return report;
    };

    report.valid = true;
    report.message = format!("Valid War Thunder folder (found {exe})");
    if !report.has_config {
        report
            .warnings
            .push(format!("{config_file} not found (the game may not have been started yet)"));
    }
    if !report.has_user_skins {
        report.warnings.push(format!(
            "{} folder not found (it will be created on first install)",
            skins_subdir.display()
        ));
    }
    report
}

/// 설치된 스킨 폴더 목록 (최근 수정 순)
///
/// 루트 폴더가 없으면 빈 목록.
pub fn list_installed_skins(skins_root: &Path) -> Result<Vec<InstalledSkin>> {
    let mut skins = Vec::new();
    for (path, modified) in read_children(skins_root, |meta| meta.is_dir())? {
        let has_blk = fs::read_dir(&path)?.filter_map(|e| e.ok()).any(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .ends_with(".blk")
        });
        skins.push((
            modified,
            InstalledSkin {
                name: file_name_of(&path),
                size: directory_size(&path)?,
                has_blk,
                modified_at: format_timestamp(modified),
                path,
            },
        ));
    }
    skins.sort_by_key(|(modified, _)| Reverse(*modified));
    Ok(skins.into_iter().map(|(_, skin)| skin).collect())
}

/// 설치된 `.bank` 파일 목록 (최근 수정 순)
pub fn list_installed_sound_mods(sound_root: &Path) -> Result<Vec<InstalledSoundMod>> {
    let mut mods = Vec::new();
    for (path, modified) in read_children(sound_root, |meta| meta.is_file())? {
        let name = file_name_of(&path);
        if !name.to_lowercase().ends_with(".bank") {
            continue;
        }
        let size = fs::metadata(&path)?.len();
        mods.push((
            modified,
            InstalledSoundMod {
                name,
                modified_at: format_timestamp(modified),
                size,
                path,
            },
        ));
    }
    mods.sort_by_key(|(modified, _)| Reverse(*modified));
    Ok(mods.into_iter().map(|(_, item)| item).collect())
}

/// 설치 항목 하나 삭제
///
/// `name`은 `root` 바로 아래 항목이어야 한다. 반환값: 삭제한 경로
pub fn remove_installed(root: &Path, name: &str, mode: RemoveMode) -> Result<PathBuf> {
    let unsafe_name = || ModKitError::UnsafePath {
        entry: name.to_string(),
    };
    let base = absolute_normalized(root).ok_or_else(unsafe_name)?;
    let target = resolve_within(&base, name).ok_or_else(unsafe_name)?;
    if target.parent() != Some(base.as_path()) {
        return Err(unsafe_name());
    }

    let metadata = match fs::symlink_metadata(&target) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ModKitError::PathNotFound { path: target });
        }
        Err(e) => return Err(ModKitError::Io(e)),
    };

    let delete_failed = |e: &dyn std::fmt::Display| ModKitError::DeleteFailed {
        path: target.clone(),
        reason: e.to_string(),
    };
    match mode {
        RemoveMode::Trash => trash::delete(&target).map_err(|e| delete_failed(&e))?,
        RemoveMode::Permanent if metadata.is_dir() => {
            fs::remove_dir_all(&target).map_err(|e| delete_failed(&e))?
        }
        RemoveMode::Permanent => fs::remove_file(&target).map_err(|e| delete_failed(&e))?,
    }

    tracing::info!(path = %target.display(), mode = ?mode, "removed installed item");
    Ok(target)
}

/// 조건에 맞는 하위 항목과 수정 시각 (루트가 없으면 빈 목록)
fn read_children(
    root: &Path,
    keep: impl Fn(&fs::Metadata) -> bool,
) -> Result<Vec<(PathBuf, SystemTime)>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ModKitError::Io(e)),
    };

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !keep(&metadata) {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        children.push((entry.path(), modified));
    }
    Ok(children)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 디렉토리 아래 파일 크기 합계 (심볼릭 링크는 따라가지 않음)
fn directory_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let metadata = fs::symlink_metadata(entry.path())?;
        if metadata.is_dir() {
            total += directory_size(&entry.path())?;
        } else if metadata.is_file() {
            total += metadata.len();
        }
    }
    Ok(total)
}
