//! 아카이브 하나 설치 (스캔 → 계획 → 추출)

use crate::core::limits::ExtractLimits;
use crate::models::install::{InstallKind, InstallResult};
use crate::system::archive::{detect_archive_format, display_file_name, ArchiveFormat};
use crate::system::extractor::{extract_flat, extract_structured};
use crate::system::planner::build_install_plan;
use crate::system::scanner::scan_archive;
use crate::utils::error::{ModKitError, Result};
use crate::utils::path_guard::absolute_normalized;
use std::fs;
use std::path::{Path, PathBuf};

/// 설치 요청 공통 옵션
#[derive(Debug, Clone, Copy)]
pub struct InstallOptions<'a> {
    pub dest_root: &'a Path,
    /// 기존 설치 폴더/파일 덮어쓰기
    pub force: bool,
    pub limits: ExtractLimits,
}

/// 원래 파일 이름으로 포맷 확인 (아카이브가 아니면 호출 단위 오류)
pub fn require_archive_format(original_name: &str) -> Result<ArchiveFormat> {
    detect_archive_format(original_name).ok_or_else(|| ModKitError::NotAnArchive {
        name: display_file_name(original_name).to_string(),
    })
}

/// 대상 루트를 절대 경로로 만들고 생성
pub fn prepare_destination_root(dest_root: &Path) -> Result<PathBuf> {
    let dest = absolute_normalized(dest_root).ok_or_else(|| ModKitError::PathNotFound {
        path: dest_root.to_path_buf(),
    })?;
    fs::create_dir_all(&dest)?;
    Ok(dest)
}

/// 스킨 아카이브 하나를 `dest_root/<폴더>`에 설치
///
/// 설치 폴더가 이미 있으면 `force`일 때만 통째로 지우고 다시 푼다 (병합하지 않음).
pub fn install_skin_archive(
    archive_path: &Path,
    original_name: &str,
    options: InstallOptions<'_>,
) -> Result<InstallResult> {
    let format = require_archive_format(original_name)?;
    let dest = prepare_destination_root(options.dest_root)?;

    let scan = scan_archive(archive_path, format, InstallKind::Skin, options.limits)?;
    let plan = build_install_plan(&scan, original_name, &dest)?;

    if plan.install_dir.exists() {
        if !options.force {
            return Err(ModKitError::DestinationExists {
                path: plan.install_dir.clone(),
            });
        }
        tracing::debug!(path = %plan.install_dir.display(), "clearing existing install folder");
        if plan.install_dir.is_dir() {
            fs::remove_dir_all(&plan.install_dir)?;
        } else {
            fs::remove_file(&plan.install_dir)?;
        }
    }
    fs::create_dir_all(&plan.install_dir)?;

    let stats = extract_structured(archive_path, format, &plan, options.limits)?;

    for warning in &plan.warnings {
        tracing::warn!(archive = %original_name, "{warning}");
    }
    tracing::info!(
        archive = %original_name,
        installed = %plan.install_dir.display(),
        files = stats.files_written,
        bytes = stats.bytes_written,
        "installed skin"
    );

    Ok(InstallResult {
        file: display_file_name(original_name).to_string(),
        installed_path: plan.install_dir,
        used_destination_root: dest,
        warnings: plan.warnings,
    })
}

/// 사운드 팩 아카이브 하나를 `dest_root`에 평탄하게 설치
///
/// 루트 폴더 충돌 검사는 없고 파일 단위 충돌만 추출기가 판단한다.
pub fn install_sound_archive(
    archive_path: &Path,
    original_name: &str,
    options: InstallOptions<'_>,
) -> Result<InstallResult> {
    let format = require_archive_format(original_name)?;
    let dest = prepare_destination_root(options.dest_root)?;

    let scan = scan_archive(archive_path, format, InstallKind::Sound, options.limits)?;
    let stats = extract_flat(archive_path, format, &dest, options.force, options.limits)?;

    for warning in &scan.warnings {
        tracing::warn!(archive = %original_name, "{warning}");
    }
    tracing::info!(
        archive = %original_name,
        installed = %dest.display(),
        files = stats.files_written,
        "installed sound mod"
    );

    Ok(InstallResult {
        file: display_file_name(original_name).to_string(),
        installed_path: dest.clone(),
        used_destination_root: dest,
        warnings: scan.warnings,
    })
}
