//! 스킨 설치 위치 결정
//!
//! 아카이브가 폴더 하나로 감싸져 있으면 그 폴더 이름으로 설치하고 추출 시
//! 최상위 폴더를 떼어낸다. 그 외에는 아카이브 파일 이름으로 새 폴더를 만든다.

use crate::models::scan::{InstallPlan, ScanResult};
use crate::system::archive::display_file_name;
use crate::utils::error::{ModKitError, Result};
use crate::utils::path_guard::{resolve_within, sanitize_name};
use std::path::Path;

/// 스캔 결과와 원래 파일 이름으로 [`InstallPlan`] 생성
///
/// `dest_root`는 절대 경로여야 한다 (호출 측에서 정규화).
pub fn build_install_plan(
    scan: &ScanResult,
    original_name: &str,
    dest_root: &Path,
) -> Result<InstallPlan> {
    let mut warnings = Vec::new();
    if scan.has_root_files {
        warnings.push(format!(
            "Found files at the archive root (skin layout may be unclear): {}",
            scan.root_file_samples.join(", ")
        ));
    }
    warnings.extend(scan.warnings.iter().cloned());
    if scan.top_levels.is_empty() {
        warnings.push("Archive appears to be empty".to_string());
    }

    if let Some(top) = scan.single_top_level() {
        let install_dir =
            resolve_within(dest_root, top).ok_or_else(|| ModKitError::UnsafePath {
                entry: top.to_string(),
            })?;
        return Ok(InstallPlan {
            install_dir,
            strip_top_level: Some(top.to_string()),
            warnings,
        });
    }

    let stem = scan.format.file_stem(display_file_name(original_name));
    let folder = sanitize_name(stem);
    let install_dir = resolve_within(dest_root, &folder)
        .ok_or_else(|| ModKitError::UnsafePath { entry: folder.clone() })?;
    Ok(InstallPlan {
        install_dir,
        strip_top_level: None,
        warnings,
    })
}
