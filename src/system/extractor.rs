//! 아카이브 추출 (쓰기 2차 패스)
//!
//! 스캔 결과를 믿지 않고 한도와 경로 검사를 처음부터 다시 한다. 엔트리 하나라도
//! 거부되면 그 아카이브 추출 전체가 실패한다 (이미 쓴 파일은 남는다).

use crate::core::limits::{ExtractLimits, LimitTracker};
use crate::models::scan::InstallPlan;
use crate::system::archive::{stream_entries, ArchiveEntry, ArchiveFormat, EntryKind};
use crate::system::scanner::is_ignored_entry;
use crate::utils::error::{ModKitError, Result};
use crate::utils::path_guard::{entry_segments, resolve_within, strip_top_level};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// 추출 통계
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub files_written: usize,
    pub dirs_created: usize,
    pub bytes_written: u64,
}

/// 폴더 구조를 유지하는 추출 (스킨)
pub fn extract_structured(
    archive_path: &Path,
    format: ArchiveFormat,
    plan: &InstallPlan,
    limits: ExtractLimits,
) -> Result<ExtractStats> {
    let mut tracker = LimitTracker::new(limits);
    let mut stats = ExtractStats::default();
    let dest = plan.install_dir.as_path();

    stream_entries(archive_path, format, |entry, reader| {
        tracker.admit(entry)?;
        if is_ignored_entry(entry) {
            return Ok(());
        }
        reject_links(entry)?;

        let relative = match plan.strip_top_level.as_deref() {
            Some(expected) => {
                let rest = strip_top_level(&entry.path, expected).ok_or_else(|| {
                    ModKitError::NotUnderExpectedFolder {
                        entry: entry.path.clone(),
                        expected: expected.to_string(),
                    }
                })?;
                if rest.is_empty() {
                    if entry.is_dir() {
                        // 떼어낸 최상위 폴더 자신
                        return Ok(());
                    }
                    return Err(ModKitError::UnexpectedRootFile {
                        entry: entry.path.clone(),
                    });
                }
                rest
            }
            None => entry.path.clone(),
        };

        let out_path = resolve_within(dest, &relative).ok_or_else(|| ModKitError::UnsafePath {
            entry: entry.path.clone(),
        })?;

        if entry.is_dir() {
            create_dir(&out_path)?;
            stats.dirs_created += 1;
            return Ok(());
        }

        let written = write_entry(entry, reader, &out_path, &mut tracker)?;
        stats.files_written += 1;
        stats.bytes_written += written;
        Ok(())
    })?;

    Ok(stats)
}

/// 폴더 구조를 무시하고 파일 이름만으로 `dest_dir`에 푸는 추출 (사운드 팩)
///
/// 같은 이름의 파일이 이미 있으면 `force`가 아닐 때 실패한다. 한 아카이브 안에서
/// 이름이 겹치는 경우도 마찬가지다.
pub fn extract_flat(
    archive_path: &Path,
    format: ArchiveFormat,
    dest_dir: &Path,
    force: bool,
    limits: ExtractLimits,
) -> Result<ExtractStats> {
    let mut tracker = LimitTracker::new(limits);
    let mut stats = ExtractStats::default();

    stream_entries(archive_path, format, |entry, reader| {
        tracker.admit(entry)?;
        if is_ignored_entry(entry) || entry.is_dir() {
            return Ok(());
        }
        reject_links(entry)?;

        let segments = entry_segments(&entry.path);
        let Some(file_name) = segments.last().copied() else {
            return Ok(());
        };
        if file_name == ".." {
            return Err(ModKitError::UnsafePath {
                entry: entry.path.clone(),
            });
        }

        let out_path = resolve_within(dest_dir, file_name).ok_or_else(|| {
            ModKitError::UnsafePath {
                entry: entry.path.clone(),
            }
        })?;
        if out_path.exists() && !force {
            return Err(ModKitError::FileExists {
                name: file_name.to_string(),
            });
        }

        let written = write_entry(entry, reader, &out_path, &mut tracker)?;
        stats.files_written += 1;
        stats.bytes_written += written;
        Ok(())
    })?;

    Ok(stats)
}

fn reject_links(entry: &ArchiveEntry) -> Result<()> {
    if entry.kind == EntryKind::Link {
        return Err(ModKitError::UnsupportedEntry {
            entry: entry.path.clone(),
        });
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| ModKitError::ExtractionFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// 엔트리 내용을 파일로 기록하고 실제 기록한 바이트 수를 반환
///
/// 선언 크기 + 여유분까지만 읽는다. 그 뒤에도 데이터가 남아 있으면 선언이
/// 거짓이므로 거부한다.
fn write_entry(
    entry: &ArchiveEntry,
    reader: &mut dyn Read,
    out_path: &Path,
    tracker: &mut LimitTracker,
) -> Result<u64> {
    if let Some(parent) = out_path.parent() {
        create_dir(parent)?;
    }

    let allowance = tracker.entry_allowance(entry);
    let mut out = File::create(out_path).map_err(|source| ModKitError::ExtractionFailed {
        path: out_path.to_path_buf(),
        source,
    })?;
    let mut limited = reader.take(allowance.saturating_add(1));
    let written = io::copy(&mut limited, &mut out).map_err(|source| {
        ModKitError::ExtractionFailed {
            path: out_path.to_path_buf(),
            source,
        }
    })?;

    if written > allowance {
        drop(out);
        let _ = fs::remove_file(out_path);
        return Err(ModKitError::SizeMismatch {
            entry: entry.path.clone(),
            declared: entry.size,
        });
    }
    tracker.record_written(written)?;
    Ok(written)
}
