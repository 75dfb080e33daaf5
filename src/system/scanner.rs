//! 아카이브 스캔 (읽기 전용 1차 패스)
//!
//! 엔트리 헤더만 훑어서 한도를 검사하고 설치 계획에 필요한 구조 정보를
//! 모은다. 디스크에는 아무것도 쓰지 않는다.

use crate::core::limits::{ExtractLimits, LimitTracker};
use crate::models::install::InstallKind;
use crate::models::scan::{ScanResult, ROOT_FILE_SAMPLE_LIMIT};
use crate::system::archive::{walk_entries, ArchiveEntry, ArchiveFormat, EntryKind};
use crate::utils::error::Result;
use crate::utils::path_guard::entry_segments;
use std::path::Path;

/// macOS 압축기가 넣는 리소스 포크 폴더
const METADATA_PREFIX: &str = "__MACOSX";

/// 구조 정보에서 제외할 엔트리인지 (이름이 비었거나 메타데이터 폴더 아래)
///
/// 제외된 엔트리도 한도 계산에는 포함된다. 스캔과 추출이 같은 규칙을 쓴다.
pub fn is_ignored_entry(entry: &ArchiveEntry) -> bool {
    if entry.kind == EntryKind::Special {
        return true;
    }
    match entry_segments(&entry.path).first() {
        None => true,
        Some(first) => *first == METADATA_PREFIX,
    }
}

/// 아카이브를 한 번 훑어 [`ScanResult`] 생성
pub fn scan_archive(
    archive_path: &Path,
    format: ArchiveFormat,
    kind: InstallKind,
    limits: ExtractLimits,
) -> Result<ScanResult> {
    let mut tracker = LimitTracker::new(limits);
    let mut scan = ScanResult::new(format);
    let marker = kind.marker_extension();
    let mut skipped = 0usize;

    walk_entries(archive_path, format, |entry| {
        tracker.admit(entry)?;

        if is_ignored_entry(entry) {
            skipped += 1;
            return Ok(());
        }

        let segments = entry_segments(&entry.path);
        if let Some(top) = segments.first() {
            scan.top_levels.insert((*top).to_string());
        }

        if !entry.is_dir() {
            if segments.len() == 1 {
                scan.has_root_files = true;
                if scan.root_file_samples.len() < ROOT_FILE_SAMPLE_LIMIT {
                    scan.root_file_samples.push(entry.path.clone());
                }
            }
            if entry.path.to_lowercase().ends_with(marker) {
                scan.has_marker = true;
            }
        }
        Ok(())
    })?;

    scan.entry_count = tracker.entry_count();
    scan.declared_bytes = tracker.declared_total();

    if skipped > 0 {
        tracing::debug!(
            archive = %archive_path.display(),
            skipped,
            "skipped metadata entries"
        );
    }
    if !scan.has_marker {
        scan.warnings.push(missing_marker_warning(kind));
    }
    Ok(scan)
}

fn missing_marker_warning(kind: InstallKind) -> String {
    match kind {
        InstallKind::Skin => {
            "No .blk file found in archive (may not be a War Thunder skin, or it is packed with the wrong structure)"
                .to_string()
        }
        InstallKind::Sound => {
            "No .bank file found in archive (may not be a War Thunder sound mod)".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ModKitError;
    use crate::utils::test_fixtures::{write_archive, write_zip};
    use tempfile::tempdir;

    #[test]
    fn test_scan_collects_structure() {
        let temp = tempdir().expect("create tempdir");
        let archive = temp.path().join("pack.zip");
        write_zip(
            &archive,
            &[
                ("Tiger/", None),
                ("Tiger/tiger.blk", Some(b"x".as_slice())),
                ("Tiger/tex/a.dds", Some(b"abcd".as_slice())),
                ("__MACOSX/Tiger/._tiger.blk", Some(b"junk".as_slice())),
            ],
        );

        let scan = scan_archive(&archive, ArchiveFormat::Zip, InstallKind::Skin, ExtractLimits::default())
            .expect("scan");
        assert_eq!(scan.single_top_level(), Some("Tiger"));
        assert!(scan.has_marker);
        assert!(!scan.has_root_files);
        assert!(scan.warnings.is_empty());
        // 메타데이터 엔트리도 한도에는 포함된다
        assert_eq!(scan.entry_count, 4);
        assert_eq!(scan.declared_bytes, 9);
    }

    #[test]
    fn test_scan_reads_solid_7z_and_tar_zst_headers() {
        for (format, ext) in [(ArchiveFormat::SevenZ, "7z"), (ArchiveFormat::TarZst, "tar.zst")] {
            let temp = tempdir().expect("create tempdir");
            let archive = temp.path().join(format!("pack.{ext}"));
            write_archive(
                &archive,
                format,
                &[
                    ("__MACOSX/Tiger/._tiger.blk", b"junk".as_slice()),
                    ("Tiger/tiger.blk", b"x".as_slice()),
                    ("Tiger/tex/a.dds", b"abcd".as_slice()),
                ],
            );

            let scan = scan_archive(&archive, format, InstallKind::Skin, ExtractLimits::default())
                .unwrap_or_else(|e| panic!("scan {ext}: {e}"));
            assert_eq!(scan.single_top_level(), Some("Tiger"), "{ext}");
            assert!(scan.has_marker, "{ext}");
            assert_eq!(scan.entry_count, 3, "{ext}");
            assert_eq!(scan.declared_bytes, 9, "{ext}");
        }
    }

    #[test]
    fn test_scan_root_files_are_sampled() {
        let temp = tempdir().expect("create tempdir");
        let archive = temp.path().join("loose.zip");
        let names: Vec<String> = (0..12).map(|i| format!("file{i:02}.dds")).collect();
        let entries: Vec<(&str, Option<&[u8]>)> = names
            .iter()
            .map(|name| (name.as_str(), Some(b"x".as_slice())))
            .collect();
        write_zip(&archive, &entries);

        let scan = scan_archive(&archive, ArchiveFormat::Zip, InstallKind::Skin, ExtractLimits::default())
            .expect("scan");
        assert!(scan.has_root_files);
        assert_eq!(scan.root_file_samples.len(), ROOT_FILE_SAMPLE_LIMIT);
        assert_eq!(scan.root_file_samples[0], "file00.dds");
        assert_eq!(scan.single_top_level(), None);
        assert!(!scan.has_marker);
        assert_eq!(scan.warnings.len(), 1);
    }

    #[test]
    fn test_scan_sound_marker_is_case_insensitive() {
        let temp = tempdir().expect("create tempdir");
        let archive = temp.path().join("sound.zip");
        write_zip(&archive, &[("banks/Master.BANK", Some(b"fmod".as_slice()))]);

        let scan = scan_archive(&archive, ArchiveFormat::Zip, InstallKind::Sound, ExtractLimits::default())
            .expect("scan");
        assert!(scan.has_marker);
        assert!(scan.warnings.is_empty());
    }

    #[test]
    fn test_scan_enforces_entry_ceiling_even_for_skipped_entries() {
        let temp = tempdir().expect("create tempdir");
        let archive = temp.path().join("many.zip");
        write_zip(
            &archive,
            &[
                ("__MACOSX/a", Some(b"1".as_slice())),
                ("__MACOSX/b", Some(b"2".as_slice())),
                ("__MACOSX/c", Some(b"3".as_slice())),
            ],
        );
        let limits = ExtractLimits {
            max_entries: 2,
            ..ExtractLimits::default()
        };

        let err = scan_archive(&archive, ArchiveFormat::Zip, InstallKind::Skin, limits).unwrap_err();
        assert!(matches!(err, ModKitError::TooManyEntries { limit: 2 }));
    }
}
