//! 아카이브 포맷 감지와 엔트리 순회
//!
//! 포맷별 라이브러리(zip, tar, 7z)를 감싸서 엔트리를 앞에서부터 한 번씩만
//! 넘겨주는 순회 함수를 제공한다. 방문 함수가 `Err`를 돌려주면 순회는
//! 즉시 멈추고 그 오류가 그대로 전파된다.

use crate::utils::error::{ModKitError, Result};
use flate2::read::GzDecoder;
use sevenz_rust2::Password as SevenZPassword;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tar::{Archive as TarArchive, EntryType};
use zip::ZipArchive;
use zstd::stream::read::Decoder as ZstdDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarZst,
    SevenZ,
}

impl ArchiveFormat {
    /// 이 포맷으로 인식된 파일 이름에서 확장자를 뗀 부분
    pub fn file_stem<'a>(&self, file_name: &'a str) -> &'a str {
        let lower = file_name.to_ascii_lowercase();
        let suffixes: &[&str] = match self {
            ArchiveFormat::Zip => &[".zip"],
            ArchiveFormat::Tar => &[".tar"],
            ArchiveFormat::TarGz => &[".tar.gz", ".tgz"],
            ArchiveFormat::TarZst => &[".tar.zst", ".tzst"],
            ArchiveFormat::SevenZ => &[".7z"],
        };
        suffixes
            .iter()
            .find(|suffix| lower.ends_with(*suffix))
            .map(|suffix| &file_name[..file_name.len() - suffix.len()])
            .unwrap_or(file_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// 심볼릭/하드 링크 (tar 전용)
    Link,
    /// 장치 파일, FIFO, pax 전역 헤더 등 내용이 없는 특수 항목
    Special,
}

/// 아카이브 안의 항목 하나 (순회 중에만 존재)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// `/` 구분자로 정규화된 원본 이름
    pub path: String,
    /// 선언된 비압축 크기
    pub size: u64,
    pub kind: EntryKind,
}

impl ArchiveEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// 업로드 원본 이름(또는 경로)에서 포맷 감지
///
/// 업로드 임시 파일은 확장자가 없을 수 있으므로 사용자가 준 원래 이름으로 판단한다.
pub fn detect_archive_format(name: &str) -> Option<ArchiveFormat> {
    let lower = display_file_name(name).to_ascii_lowercase();
    if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        return Some(ArchiveFormat::TarGz);
    }
    if lower.ends_with(".tar.zst") || lower.ends_with(".tzst") {
        return Some(ArchiveFormat::TarZst);
    }
    match lower.rsplit_once('.')?.1 {
        "zip" => Some(ArchiveFormat::Zip),
        "tar" => Some(ArchiveFormat::Tar),
        "7z" => Some(ArchiveFormat::SevenZ),
        _ => None,
    }
}

/// 브라우저가 넘긴 전체 경로(`C:\fakepath\a.zip`)에서 파일 이름만 추출
pub fn display_file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

pub fn normalize_entry_name(name: &str) -> String {
    name.replace('\\', "/")
}

/// 엔트리 헤더와 내용 스트림을 순서대로 방문
pub fn stream_entries<F>(path: &Path, format: ArchiveFormat, mut visit: F) -> Result<()>
where
    F: FnMut(&ArchiveEntry, &mut dyn Read) -> Result<()>,
{
    match format {
        ArchiveFormat::Zip => stream_zip_entries(path, &mut visit),
        ArchiveFormat::Tar => {
            let file = File::open(path).map_err(ModKitError::Io)?;
            stream_tar_like_entries(TarArchive::new(file), path, &mut visit)
        }
        ArchiveFormat::TarGz => {
            let file = File::open(path).map_err(ModKitError::Io)?;
            stream_tar_like_entries(TarArchive::new(GzDecoder::new(file)), path, &mut visit)
        }
        ArchiveFormat::TarZst => {
            let file = File::open(path).map_err(ModKitError::Io)?;
            let decoder = ZstdDecoder::new(file).map_err(|e| read_failed(path, e))?;
            stream_tar_like_entries(TarArchive::new(decoder), path, &mut visit)
        }
        ArchiveFormat::SevenZ => stream_7z_entries(path, &mut visit),
    }
}

/// 엔트리 헤더만 방문 (내용은 읽지 않음)
pub fn walk_entries<F>(path: &Path, format: ArchiveFormat, mut visit: F) -> Result<()>
where
    F: FnMut(&ArchiveEntry) -> Result<()>,
{
    match format {
        // 7z는 솔리드 블록을 풀어야 스트림이 나오므로 헤더 목록만 따로 읽는다
        ArchiveFormat::SevenZ => walk_7z_entries(path, &mut visit),
        _ => stream_entries(path, format, |entry, _| visit(entry)),
    }
}

fn read_failed(path: &Path, error: impl std::fmt::Display) -> ModKitError {
    ModKitError::ArchiveReadFailed {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

fn stream_zip_entries(
    path: &Path,
    visit: &mut dyn FnMut(&ArchiveEntry, &mut dyn Read) -> Result<()>,
) -> Result<()> {
    let file = File::open(path).map_err(ModKitError::Io)?;
    let mut archive = ZipArchive::new(file).map_err(|e| read_failed(path, e))?;

    for idx in 0..archive.len() {
        let mut entry = archive.by_index(idx).map_err(|e| read_failed(path, e))?;
        let info = ArchiveEntry {
            path: normalize_entry_name(entry.name()),
            size: entry.size(),
            kind: if entry.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
        };
        visit(&info, &mut entry)?;
    }
    Ok(())
}

fn stream_tar_like_entries<R: Read>(
    mut archive: TarArchive<R>,
    src: &Path,
    visit: &mut dyn FnMut(&ArchiveEntry, &mut dyn Read) -> Result<()>,
) -> Result<()> {
    for entry_result in archive.entries().map_err(|e| read_failed(src, e))? {
        let mut entry = entry_result.map_err(|e| read_failed(src, e))?;
        let entry_type = entry.header().entry_type();
        let name = normalize_entry_name(&String::from_utf8_lossy(&entry.path_bytes()));

        let kind = match entry_type {
            EntryType::Directory => EntryKind::Directory,
            EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => {
                // 오래된 tar는 디렉토리를 일반 파일 + 끝의 `/`로 기록한다
                if name.ends_with('/') {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                }
            }
            EntryType::Symlink | EntryType::Link => EntryKind::Link,
            other => {
                tracing::debug!(entry = %name, kind = ?other, "special tar entry");
                EntryKind::Special
            }
        };
        let info = ArchiveEntry {
            path: name,
            size: entry.size(),
            kind,
        };
        visit(&info, &mut entry)?;
    }
    Ok(())
}

fn walk_7z_entries(path: &Path, visit: &mut dyn FnMut(&ArchiveEntry) -> Result<()>) -> Result<()> {
    let file = File::open(path).map_err(ModKitError::Io)?;
    let reader = sevenz_rust2::SevenZReader::new(file, SevenZPassword::empty())
        .map_err(|e| read_failed(path, e))?;

    for entry in &reader.archive().files {
        let info = ArchiveEntry {
            path: normalize_entry_name(&entry.name),
            size: entry.size,
            kind: if entry.is_directory {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
        };
        visit(&info)?;
    }
    Ok(())
}

fn stream_7z_entries(
    path: &Path,
    visit: &mut dyn FnMut(&ArchiveEntry, &mut dyn Read) -> Result<()>,
) -> Result<()> {
    let file = File::open(path).map_err(ModKitError::Io)?;
    // 콜백은 sevenz 오류 타입만 돌려줄 수 있으므로 우리 오류는 따로 보관하고 순회를 멈춘다
    let mut stopped: Option<ModKitError> = None;

    let mut extract_fn = |entry: &sevenz_rust2::SevenZArchiveEntry,
                          reader: &mut dyn Read,
                          _output_path: &PathBuf|
     -> std::result::Result<bool, sevenz_rust2::Error> {
        let info = ArchiveEntry {
            path: normalize_entry_name(&entry.name),
            size: entry.size,
            kind: if entry.is_directory {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
        };
        // 솔리드 블록은 디코더 하나를 공유한다: 방문 함수가 남긴 내용은 여기서 버린다
        let visited = visit(&info, reader).and_then(|()| {
            io::copy(reader, &mut io::sink())
                .map(|_| ())
                .map_err(|e| read_failed(path, e))
        });
        match visited {
            Ok(()) => Ok(true),
            Err(e) => {
                stopped = Some(e);
                Ok(false)
            }
        }
    };

    // 출력 경로 인자는 콜백에서 쓰지 않는다 (쓰기는 전부 호출 측에서 검사 후 수행)
    let scratch = std::env::temp_dir();
    let result = sevenz_rust2::decompress_with_extract_fn(file, &scratch, &mut extract_fn);

    if let Some(error) = stopped {
        return Err(error);
    }
    result.map_err(|e| read_failed(path, e))
}
