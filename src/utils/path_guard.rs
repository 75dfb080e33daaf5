//! 경로 안전 검사 (zip-slip 방지)
//!
//! 아카이브에서 나온 이름은 전부 신뢰할 수 없는 입력으로 취급한다.
//! 디스크에 쓰는 모든 경로는 [`resolve_within`]을 통과해야 한다.

use std::path::{Component, Path, PathBuf};

/// 정리 결과가 비었을 때 쓰는 폴더 이름
pub const FALLBACK_NAME: &str = "skin";

/// 폴더 이름으로 쓸 수 있도록 문자열 정리
///
/// `[A-Za-z0-9._ -]` 이외의 문자는 `_`로 바꾸고, 앞쪽의 공백과 `.`, 뒤쪽 공백을
/// 제거한다. 결과는 `.`으로 시작하지 않으며, 비면 [`FALLBACK_NAME`]을 반환한다.
///
/// # Examples
/// ```
/// use wt_modkit::utils::path_guard::sanitize_name;
///
/// assert_eq!(sanitize_name("Tiger II (camo)"), "Tiger II _camo_");
/// assert_eq!(sanitize_name("..hidden"), "hidden");
/// assert_eq!(sanitize_name("   "), "skin");
/// ```
pub fn sanitize_name(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|ch| if is_allowed_name_char(ch) { ch } else { '_' })
        .collect();

    let cleaned = replaced
        .trim_start_matches(|ch: char| ch == '.' || ch.is_whitespace())
        .trim_end();
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

fn is_allowed_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | ' ' | '-')
}

/// 아카이브 상대 경로를 `base_dir` 아래의 절대 경로로 변환
///
/// `..` 세그먼트나 드라이브 문자(`C:`)로 시작하는 세그먼트가 있으면 `None`.
/// 결과는 항상 `base_dir` 자신이거나 그 하위 경로이다.
pub fn resolve_within(base_dir: &Path, relative: &str) -> Option<PathBuf> {
    let normalized = relative.replace('\\', "/");
    let mut segments = Vec::new();
    for segment in normalized.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if segment == ".." || has_drive_prefix(segment) {
            return None;
        }
        segments.push(segment);
    }

    let base = absolute_normalized(base_dir)?;
    let mut out = base.clone();
    for segment in segments {
        out.push(segment);
    }

    if out.starts_with(&base) {
        Some(out)
    } else {
        None
    }
}

/// `C:`, `d:foo` 처럼 드라이브 문자로 시작하는 세그먼트인지 확인
fn has_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// 절대 경로로 만들고 `.` / `..` 을 어휘적으로 정리
pub fn absolute_normalized(path: &Path) -> Option<PathBuf> {
    let absolute = std::path::absolute(path).ok()?;
    let mut result = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            other => result.push(other.as_os_str()),
        }
    }
    Some(result)
}

/// 아카이브 엔트리 이름을 `/` 구분 세그먼트로 분리 (빈 세그먼트와 `.` 제외)
pub fn entry_segments(name: &str) -> Vec<&str> {
    name.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// 예상한 최상위 폴더를 떼어낸 나머지 경로
///
/// 첫 세그먼트가 `expected`가 아니면 `None`, 폴더 자신이면 빈 문자열.
pub fn strip_top_level(name: &str, expected: &str) -> Option<String> {
    let segments = entry_segments(name);
    match segments.split_first() {
        None => Some(String::new()),
        Some((first, rest)) if *first == expected => Some(rest.join("/")),
        Some(_) => None,
    }
}
