//! config.blk 플래그 패치
//!
//! 완전한 BLK 파서가 아니라 필요한 부분만 찾아 바꾸는 텍스트 패치이다.
//! 지원하는 문법:
//! - 섹션: `이름 { ... }` (이름 앞은 단어 경계, 중괄호 사이 공백/줄바꿈 허용).
//!   본문은 첫 번째 `}`에서 끝나므로 중첩 블록이 있는 섹션은 그 앞부분만 본다.
//! - 불리언 키: `key:b=yes` / `key:b=no` (대소문자 무시, `:`와 `=` 주변 공백 허용).
//!
//! 바꾸는 대상 바이트 외의 내용은 그대로 둔다. 원본 백업(`config.blk.backup`)은
//! 없을 때 한 번만 만든다.

use crate::utils::error::{ModKitError, Result};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const BACKUP_SUFFIX: &str = ".backup";

/// 섹션 안의 불리언 키 하나
#[derive(Debug)]
pub struct BlkFlag {
    pub section: &'static str,
    pub key: &'static str,
    /// 섹션을 새로 만들 때 키 앞에 함께 넣는 기본 줄
    pub section_defaults: &'static [&'static str],
    matcher: OnceLock<FlagMatcher>,
}

/// `sound { enable_mod:b=yes }`
pub static SOUND_MOD_FLAG: BlkFlag = BlkFlag {
    section: "sound",
    key: "enable_mod",
    section_defaults: &["fmod_sound_enable:b=yes", "speakerMode:t=\"auto\""],
    matcher: OnceLock::new(),
};

/// 텍스트 패치 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagPatch {
    /// 이미 원하는 값이거나 끌 대상이 없음
    Unchanged,
    Patched(String),
}

/// 플래그 하나에 대한 섹션/키 패턴
#[derive(Debug)]
struct FlagMatcher {
    section: Regex,
    key: Regex,
}

impl FlagMatcher {
    fn new(section: &str, key: &str) -> Result<Self> {
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| ModKitError::Config(e.to_string()))
        };
        Ok(Self {
            section: compile(format!(r"(?s)\b{}\s*\{{([^}}]*)\}}", regex::escape(section)))?,
            key: compile(format!(r"(?i)\b{}\s*:\s*b\s*=\s*(yes|no)\b", regex::escape(key)))?,
        })
    }

    /// 섹션 본문의 바이트 범위
    fn find_section(&self, content: &str) -> Option<Range<usize>> {
        self.section
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|body| body.range())
    }

    /// 섹션 본문 안에서 키 값(`yes`/`no`)의 바이트 범위와 현재 값
    fn find_key_value(&self, body: &str) -> Option<(Range<usize>, bool)> {
        self.key.captures(body).and_then(|caps| caps.get(1)).map(|value| {
            let enabled = value.as_str().eq_ignore_ascii_case("yes");
            (value.range(), enabled)
        })
    }
}

impl BlkFlag {
    /// 패턴은 플래그마다 처음 쓸 때 한 번만 컴파일한다
    fn matcher(&self) -> Result<&FlagMatcher> {
        if let Some(matcher) = self.matcher.get() {
            return Ok(matcher);
        }
        let built = FlagMatcher::new(self.section, self.key)?;
        Ok(self.matcher.get_or_init(|| built))
    }
}

/// 현재 플래그 값 (섹션이나 키가 없으면 `false`)
pub fn read_flag(content: &str, flag: &BlkFlag) -> Result<bool> {
    let matcher = flag.matcher()?;
    let Some(section) = matcher.find_section(content) else {
        return Ok(false);
    };
    Ok(matcher
        .find_key_value(&content[section])
        .map(|(_, enabled)| enabled)
        .unwrap_or(false))
}

/// 플래그를 `value`로 맞춘 새 텍스트 계산
///
/// - 키가 있으면 값 부분만 바꾼다.
/// - 섹션은 있는데 키가 없으면 본문 끝(뒤쪽 공백 앞)에 키 줄을 넣는다.
/// - 섹션이 없으면 파일 끝에 새 섹션을 붙인다. 기존 내용은 그대로 앞부분으로 남는다.
///
/// 끄는 경우 키나 섹션이 없으면 바꿀 것이 없다.
pub fn patch_flag(content: &str, flag: &BlkFlag, value: bool) -> Result<FlagPatch> {
    let literal = if value { "yes" } else { "no" };
    let matcher = flag.matcher()?;

    let Some(section) = matcher.find_section(content) else {
        if !value {
            return Ok(FlagPatch::Unchanged);
        }
        let mut patched = String::with_capacity(content.len() + 128);
        patched.push_str(content);
        if !patched.is_empty() && !patched.ends_with('\n') {
            patched.push('\n');
        }
        patched.push('\n');
        patched.push_str(&new_section_block(flag));
        return Ok(FlagPatch::Patched(patched));
    };

    let body = &content[section.clone()];
    match matcher.find_key_value(body) {
        Some((_, current)) if current == value => Ok(FlagPatch::Unchanged),
        Some((range, _)) => {
            let start = section.start + range.start;
            let end = section.start + range.end;
            Ok(FlagPatch::Patched(format!(
                "{}{}{}",
                &content[..start],
                literal,
                &content[end..]
            )))
        }
        None if !value => Ok(FlagPatch::Unchanged),
        None => {
            let kept = body.trim_end();
            let tail = &body[kept.len()..];
            let mut new_body = format!("{kept}\n  {}:b={literal}", flag.key);
            if !tail.contains('\n') {
                new_body.push('\n');
            }
            new_body.push_str(tail);
            Ok(FlagPatch::Patched(format!(
                "{}{}{}",
                &content[..section.start],
                new_body,
                &content[section.end..]
            )))
        }
    }
}

fn new_section_block(flag: &BlkFlag) -> String {
    let mut block = format!("{}{{\n", flag.section);
    for line in flag.section_defaults {
        block.push_str("  ");
        block.push_str(line);
        block.push('\n');
    }
    block.push_str(&format!("  {}:b=yes\n}}\n", flag.key));
    block
}

/// `config.blk` → `config.blk.backup`
pub fn backup_path_for(config_path: &Path) -> PathBuf {
    let mut name = config_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(BACKUP_SUFFIX);
    config_path.with_file_name(name)
}

/// 사운드 모드 상태 조회 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundModStatus {
    pub exists: bool,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
}

/// 사운드 모드 켜기/끄기 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundModOutcome {
    pub message: String,
    pub config_path: PathBuf,
    /// 이번 호출에서 파일을 고쳤을 때만 채워진다
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_folder_path: Option<PathBuf>,
    /// 이미 원하는 상태여서 아무것도 쓰지 않음
    pub unchanged: bool,
}

/// 설정 파일이 없으면 `exists: false` (오류 아님)
pub fn sound_mod_status(config_path: &Path) -> Result<SoundModStatus> {
    if !config_path.is_file() {
        return Ok(SoundModStatus {
            exists: false,
            enabled: false,
            config_path: None,
        });
    }
    let content = fs::read_to_string(config_path)?;
    Ok(SoundModStatus {
        exists: true,
        enabled: read_flag(&content, &SOUND_MOD_FLAG)?,
        config_path: Some(config_path.to_path_buf()),
    })
}

/// 사운드 모드 켜기: 설정 패치 후 `mod_folder` 생성
pub fn enable_sound_mod(config_path: &Path, mod_folder: &Path) -> Result<SoundModOutcome> {
    match apply_flag(config_path, &SOUND_MOD_FLAG, true)? {
        None => {
            tracing::debug!(config = %config_path.display(), "sound mod already enabled");
            Ok(SoundModOutcome {
                message: "Sound mod is already enabled".to_string(),
                config_path: config_path.to_path_buf(),
                backup_path: None,
                mod_folder_path: None,
                unchanged: true,
            })
        }
        Some(backup_path) => {
            fs::create_dir_all(mod_folder)?;
            tracing::info!(
                config = %config_path.display(),
                mod_folder = %mod_folder.display(),
                "sound mod enabled"
            );
            Ok(SoundModOutcome {
                message: "Sound mod enabled: config.blk updated and sound/mod folder created"
                    .to_string(),
                config_path: config_path.to_path_buf(),
                backup_path: Some(backup_path),
                mod_folder_path: Some(mod_folder.to_path_buf()),
                unchanged: false,
            })
        }
    }
}

/// 사운드 모드 끄기 (설치된 사운드 파일은 건드리지 않는다)
pub fn disable_sound_mod(config_path: &Path) -> Result<SoundModOutcome> {
    match apply_flag(config_path, &SOUND_MOD_FLAG, false)? {
        None => {
            tracing::debug!(config = %config_path.display(), "sound mod already disabled");
            Ok(SoundModOutcome {
                message: "Sound mod is already disabled".to_string(),
                config_path: config_path.to_path_buf(),
                backup_path: None,
                mod_folder_path: None,
                unchanged: true,
            })
        }
        Some(backup_path) => {
            tracing::info!(config = %config_path.display(), "sound mod disabled");
            Ok(SoundModOutcome {
                message: "Sound mod disabled: config.blk updated".to_string(),
                config_path: config_path.to_path_buf(),
                backup_path: Some(backup_path),
                mod_folder_path: None,
                unchanged: false,
            })
        }
    }
}

/// 파일에 플래그 적용. 실제로 썼으면 백업 경로, 바꿀 것이 없으면 `None`.
fn apply_flag(config_path: &Path, flag: &BlkFlag, value: bool) -> Result<Option<PathBuf>> {
    if !config_path.is_file() {
        return Err(ModKitError::ConfigNotFound {
            path: config_path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(config_path)?;
    let FlagPatch::Patched(patched) = patch_flag(&content, flag, value)? else {
        return Ok(None);
    };

    let backup_path = backup_path_for(config_path);
    if !backup_path.exists() {
        fs::copy(config_path, &backup_path)?;
        tracing::info!(backup = %backup_path.display(), "config backup created");
    }
    fs::write(config_path, patched)?;
    Ok(Some(backup_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn patched(content: &str, value: bool) -> String {
        match patch_flag(content, &SOUND_MOD_FLAG, value).expect("patch") {
            FlagPatch::Patched(text) => text,
            FlagPatch::Unchanged => panic!("expected a change for {content:?}"),
        }
    }

    #[test]
    fn test_read_flag() {
        assert!(read_flag("sound{\n  enable_mod:b=yes\n}\n", &SOUND_MOD_FLAG).expect("read"));
        assert!(read_flag("sound {\n  Enable_Mod : b = YES\n}", &SOUND_MOD_FLAG).expect("read"));
        assert!(!read_flag("sound{\n  enable_mod:b=no\n}", &SOUND_MOD_FLAG).expect("read"));
        assert!(!read_flag("graphics{\n  enable_mod:b=yes\n}", &SOUND_MOD_FLAG).expect("read"));
        assert!(!read_flag("", &SOUND_MOD_FLAG).expect("read"));
    }

    #[test]
    fn test_flag_patterns_are_compiled_once() {
        let first = SOUND_MOD_FLAG.matcher().expect("compile");
        let second = SOUND_MOD_FLAG.matcher().expect("reuse");
        assert!(std::ptr::eq(first, second));
        assert!(first.find_section("sound{}").is_some());
    }

    #[test]
    fn test_section_name_needs_word_boundary() {
        let content = "fmod_sound{\n  enable_mod:b=yes\n}\n";
        assert!(!read_flag(content, &SOUND_MOD_FLAG).expect("read"));
    }

    #[test]
    fn test_flip_no_to_yes_changes_only_the_value() {
        let content = "video{\n  vsync:b=no\n}\nsound{\n  volume:r=0.5\n  enable_mod : b = no\n}\n";
        let out = patched(content, true);
        assert_eq!(
            out,
            "video{\n  vsync:b=no\n}\nsound{\n  volume:r=0.5\n  enable_mod : b = yes\n}\n"
        );
    }

    #[test]
    fn test_missing_key_is_appended_inside_section() {
        let content = "sound{\n  volume:r=0.5\n}\nafter{}\n";
        let out = patched(content, true);
        assert_eq!(out, "sound{\n  volume:r=0.5\n  enable_mod:b=yes\n}\nafter{}\n");

        let out = patched("sound{}", true);
        assert_eq!(out, "sound{\n  enable_mod:b=yes\n}");
    }

    #[test]
    fn test_missing_section_appends_block_after_original_bytes() {
        let content = "graphics{\n  hdr:b=no\n}";
        let out = patched(content, true);
        assert!(out.starts_with(content));
        assert_eq!(
            &out[content.len()..],
            "\n\nsound{\n  fmod_sound_enable:b=yes\n  speakerMode:t=\"auto\"\n  enable_mod:b=yes\n}\n"
        );
        assert!(read_flag(&out, &SOUND_MOD_FLAG).expect("read"));
    }

    #[test]
    fn test_already_set_is_unchanged() {
        let content = "sound{\n  enable_mod:b=yes\n}\n";
        assert_eq!(
            patch_flag(content, &SOUND_MOD_FLAG, true).expect("patch"),
            FlagPatch::Unchanged
        );
        assert_eq!(
            patch_flag("misc{}\n", &SOUND_MOD_FLAG, false).expect("patch"),
            FlagPatch::Unchanged
        );
    }

    #[test]
    fn test_disable_rewrites_yes_to_no() {
        let out = patched("sound{\n  enable_mod:b=yes\n}\n", false);
        assert_eq!(out, "sound{\n  enable_mod:b=no\n}\n");
    }

    #[test]
    fn test_enable_twice_backs_up_once() {
        let temp = tempdir().expect("create tempdir");
        let config = temp.path().join("config.blk");
        let mod_folder = temp.path().join("sound").join("mod");
        let original = "sound{\n  enable_mod:b=no\n}\n";
        fs::write(&config, original).expect("write config");

        let first = enable_sound_mod(&config, &mod_folder).expect("first enable");
        assert!(!first.unchanged);
        assert!(mod_folder.is_dir());
        let backup = backup_path_for(&config);
        assert_eq!(first.backup_path.as_deref(), Some(backup.as_path()));
        assert_eq!(fs::read_to_string(&backup).expect("backup"), original);

        let second = enable_sound_mod(&config, &mod_folder).expect("second enable");
        assert!(second.unchanged);
        assert!(second.message.contains("already enabled"));
        assert_eq!(fs::read_to_string(&backup).expect("backup"), original);
        assert!(sound_mod_status(&config).expect("status").enabled);
    }

    #[test]
    fn test_backup_is_never_overwritten() {
        let temp = tempdir().expect("create tempdir");
        let config = temp.path().join("config.blk");
        let mod_folder = temp.path().join("mod");
        fs::write(&config, "sound{\n  enable_mod:b=no\n}\n").expect("write config");

        enable_sound_mod(&config, &mod_folder).expect("enable");
        disable_sound_mod(&config).expect("disable");
        enable_sound_mod(&config, &mod_folder).expect("enable again");

        let backup = fs::read_to_string(backup_path_for(&config)).expect("backup");
        assert_eq!(backup, "sound{\n  enable_mod:b=no\n}\n");
    }

    #[test]
    fn test_missing_config_file() {
        let temp = tempdir().expect("create tempdir");
        let config = temp.path().join("config.blk");

        let status = sound_mod_status(&config).expect("status");
        assert!(!status.exists && !status.enabled);
        assert!(status.config_path.is_none());

        let err = enable_sound_mod(&config, &temp.path().join("mod")).unwrap_err();
        assert!(matches!(err, ModKitError::ConfigNotFound { .. }));
        assert!(err.to_string().contains("config.blk"));
    }

    #[test]
    fn test_backup_path_for() {
        assert_eq!(
            backup_path_for(Path::new("/wt/config.blk")),
            PathBuf::from("/wt/config.blk.backup")
        );
    }
}
