use super::*;
use crate::core::limits::ExtractLimits;
use crate::models::install::InstallProgressEvent;
use crate::utils::error::ModKitError;
use crate::utils::test_fixtures::write_zip;
use std::sync::mpsc;
use tempfile::TempDir;

fn make_test_kit(game: &Path) -> ModKit {
    ModKit::new(Settings::default().with_game_folder(game))
}

fn game_dir() -> TempDir {
    tempfile::tempdir().expect("create game dir")
}

fn skin_zip(dir: &Path, name: &str, top: &str) -> PathBuf {
    let path = dir.join(name);
    let blk = format!("{top}/{top}.blk");
    write_zip(&path, &[(blk.as_str(), Some(b"blk".as_slice()))]);
    path
}

#[test]
fn test_single_install_uses_default_skins_root() {
    let game = game_dir();
    let kit = make_test_kit(game.path());
    let archive = skin_zip(game.path(), "t.zip", "Tiger");

    let result = kit
        .install_skin(&ArchiveUpload::local(&archive), &InstallRequest::default())
        .expect("install");
    assert_eq!(
        result.used_destination_root,
        crate::utils::path_guard::absolute_normalized(&game.path().join("UserSkins"))
            .expect("abs")
    );
    assert!(game.path().join("UserSkins").join("Tiger").join("Tiger.blk").is_file());
    // 로컬 파일은 남는다
    assert!(archive.exists());
}

#[test]
fn test_batch_with_corrupt_middle_archive() {
    let game = game_dir();
    let kit = make_test_kit(game.path());
    let uploads_dir = game.path().join("uploads");
    fs::create_dir_all(&uploads_dir).expect("create uploads");

    let first = skin_zip(&uploads_dir, "u1", "Alpha");
    let broken = uploads_dir.join("u2");
    fs::write(&broken, b"PK\x03\x04 this is not really a zip").expect("write broken");
    let third = skin_zip(&uploads_dir, "u3", "Gamma");

    let uploads = vec![
        ArchiveUpload::temporary(&first, "alpha.zip"),
        ArchiveUpload::temporary(&broken, "broken.zip"),
        ArchiveUpload::temporary(&third, "gamma.zip"),
    ];
    let (tx, rx) = mpsc::channel::<InstallProgressEvent>();

    let report = kit
        .install_skins(&uploads, &InstallRequest::default(), Some(&tx))
        .expect("batch runs");
    drop(tx);

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.processed(), 3);
    assert_eq!(report.results[0].file, "alpha.zip");
    assert_eq!(report.results[1].file, "gamma.zip");
    assert_eq!(report.errors[0].file, "broken.zip");

    let events: Vec<_> = rx.iter().collect();
    let files: Vec<_> = events.iter().map(|e| e.file.as_str()).collect();
    assert_eq!(files, vec!["alpha.zip", "broken.zip", "gamma.zip"]);
    assert_eq!(events[2].percent, 100);

    // 임시 업로드는 성공/실패와 관계없이 삭제
    assert!(!first.exists() && !broken.exists() && !third.exists());
}

#[test]
fn test_batch_conflict_is_per_archive() {
    let game = game_dir();
    let kit = make_test_kit(game.path());
    let a = skin_zip(game.path(), "a.zip", "Same");
    let b = skin_zip(game.path(), "b.zip", "Same");

    let report = kit
        .install_skins(
            &[ArchiveUpload::local(&a), ArchiveUpload::local(&b)],
            &InstallRequest::default(),
            None,
        )
        .expect("batch runs");
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].error.contains("already exists"));

    let report = kit
        .install_skins(
            &[ArchiveUpload::local(&b)],
            &InstallRequest::new(None, true),
            None,
        )
        .expect("forced batch");
    assert_eq!(report.results.len(), 1);
}

#[test]
fn test_empty_batch_is_a_call_error() {
    let game = game_dir();
    let kit = make_test_kit(game.path());
    let err = kit
        .install_skins(&[], &InstallRequest::default(), None)
        .unwrap_err();
    assert!(matches!(err, ModKitError::EmptyBatch));
}

#[test]
fn test_non_archive_name_rejects_whole_batch() {
    let game = game_dir();
    let kit = make_test_kit(game.path());
    let good = skin_zip(game.path(), "good.tmp", "Good");
    let bad = game.path().join("bad.tmp");
    fs::write(&bad, "text").expect("write bad");

    let err = kit
        .install_skins(
            &[
                ArchiveUpload::temporary(&good, "good.zip"),
                ArchiveUpload::temporary(&bad, "notes.txt"),
            ],
            &InstallRequest::default(),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, ModKitError::NotAnArchive { ref name } if name == "notes.txt"));
    // 아무것도 설치하지 않았고 임시 파일은 정리됨
    assert!(!game.path().join("UserSkins").join("Good").exists());
    assert!(!good.exists() && !bad.exists());
}

#[test]
fn test_limit_violation_writes_nothing() {
    let game = game_dir();
    let mut settings = Settings::default().with_game_folder(game.path());
    settings.limits = ExtractLimits {
        max_entry_bytes: 4,
        ..ExtractLimits::default()
    };
    let kit = ModKit::new(settings);
    let archive = game.path().join("big.zip");
    write_zip(&archive, &[("Big/huge.dds", Some(b"12345".as_slice()))]);

    let err = kit
        .install_skin(&ArchiveUpload::local(&archive), &InstallRequest::default())
        .unwrap_err();
    assert!(matches!(err, ModKitError::EntryTooLarge { size: 5, limit: 4, .. }));
    assert!(!game.path().join("UserSkins").join("Big").exists());
}

#[test]
fn test_sound_pack_collision_then_force() {
    let game = game_dir();
    let kit = make_test_kit(game.path());
    let archive = game.path().join("pack.zip");
    write_zip(&archive, &[("banks/sample.bank", Some(b"fmod".as_slice()))]);
    let upload = ArchiveUpload::local(&archive);

    let first = kit
        .install_sound(&upload, &InstallRequest::default())
        .expect("first install");
    assert!(first.warnings.is_empty());
    assert!(game.path().join("sound").join("mod").join("sample.bank").is_file());

    let err = kit
        .install_sound(&upload, &InstallRequest::default())
        .unwrap_err();
    assert!(matches!(err, ModKitError::FileExists { .. }));

    kit.install_sound(&upload, &InstallRequest::new(None, true))
        .expect("forced install");

    let mods = kit.list_installed_sound_mods().expect("list");
    assert_eq!(mods.len(), 1);
    assert_eq!(mods[0].name, "sample.bank");
}

#[test]
fn test_enable_sound_mod_twice() {
    let game = game_dir();
    let kit = make_test_kit(game.path());
    fs::write(kit.config_path(), "graphics{\n  hdr:b=no\n}\n").expect("write config");

    let first = kit.enable_sound_mod().expect("enable");
    assert!(!first.unchanged);
    assert!(kit.sound_mod_status().expect("status").enabled);
    assert!(game.path().join("sound").join("mod").is_dir());

    let second = kit.enable_sound_mod().expect("enable again");
    assert!(second.unchanged);
    assert!(second.message.contains("already enabled"));
    assert!(kit.sound_mod_status().expect("status").enabled);

    let backups: Vec<_> = fs::read_dir(game.path())
        .expect("read game dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".backup"))
        .collect();
    assert_eq!(backups.len(), 1);

    let config = fs::read_to_string(kit.config_path()).expect("read config");
    assert!(config.starts_with("graphics{\n  hdr:b=no\n}\n"));
}

#[test]
fn test_list_and_remove_installed_skin() {
    let game = game_dir();
    let kit = make_test_kit(game.path());
    let archive = skin_zip(game.path(), "t.zip", "Tiger");
    kit.install_skin(&ArchiveUpload::local(&archive), &InstallRequest::default())
        .expect("install");

    let skins = kit.list_installed_skins().expect("list");
    assert_eq!(skins.len(), 1);
    assert!(skins[0].has_blk);

    kit.remove_skin("Tiger", RemoveMode::Permanent).expect("remove");
    assert!(kit.list_installed_skins().expect("list").is_empty());
}
