use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use tracing_subscriber::EnvFilter;
use wt_modkit::app::{InstallRequest, ModKit};
use wt_modkit::core::settings::{settings_path, Settings};
use wt_modkit::models::{ArchiveUpload, BatchReport, InstallProgressEvent, RemoveMode};
use wt_modkit::utils::formatter::format_file_size;

#[derive(Debug, Parser)]
#[command(name = "wt-modkit", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
struct Cli {
    /// War Thunder install folder (overrides the settings file)
    #[arg(long, global = true)]
    game_folder: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Install skin archives into UserSkins
    #[command(name = "install-skins")]
    InstallSkins(InstallArgs),
    /// Install sound mod archives into sound/mod
    #[command(name = "install-sounds")]
    InstallSounds(InstallArgs),
    /// Inspect or toggle the sound mod flag in config.blk
    #[command(name = "sound-mod")]
    SoundMod {
        #[command(subcommand)]
        action: SoundModAction,
    },
    /// Check that the game folder looks like a War Thunder install
    Validate,
    /// List installed skins or sound mods
    #[command(alias = "ls")]
    List {
        #[arg(value_enum)]
        kind: ListKind,
    },
    /// Remove one installed skin folder or sound bank
    #[command(alias = "rm")]
    Remove {
        #[arg(value_enum)]
        kind: ItemKind,
        name: String,
        /// Delete permanently instead of moving to the trash
        #[arg(long)]
        permanent: bool,
    },
}

#[derive(Debug, clap::Args)]
struct InstallArgs {
    /// Archive files (.zip, .7z, .tar, .tar.gz, .tar.zst)
    #[arg(required = true)]
    archives: Vec<PathBuf>,
    /// Destination root (defaults to the game folder's install location)
    #[arg(long)]
    dest: Option<PathBuf>,
    /// Replace existing installs
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Subcommand)]
enum SoundModAction {
    Status,
    Enable,
    Disable,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListKind {
    Skins,
    Sounds,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ItemKind {
    Skin,
    Sound,
}

#[derive(Debug, Clone, Copy)]
enum BatchKind {
    Skins,
    Sounds,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(payload) => {
            println!("{}", render(with_ok(payload)));
            ExitCode::SUCCESS
        }
        Err(e) => {
            let message = format!("{e:#}");
            tracing::error!(error = %message, "command failed");
            println!("{}", render(json!({ "ok": false, "error": message })));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Value> {
    let mut settings = Settings::load().with_context(|| match settings_path() {
        Some(path) => format!("failed to load settings from {}", path.display()),
        None => "failed to load settings".to_string(),
    })?;
    if let Some(folder) = cli.game_folder {
        settings = settings.with_game_folder(folder);
    }
    let kit = ModKit::new(settings);

    match cli.cmd {
        Commands::InstallSkins(args) => install(&kit, BatchKind::Skins, args),
        Commands::InstallSounds(args) => install(&kit, BatchKind::Sounds, args),
        Commands::SoundMod { action } => match action {
            SoundModAction::Status => to_value(&kit.sound_mod_status()?),
            SoundModAction::Enable => to_value(&kit.enable_sound_mod()?),
            SoundModAction::Disable => to_value(&kit.disable_sound_mod()?),
        },
        Commands::Validate => to_value(&kit.validate_game_folder()),
        Commands::List { kind } => match kind {
            ListKind::Skins => {
                let skins = kit.list_installed_skins()?;
                let total: u64 = skins.iter().map(|s| s.size).sum();
                tracing::info!(count = skins.len(), total = %format_file_size(total), "installed skins");
                Ok(json!({ "skins": skins }))
            }
            ListKind::Sounds => {
                let mods = kit.list_installed_sound_mods()?;
                Ok(json!({ "soundMods": mods }))
            }
        },
        Commands::Remove {
            kind,
            name,
            permanent,
        } => {
            let mode = if permanent {
                RemoveMode::Permanent
            } else {
                RemoveMode::Trash
            };
            let removed = match kind {
                ItemKind::Skin => kit.remove_skin(&name, mode)?,
                ItemKind::Sound => kit.remove_sound_mod(&name, mode)?,
            };
            Ok(json!({ "message": format!("Removed {name}"), "path": removed }))
        }
    }
}

/// 아카이브가 하나면 단일 결과, 여러 개면 작업 스레드에서 배치 설치
fn install(kit: &ModKit, kind: BatchKind, args: InstallArgs) -> anyhow::Result<Value> {
    let request = InstallRequest::new(args.dest, args.force);
    let uploads: Vec<ArchiveUpload> = args.archives.into_iter().map(ArchiveUpload::local).collect();

    if let [upload] = uploads.as_slice() {
        let result = match kind {
            BatchKind::Skins => kit.install_skin(upload, &request)?,
            BatchKind::Sounds => kit.install_sound(upload, &request)?,
        };
        return to_value(&result);
    }

    let report = run_batch_worker(kit.clone(), kind, uploads, request)?;
    to_value(&report)
}

fn run_batch_worker(
    kit: ModKit,
    kind: BatchKind,
    uploads: Vec<ArchiveUpload>,
    request: InstallRequest,
) -> anyhow::Result<BatchReport> {
    let (progress_tx, progress_rx) = mpsc::channel::<InstallProgressEvent>();
    let worker = thread::spawn(move || match kind {
        BatchKind::Skins => kit.install_skins(&uploads, &request, Some(&progress_tx)),
        BatchKind::Sounds => kit.install_sounds(&uploads, &request, Some(&progress_tx)),
    });

    for event in progress_rx {
        tracing::info!(
            current = event.current,
            total = event.total,
            percent = event.percent,
            "installing {}",
            event.file
        );
    }

    let report = worker
        .join()
        .map_err(|_| anyhow!("install worker panicked"))??;
    Ok(report)
}

fn to_value<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn with_ok(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) => {
            map.insert("ok".to_string(), Value::Bool(true));
            Value::Object(map)
        }
        other => json!({ "ok": true, "data": other }),
    }
}

fn render(value: Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}
