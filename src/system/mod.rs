// System Layer
pub mod archive;
pub mod config_blk;
pub mod extractor;
pub mod game_folder;
pub mod install;
pub mod planner;
pub mod scanner;

pub use archive::{detect_archive_format, ArchiveEntry, ArchiveFormat, EntryKind};
pub use config_blk::{SoundModOutcome, SoundModStatus};
pub use install::{install_skin_archive, install_sound_archive, InstallOptions};
