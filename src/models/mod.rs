// Data Models
pub mod install;
pub mod installed;
pub mod scan;

pub use install::{
    ArchiveUpload, BatchReport, InstallError, InstallKind, InstallProgressEvent, InstallResult,
};
pub use installed::{GameFolderReport, InstalledSkin, InstalledSoundMod, RemoveMode};
pub use scan::{InstallPlan, ScanResult};
