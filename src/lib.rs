//! War Thunder 사용자 스킨/사운드 모드 설치 도구
//!
//! 신뢰할 수 없는 아카이브를 대상 폴더 밖으로 벗어나지 않게, 리소스 한도 안에서
//! 풀어 놓고 `config.blk`의 사운드 모드 플래그를 관리한다.

pub mod app;
pub mod core;
pub mod models;
pub mod system;
pub mod utils;

pub use app::ModKit;
pub use utils::error::{ModKitError, Result};
