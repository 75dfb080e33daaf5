//! 여러 아카이브 순차 설치

use super::*;
use crate::models::install::{BatchReport, InstallError, InstallProgressEvent};
use crate::system::archive::{detect_archive_format, display_file_name};
use crate::system::install::prepare_destination_root;
use crate::utils::error::ModKitError;
use crate::utils::formatter::pluralize;
use std::sync::mpsc::Sender;

impl ModKit {
    /// 스킨 아카이브 여러 개를 입력 순서대로 설치
    ///
    /// 아카이브별 실패는 `errors`에 기록하고 다음 아카이브로 넘어간다.
    /// 빈 목록이나 아카이브가 아닌 파일 이름은 어떤 아카이브도 건드리기 전에
    /// 호출 전체를 실패시킨다.
    pub fn install_skins(
        &self,
        uploads: &[ArchiveUpload],
        request: &InstallRequest,
        progress: Option<&Sender<InstallProgressEvent>>,
    ) -> Result<BatchReport> {
        self.install_batch(InstallKind::Skin, uploads, request, progress)
    }

    /// 사운드 팩 아카이브 여러 개를 입력 순서대로 설치
    pub fn install_sounds(
        &self,
        uploads: &[ArchiveUpload],
        request: &InstallRequest,
        progress: Option<&Sender<InstallProgressEvent>>,
    ) -> Result<BatchReport> {
        self.install_batch(InstallKind::Sound, uploads, request, progress)
    }

    fn install_batch(
        &self,
        kind: InstallKind,
        uploads: &[ArchiveUpload],
        request: &InstallRequest,
        progress: Option<&Sender<InstallProgressEvent>>,
    ) -> Result<BatchReport> {
        let dest_root = match validate_batch(uploads)
            .and_then(|()| prepare_destination_root(&self.destination_root(kind, request)))
        {
            Ok(dest) => dest,
            Err(e) => {
                uploads.iter().for_each(discard_upload);
                return Err(e);
            }
        };

        let total = uploads.len();
        let mut report = BatchReport::new(dest_root.clone());

        for (idx, upload) in uploads.iter().enumerate() {
            let file = upload_label(upload);
            if let Some(tx) = progress {
                let _ = tx.send(InstallProgressEvent::new(idx + 1, total, file.clone()));
            }

            match self.install_one(kind, upload, &dest_root, request.force) {
                Ok(result) => report.results.push(result),
                Err(e) => {
                    tracing::warn!(archive = %file, error = %e, "{} install failed", kind.name());
                    report.errors.push(InstallError {
                        file,
                        error: e.to_string(),
                    });
                }
            }
            discard_upload(upload);
        }

        tracing::info!(
            installed = report.results.len(),
            failed = report.errors.len(),
            "{} batch finished: {}",
            kind.name(),
            pluralize(total, "archive", "archives")
        );
        Ok(report)
    }
}

fn validate_batch(uploads: &[ArchiveUpload]) -> Result<()> {
    if uploads.is_empty() {
        return Err(ModKitError::EmptyBatch);
    }
    match uploads
        .iter()
        .find(|upload| detect_archive_format(&upload.original_name).is_none())
    {
        Some(upload) => Err(ModKitError::NotAnArchive {
            name: upload_label(upload),
        }),
        None => Ok(()),
    }
}

/// 결과/오류 기록용 이름 (원래 이름이 없으면 실제 파일 이름)
fn upload_label(upload: &ArchiveUpload) -> String {
    let name = display_file_name(&upload.original_name);
    if !name.is_empty() {
        return name.to_string();
    }
    upload
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
