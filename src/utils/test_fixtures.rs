//! 테스트용 아카이브 생성 도우미

use crate::system::archive::ArchiveFormat;
use sevenz_rust2::{SeqReader, SevenZArchiveEntry, SevenZWriter, SourceReader};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions as ZipFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// `(이름, 내용)` 목록으로 zip 생성 (내용이 `None`이면 디렉토리 엔트리)
pub fn write_zip(path: &Path, entries: &[(&str, Option<&[u8]>)]) {
    let file = File::create(path).expect("create zip file");
    let mut writer = ZipWriter::new(file);
    let options = ZipFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, content) in entries {
        match content {
            None => writer.add_directory(*name, options).expect("add directory"),
            Some(bytes) => {
                writer.start_file(*name, options).expect("start file");
                writer.write_all(bytes).expect("write file");
            }
        }
    }
    writer.finish().expect("finish zip");
}

/// 파일 엔트리만으로 tar.gz 생성
pub fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).expect("create tar.gz");
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    append_tar_files(encoder, entries)
        .finish()
        .expect("finish gzip");
}

/// 파일 엔트리만으로 tar.zst 생성
pub fn write_tar_zst(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).expect("create tar.zst");
    let encoder = zstd::stream::write::Encoder::new(file, 0).expect("create zstd encoder");
    append_tar_files(encoder, entries)
        .finish()
        .expect("finish zstd");
}

/// 파일 엔트리를 모두 하나의 솔리드 블록에 넣은 7z 생성
pub fn write_7z(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = SevenZWriter::create(path).expect("create 7z");
    let headers = entries
        .iter()
        .map(|(name, _)| SevenZArchiveEntry::new_file(name))
        .collect();
    let readers = entries
        .iter()
        .map(|(_, content)| SourceReader::new(*content))
        .collect();
    writer
        .push_archive_entries(headers, SeqReader::new(readers))
        .expect("add solid block");
    writer.finish().expect("finish 7z");
}

/// 포맷에 맞는 생성 함수로 파일 엔트리만 담은 아카이브 생성
pub fn write_archive(path: &Path, format: ArchiveFormat, entries: &[(&str, &[u8])]) {
    match format {
        ArchiveFormat::Zip => {
            let entries: Vec<_> = entries
                .iter()
                .map(|(name, content)| (*name, Some(*content)))
                .collect();
            write_zip(path, &entries);
        }
        ArchiveFormat::Tar => {
            let file = File::create(path).expect("create tar");
            append_tar_files(file, entries);
        }
        ArchiveFormat::TarGz => write_tar_gz(path, entries),
        ArchiveFormat::TarZst => write_tar_zst(path, entries),
        ArchiveFormat::SevenZ => write_7z(path, entries),
    }
}

fn append_tar_files<W: Write>(out: W, entries: &[(&str, &[u8])]) -> W {
    let mut builder = tar::Builder::new(out);
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, name, *content)
            .expect("append tar entry");
    }
    builder.into_inner().expect("finish tar")
}
