//! # 图片上传模块（intake）
//!
//! ## 设计思路
//!
//! 一次上传 = 一批文件。所有文件并发读取，任一失败则整批拒绝，不产出部分列表。
//! 在“尽可能早”的阶段校验类型，避免把不支持的文件送到服务端。
//!
//! ## 实现思路
//!
//! - 读取：每个文件一个 `JoinSet` 任务，按原始顺序回收结果。
//! - 校验：声明类型必须在白名单内，且与文件签名（magic bytes）一致。
//! - 标识：文件名 + 最后修改时间；标识冲突时保留首个位置、采用后者数据。

mod file;

use bytes::Bytes;
use tokio::task::JoinSet;

pub use file::{IntakeFile, MemoryFile, PathFile};

use crate::error::AppError;
use crate::model::{MimeType, SourceImage};

/// 单个文件允许的最大体积（字节）。
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// 并发读取全部文件并生成原图记录。
///
/// 任一文件失败返回 `AppError::Intake`（统一文案），详细原因只写日志。
pub async fn intake<F: IntakeFile>(files: Vec<F>) -> Result<Vec<SourceImage>, AppError> {
    let total = files.len();
    log::info!("📁 开始读取上传文件 - {} 个", total);

    let mut tasks = JoinSet::new();
    for (index, file) in files.into_iter().enumerate() {
        tasks.spawn(async move { load_one(&file).await.map(|image| (index, image)) });
    }

    let mut loaded = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => Err(format!("读取任务异常：{}", e)),
        };

        match outcome {
            Ok(entry) => loaded.push(entry),
            Err(detail) => {
                tasks.abort_all();
                log::warn!("⚠️ 上传失败，整批丢弃：{}", detail);
                return Err(AppError::Intake);
            }
        }
    }

    loaded.sort_by_key(|(index, _)| *index);
    let images = collapse_duplicate_ids(loaded.into_iter().map(|(_, image)| image));
    log::info!("✅ 上传完成 - {} 个文件 → {} 张图片", total, images.len());

    Ok(images)
}

async fn load_one<F: IntakeFile>(file: &F) -> Result<SourceImage, String> {
    let name = file.name().to_string();
    let mime = MimeType::parse(file.declared_mime())
        .ok_or_else(|| format!("{}：不支持的类型 {}", name, file.declared_mime()))?;

    let bytes = file
        .read()
        .await
        .map_err(|e| format!("{}：无法读取文件：{}", name, e))?;

    if bytes.len() as u64 > MAX_FILE_SIZE {
        return Err(format!(
            "{}：文件过大：{:.2} MB（限制：{:.2} MB）",
            name,
            bytes.len() as f64 / 1024.0 / 1024.0,
            MAX_FILE_SIZE as f64 / 1024.0 / 1024.0
        ));
    }
    validate_signature(&bytes, mime).map_err(|e| format!("{}：{}", name, e))?;

    Ok(SourceImage::new(name, file.last_modified(), mime, bytes))
}

/// 通过文件签名校验实际类型与声明一致。
fn validate_signature(bytes: &Bytes, declared: MimeType) -> Result<(), String> {
    if bytes.is_empty() {
        return Err("图片内容为空".to_string());
    }

    let kind = infer::get(bytes).ok_or_else(|| "无法识别图片类型".to_string())?;
    match MimeType::parse(kind.mime_type()) {
        Some(actual) if actual == declared => Ok(()),
        _ => Err(format!(
            "文件签名与声明类型不符：声明 {}，实际 {}",
            declared,
            kind.mime_type()
        )),
    }
}

/// 相同标识视为同一张图：位置取首次出现，数据取最后一次。
fn collapse_duplicate_ids(images: impl Iterator<Item = SourceImage>) -> Vec<SourceImage> {
    let mut out: Vec<SourceImage> = Vec::new();
    for image in images {
        match out.iter_mut().find(|existing| existing.id() == image.id()) {
            Some(existing) => {
                log::debug!("♻️ 标识冲突，采用后读入的数据：{}", image.id());
                *existing = image;
            }
            None => out.push(image),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[tokio::test]
    async fn reads_files_in_original_order() {
        let files = vec![
            MemoryFile::new("b.png", 2, "image/png", PNG),
            MemoryFile::new("a.jpg", 1, "image/jpeg", JPEG),
        ];

        let images = intake(files).await.expect("intake should succeed");

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].id(), "b.png-2");
        assert_eq!(images[1].id(), "a.jpg-1");
        assert!(images[1].data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn one_bad_file_rejects_whole_batch() {
        let files = vec![
            MemoryFile::new("ok.png", 1, "image/png", PNG),
            MemoryFile::new("notes.txt", 2, "text/plain", &b"hello"[..]),
        ];

        assert!(matches!(intake(files).await, Err(AppError::Intake)));
    }

    /// 读取前先等待一段时间，可配置为读取失败。
    struct SlowFile {
        name: &'static str,
        delay: std::time::Duration,
        fail: bool,
    }

    impl IntakeFile for SlowFile {
        fn name(&self) -> &str {
            self.name
        }

        fn last_modified(&self) -> i64 {
            1
        }

        fn declared_mime(&self) -> &str {
            "image/png"
        }

        async fn read(&self) -> std::io::Result<Bytes> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "拒绝访问"));
            }
            Ok(Bytes::from_static(PNG))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn read_error_rejects_whole_batch() {
        let files = vec![
            SlowFile { name: "a.png", delay: std::time::Duration::from_secs(1), fail: false },
            SlowFile { name: "b.png", delay: std::time::Duration::from_secs(2), fail: true },
            SlowFile { name: "c.png", delay: std::time::Duration::from_secs(3), fail: false },
        ];

        assert!(matches!(intake(files).await, Err(AppError::Intake)));
    }

    #[tokio::test(start_paused = true)]
    async fn reads_run_concurrently() {
        let files: Vec<SlowFile> = ["a.png", "b.png", "c.png", "d.png"]
            .into_iter()
            .map(|name| SlowFile { name, delay: std::time::Duration::from_secs(5), fail: false })
            .collect();

        let started = tokio::time::Instant::now();
        let images = intake(files).await.expect("intake should succeed");

        assert_eq!(images.len(), 4);
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn declared_type_must_match_signature() {
        let files = vec![MemoryFile::new("fake.png", 1, "image/png", JPEG)];

        assert!(matches!(intake(files).await, Err(AppError::Intake)));
    }

    #[tokio::test]
    async fn colliding_ids_keep_later_data() {
        let mut later = JPEG.to_vec();
        later.push(0xAB);
        let files = vec![
            MemoryFile::new("a.jpg", 1_000, "image/jpeg", JPEG),
            MemoryFile::new("a.jpg", 1_000, "image/jpeg", later.clone()),
        ];

        let images = intake(files).await.expect("intake should succeed");

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id(), "a.jpg-1000");
        assert_eq!(images[0].bytes().as_ref(), later.as_slice());
    }

    #[tokio::test]
    async fn path_file_reads_from_disk() {
        let dir = std::env::temp_dir().join(format!("neorevive-intake-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.expect("create temp dir failed");
        let path = dir.join("photo.PNG");
        tokio::fs::write(&path, PNG).await.expect("write temp file failed");

        let file = PathFile::open(&path).await.expect("open should succeed");
        assert_eq!(file.path(), path.as_path());
        assert_eq!(file.declared_mime(), "image/png");

        let images = intake(vec![file]).await.expect("intake should succeed");
        let _ = tokio::fs::remove_dir_all(&dir).await;

        assert_eq!(images[0].name(), "photo.PNG");
        assert_eq!(images[0].mime_type(), MimeType::Png);
    }

    #[tokio::test]
    async fn missing_path_fails_open() {
        let result = PathFile::open("/definitely/not/here.png").await;

        assert!(result.is_err());
    }
}
