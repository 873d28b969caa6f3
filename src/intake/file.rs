//! 上传文件句柄。
//!
//! 文件选择器 / 拖放区交给我们的是“句柄”：名称、最后修改时间、声明的类型，
//! 字节按需异步读取。

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use bytes::Bytes;

/// 待读取的上传文件。
pub trait IntakeFile: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// 最后修改时间（Unix 毫秒）。
    fn last_modified(&self) -> i64;

    /// 来源声明的 MIME 类型。
    fn declared_mime(&self) -> &str;

    fn read(&self) -> impl Future<Output = io::Result<Bytes>> + Send;
}

/// 已在内存中的文件（拖放 / WebView 传入的字节）。
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    last_modified: i64,
    mime: String,
    bytes: Bytes,
}

impl MemoryFile {
    pub fn new(
        name: impl Into<String>,
        last_modified: i64,
        mime: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            last_modified,
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }
}

impl IntakeFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn declared_mime(&self) -> &str {
        &self.mime
    }

    async fn read(&self) -> io::Result<Bytes> {
        Ok(self.bytes.clone())
    }
}

/// 本地磁盘文件；类型按扩展名声明。
#[derive(Debug, Clone)]
pub struct PathFile {
    path: PathBuf,
    name: String,
    last_modified: i64,
    mime: String,
}

impl PathFile {
    /// 读取 metadata 构建句柄，不读取内容。
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("不是文件：{}", path.display()),
            ));
        }

        let last_modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(crate::model::MimeType::from_extension)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok(Self {
            path,
            name,
            last_modified,
            mime,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IntakeFile for PathFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn declared_mime(&self) -> &str {
        &self.mime
    }

    async fn read(&self) -> io::Result<Bytes> {
        tokio::fs::read(&self.path).await.map(Bytes::from)
    }
}
