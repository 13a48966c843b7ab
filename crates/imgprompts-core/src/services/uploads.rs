//! 上传文件存储服务
//!
//! 校验并保存上传的图片，生成唯一文件名和访问地址。
//! 一次请求内保存的文件通过 [`UploadBatch`] 管理，未提交时自动删除。

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use scopeguard::ScopeGuard;
use xxhash_rust::xxh3::xxh3_64;

use crate::utils::error::{AppError, AppResult};
use crate::utils::sanitize::sanitize_filename_component;

/// 允许的图片扩展名
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// 同名文件的最大重试次数
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// 上传文件存储
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_file_size: u64,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            root: root.into(),
            max_file_size,
        }
    }

    /// 上传目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// 确保上传目录存在
    pub fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// 小写扩展名（不含点）
    pub fn extension_of(filename: &str) -> Option<String> {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// 是否为允许的图片类型（按扩展名判断）
    pub fn is_valid_image_type(filename: &str) -> bool {
        Self::extension_of(filename)
            .map(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// 校验文件类型与大小
    pub fn validate(&self, filename: &str, size: u64) -> AppResult<()> {
        if !Self::is_valid_image_type(filename) {
            return Err(AppError::UnsupportedFormat(filename.to_string()));
        }
        if size > self.max_file_size {
            return Err(AppError::Validation(format!("文件大小超出限制: {}", filename)));
        }
        Ok(())
    }

    /// 生成唯一文件名：`{净化后的文件名}_{unix 时间戳}_{内容哈希前 8 位}.{扩展名}`
    pub fn generate_unique_filename(original: &str, data: &[u8]) -> String {
        let base = Path::new(original)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(original);
        let stem = Path::new(base)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let stem = sanitize_filename_component(stem);
        let ext = Self::extension_of(base).unwrap_or_else(|| "bin".to_string());
        let timestamp = chrono::Utc::now().timestamp();
        let hash = format!("{:016x}", xxh3_64(data));

        format!("{}_{}_{}.{}", stem, timestamp, &hash[..8], ext)
    }

    /// 保存单个文件，返回落盘文件名
    ///
    /// 文件以独占方式创建，同名文件已存在时追加序号，每次调用都对应一个新文件。
    pub fn save(&self, original_name: &str, data: &[u8]) -> AppResult<String> {
        self.validate(original_name, data.len() as u64)?;
        self.ensure_dir()?;

        let candidate = Self::generate_unique_filename(original_name, data);
        let (filename, mut file) = self.create_exclusive(&candidate)?;
        if let Err(e) = file.write_all(data) {
            drop(file);
            let _ = fs::remove_file(self.root.join(&filename));
            return Err(AppError::Io(e));
        }

        tracing::debug!("保存上传文件 {} -> {}", original_name, filename);
        Ok(filename)
    }

    /// 独占创建文件，名称被占用时依次尝试 `{主干}_{序号}.{扩展名}`
    fn create_exclusive(&self, candidate: &str) -> AppResult<(String, fs::File)> {
        let path = Path::new(candidate);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(candidate);
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("bin");

        for seq in 0..MAX_NAME_ATTEMPTS {
            let filename = if seq == 0 {
                candidate.to_string()
            } else {
                format!("{}_{}.{}", stem, seq, ext)
            };
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&filename))
            {
                Ok(file) => return Ok((filename, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(AppError::Io(e)),
            }
        }

        Err(AppError::General(format!("无法为 {} 分配文件名", candidate)))
    }

    /// 删除已保存的文件，文件不存在视为成功
    pub fn remove(&self, filename: &str) -> AppResult<()> {
        let path = self.root.join(filename);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// 文件访问地址
    pub fn file_url(base_url: &str, filename: &str) -> String {
        format!("{}/uploads/{}", base_url.trim_end_matches('/'), filename)
    }

    /// 开始一个上传批次
    pub fn begin<'a>(&'a self) -> UploadBatch<'a> {
        let saved = SavedFiles {
            store: self,
            filenames: Vec::new(),
        };
        UploadBatch {
            saved: scopeguard::guard(saved, rollback as fn(SavedFiles<'a>)),
        }
    }
}

/// 批次内已写入的文件
struct SavedFiles<'a> {
    store: &'a UploadStore,
    filenames: Vec<String>,
}

fn rollback(saved: SavedFiles<'_>) {
    for filename in &saved.filenames {
        match saved.store.remove(filename) {
            Ok(()) => tracing::info!("回滚上传文件: {}", filename),
            Err(e) => tracing::warn!("回滚上传文件 {} 失败: {}", filename, e),
        }
    }
}

/// 一次请求内的上传批次，未 `commit` 即被丢弃时删除本批次写入的文件
pub struct UploadBatch<'a> {
    saved: ScopeGuard<SavedFiles<'a>, fn(SavedFiles<'a>)>,
}

impl UploadBatch<'_> {
    /// 保存文件并记录到批次
    pub fn save(&mut self, original_name: &str, data: &[u8]) -> AppResult<String> {
        let filename = self.saved.store.save(original_name, data)?;
        self.saved.filenames.push(filename.clone());
        Ok(filename)
    }

    /// 已保存的文件名
    pub fn saved(&self) -> &[String] {
        &self.saved.filenames
    }

    /// 提交批次，保留所有文件
    pub fn commit(self) -> Vec<String> {
        ScopeGuard::into_inner(self.saved).filenames
    }
}
