//! # 存档存储服务
//!
//! 存档 blob 的键值存储抽象，以及两个实现：
//! - `FileStorage`：写入数据目录下的 JSON 文件，每次覆盖前保留一份 `.bak` 备份
//! - `MemoryStorage`：仅存在于内存中，供测试和无盘运行使用
//!
//! ## 写入流程（FileStorage）
//! 1. 确保父目录存在
//! 2. 若旧文件存在，复制为 `<文件名>.bak`
//! 3. 新内容先写入 `<文件名>.tmp`，再 rename 覆盖目标文件
//!
//! rename 在同一目录内是原子操作，进程在写入途中退出也不会留下半个存档。
//! 存档损坏时加载流程会回落到默认状态，下一次写入前旧文件会进入 `.bak`，不会被直接覆盖掉。

use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// 存档 blob 的键值存储
///
/// 读写均为同步操作：所有状态修改都在调用线程上同步完成并立即落盘。
pub trait BlobStorage: Send + Sync {
    /// 读取存档；尚未写入过时返回 `Ok(None)`
    fn load(&self) -> Result<Option<String>, String>;

    /// 覆盖写入存档
    fn save(&self, blob: &str) -> Result<(), String>;
}

/// 基于文件的存档存储
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 备份文件路径：`<原文件名>.bak`
    fn backup_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".bak")
    }
}

impl BlobStorage for FileStorage {
    fn load(&self) -> Result<Option<String>, String> {
        if !self.path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| format!("读取存档文件失败: {}", e))
    }

    fn save(&self, blob: &str) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("创建数据目录失败: {}", e))?;
            }
        }

        if self.path.exists() {
            std::fs::copy(&self.path, self.backup_path())
                .map_err(|e| format!("创建存档备份失败: {}", e))?;
        }

        let tmp_path = sibling_with_suffix(&self.path, ".tmp");
        std::fs::write(&tmp_path, blob).map_err(|e| format!("写入临时存档失败: {}", e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| format!("替换存档文件失败: {}", e))
    }
}

/// 内存存档存储
#[derive(Default)]
pub struct MemoryStorage {
    blob: RwLock<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有内容初始化（用于模拟旧版存档）
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: RwLock::new(Some(blob.into())),
        }
    }

    /// 最近一次写入的内容
    pub fn snapshot(&self) -> Option<String> {
        self.blob.read().ok()?.clone()
    }
}

impl BlobStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>, String> {
        self.blob
            .read()
            .map(|blob| blob.clone())
            .map_err(|_| "内存存档锁已损坏".to_string())
    }

    fn save(&self, blob: &str) -> Result<(), String> {
        let mut guard = self
            .blob
            .write()
            .map_err(|_| "内存存档锁已损坏".to_string())?;
        *guard = Some(blob.to_string());
        Ok(())
    }
}

/// 在文件名末尾追加后缀（保留原扩展名）
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}
