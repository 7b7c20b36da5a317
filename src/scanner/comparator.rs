use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CompareConfig;
use crate::error::{io_err, CompareError, Result};
use crate::models::{Entry, RelativePath, Status};
use crate::utils::{format_time, hash_file, modified_utc};

/// 目录比较器 - 负责路径映射、排除判断和单个文件的比较
///
/// 构造后不可变，可以在多个线程之间共享。
#[derive(Debug, Clone)]
pub struct DirectoryComparator {
    origin_root: PathBuf,
    new_root: PathBuf,
    excludes: Vec<String>,
    ignore_times: bool,
    follow_symlinks: bool,
}

/// 从参照根目录到当前目录的真实路径链
///
/// 只在跟随符号链接时记录，用来发现指回祖先目录的链接。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ancestors(Vec<PathBuf>);

impl Ancestors {
    pub fn contains(&self, real_path: &Path) -> bool {
        self.0.iter().any(|ancestor| ancestor == real_path)
    }

    fn child(&self, real_path: PathBuf) -> Self {
        let mut chain = self.0.clone();
        chain.push(real_path);
        Self(chain)
    }
}

/// 一个目录的直接子项
#[derive(Debug, Default)]
pub struct DirListing {
    /// 需要比较的文件
    pub files: Vec<PathBuf>,

    /// 需要递归的子目录
    pub dirs: Vec<PathBuf>,

    /// 包含当前目录在内的祖先链，递归子目录时传入
    pub ancestors: Ancestors,
}

impl DirectoryComparator {
    /// 根据配置创建比较器
    pub fn new(config: &CompareConfig) -> Self {
        Self {
            origin_root: config.origin_root.clone(),
            new_root: config.new_root.clone(),
            excludes: config.excludes.clone(),
            ignore_times: config.ignore_times,
            follow_symlinks: config.follow_symlinks,
        }
    }

    pub fn origin_root(&self) -> &Path {
        &self.origin_root
    }

    /// 去掉参照根目录前缀
    ///
    /// 传入的路径必须位于参照根目录之下，否则属于内部错误，直接 panic。
    fn strip_origin<'a>(&self, path: &'a Path) -> &'a Path {
        match path.strip_prefix(&self.origin_root) {
            Ok(rest) => rest,
            Err(_) => panic!(
                "illegal path: {} is not a child of {}",
                path.display(),
                self.origin_root.display()
            ),
        }
    }

    /// 参照目录下的路径 -> 相对路径
    pub fn to_relative(&self, path: &Path) -> RelativePath {
        RelativePath::from_stripped(self.strip_origin(path))
    }

    /// 参照目录下的路径 -> 新目录中对应的路径
    pub fn to_new_path(&self, path: &Path) -> PathBuf {
        let rest = self.strip_origin(path);
        if rest.as_os_str().is_empty() {
            self.new_root.clone()
        } else {
            self.new_root.join(rest)
        }
    }

    /// 相对路径是否以任一排除前缀开头
    pub fn is_excluded(&self, path: &Path) -> bool {
        let relative = self.to_relative(path);
        self.excludes
            .iter()
            .any(|prefix| relative.starts_with(prefix))
    }

    /// 新目录中缺少对应目录时返回 MIS 记录
    ///
    /// 只有"不存在"算缺失，其他读取错误带上路径返回。
    pub fn check_directory(&self, dir: &Path) -> Result<Option<Entry>> {
        let new_dir = self.to_new_path(dir);
        match fs::metadata(&new_dir) {
            Ok(metadata) if metadata.is_dir() => Ok(None),
            Ok(_) => {
                tracing::debug!("不是目录: {}", new_dir.display());
                Ok(Some(Entry::missing_dir(self.to_relative(dir))))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("目录缺失: {}", new_dir.display());
                Ok(Some(Entry::missing_dir(self.to_relative(dir))))
            }
            Err(err) => Err(io_err(&new_dir)(err)),
        }
    }

    /// 列出目录的直接子项，已排除的条目不会出现在结果中
    ///
    /// `ancestors` 是 `dir` 之上的祖先链（根目录传入空链）。
    /// 跟随符号链接时，指回祖先的目录链接和失效的链接都会被跳过。
    pub fn list_directory(&self, dir: &Path, ancestors: &Ancestors) -> Result<DirListing> {
        let mut listing = DirListing::default();
        if self.follow_symlinks {
            let real_dir = fs::canonicalize(dir).map_err(io_err(dir))?;
            listing.ancestors = ancestors.child(real_dir);
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.loop_ancestor().is_some() => {
                    tracing::warn!("跳过循环的符号链接: {}", err);
                    continue;
                }
                Err(err) if is_dangling_link(&err) => {
                    tracing::debug!("跳过失效的符号链接: {}", err);
                    continue;
                }
                Err(err) => return Err(walk_error(dir, err)),
            };
            let path = entry.path();

            if self.is_excluded(path) {
                tracing::debug!("已排除: {}", path.display());
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if entry.path_is_symlink() {
                    let real_path = fs::canonicalize(path).map_err(io_err(path))?;
                    if listing.ancestors.contains(&real_path) {
                        tracing::warn!(
                            "跳过循环的符号链接: {} -> {}",
                            path.display(),
                            real_path.display()
                        );
                        continue;
                    }
                }
                listing.dirs.push(path.to_path_buf());
            } else if file_type.is_file() {
                listing.files.push(path.to_path_buf());
            } else if file_type.is_symlink() {
                // 未跟随的符号链接：指向文件的按文件比较，指向目录的跳过
                match fs::metadata(path) {
                    Ok(metadata) if metadata.is_file() => listing.files.push(path.to_path_buf()),
                    Ok(_) => tracing::debug!("跳过目录符号链接: {}", path.display()),
                    Err(err) => tracing::debug!("跳过失效的符号链接 {}: {}", path.display(), err),
                }
            } else {
                tracing::debug!("跳过特殊文件: {}", path.display());
            }
        }

        Ok(listing)
    }

    /// 比较单个文件
    ///
    /// 新文件不存在为 MIS；新文件不比参照文件旧时直接视为一致；
    /// 否则（或忽略时间戳时）比较内容。
    pub fn classify_file(&self, file: &Path) -> Result<Entry> {
        let relative = self.to_relative(file);
        let new_file = self.to_new_path(file);

        let new_meta = match fs::metadata(&new_file) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(Entry::file(Status::Missing, relative)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(Entry::file(Status::Missing, relative));
            }
            Err(err) => return Err(io_err(&new_file)(err)),
        };

        let origin_meta = fs::metadata(file).map_err(io_err(file))?;
        let origin_time = modified_utc(&origin_meta, file)?;
        let new_time = modified_utc(&new_meta, &new_file)?;
        let newer = new_time > origin_time;

        if !self.ignore_times && new_time >= origin_time {
            tracing::debug!(
                "{}: 时间戳 {} >= {}，跳过内容比较",
                relative,
                format_time(&new_time),
                format_time(&origin_time)
            );
            let status = if newer { Status::Newer } else { Status::Ok };
            return Ok(Entry::file(status, relative));
        }

        let same_content = if origin_meta.len() != new_meta.len() {
            false
        } else {
            hash_file(file)? == hash_file(&new_file)?
        };

        let status = match (same_content, newer) {
            (false, _) => Status::Changed,
            (true, true) => Status::Newer,
            (true, false) => Status::Ok,
        };
        tracing::debug!("{}: 内容比较结果 {}", relative, status.code());

        Ok(Entry::file(status, relative))
    }
}

/// 跟随链接时，目标不存在的符号链接
fn is_dangling_link(err: &walkdir::Error) -> bool {
    let Some(path) = err.path() else {
        return false;
    };
    let is_link = fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false);
    err.depth() > 0 && is_link && fs::metadata(path).is_err()
}

fn walk_error(dir: &Path, err: walkdir::Error) -> CompareError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.to_path_buf());
    CompareError::Io {
        path,
        source: err.into(),
    }
}
