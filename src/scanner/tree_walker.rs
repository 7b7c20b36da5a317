use std::collections::VecDeque;
use std::path::PathBuf;
use indicatif::ProgressBar;

use crate::error::Result;
use crate::models::Entry;
use crate::scanner::{Ancestors, DirectoryComparator};

/// 顺序遍历器 - 深度优先、先序遍历参照目录，惰性产出比较记录
///
/// 遍历本身不做任何输出。读取失败的路径会以 `Err` 产出，
/// 之后遍历继续，由调用方决定终止还是跳过。
pub struct TreeWalker<'a> {
    comparator: &'a DirectoryComparator,

    /// 待处理的目录栈及其祖先链，栈顶为下一个目录
    pending_dirs: Vec<(PathBuf, Ancestors)>,

    /// 当前目录中待比较的文件
    pending_files: VecDeque<PathBuf>,

    progress: ProgressBar,

    /// 已处理的目录数量
    scanned_dirs: usize,
}

impl<'a> TreeWalker<'a> {
    /// 从参照根目录开始遍历
    pub fn new(comparator: &'a DirectoryComparator) -> Self {
        Self {
            pending_dirs: vec![(comparator.origin_root().to_path_buf(), Ancestors::default())],
            comparator,
            pending_files: VecDeque::new(),
            progress: ProgressBar::hidden(),
            scanned_dirs: 0,
        }
    }

    /// 在进度条上显示当前目录
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn scanned_dirs(&self) -> usize {
        self.scanned_dirs
    }
}

impl Iterator for TreeWalker<'_> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(file) = self.pending_files.pop_front() {
                self.progress.inc(1);
                return Some(self.comparator.classify_file(&file));
            }

            let (dir, ancestors) = self.pending_dirs.pop()?;
            self.scanned_dirs += 1;
            self.progress.set_message(format!(
                "{} | 目录: {}",
                self.comparator.to_relative(&dir),
                self.scanned_dirs
            ));

            match self.comparator.check_directory(&dir) {
                Ok(Some(missing)) => return Some(Ok(missing)),
                Ok(None) => {}
                Err(err) => return Some(Err(err)),
            }

            match self.comparator.list_directory(&dir, &ancestors) {
                Ok(listing) => {
                    self.pending_files.extend(listing.files);
                    // 逆序入栈，保证第一个子目录最先处理
                    let chain = listing.ancestors;
                    self.pending_dirs.extend(
                        listing.dirs.into_iter().rev().map(|sub| (sub, chain.clone()))
                    );
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
