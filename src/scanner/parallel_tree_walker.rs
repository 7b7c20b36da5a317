use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use crossbeam_channel::{bounded, Receiver, Sender};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::error::Result;
use crate::models::Entry;
use crate::scanner::{Ancestors, DirectoryComparator};

/// 并发遍历器 - 在固定大小的线程池中并行比较互不相关的子树
///
/// 所有结果经由同一个通道送到调用方，调用方是唯一的写出者。
/// 结果之间没有顺序保证；单个文件对的哈希不会被拆分到多个线程。
pub struct ParallelTreeWalker {
    comparator: Arc<DirectoryComparator>,

    /// 线程池大小
    jobs: usize,

    /// 结果通道容量
    queue_size: usize,

    progress: ProgressBar,
}

/// 接收端已关闭
struct Disconnected;

impl ParallelTreeWalker {
    /// 创建并发遍历器，`jobs` 为 0 时使用 CPU 核心数
    pub fn new(comparator: DirectoryComparator, jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self {
            comparator: Arc::new(comparator),
            jobs,
            queue_size: 1000,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// 设置结果通道容量，至少为 1
    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size.max(1);
        self
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 在后台线程池中开始遍历，返回结果接收端和后台线程句柄
    ///
    /// 所有结果发送完毕后通道关闭；丢弃接收端会让遍历尽快停止，
    /// 之后 join 句柄即可等待所有工作线程退出。
    pub fn walk(
        self,
    ) -> std::result::Result<(Receiver<Result<Entry>>, JoinHandle<()>), rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|i| format!("folderdiff-worker-{}", i))
            .build()?;
        let (tx, rx) = bounded(self.queue_size);

        tracing::debug!("使用 {} 个线程并发比较", self.jobs);

        let comparator = self.comparator;
        let progress = self.progress;
        let handle = std::thread::spawn(move || {
            pool.install(|| {
                let root = comparator.origin_root().to_path_buf();
                if walk_dir(&comparator, &root, &Ancestors::default(), &tx, &progress).is_err() {
                    tracing::debug!("接收端已关闭，停止遍历");
                }
            });
        });

        Ok((rx, handle))
    }
}

fn send(tx: &Sender<Result<Entry>>, item: Result<Entry>) -> std::result::Result<(), Disconnected> {
    tx.send(item).map_err(|_| Disconnected)
}

/// 比较一个目录：先检查是否缺失，再并行比较文件、并行递归子目录
fn walk_dir(
    comparator: &DirectoryComparator,
    dir: &Path,
    ancestors: &Ancestors,
    tx: &Sender<Result<Entry>>,
    progress: &ProgressBar,
) -> std::result::Result<(), Disconnected> {
    progress.set_message(comparator.to_relative(dir).to_string());

    match comparator.check_directory(dir) {
        Ok(Some(missing)) => return send(tx, Ok(missing)),
        Ok(None) => {}
        Err(err) => return send(tx, Err(err)),
    }

    let listing = match comparator.list_directory(dir, ancestors) {
        Ok(listing) => listing,
        Err(err) => return send(tx, Err(err)),
    };

    listing.files.par_iter().try_for_each(|file| {
        progress.inc(1);
        send(tx, comparator.classify_file(file))
    })?;

    listing
        .dirs
        .par_iter()
        .try_for_each(|sub| walk_dir(comparator, sub, &listing.ancestors, tx, progress))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompareConfig;
    use crate::models::Status;
    use crate::scanner::TreeWalker;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::MAIN_SEPARATOR;
    use tempfile::tempdir;

    #[test]
    fn test_parallel_matches_sequential() {
        let origin = tempdir().unwrap();
        let new = tempdir().unwrap();

        for dir in ["x", "y", "z"] {
            fs::create_dir(origin.path().join(dir)).unwrap();
            for i in 0..5 {
                fs::write(origin.path().join(dir).join(format!("f{}.txt", i)), dir).unwrap();
            }
        }
        fs::create_dir(new.path().join("x")).unwrap();
        fs::create_dir(new.path().join("y")).unwrap();
        fs::write(new.path().join("x").join("f0.txt"), "x").unwrap();

        let mut config = CompareConfig::new(origin.path(), new.path());
        config.ignore_times = true;
        let comparator = DirectoryComparator::new(&config);

        let sequential: BTreeSet<String> = TreeWalker::new(&comparator)
            .map(|entry| entry.unwrap().to_string())
            .collect();

        let walker = ParallelTreeWalker::new(comparator, 4);
        assert_eq!(walker.jobs(), 4);
        let (rx, handle) = walker.walk().unwrap();
        let parallel: BTreeSet<String> = rx
            .iter()
            .map(|entry| entry.unwrap().to_string())
            .collect();
        handle.join().unwrap();

        assert_eq!(sequential, parallel);
        // x 中 1 个一致 4 个缺失，y 中 5 个缺失，z 整个目录缺失
        assert_eq!(parallel.len(), 11);
    }

    #[test]
    fn test_dropping_receiver_stops_walk() {
        let origin = tempdir().unwrap();
        let new = tempdir().unwrap();
        for i in 0..200 {
            fs::write(origin.path().join(format!("f{:03}.txt", i)), "a").unwrap();
        }

        let config = CompareConfig::new(origin.path(), new.path());
        let progress = ProgressBar::hidden();
        let walker = ParallelTreeWalker::new(DirectoryComparator::new(&config), 2)
            .with_queue_size(1)
            .with_progress(progress.clone());
        let (rx, handle) = walker.walk().unwrap();

        let first = rx.recv().unwrap().unwrap();
        assert_eq!(first.status, Status::Missing);
        drop(rx);

        // 工作线程发现通道关闭后退出，不会比较完全部文件
        handle.join().unwrap();
        assert!(progress.position() < 200);
    }

    #[cfg(unix)]
    #[test]
    fn test_followed_loop_terminates() {
        use std::os::unix::fs::symlink;

        let origin = tempdir().unwrap();
        let new = tempdir().unwrap();
        for root in [origin.path(), new.path()] {
            fs::create_dir_all(root.join("a").join("b")).unwrap();
            fs::write(root.join("a").join("f.txt"), "f").unwrap();
            symlink("../../a", root.join("a").join("b").join("loop")).unwrap();
            symlink("..", root.join("a").join("up")).unwrap();
        }

        let mut config = CompareConfig::new(origin.path(), new.path());
        config.follow_symlinks = true;
        let (rx, handle) = ParallelTreeWalker::new(DirectoryComparator::new(&config), 3)
            .walk()
            .unwrap();
        let entries: Vec<Entry> = rx.iter().collect::<Result<_>>().unwrap();
        handle.join().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path.as_str(), format!("{}a{}f.txt", MAIN_SEPARATOR, MAIN_SEPARATOR));
    }
}
