pub mod comparator;
pub mod parallel_tree_walker;
pub mod tree_walker;

pub use comparator::{Ancestors, DirectoryComparator, DirListing};
pub use parallel_tree_walker::ParallelTreeWalker;
pub use tree_walker::TreeWalker;
