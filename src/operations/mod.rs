pub mod compare;

pub use compare::CompareOperation;
