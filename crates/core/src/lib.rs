pub mod category;
pub mod compare;
pub mod dataset;
pub mod exclusion;
pub mod money;
pub mod summary;
pub mod transaction;

pub use category::{
    categorize, CategoryEntry, CategoryError, CategoryMap, CategoryStore, MemoryCategoryStore,
};
pub use compare::{
    compare, compare_all, CategoryComparison, CompareError, Comparison, SideComparison, Which,
};
pub use dataset::Dataset;
pub use exclusion::{filter, identity_of, ExclusionKey, ExclusionSet};
pub use money::Money;
pub use summary::{compute_summary, CategoryStats, RunningTotals, SideSummary, Summary};
pub use transaction::{Transaction, TransactionTable, TransactionType};
