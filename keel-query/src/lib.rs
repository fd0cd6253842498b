//! Query compilation for keel.
//!
//! Clients describe what they want as plain data; this crate compiles that
//! description against a record shape before any storage call is made:
//!
//! - [`FilterNode`] → [`compile`] → [`Predicate`] (inspectable, pushable to
//!   storage) → [`Matcher`] (closure tree for in-memory evaluation)
//! - expand paths → [`ExpandDirective`]
//! - [`OrderBy`] → [`SortKey`]s
//! - record keys → key predicates ([`key::for_one`], [`key::for_many`])
//! - [`PageRequest`] → [`PagePlan`] → [`PageResult`] over any
//!   [`QueryableSource`]
//!
//! All validation errors surface as [`CompileError`] before the source is
//! touched. Storage failures surface as [`StorageError`] unchanged.

mod compile;
mod error;
mod expand;
mod filter;
pub mod key;
mod page;
mod predicate;
mod sort;
mod source;

pub use compile::{MAX_FILTER_DEPTH, compile};
pub use error::{
    CompileError, CompileResult, QueryError, QueryResult, StorageError, StorageResult,
};
pub use expand::{ExpandDirective, RelationPath};
pub use filter::{FilterNode, Operator};
pub use page::{PagePlan, PageRequest, PageResult, page};
pub use predicate::{Comparison, Matcher, Predicate};
pub use sort::{OrderBy, SortDirection, SortKey, compare_records, compile_sort};
pub use source::QueryableSource;
