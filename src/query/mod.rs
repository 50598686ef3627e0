//! Predicate model and boolean query compiler
//!
//! ```text
//! verb call ──► PredicateSet (normalized, bucketed)
//!                   │
//!                   ▼
//!             QueryCompiler ──► ClauseTranslator (leaf clauses)
//!                   │
//!                   ▼
//!          {"bool": {"must": [...], "filter": [...], ...}}
//! ```

mod clause;
mod compiler;
mod predicate;
mod verbs;

pub use clause::ClauseTranslator;
pub use compiler::QueryCompiler;
pub(crate) use predicate::is_empty_value;
pub use predicate::{Bucket, Column, Operator, Predicate, PredicateSet, RangeBound};
pub use verbs::{Verb, VerbArgs};
