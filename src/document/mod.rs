//! Request documents
//!
//! [`QuerySpec`] holds the structural options a caller sets (pagination,
//! sort, projection, collapse, group-by, body override); the
//! [`DocumentAssembler`] folds them together with the compiled predicate tree
//! into an immutable [`QueryDocument`].

mod assembler;
mod spec;

pub use assembler::{DocumentAssembler, QueryDocument};
pub use spec::{BodyOverride, Direction, QuerySpec, SortOrder};
