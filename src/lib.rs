//! tsvclean — Streaming cleaner for large tab-delimited datasets.
//!
//! Enforces per-column byte limits with UTF-8-safe truncation and removes
//! exact-duplicate records in a single pass. Memory grows with the number of
//! distinct output rows, never with the size of the input.
//!
//! ## Example
//!
//! ```
//! use tsvclean::{Cleaner, SchemaRegistry};
//!
//! let registry = SchemaRegistry::builtin();
//! let limits = registry.limits_for("movies").unwrap();
//!
//! let input = "tconst\tprimaryTitle\ntt0000001\tCarmencita\ntt0000001\tCarmencita\n";
//! let mut output = Vec::new();
//! let summary = Cleaner::new(limits).run(input.as_bytes(), &mut output).unwrap();
//!
//! assert_eq!(summary.duplicates_dropped, 1);
//! assert_eq!(
//!     String::from_utf8(output).unwrap(),
//!     "tconst\tprimaryTitle\ntt0000001\tCarmencita\n"
//! );
//! ```

pub mod cleaner;
pub mod error;
pub mod schema;
pub mod truncate;

pub use cleaner::{clean_file, CleanSummary, Cleaner, ShapePolicy, DELIMITER, STDIO_PATH};
pub use error::{CleanError, Result};
pub use schema::{ColumnLimits, SchemaRegistry};
pub use truncate::truncate_to_bytes;
