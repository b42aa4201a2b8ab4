//! Query evaluation helpers
//!
//! The index manager resolves terms to posting lists per segment; this module
//! combines those lists:
//! - `intersect`: AND over sorted posting lists
//! - `union`: OR over sorted posting lists
//! - `PhraseMatcher`: consecutive-offset check over position lists

mod bool_query;
mod phrase_query;

pub use bool_query::{intersect, union};
pub use phrase_query::{follow_positions, PhraseMatcher};
