pub mod document;

pub use document::{current_timestamp, Document};
