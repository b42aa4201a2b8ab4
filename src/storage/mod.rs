//! Storage collaborators: fixed-size page files and per-segment document stores.

mod doc_store;
mod page_file;

pub use doc_store::{BlobPointer, DocStore, DocStoreIter};
pub use page_file::{PageFileChannel, PAGE_SIZE};
