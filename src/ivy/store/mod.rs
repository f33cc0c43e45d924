//! # Storage Layer
//!
//! Every table is a directory under the database root and every record is one
//! JSON file in it:
//!
//! ```text
//! data/
//! ├── ivy.json            # Optional index configuration
//! ├── planes/
//! │   ├── 1.json
//! │   ├── 2.json
//! │   └── 5.json          # ids 3 and 4 were deleted
//! └── airports/
//!     └── 1.json
//! ```
//!
//! The id is the filename stem and is never written into the document.
//! Allocation is `max + 1` over the ids present, so deleting the highest id
//! frees it for reuse while other gaps stay.
//!
//! - [`table::TableDir`]: the directory, id discovery, atomic file writes
//! - [`records`]: find/create/update/delete and field scans over one table
//!
//! Nothing here locks. Callers go through [`crate::db::Database`], which
//! holds the table's lock around every call.

pub mod records;
pub mod table;

pub use table::TableDir;
