//! Metadata streams of a managed image.
//!
//! The metadata root's stream directory names the regions of the metadata:
//! the `#~` tables stream plus the `#Strings`, `#US`, `#GUID` and `#Blob`
//! heaps. This crate parses the directory ([`StreamHeader`]) and the tables
//! stream ([`TablesStream`]); the heaps are located but not decoded beyond
//! the index widths the tables need.

mod streamheader;
mod tablesheader;

pub use streamheader::StreamHeader;
pub use tablesheader::{TableLocation, TablesStream};
