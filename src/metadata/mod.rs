//! CLI metadata parsing for managed PE images.
//!
//! A managed image chains from the CLR data directory to the CLI runtime
//! header ([`CliHeader`]), from there to the metadata root ([`Root`]) with
//! its stream directory, and from the `#~` stream header to the metadata
//! tables ([`TablesStream`]). All three stages run once during image
//! construction; the results are owned by the image and immutable.
//!
//! # Key Components
//!
//! - [`CliHeader`] - the fixed 72-byte runtime header
//! - [`Root`] - metadata root and stream directory
//! - [`TablesStream`] - the `#~` stream with bitmaps, row counts and
//!   table locations
//! - [`tables`] - typed row access for the supported tables
//! - [`method_size`] - tiny/fat CIL method body sizing
//!
//! # Examples
//!
//! ```rust,no_run
//! use coffscope::{metadata::tables::TableId, CoffImage};
//!
//! let image = CoffImage::from_file(std::path::Path::new("managed.dll"))?;
//! if let Some(root) = image.metadata_root() {
//!     println!("runtime {}", root.version);
//! }
//! if let Some(tables) = image.tables() {
//!     println!("{} tables present", tables.table_count());
//!     println!("{} type refs", tables.row_count(TableId::TypeRef));
//! }
//! # Ok::<(), coffscope::Error>(())
//! ```

pub mod tables;

mod cor20;
mod method;
mod root;
mod streams;

pub use cor20::{CliHeader, CLI_HEADER_SIZE};
pub use method::method_size;
pub use root::{Root, METADATA_SIGNATURE};
pub use streams::{StreamHeader, TableLocation, TablesStream};

/// The parsed CLI metadata of a managed image.
///
/// The runtime header is always present when the CLR data directory points
/// anywhere; the root is absent when the header's metadata RVA is zero, and
/// the tables stream is absent when the stream directory carries no `#~`
/// entry.
pub struct CliMetadata {
    /// The CLI runtime header
    pub header: CliHeader,
    /// The metadata root and stream directory, if the header names one
    pub root: Option<Root>,
    /// The `#~` tables stream, if present in the stream directory
    pub tables: Option<TablesStream>,
}
