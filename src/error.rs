use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, covering every failure this library can return.
///
/// The variants map onto the three kinds of failure a read-only image parser
/// can encounter: reads that would cross the end of the buffer
/// ([`Error::OutOfBounds`]), structural invariants of the file format that do
/// not hold ([`Error::Malformed`]), and queries the format simply does not
/// record ([`Error::Unimplemented`]).
///
/// # Examples
///
/// ```rust,no_run
/// use coffscope::{CoffImage, Error};
///
/// match CoffImage::from_file(std::path::Path::new("some.obj")) {
///     Ok(image) => println!("loaded {} bytes", image.len()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("malformed image: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An out of bound access was attempted while parsing the image.
    ///
    /// A typed read would have crossed the end of the buffer, or the
    /// address arithmetic for the read would have overflowed.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The image is damaged and could not be parsed.
    ///
    /// A structural invariant of the PE/COFF or CLI metadata format was
    /// violated: wrong magic, an RVA no section covers, an out-of-range
    /// index, an invalid encoded section name, and so on. The error carries
    /// the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// This file type is not supported.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// The requested operation is not recorded by the COFF format.
    ///
    /// Returned instead of aborting for the handful of queries the format
    /// cannot answer, e.g. the final address of a relocation target.
    #[error("Not implemented - {0}")]
    Unimplemented(&'static str),

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
