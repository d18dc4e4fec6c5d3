pub mod header;
pub mod args;
pub mod convert;
pub mod logging;

pub use header::{RekHeader, PixelFormat, HeaderError, HEADER_SIZE};
pub use args::{parse, ConvertJob, Invocation, SyntaxError, USAGE};
pub use convert::{convert, ConvertError};
