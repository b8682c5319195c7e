//! # duke-stream-xlsx
//!
//! Forward-only XLSX (Office Open XML) package sink for duke-stream.
//!
//! [`XlsxSink`] implements [`duke_stream_core::PackageSink`]: worksheet rows
//! are streamed into the ZIP archive as they arrive, and the workbook-level
//! parts are written once the document finishes.

pub mod error;
pub mod sink;

mod comments;
mod package;
mod sheet;
mod styles;
mod xml;

pub use error::{XlsxError, XlsxResult};
pub use sink::{Compression, DocumentType, XlsxOptions, XlsxSink};
pub use xml::InvalidCharacters;
