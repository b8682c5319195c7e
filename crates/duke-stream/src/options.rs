//! Writer and sheet options

use crate::{ColumnSpec, FreezePane, SheetState, StyleId};

#[cfg(feature = "xlsx")]
use duke_stream_xlsx::{Compression, InvalidCharacters, XlsxOptions};

/// Document-wide settings for a [`StreamWriter`](crate::StreamWriter)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriterOptions {
    /// Route `Text` cells through the shared-string table instead of writing
    /// them inline
    pub shared_strings: bool,
    /// What the XLSX sink does with characters XML cannot carry
    #[cfg(feature = "xlsx")]
    pub invalid_characters: InvalidCharacters,
    #[cfg(feature = "xlsx")]
    pub compression: Compression,
}

impl WriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shared_strings(mut self, enabled: bool) -> Self {
        self.shared_strings = enabled;
        self
    }

    #[cfg(feature = "xlsx")]
    pub fn with_invalid_characters(mut self, policy: InvalidCharacters) -> Self {
        self.invalid_characters = policy;
        self
    }

    #[cfg(feature = "xlsx")]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Sink settings derived from these options
    #[cfg(feature = "xlsx")]
    pub fn xlsx_options(&self) -> XlsxOptions {
        XlsxOptions::default()
            .with_invalid_characters(self.invalid_characters)
            .with_compression(self.compression)
    }
}

/// Settings for one sheet, supplied when it is opened
///
/// # Example
///
/// ```rust
/// use duke_stream::{ColumnSpec, FreezePane, SheetOptions, SheetState};
///
/// let options = SheetOptions::new()
///     .with_columns(vec![ColumnSpec::width(20.0), ColumnSpec::width(12.0)])
///     .with_freeze(FreezePane::rows(1))
///     .with_state(SheetState::Hidden);
/// assert_eq!(options.columns.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetOptions {
    /// Column layout, forwarded to the sink as given
    pub columns: Vec<ColumnSpec>,
    pub state: SheetState,
    /// Style for unstyled cells of the first row written on the sheet
    pub header_style: Option<StyleId>,
    pub freeze: Option<FreezePane>,
}

impl SheetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_state(mut self, state: SheetState) -> Self {
        self.state = state;
        self
    }

    pub fn with_header_style(mut self, style: StyleId) -> Self {
        self.header_style = Some(style);
        self
    }

    pub fn with_freeze(mut self, freeze: FreezePane) -> Self {
        self.freeze = Some(freeze);
        self
    }
}
