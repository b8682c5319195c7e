//! Column specifications

use crate::style::StyleId;

/// Width, visibility and default format for a run of columns
///
/// Specs are forwarded to the sink verbatim when a sheet opens and must be
/// known up front, since column metadata precedes the row data in the package.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSpec {
    /// Number of consecutive columns the spec covers
    pub count: u32,
    /// Width in characters (None = default)
    pub width: Option<f64>,
    pub hidden: bool,
    pub style: Option<StyleId>,
}

impl ColumnSpec {
    /// A single column with default settings
    pub fn new() -> Self {
        Self {
            count: 1,
            width: None,
            hidden: false,
            style: None,
        }
    }

    /// A single column of the given width
    pub fn width(width: f64) -> Self {
        Self::new().with_width(width)
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Repeat the spec over `count` columns (at least one)
    pub fn repeated(mut self, count: u32) -> Self {
        self.count = count.max(1);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_style(mut self, style: StyleId) -> Self {
        self.style = Some(style);
        self
    }

    /// Whether the spec changes anything from the sheet defaults
    pub fn has_custom_settings(&self) -> bool {
        self.width.is_some() || self.hidden || self.style.is_some()
    }
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand specs into `(first, last, spec)` 1-based column spans, skipping
/// specs without custom settings
pub fn column_spans(specs: &[ColumnSpec]) -> Vec<(u32, u32, &ColumnSpec)> {
    let mut spans = Vec::new();
    let mut next = 1u32;
    for spec in specs {
        let first = next;
        let last = first.saturating_add(spec.count.max(1) - 1);
        if spec.has_custom_settings() {
            spans.push((first, last, spec));
        }
        next = last.saturating_add(1);
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_spans() {
        let specs = vec![
            ColumnSpec::width(20.0),
            ColumnSpec::new().repeated(2),
            ColumnSpec::width(8.5).repeated(3).hidden(true),
        ];
        let spans: Vec<(u32, u32)> = column_spans(&specs)
            .into_iter()
            .map(|(first, last, _)| (first, last))
            .collect();
        assert_eq!(spans, vec![(1, 1), (4, 6)]);
    }

    #[test]
    fn test_repeated_never_zero() {
        assert_eq!(ColumnSpec::new().repeated(0).count, 1);
    }
}
