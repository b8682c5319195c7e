//! Cell formatting descriptors and the style registry
//!
//! A [`Style`] is a set of optional components. Unset components fall back
//! to the package defaults when the style is applied directly to a cell, and
//! are left out entirely when the style is used as a differential format in
//! a conditional formatting rule.
//!
//! Styles are turned into indices by the [`StyleRegistry`], which collapses
//! structurally equal styles into one entry.

mod alignment;
mod border;
mod color;
mod fill;
mod font;
mod number_format;
mod registry;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{BorderEdge, BorderLineStyle, BorderStyle, DiagonalDirection};
pub use color::Color;
pub use fill::{FillStyle, PatternType};
pub use font::{FontStyle, FontVerticalAlign, Underline};
pub use number_format::NumberFormat;
pub use registry::{DifferentialStyleId, StyleId, StyleRef, StyleRegistry, Stylesheet};

/// A cell format made of optional components
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    /// Font settings
    pub font: Option<FontStyle>,
    /// Background fill
    pub fill: Option<FillStyle>,
    /// Cell borders
    pub border: Option<BorderStyle>,
    /// Number format
    pub number_format: Option<NumberFormat>,
    /// Text alignment
    pub alignment: Option<Alignment>,
    /// Cell protection
    pub protection: Option<Protection>,
}

impl Style {
    /// Create a style with every component unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no component is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Set the font
    pub fn with_font(mut self, font: FontStyle) -> Self {
        self.font = Some(font);
        self
    }

    /// Set the fill
    pub fn with_fill(mut self, fill: FillStyle) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Set the borders
    pub fn with_border(mut self, border: BorderStyle) -> Self {
        self.border = Some(border);
        self
    }

    /// Set the number format
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = Some(format);
        self
    }

    /// Set the alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Set the protection flags
    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = Some(protection);
        self
    }

    /// Shorthand for a bold default font
    pub fn bold(self) -> Self {
        let font = self.font.clone().unwrap_or_default().with_bold(true);
        self.with_font(font)
    }

    /// Shorthand for a solid background fill
    pub fn fill_color(self, color: Color) -> Self {
        self.with_fill(FillStyle::solid(color))
    }

    /// Shorthand for a custom number format code
    pub fn number_format(self, code: impl Into<String>) -> Self {
        self.with_number_format(NumberFormat::Custom(code.into()))
    }

    /// Font to emit for a direct cell format
    pub fn effective_font(&self) -> FontStyle {
        self.font.clone().unwrap_or_default()
    }

    /// Fill to emit for a direct cell format
    pub fn effective_fill(&self) -> FillStyle {
        self.fill.clone().unwrap_or_default()
    }

    /// Borders to emit for a direct cell format
    pub fn effective_border(&self) -> BorderStyle {
        self.border.clone().unwrap_or_default()
    }

    /// Number format to emit for a direct cell format
    pub fn effective_number_format(&self) -> NumberFormat {
        self.number_format.clone().unwrap_or_default()
    }
}

/// Cell protection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Protection {
    /// Cell is locked when the sheet is protected
    pub locked: bool,
    /// Formula is hidden when the sheet is protected
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

impl Protection {
    /// Unlocked, visible formula
    pub fn unlocked() -> Self {
        Self {
            locked: false,
            hidden: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_set_components() {
        let style = Style::new().bold().fill_color(Color::YELLOW).number_format("0.00%");
        assert!(style.font.as_ref().unwrap().bold);
        assert_eq!(style.fill, Some(FillStyle::solid(Color::YELLOW)));
        assert_eq!(
            style.number_format,
            Some(NumberFormat::Custom("0.00%".into()))
        );
        assert!(style.border.is_none());
        assert!(!style.is_empty());
        assert!(Style::new().is_empty());
    }

    #[test]
    fn test_effective_components_fall_back_to_defaults() {
        let style = Style::new();
        assert_eq!(style.effective_font(), FontStyle::default());
        assert_eq!(style.effective_fill(), FillStyle::None);
        assert_eq!(style.effective_number_format(), NumberFormat::General);
    }
}
