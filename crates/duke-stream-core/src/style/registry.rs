//! Style registry for deduplication and named lookup

use super::Style;
use crate::error::{Error, Result};
use ahash::AHashMap;
use std::fmt;

/// Index of a direct cell format
///
/// Index 0 is always the default format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleId(u32);

impl StyleId {
    /// The default cell format
    pub const DEFAULT: StyleId = StyleId(0);

    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a differential format, usable only by conditional formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifferentialStyleId(u32);

impl DifferentialStyleId {
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DifferentialStyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A direct style selected either by index or by registered name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StyleRef {
    ByIndex(StyleId),
    ByName(String),
}

impl From<StyleId> for StyleRef {
    fn from(id: StyleId) -> Self {
        StyleRef::ByIndex(id)
    }
}

impl From<&str> for StyleRef {
    fn from(name: &str) -> Self {
        StyleRef::ByName(name.to_string())
    }
}

impl From<String> for StyleRef {
    fn from(name: String) -> Self {
        StyleRef::ByName(name)
    }
}

/// The registry's content in index order, ready for the sink
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    /// Direct cell formats; position is the [`StyleId`]
    pub cell_styles: Vec<Style>,
    /// Differential formats; position is the [`DifferentialStyleId`]
    pub differential_styles: Vec<Style>,
    /// Named direct formats in registration order
    pub named_styles: Vec<(String, StyleId)>,
}

/// One index space: styles in insertion order plus lookup maps
#[derive(Debug, Default)]
struct StyleTable {
    styles: Vec<Style>,
    index_map: AHashMap<Style, u32>,
    names: AHashMap<String, u32>,
    named: Vec<(String, u32)>,
}

impl StyleTable {
    fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&idx) = self.index_map.get(&style) {
            return idx;
        }

        let idx = self.styles.len() as u32;
        self.index_map.insert(style.clone(), idx);
        self.styles.push(style);
        idx
    }

    fn register(&mut self, style: Style, name: Option<&str>) -> Result<u32> {
        if let Some(name) = name {
            check_name(name)?;
            if self.names.contains_key(name) {
                return Err(Error::DuplicateStyleName(name.to_string()));
            }
        }

        let idx = self.get_or_insert(style);
        if let Some(name) = name {
            self.names.insert(name.to_string(), idx);
            self.named.push((name.to_string(), idx));
        }
        Ok(idx)
    }

    fn resolve(&self, name: &str) -> Result<u32> {
        check_name(name)?;
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::StyleNameNotFound(name.to_string()))
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::StyleNameMustBeProvided);
    }
    Ok(())
}

/// Deduplicating registry of cell formats for one document
///
/// Structurally equal styles share one index, and indices are never
/// renumbered. Direct and differential formats live in separate index spaces
/// with separate name tables. Once [`finalize`](Self::finalize) hands the list
/// to the sink, registration is closed.
///
/// # Example
///
/// ```
/// use duke_stream_core::style::{Style, StyleRegistry, StyleId, Color};
///
/// let mut registry = StyleRegistry::new();
/// let header = registry.register(Style::new().bold(), Some("header")).unwrap();
/// let again = registry.register(Style::new().bold(), None).unwrap();
/// assert_eq!(header, again);
/// assert_eq!(registry.resolve("header").unwrap(), header);
///
/// let highlight = registry
///     .register_differential(Style::new().fill_color(Color::YELLOW), None)
///     .unwrap();
/// assert_eq!(highlight.index(), 0);
/// assert_ne!(header, StyleId::DEFAULT);
/// ```
#[derive(Debug)]
pub struct StyleRegistry {
    cell: StyleTable,
    differential: StyleTable,
    finalized: bool,
}

impl StyleRegistry {
    /// Create a registry holding only the default style at index 0
    pub fn new() -> Self {
        let mut cell = StyleTable::default();
        cell.get_or_insert(Style::default());
        Self {
            cell,
            differential: StyleTable::default(),
            finalized: false,
        }
    }

    /// Get or add a direct cell format, optionally under a name
    pub fn register(&mut self, style: Style, name: Option<&str>) -> Result<StyleId> {
        self.ensure_open()?;
        self.cell.register(style, name).map(StyleId)
    }

    /// Get or add a differential format, optionally under a name
    pub fn register_differential(
        &mut self,
        style: Style,
        name: Option<&str>,
    ) -> Result<DifferentialStyleId> {
        self.ensure_open()?;
        self.differential
            .register(style, name)
            .map(DifferentialStyleId)
    }

    /// Look up a direct format by its exact (case-sensitive) name
    pub fn resolve(&self, name: &str) -> Result<StyleId> {
        self.cell.resolve(name).map(StyleId)
    }

    /// Look up a differential format by its exact (case-sensitive) name
    pub fn resolve_differential(&self, name: &str) -> Result<DifferentialStyleId> {
        self.differential.resolve(name).map(DifferentialStyleId)
    }

    /// Turn a by-index or by-name reference into an index of this registry
    pub fn resolve_ref(&self, style: &StyleRef) -> Result<StyleId> {
        match style {
            StyleRef::ByIndex(id) if (id.0 as usize) < self.cell.styles.len() => Ok(*id),
            StyleRef::ByIndex(id) => Err(Error::UnknownStyleIndex(id.0)),
            StyleRef::ByName(name) => self.resolve(name),
        }
    }

    /// Get a direct format by index
    pub fn get(&self, id: StyleId) -> Option<&Style> {
        self.cell.styles.get(id.0 as usize)
    }

    /// Get a differential format by index
    pub fn get_differential(&self, id: DifferentialStyleId) -> Option<&Style> {
        self.differential.styles.get(id.0 as usize)
    }

    /// Number of direct formats, including the default
    pub fn len(&self) -> usize {
        self.cell.styles.len()
    }

    /// Whether only the default format exists
    pub fn is_empty(&self) -> bool {
        self.cell.styles.len() <= 1
    }

    /// Number of differential formats
    pub fn differential_len(&self) -> usize {
        self.differential.styles.len()
    }

    /// Whether the list has been handed out
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Close registration and return every format in index order
    ///
    /// Calling it again returns the same list.
    pub fn finalize(&mut self) -> Stylesheet {
        self.finalized = true;
        Stylesheet {
            cell_styles: self.cell.styles.clone(),
            differential_styles: self.differential.styles.clone(),
            named_styles: self
                .cell
                .named
                .iter()
                .map(|(name, idx)| (name.clone(), StyleId(*idx)))
                .collect(),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finalized {
            return Err(Error::StyleListNotAvailable);
        }
        Ok(())
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
