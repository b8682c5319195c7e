//! Cell range addresses
//!
//! A [`CellRange`] is a rectangular span such as `A1`, `$B$2:D10` or
//! `'Q1 Sales'!A1:C5`. Ranges are immutable and always stored in normalized
//! form: the start corner is the top-left cell and the end corner the
//! bottom-right cell, whatever order the corners were given in.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// One corner of a range as written in A1 notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Corner {
    column: u32,
    row: u32,
    column_absolute: bool,
    row_absolute: bool,
}

impl Corner {
    fn relative(column: u32, row: u32) -> Self {
        Self {
            column,
            row,
            column_absolute: false,
            row_absolute: false,
        }
    }

    fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        if self.column_absolute {
            f.write_char('$')?;
        }
        f.write_str(&column_to_letters(self.column))?;
        if self.row_absolute {
            f.write_char('$')?;
        }
        write!(f, "{}", self.row)
    }
}

/// Sheet qualifier of a range
///
/// `quoted` records whether the name is rendered inside single quotes; it
/// does not take part in equality, hashing or ordering.
#[derive(Debug, Clone)]
struct SheetName {
    name: String,
    quoted: bool,
}

impl SheetName {
    /// A name that is quoted only when it has to be
    fn new(name: String) -> Self {
        let quoted = !is_plain_sheet_name(&name);
        Self { name, quoted }
    }
}

impl PartialEq for SheetName {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SheetName {}

impl std::hash::Hash for SheetName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Ord for SheetName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl PartialOrd for SheetName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A rectangular range of cells, optionally qualified by a sheet name
///
/// Columns and rows are 1-based (`A1` is column 1, row 1). Each coordinate
/// carries its own absolute (`$`) marker. A parsed sheet name keeps the
/// quoting it was written with; names added through
/// [`with_sheet`](Self::with_sheet) are quoted when they are not plain
/// identifiers.
///
/// # Examples
///
/// ```
/// use duke_stream_core::CellRange;
///
/// let range = CellRange::parse("c5:$A$1").unwrap();
/// assert_eq!(range.to_string(), "$A$1:C5");
/// assert_eq!(range.height(), 5);
///
/// let single = CellRange::parse("Data!B2").unwrap();
/// assert!(single.is_single_cell());
/// assert_eq!(single.sheet(), Some("Data"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct CellRange {
    start: Corner,
    end: Corner,
    sheet: Option<SheetName>,
}

impl CellRange {
    /// Create a relative range from explicit coordinates
    ///
    /// The corners may be given in any order; the result is normalized.
    pub fn new(start_column: u32, start_row: u32, end_column: u32, end_row: u32) -> Result<Self> {
        check_column(start_column)?;
        check_column(end_column)?;
        check_row(start_row)?;
        check_row(end_row)?;
        Ok(Self::from_corners(
            Corner::relative(start_column, start_row),
            Corner::relative(end_column, end_row),
            None,
        ))
    }

    /// Create a single-cell range
    pub fn cell(column: u32, row: u32) -> Result<Self> {
        Self::new(column, row, column, row)
    }

    /// Parse a range from A1 notation
    ///
    /// Accepts an optional `sheet!` prefix (the name may be quoted with single
    /// quotes), one cell reference, and optionally `:` followed by a second
    /// cell reference. Column letters are case-insensitive.
    pub fn parse(text: &str) -> Result<Self> {
        let s = text.trim();
        if s.is_empty() {
            return Err(invalid(text, "empty range"));
        }

        let (sheet, refs) = split_sheet_name(s, text)?;

        let mut parts = refs.split(':');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid(text, "more than one ':'"));
        }

        let start = parse_corner(first, text)?;
        let end = match second {
            Some(part) => parse_corner(part, text)?,
            None => start,
        };

        Ok(Self::from_corners(start, end, sheet))
    }

    fn from_corners(a: Corner, b: Corner, sheet: Option<SheetName>) -> Self {
        // Absolute markers travel with the coordinate they decorate.
        let ((start_column, start_column_absolute), (end_column, end_column_absolute)) =
            if a.column <= b.column {
                ((a.column, a.column_absolute), (b.column, b.column_absolute))
            } else {
                ((b.column, b.column_absolute), (a.column, a.column_absolute))
            };
        let ((start_row, start_row_absolute), (end_row, end_row_absolute)) = if a.row <= b.row {
            ((a.row, a.row_absolute), (b.row, b.row_absolute))
        } else {
            ((b.row, b.row_absolute), (a.row, a.row_absolute))
        };

        let start = Corner {
            column: start_column,
            row: start_row,
            column_absolute: start_column_absolute,
            row_absolute: start_row_absolute,
        };
        let mut end = Corner {
            column: end_column,
            row: end_row,
            column_absolute: end_column_absolute,
            row_absolute: end_row_absolute,
        };
        if start.column == end.column && start.row == end.row {
            // A single cell renders as one reference, so it can only carry one set of markers.
            end = start;
        }

        Self { start, end, sheet }
    }

    /// Return a copy with the given absolute markers on both corners
    pub fn with_absolute(&self, column_absolute: bool, row_absolute: bool) -> Self {
        let mut range = self.clone();
        for corner in [&mut range.start, &mut range.end] {
            corner.column_absolute = column_absolute;
            corner.row_absolute = row_absolute;
        }
        range
    }

    /// Return a fully absolute copy (`$A$1:$C$5`)
    pub fn to_absolute(&self) -> Self {
        self.with_absolute(true, true)
    }

    /// Return a copy qualified with a sheet name
    pub fn with_sheet(&self, sheet: impl Into<String>) -> Self {
        Self {
            sheet: Some(SheetName::new(sheet.into())),
            ..self.clone()
        }
    }

    /// Return a copy without the sheet qualifier
    pub fn without_sheet(&self) -> Self {
        Self {
            sheet: None,
            ..self.clone()
        }
    }

    /// First column (1-based)
    pub fn start_column(&self) -> u32 {
        self.start.column
    }

    /// First row (1-based)
    pub fn start_row(&self) -> u32 {
        self.start.row
    }

    /// Last column (1-based, inclusive)
    pub fn end_column(&self) -> u32 {
        self.end.column
    }

    /// Last row (1-based, inclusive)
    pub fn end_row(&self) -> u32 {
        self.end.row
    }

    /// Absolute markers as `[start column, start row, end column, end row]`
    pub fn absolute_flags(&self) -> [bool; 4] {
        [
            self.start.column_absolute,
            self.start.row_absolute,
            self.end.column_absolute,
            self.end.row_absolute,
        ]
    }

    /// Sheet qualifier, unquoted
    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_ref().map(|s| s.name.as_str())
    }

    /// Number of rows spanned
    pub fn height(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns spanned
    pub fn width(&self) -> u32 {
        self.end.column - self.start.column + 1
    }

    /// Whether the range addresses exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.start.column == self.end.column && self.start.row == self.end.row
    }

    /// Whether the cell at `column`/`row` lies inside the range
    pub fn contains(&self, column: u32, row: u32) -> bool {
        (self.start.column..=self.end.column).contains(&column)
            && (self.start.row..=self.end.row).contains(&row)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write_sheet_name(f, sheet)?;
            f.write_char('!')?;
        }
        self.start.write_to(f)?;
        if !self.is_single_cell() {
            f.write_char(':')?;
            self.end.write_to(f)?;
        }
        Ok(())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CellRange {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CellRange> for String {
    fn from(range: CellRange) -> Self {
        range.to_string()
    }
}

impl Ord for CellRange {
    /// Row-major on the start corner, then the end corner
    fn cmp(&self, other: &Self) -> Ordering {
        (
            self.start.row,
            self.start.column,
            self.end.row,
            self.end.column,
        )
            .cmp(&(
                other.start.row,
                other.start.column,
                other.end.row,
                other.end.column,
            ))
            .then_with(|| self.absolute_flags().cmp(&other.absolute_flags()))
            .then_with(|| self.sheet.cmp(&other.sheet))
    }
}

impl PartialOrd for CellRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA)
///
/// Returns an empty string for column 0.
pub fn column_to_letters(column: u32) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut n = column;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert column letters to a 1-based column number (A = 1, Z = 26, AA = 27)
///
/// Letters are case-insensitive. Fails for empty input, non-letters and
/// columns past `XFD`.
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidRange("empty column letters".into()));
    }

    let mut column: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidRange(format!(
                "invalid column letter '{}' in '{}'",
                c, letters
            )));
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        column = column
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .filter(|&v| v <= MAX_COLS)
            .ok_or_else(|| Error::InvalidRange(format!("column '{}' out of range", letters)))?;
    }

    Ok(column)
}

fn invalid(text: &str, reason: &str) -> Error {
    Error::InvalidRange(format!("'{}': {}", text, reason))
}

fn check_column(column: u32) -> Result<()> {
    if column == 0 || column > MAX_COLS {
        return Err(Error::ColumnOutOfBounds(column, MAX_COLS));
    }
    Ok(())
}

fn check_row(row: u32) -> Result<()> {
    if row == 0 || row > MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS));
    }
    Ok(())
}

/// Split an optional `sheet!` prefix from the cell references
///
/// A quoted name ends at the first lone `'` and may contain `!`; an
/// unquoted name ends at the first `!`.
fn split_sheet_name<'a>(s: &'a str, text: &str) -> Result<(Option<SheetName>, &'a str)> {
    if let Some(quoted) = s.strip_prefix('\'') {
        let mut name = String::new();
        let mut chars = quoted.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != '\'' {
                name.push(c);
                continue;
            }
            if matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                name.push('\'');
                continue;
            }
            let refs = quoted[i + 1..]
                .strip_prefix('!')
                .ok_or_else(|| invalid(text, "expected '!' after quoted sheet name"))?;
            if name.is_empty() {
                return Err(invalid(text, "missing sheet name before '!'"));
            }
            return Ok((Some(SheetName { name, quoted: true }), refs));
        }
        return Err(invalid(text, "unterminated quoted sheet name"));
    }

    match s.find('!') {
        Some(0) => Err(invalid(text, "missing sheet name before '!'")),
        Some(pos) => Ok((
            Some(SheetName {
                name: s[..pos].to_string(),
                quoted: false,
            }),
            &s[pos + 1..],
        )),
        None => Ok((None, s)),
    }
}

fn parse_corner(part: &str, text: &str) -> Result<Corner> {
    let bytes = part.as_bytes();
    let mut pos = 0;

    let column_absolute = bytes.first() == Some(&b'$');
    if column_absolute {
        pos += 1;
    }

    let letters_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
        pos += 1;
    }
    if pos == letters_start {
        return Err(invalid(text, "missing column letters"));
    }
    let column = letters_to_column(&part[letters_start..pos]).map_err(|_| invalid(text, "column out of range"))?;

    let row_absolute = bytes.get(pos) == Some(&b'$');
    if row_absolute {
        pos += 1;
    }

    let digits = &part[pos..];
    if digits.is_empty() {
        return Err(invalid(text, "missing row number"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(text, "row number must follow column letters"));
    }
    let row: u32 = digits
        .parse()
        .map_err(|_| invalid(text, "row number out of range"))?;
    if row == 0 {
        return Err(invalid(text, "row number must be >= 1"));
    }
    if row > MAX_ROWS {
        return Err(invalid(text, "row number out of range"));
    }

    Ok(Corner {
        column,
        row,
        column_absolute,
        row_absolute,
    })
}

fn write_sheet_name(f: &mut impl fmt::Write, sheet: &SheetName) -> fmt::Result {
    if sheet.quoted {
        f.write_char('\'')?;
        f.write_str(&sheet.name.replace('\'', "''"))?;
        f.write_char('\'')
    } else {
        f.write_str(&sheet.name)
    }
}

/// Names that can be written without quotes: identifier-like and not
/// mistakable for a cell reference. Anything containing `!` or `'` is quoted.
fn is_plain_sheet_name(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false);
    first_ok
        && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        && parse_corner(name, name).is_err()
}
