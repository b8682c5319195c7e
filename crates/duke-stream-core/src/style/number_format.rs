//! Number formats

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormat {
    #[default]
    General,

    /// Built-in format by id (0-163)
    BuiltIn(u32),

    /// Custom format code such as `0.00%` or `yyyy-mm-dd`
    Custom(String),
}

impl NumberFormat {
    /// First id available for custom format codes
    pub const FIRST_CUSTOM_ID: u32 = 164;

    /// 1 - 0
    pub const INTEGER: Self = NumberFormat::BuiltIn(1);
    /// 2 - 0.00
    pub const DECIMAL_2: Self = NumberFormat::BuiltIn(2);
    /// 3 - #,##0
    pub const THOUSANDS: Self = NumberFormat::BuiltIn(3);
    /// 4 - #,##0.00
    pub const THOUSANDS_DECIMAL_2: Self = NumberFormat::BuiltIn(4);
    /// 9 - 0%
    pub const PERCENT: Self = NumberFormat::BuiltIn(9);
    /// 10 - 0.00%
    pub const PERCENT_DECIMAL_2: Self = NumberFormat::BuiltIn(10);
    /// 11 - 0.00E+00
    pub const SCIENTIFIC: Self = NumberFormat::BuiltIn(11);
    /// 14 - mm-dd-yy
    pub const DATE: Self = NumberFormat::BuiltIn(14);
    /// 22 - m/d/yy h:mm
    pub const DATE_TIME: Self = NumberFormat::BuiltIn(22);
    /// 49 - @
    pub const TEXT: Self = NumberFormat::BuiltIn(49);

    /// Custom format from a code string
    pub fn custom(code: impl Into<String>) -> Self {
        NumberFormat::Custom(code.into())
    }

    /// Built-in id, if this format does not need a `numFmt` entry
    pub fn builtin_id(&self) -> Option<u32> {
        match self {
            NumberFormat::General => Some(0),
            NumberFormat::BuiltIn(id) => Some(*id),
            NumberFormat::Custom(_) => None,
        }
    }

    /// Custom format code, if any
    pub fn custom_code(&self) -> Option<&str> {
        match self {
            NumberFormat::Custom(code) => Some(code),
            _ => None,
        }
    }
}
