//! GPIO line resolution against a controller table
//!
//! A global line number resolves to the controller whose line range contains
//! it, yielding the controller label and a controller-local offset. The
//! production table is loaded from a standalone TOML file listing the
//! controllers present on the target.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChipTableError {
    #[error("failed to read chip table: {0}")]
    IoError(#[from] std::io::Error),
    #[error("failed to parse chip table: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Role a signal line plays on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinRole {
    /// Data line.
    Sda,
    /// Clock line.
    Scl,
}

impl fmt::Display for PinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinRole::Sda => write!(f, "SDA"),
            PinRole::Scl => write!(f, "SCL"),
        }
    }
}

/// A resolved signal line: owning controller plus local offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPin {
    /// Label of the owning controller.
    pub chip_label: String,
    /// Line offset local to the controller.
    pub offset: u32,
}

/// Resolves a global signal-line number to its owning controller.
///
/// Resolution has no side effects; an unknown line is simply `None`.
pub trait PinResolver {
    fn resolve(&self, line: u32) -> Option<ResolvedPin>;
}

/// One GPIO controller and the global line range it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpioChip {
    /// Controller label (e.g. "gpiochip0").
    pub label: String,
    /// First global line number owned by this controller.
    pub base: u32,
    /// Number of lines on this controller.
    pub ngpio: u32,
}

/// Table of known GPIO controllers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipTable {
    #[serde(default, rename = "chip")]
    chips: Vec<GpioChip>,
}

impl ChipTable {
    pub fn new(chips: Vec<GpioChip>) -> Self {
        Self { chips }
    }

    /// Parse a chip table from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ChipTableError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a chip table from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ChipTableError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn chips(&self) -> &[GpioChip] {
        &self.chips
    }
}

impl PinResolver for ChipTable {
    fn resolve(&self, line: u32) -> Option<ResolvedPin> {
        self.chips
            .iter()
            .find(|chip| line >= chip.base && line - chip.base < chip.ngpio)
            .map(|chip| ResolvedPin {
                chip_label: chip.label.clone(),
                offset: line - chip.base,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_chip_table() -> ChipTable {
        ChipTable::new(vec![
            GpioChip {
                label: "gpiochip0".to_string(),
                base: 0,
                ngpio: 32,
            },
            GpioChip {
                label: "gpiochip1".to_string(),
                base: 32,
                ngpio: 16,
            },
        ])
    }

    #[test]
    fn test_resolve_within_first_chip() {
        let table = two_chip_table();
        let pin = table.resolve(5).unwrap();
        assert_eq!(pin.chip_label, "gpiochip0");
        assert_eq!(pin.offset, 5);
    }

    #[test]
    fn test_resolve_crosses_into_second_chip() {
        let table = two_chip_table();
        let pin = table.resolve(35).unwrap();
        assert_eq!(pin.chip_label, "gpiochip1");
        assert_eq!(pin.offset, 3);
    }

    #[test]
    fn test_resolve_unknown_line() {
        let table = two_chip_table();
        assert_eq!(table.resolve(48), None);
        assert_eq!(table.resolve(999), None);
    }

    #[test]
    fn test_chip_table_from_toml() {
        let toml = r#"
[[chip]]
label = "gpiochip0"
base = 0
ngpio = 32

[[chip]]
label = "gpiochip1"
base = 32
ngpio = 16
"#;
        let table = ChipTable::from_toml(toml).unwrap();
        assert_eq!(table.chips().len(), 2);
        assert_eq!(table.resolve(33).unwrap().chip_label, "gpiochip1");
    }

    #[test]
    fn test_chip_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpiochips.toml");
        std::fs::write(
            &path,
            "[[chip]]\nlabel = \"gpiochip0\"\nbase = 0\nngpio = 8\n",
        )
        .unwrap();

        let table = ChipTable::from_file(&path).unwrap();
        assert_eq!(table.resolve(7).unwrap().offset, 7);
        assert_eq!(table.resolve(8), None);
    }
}
