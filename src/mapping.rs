//! Symbol-to-action permutations.
//!
//! A [`Mapping`] decides what each base-12 symbol means to the turtle:
//! `mapping[symbol] = action`, where actions `0..6` translate and `6..12` rotate.

use crate::error::{ConfigError, MappingError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Number of distinct symbols and actions.
pub const SYMBOL_COUNT: usize = 12;

/// An immutable symbol-to-action table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Mapping {
    table: [u8; SYMBOL_COUNT],
}

impl Mapping {
    pub const IDENTITY: Mapping = Mapping {
        table: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    };
    pub const OPTIMAL: Mapping = Mapping {
        table: [0, 1, 2, 3, 4, 5, 6, 7, 10, 9, 8, 11],
    };
    pub const SPIRAL: Mapping = Mapping {
        table: [0, 2, 4, 6, 8, 10, 1, 3, 5, 7, 9, 11],
    };
    pub const STOCK_OPT: Mapping = Mapping {
        table: [1, 0, 2, 4, 10, 5, 6, 9, 8, 7, 3, 11],
    };

    /// Builds a mapping, rejecting anything that is not a permutation of `0..12`.
    pub fn new(table: [u8; SYMBOL_COUNT]) -> Result<Self, MappingError> {
        let mut seen = [false; SYMBOL_COUNT];
        for (index, &action) in table.iter().enumerate() {
            let slot = seen
                .get_mut(action as usize)
                .ok_or(MappingError::ActionOutOfRange { index, action })?;
            if *slot {
                return Err(MappingError::RepeatedAction { action });
            }
            *slot = true;
        }
        Ok(Self { table })
    }

    /// Wraps a table without validation.
    ///
    /// The walk engine still accepts such a mapping: it executes `action % 12`
    /// for every entry, so repeated or oversized actions are exercised rather
    /// than rejected.
    pub fn permissive(table: [u8; SYMBOL_COUNT]) -> Self {
        Self { table }
    }

    /// Looks up one of the standard mappings by its display name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "Identity" => Some(Self::IDENTITY),
            "Optimal" => Some(Self::OPTIMAL),
            "Spiral" => Some(Self::SPIRAL),
            "Stock-opt" => Some(Self::STOCK_OPT),
            _ => None,
        }
    }

    /// Returns the action index for a raw symbol (`symbol` is reduced mod 12).
    #[inline]
    pub fn action(&self, symbol: u8) -> u8 {
        self.table[symbol as usize % SYMBOL_COUNT]
    }

    pub fn as_array(&self) -> &[u8; SYMBOL_COUNT] {
        &self.table
    }

    /// True when the table is a real permutation.
    pub fn is_permutation(&self) -> bool {
        Self::new(self.table).is_ok()
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<Vec<u8>> for Mapping {
    type Error = MappingError;

    fn try_from(v: Vec<u8>) -> Result<Self, Self::Error> {
        let table: [u8; SYMBOL_COUNT] = v
            .as_slice()
            .try_into()
            .map_err(|_| MappingError::WrongLength { len: v.len() })?;
        Self::new(table)
    }
}

impl From<Mapping> for Vec<u8> {
    fn from(m: Mapping) -> Self {
        m.as_array().to_vec()
    }
}

/// Named mappings available to a run, seeded with the standard four.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingTable {
    mappings: HashMap<String, Mapping>,
}

impl Default for MappingTable {
    fn default() -> Self {
        let mappings = [
            ("Identity", Mapping::IDENTITY),
            ("Optimal", Mapping::OPTIMAL),
            ("Spiral", Mapping::SPIRAL),
            ("Stock-opt", Mapping::STOCK_OPT),
        ]
        .into_iter()
        .map(|(name, m)| (name.to_string(), m))
        .collect();
        Self { mappings }
    }
}

impl MappingTable {
    /// Parses `{ "Name": [12 actions], ... }` on top of the standard mappings.
    ///
    /// Every entry must be a valid permutation; the first bad one is reported
    /// by name.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, Vec<u8>> = serde_json::from_str(text)?;
        let mut table = Self::default();
        for (name, actions) in raw {
            let mapping = Mapping::try_from(actions).map_err(|source| ConfigError::Mapping {
                name: name.clone(),
                source,
            })?;
            table.insert(name, mapping);
        }
        Ok(table)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn insert(&mut self, name: impl Into<String>, mapping: Mapping) {
        self.mappings.insert(name.into(), mapping);
    }

    pub fn get(&self, name: &str) -> Option<&Mapping> {
        self.mappings.get(name)
    }

    /// Looks up `name`, falling back to [`Mapping::IDENTITY`] for unknown names.
    pub fn get_or_identity(&self, name: &str) -> Mapping {
        self.get(name).copied().unwrap_or(Mapping::IDENTITY)
    }

    /// Mapping names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.mappings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
