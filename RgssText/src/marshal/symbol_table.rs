//! Symbol table management for marshal streams
//!
//! Symbols are written in full the first time they appear and as a `;`
//! backreference afterwards. Indices are assigned in first-use order and are
//! scoped to a single encode call. Symbols are keyed by their raw bytes, so
//! legacy-encoded names intern the same way UTF-8 ones do.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Vec<u8>>,
    indices: HashMap<Vec<u8>, usize>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a symbol. Returns its index and whether it was newly added.
    pub fn intern(&mut self, symbol: &[u8]) -> (usize, bool) {
        if let Some(&idx) = self.indices.get(symbol) {
            return (idx, false);
        }

        let idx = self.symbols.len();
        self.symbols.push(symbol.to_vec());
        self.indices.insert(symbol.to_vec(), idx);
        (idx, true)
    }

    /// Get symbol by index
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&[u8]> {
        self.symbols.get(idx).map(Vec::as_slice)
    }

    /// Get index of a symbol
    #[must_use]
    pub fn index_of(&self, symbol: &[u8]) -> Option<usize> {
        self.indices.get(symbol).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
