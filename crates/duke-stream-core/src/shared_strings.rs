//! Shared string table

use ahash::AHashMap;

/// Per-document table of distinct strings referenced by index from cells
#[derive(Debug, Default, Clone)]
pub struct SharedStringTable {
    strings: Vec<String>,
    index: AHashMap<String, u32>,
    /// Total references, including repeats
    count: u64,
}

impl SharedStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or add a string, returning its index
    pub fn intern(&mut self, value: &str) -> u32 {
        self.count += 1;
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(value.to_string());
        self.index.insert(value.to_string(), idx);
        idx
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    /// Distinct strings in index order
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Number of distinct strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Number of references handed out
    pub fn reference_count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut table = SharedStringTable::new();
        assert_eq!(table.intern("apple"), 0);
        assert_eq!(table.intern("pear"), 1);
        assert_eq!(table.intern("apple"), 0);

        assert_eq!(table.len(), 2);
        assert_eq!(table.reference_count(), 3);
        assert_eq!(table.get(1), Some("pear"));
        assert_eq!(table.get(2), None);
    }
}
