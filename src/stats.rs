use std::collections::HashMap;

/// Call counts keyed by signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable(HashMap<String, u64>);

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the count for `signature`.
    pub fn increment(&mut self, signature: &str) {
        // Only allocate a key the first time a signature is seen
        if let Some(count) = self.0.get_mut(signature) {
            *count += 1;
        } else {
            self.0.insert(signature.to_owned(), 1);
        }
    }

    pub fn get(&self, signature: &str) -> u64 {
        self.0.get(signature).copied().unwrap_or(0)
    }

    /// Number of distinct signatures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(signature, count)| (signature.as_str(), *count))
    }

    /// Every entry, highest count first. Equal counts are ordered by signature so output is reproducible.
    pub fn ranked(&self) -> Vec<RankedEntry<'_>> {
        let mut entries: Vec<_> = self.iter().map(|(signature, count)| RankedEntry { signature, count }).collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.signature.cmp(b.signature)));
        entries
    }

    /// The highest ranked entries, at most `limit` of them, cut short according to `cutoff`.
    pub fn top(&self, limit: usize, cutoff: Cutoff) -> Top<'_> {
        let mut ranked = self.ranked();
        let k = limit.min(ranked.len());
        ranked.truncate(k);
        if cutoff == Cutoff::FirstSingleton {
            // Keep the first entry seen only once, drop everything after it
            if let Some(index) = ranked.iter().position(|entry| entry.count == 1) {
                ranked.truncate(index + 1);
            }
        }
        Top { k, entries: ranked }
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for CountTable {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(signature, count)| (signature.into(), count)).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry<'a> {
    pub signature: &'a str,
    pub count: u64,
}

/// When to stop listing a ranking before reaching its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cutoff {
    /// Stop after the first signature that was called only once.
    FirstSingleton,
    /// List everything up to the limit.
    Limit,
}

/// A ranking ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Top<'a> {
    /// `min(limit, distinct signatures)`, what the header announces even if the list stops early.
    pub k: usize,
    pub entries: Vec<RankedEntry<'a>>,
}

/// Per-document and run-wide call statistics.
///
/// The global table always equals the sum of the per-document tables of every document recorded so far.
#[derive(Debug, Default)]
pub struct Aggregator {
    document: CountTable,
    global: CountTable,
    total_calls: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting a new document. The global table is untouched.
    pub fn reset_document(&mut self) {
        self.document.clear();
    }

    /// Count one call to `signature`.
    pub fn record(&mut self, signature: &str) {
        self.document.increment(signature);
        self.global.increment(signature);
        self.total_calls += 1;
    }

    pub fn document(&self) -> &CountTable {
        &self.document
    }

    pub fn global(&self) -> &CountTable {
        &self.global
    }

    pub fn total_calls(&self) -> u64 {
        self.total_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::hashmap;

    fn entry(signature: &str, count: u64) -> RankedEntry<'_> {
        RankedEntry { signature, count }
    }

    #[test]
    fn test_record() {
        let mut aggregator = Aggregator::new();
        for signature in ["A#a", "B.b", "A#a"] {
            aggregator.record(signature);
        }
        assert_eq!(aggregator.document(), &CountTable(hashmap! { "A#a".into() => 2, "B.b".into() => 1 }));
        assert_eq!(aggregator.total_calls(), 3);

        aggregator.reset_document();
        assert!(aggregator.document().is_empty());
        aggregator.record("B.b");
        assert_eq!(aggregator.document(), &CountTable(hashmap! { "B.b".into() => 1 }));
        assert_eq!(aggregator.global(), &CountTable(hashmap! { "A#a".into() => 2, "B.b".into() => 2 }));
        assert_eq!(aggregator.total_calls(), 4);
        assert_eq!(aggregator.global().total(), aggregator.total_calls());
    }

    #[test]
    fn test_global_is_sum_of_documents() {
        let documents = [vec!["A#a", "B#b", "A#a"], vec![], vec!["B#b", "C.c"], vec!["A#a"]];
        let mut aggregator = Aggregator::new();
        let mut summed: HashMap<String, u64> = HashMap::new();
        for document in &documents {
            aggregator.reset_document();
            for signature in document {
                aggregator.record(signature);
            }
            assert_eq!(aggregator.document().total(), document.len() as u64);
            for (signature, count) in aggregator.document().iter() {
                *summed.entry(signature.to_owned()).or_default() += count;
            }
        }
        assert_eq!(aggregator.global(), &CountTable(summed));
        assert_eq!(aggregator.total_calls(), 6);
    }

    #[test]
    fn test_ranked_breaks_ties_by_signature() {
        let table: CountTable = vec![("b", 2), ("c", 5), ("a", 2), ("d", 1)].into_iter().collect();
        assert_eq!(table.ranked(), vec![entry("c", 5), entry("a", 2), entry("b", 2), entry("d", 1)]);
    }

    #[test]
    fn test_top_early_exit() {
        let table: CountTable = vec![("a", 5), ("b", 3), ("c", 1), ("d", 1), ("e", 7)].into_iter().collect();

        let top = table.top(20, Cutoff::FirstSingleton);
        assert_eq!(top.k, 5);
        assert_eq!(top.entries, vec![entry("e", 7), entry("a", 5), entry("b", 3), entry("c", 1)]);

        let top = table.top(20, Cutoff::Limit);
        assert_eq!(top.k, 5);
        assert_eq!(top.entries.iter().map(|e| e.count).collect::<Vec<_>>(), vec![7, 5, 3, 1, 1]);
    }

    #[test]
    fn test_top_limit() {
        let table: CountTable = (0..25u64).map(|i| (format!("S#m{:02}", i), i + 2)).collect();
        let top = table.top(20, Cutoff::FirstSingleton);
        assert_eq!(top.k, 20);
        assert_eq!(top.entries.len(), 20);
        assert_eq!(top.entries[0], entry("S#m24", 26));
        assert_eq!(top.entries[19], entry("S#m05", 7));

        let small: CountTable = vec![("a", 3), ("b", 2)].into_iter().collect();
        assert_eq!(small.top(20, Cutoff::Limit).k, 2);
        assert_eq!(CountTable::new().top(20, Cutoff::Limit), Top { k: 0, entries: vec![] });
    }
}
