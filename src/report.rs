use crate::stats::{Aggregator, CountTable, Cutoff};
use std::{
    fmt,
    io::{self, Write},
    path::Path,
};

/// Writes statistics to one sink and diagnostics to another, so the report can be captured on its own.
pub struct Reporter<O: Write, D: Write> {
    out: O,
    diag: D,
    limit: usize,
}

impl<O: Write, D: Write> Reporter<O, D> {
    /// `limit` caps how many signatures each ranking lists.
    pub fn new(out: O, diag: D, limit: usize) -> Self {
        Self { out, diag, limit }
    }

    pub fn found(&mut self, appmaps: usize) -> io::Result<()> {
        writeln!(self.diag, "Found {} appmaps", appmaps)
    }

    /// Report a skipped input or event.
    pub fn diagnostic(&mut self, message: &dyn fmt::Display) -> io::Result<()> {
        writeln!(self.diag, ">>> {}", message)
    }

    pub fn document(&mut self, path: &Path, events: usize) -> io::Result<()> {
        writeln!(self.out, "{}: {} event(s)", path.display(), events)
    }

    /// List a document's most called signatures, stopping at the first one called only once.
    pub fn document_top(&mut self, table: &CountTable) -> io::Result<()> {
        let top = table.top(self.limit, Cutoff::FirstSingleton);
        writeln!(self.out, "Top {}", top.k)?;
        for entry in top.entries {
            writeln!(self.out, "{}: {}", entry.signature, entry.count)?;
        }
        Ok(())
    }

    /// Total calls and the most called signatures across every document.
    pub fn summary(&mut self, aggregator: &Aggregator) -> io::Result<()> {
        writeln!(self.out, "Total calls: {}", aggregator.total_calls())?;
        let top = aggregator.global().top(self.limit, Cutoff::Limit);
        writeln!(self.out, "Top {}:", top.k)?;
        for entry in top.entries {
            writeln!(self.out, "{}: {}", entry.signature, entry.count)?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> (O, D) {
        (self.out, self.diag)
    }
}
