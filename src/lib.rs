use log::{debug, info, warn};
use std::{
    io::{self, Read, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

pub mod document;
pub mod event;
pub mod files;
pub mod report;
pub mod stats;

pub use document::{DecodeError, Document, ShapeError};
pub use event::{signature, CallEvent, Event, MalformedCall};
pub use files::{find_appmaps, Discovery, Filesystem, OsFilesystem};
pub use report::Reporter;
pub use stats::{Aggregator, CountTable, Cutoff, RankedEntry, Top};

/// AppMaps larger than this many bytes are skipped by default.
pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024 * 2000;
/// Default number of signatures listed in each ranking.
pub const DEFAULT_TOP: usize = 20;

/// Everything that can go wrong while producing statistics. Only fatal errors stop a run,
/// the rest are reported as diagnostics and the offending input or event is skipped.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("File {name} too big, skipped")]
    InputTooLarge { name: String, size: u64 },
    #[error("Failed opening {}", .path.display())]
    InputOpenFailure { path: PathBuf, source: io::Error },
    #[error("Failed reading {}", .path.display())]
    InputReadFailure { path: PathBuf, source: io::Error },
    #[error("Failed decoding {}, {}", .path.display(), .source)]
    DecodeFailure { path: PathBuf, source: DecodeError },
    #[error("{} in {}", .problem, .path.display())]
    MissingEventsShape { path: PathBuf, problem: ShapeError },
    #[error("Malformed call event {} in {}: {}", .index, .path.display(), .reason)]
    MalformedCallEvent { path: PathBuf, index: usize, reason: MalformedCall },
    #[error("Failed writing report")]
    Output(#[from] io::Error),
}

impl StatsError {
    /// Whether this error ends the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StatsError::InputOpenFailure { .. } | StatsError::InputReadFailure { .. } | StatsError::Output(_)
        )
    }
}

/// Process every AppMap in order, then report the totals. Returns the final statistics.
pub fn run<F: Filesystem, O: Write, D: Write>(
    fs: &F,
    appmaps: &[PathBuf],
    reporter: &mut Reporter<O, D>,
) -> Result<Aggregator, StatsError> {
    let mut aggregator = Aggregator::new();
    reporter.found(appmaps.len())?;
    for path in appmaps {
        match process_appmap(fs, path, &mut aggregator, reporter) {
            Ok(()) => (),
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                warn!("skipped {}: {}", path.display(), error);
                reporter.diagnostic(&error)?;
            }
        }
    }
    reporter.summary(&aggregator)?;
    Ok(aggregator)
}

/// Count the calls in one AppMap and report its ranking. Nothing is recorded unless the whole document decodes;
/// malformed call events are reported and skipped one by one.
pub fn process_appmap<F: Filesystem, O: Write, D: Write>(
    fs: &F,
    path: &Path,
    aggregator: &mut Aggregator,
    reporter: &mut Reporter<O, D>,
) -> Result<(), StatsError> {
    aggregator.reset_document();
    let bytes = read_appmap(fs, path)?;
    let root = document::decode(&bytes)
        .map_err(|source| StatsError::DecodeFailure { path: path.to_owned(), source })?;
    let document = Document::from_root(root)
        .map_err(|problem| StatsError::MissingEventsShape { path: path.to_owned(), problem })?;

    reporter.document(path, document.len())?;
    for (index, event) in document.events().enumerate() {
        match event {
            Ok(Event::Call(call)) => aggregator.record(&call.signature()),
            Ok(Event::Other) => (),
            Err(reason) => {
                let error = StatsError::MalformedCallEvent { path: path.to_owned(), index, reason };
                warn!("{}", error);
                reporter.diagnostic(&error)?;
            }
        }
    }
    info!("{}: {} call(s), {} signature(s)", path.display(), aggregator.document().total(), aggregator.document().len());
    reporter.document_top(aggregator.document())?;
    Ok(())
}

/// Read a whole AppMap. The file is closed before this returns, whatever happens next.
fn read_appmap<F: Filesystem>(fs: &F, path: &Path) -> Result<Vec<u8>, StatsError> {
    debug!("reading {}", path.display());
    let mut file = fs.open(path).map_err(|source| StatsError::InputOpenFailure { path: path.to_owned(), source })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|source| StatsError::InputReadFailure { path: path.to_owned(), source })?;
    Ok(bytes)
}
