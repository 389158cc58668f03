use crate::deck_io_util::{is_gzip_path, open_deck, DeckWriter};
use crate::deck_record_util::{compare_keys, DeckError, DeckRecord};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use log::{debug, info};
use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Counters of a single two-way merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub records_a: u64,
    pub records_b: u64,
    /// key collisions summed into one output record
    pub merged: u64,
    pub written: u64,
}

impl fmt::Display for MergeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| Deck A | Deck B | Summed | Written |")?;
        writeln!(f, "|-------:|-------:|-------:|--------:|")?;
        write!(
            f,
            "| {} | {} | {} | {} |",
            self.records_a, self.records_b, self.merged, self.written
        )
    }
}

/// Head of one sorted record stream. `head()` is `None` once the stream is exhausted.
pub struct DeckCursor<R: Read> {
    reader: csv::Reader<R>,
    fields: StringRecord,
    head: Option<DeckRecord>,
    count: u64,
}

impl<R: Read> DeckCursor<R> {
    pub fn new(source: R) -> Result<DeckCursor<R>, DeckError> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(source);
        let mut cursor = DeckCursor {
            reader,
            fields: StringRecord::new(),
            head: None,
            count: 0,
        };
        cursor.advance()?;
        Ok(cursor)
    }

    pub fn head(&self) -> Option<DeckRecord> {
        self.head
    }

    /// Number of records parsed so far, including the current head.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn advance(&mut self) -> Result<(), DeckError> {
        if self.reader.read_record(&mut self.fields)? {
            self.head = Some(DeckRecord::from_fields(&self.fields)?);
            self.count += 1;
        } else {
            self.head = None;
        }
        Ok(())
    }
}

/// Merges two decks sorted by key into `out`, summing `sum1`/`sum2` of records
/// whose keys appear on both sides.
pub fn merge_decks<A, B, W>(a: A, b: B, out: W) -> Result<MergeStats, DeckError>
where
    A: Read,
    B: Read,
    W: Write,
{
    let mut cursor_a = DeckCursor::new(a)?;
    let mut cursor_b = DeckCursor::new(b)?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Never)
        .from_writer(out);
    let mut stats = MergeStats::default();

    loop {
        match (cursor_a.head(), cursor_b.head()) {
            (Some(record_a), Some(record_b)) => match compare_keys(&record_a.key, &record_b.key) {
                Ordering::Equal => {
                    writer.write_record(record_a.merged_with(&record_b)?.to_fields())?;
                    stats.merged += 1;
                    cursor_a.advance()?;
                    cursor_b.advance()?;
                }
                Ordering::Less => {
                    writer.write_record(record_a.to_fields())?;
                    cursor_a.advance()?;
                }
                Ordering::Greater => {
                    writer.write_record(record_b.to_fields())?;
                    cursor_b.advance()?;
                }
            },
            (Some(record_a), None) => {
                writer.write_record(record_a.to_fields())?;
                cursor_a.advance()?;
            }
            (None, Some(record_b)) => {
                writer.write_record(record_b.to_fields())?;
                cursor_b.advance()?;
            }
            (None, None) => break,
        }
        stats.written += 1;
    }
    writer.flush()?;

    stats.records_a = cursor_a.count();
    stats.records_b = cursor_b.count();
    debug!(
        "merge finished: {} + {} records, {} summed, {} written",
        stats.records_a, stats.records_b, stats.merged, stats.written
    );
    Ok(stats)
}

/// File-level merge. `.gz` paths are compressed/decompressed transparently.
pub fn merge_deck_files(
    deck_a: &Path,
    deck_b: &Path,
    output: &Path,
) -> Result<MergeStats, DeckError> {
    let reader_a = open_deck(deck_a)?;
    let reader_b = open_deck(deck_b)?;
    let mut writer = DeckWriter::create(output)?;
    let stats = merge_decks(reader_a, reader_b, &mut writer)?;
    writer.finish()?;
    info!(
        "merged {:?} and {:?} into {:?}: {} records written",
        deck_a, deck_b, output, stats.written
    );
    Ok(stats)
}

/// Folds `decks` left to right into `output`. Every step, the last one
/// included, writes to a temporary file next to `output`, so `output` may also
/// appear in `decks`. The last step is persisted over `output`; the stats of
/// that step are returned.
pub fn merge_deck_list<P: AsRef<Path>>(decks: &[P], output: &Path) -> Result<MergeStats, DeckError> {
    let (first, rest) = decks.split_first().ok_or(DeckError::NoInputs)?;
    let tmp_dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    // a single deck is folded with an empty stream
    let steps = rest.len().max(1);
    let mut running: Option<NamedTempFile> = None;
    let mut last_stats: Option<MergeStats> = None;
    for i in 0..steps {
        let reader_a = match &running {
            Some(step) => open_deck(step.path())?,
            None => open_deck(first.as_ref())?,
        };
        let reader_b: Box<dyn Read> = match rest.get(i) {
            Some(next) => open_deck(next.as_ref())?,
            None => Box::new(io::empty()),
        };
        let gzip = i + 1 == steps && is_gzip_path(output);
        let step = NamedTempFile::new_in(tmp_dir)?;
        let mut writer = DeckWriter::from_file(step.as_file().try_clone()?, gzip);
        last_stats = Some(merge_decks(reader_a, reader_b, &mut writer)?);
        writer.finish()?;
        // replacing the handle deletes the previous intermediate deck
        running = Some(step);
        debug!("fold step {}/{} done", i + 1, steps);
    }

    let last = running.ok_or(DeckError::NoInputs)?;
    last.persist(output).map_err(|e| DeckError::Io(e.error))?;
    info!("folded {} decks into {:?}", decks.len(), output);
    last_stats.ok_or(DeckError::NoInputs)
}
