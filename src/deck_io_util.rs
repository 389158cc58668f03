use crate::deck_record_util::DeckError;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

/// Opens a deck for reading, decompressing `.gz` paths.
pub fn open_deck(path: &Path) -> Result<Box<dyn Read>, DeckError> {
    let file = File::open(path).map_err(|source| DeckError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    if is_gzip_path(path) {
        Ok(Box::new(MultiGzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Output side of a merge. Must be closed with `finish` so the gzip trailer
/// and buffered bytes reach the disk and errors are reported.
pub enum DeckWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl DeckWriter {
    pub fn create(path: &Path) -> Result<DeckWriter, DeckError> {
        let file = File::create(path).map_err(|source| DeckError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(DeckWriter::from_file(file, is_gzip_path(path)))
    }

    pub fn from_file(file: File, gzip: bool) -> DeckWriter {
        let writer = BufWriter::new(file);
        if gzip {
            DeckWriter::Gzip(GzEncoder::new(writer, Compression::default()))
        } else {
            DeckWriter::Plain(writer)
        }
    }

    pub fn finish(self) -> io::Result<()> {
        match self {
            DeckWriter::Plain(mut w) => w.flush(),
            DeckWriter::Gzip(w) => w.finish()?.flush(),
        }
    }
}

impl Write for DeckWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            DeckWriter::Plain(w) => w.write(buf),
            DeckWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            DeckWriter::Plain(w) => w.flush(),
            DeckWriter::Gzip(w) => w.flush(),
        }
    }
}
