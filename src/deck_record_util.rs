use csv::StringRecord;
use std::cmp::Ordering;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub const KEY_LEN: usize = 16;
pub const COLUMN_COUNT: usize = KEY_LEN + 2;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: expected 18 columns, found {found}")]
    ColumnCount { line: u64, found: usize },
    #[error("line {line}, column {column}: {token:?} is not a base-10 integer")]
    InvalidInteger {
        line: u64,
        column: usize,
        token: String,
    },
    #[error("sum overflow while merging key {key}")]
    SumOverflow { key: DeckKey },
    #[error("no input decks given")]
    NoInputs,
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The 16 feature columns of a deck row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeckKey(pub [u8; KEY_LEN]);

impl DeckKey {
    pub fn new(columns: [u8; KEY_LEN]) -> DeckKey {
        DeckKey(columns)
    }

    pub fn columns(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Element-wise comparison from column 0 to 15, first difference wins.
pub fn compare_keys(a: &DeckKey, b: &DeckKey) -> Ordering {
    for i in 0..KEY_LEN {
        if a.0[i] < b.0[i] {
            return Ordering::Less;
        } else if a.0[i] > b.0[i] {
            return Ordering::Greater;
        }
    }
    Ordering::Equal
}

impl Ord for DeckKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_keys(self, other)
    }
}

impl PartialOrd for DeckKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DeckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", column)?;
        }
        Ok(())
    }
}

/// One deck row: the key followed by the two accumulator columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckRecord {
    pub key: DeckKey,
    pub sum1: i64,
    pub sum2: i64,
}

impl DeckRecord {
    pub fn new(key: DeckKey, sum1: i64, sum2: i64) -> DeckRecord {
        DeckRecord { key, sum1, sum2 }
    }

    /// Parses one text line. A trailing `\n` or `\r\n` is ignored.
    pub fn parse_line(line: &str) -> Result<DeckRecord, DeckError> {
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        DeckRecord::from_tokens(line.split(','), 1)
    }

    /// Builds a record from a row yielded by a `csv::Reader`.
    pub fn from_fields(fields: &StringRecord) -> Result<DeckRecord, DeckError> {
        let line = fields.position().map(|p| p.line()).unwrap_or(0);
        DeckRecord::from_tokens(fields.iter(), line)
    }

    fn from_tokens<'a, I>(tokens: I, line: u64) -> Result<DeckRecord, DeckError>
    where
        I: Iterator<Item = &'a str>,
    {
        let tokens: Vec<&str> = tokens.collect();
        if tokens.len() != COLUMN_COUNT {
            return Err(DeckError::ColumnCount {
                line,
                found: tokens.len(),
            });
        }
        let mut columns = [0u8; KEY_LEN];
        for (i, token) in tokens[..KEY_LEN].iter().enumerate() {
            // out-of-range feature values wrap into 0..=255
            columns[i] = parse_integer(token, line, i + 1)? as u8;
        }
        let sum1 = parse_integer(tokens[KEY_LEN], line, KEY_LEN + 1)?;
        let sum2 = parse_integer(tokens[KEY_LEN + 1], line, KEY_LEN + 2)?;
        Ok(DeckRecord::new(DeckKey(columns), sum1, sum2))
    }

    /// Adds the accumulators of `other`, keeping this record's key.
    pub fn merged_with(&self, other: &DeckRecord) -> Result<DeckRecord, DeckError> {
        let overflow = || DeckError::SumOverflow { key: self.key };
        let sum1 = self.sum1.checked_add(other.sum1).ok_or_else(overflow)?;
        let sum2 = self.sum2.checked_add(other.sum2).ok_or_else(overflow)?;
        Ok(DeckRecord::new(self.key, sum1, sum2))
    }

    pub fn to_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::with_capacity(COLUMN_COUNT);
        fields.extend(self.key.0.iter().map(|c| c.to_string()));
        fields.push(self.sum1.to_string());
        fields.push(self.sum2.to_string());
        fields
    }

    /// `k0,k1,...,k15,sum1,sum2\n`
    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(COLUMN_COUNT * 4);
        for column in self.key.0.iter() {
            line.push_str(&column.to_string());
            line.push(',');
        }
        line.push_str(&format!("{},{}\n", self.sum1, self.sum2));
        line
    }
}

fn parse_integer(token: &str, line: u64, column: usize) -> Result<i64, DeckError> {
    token
        .trim()
        .parse::<i64>()
        .map_err(|_| DeckError::InvalidInteger {
            line,
            column,
            token: token.to_string(),
        })
}
