use fxhash::{FxHashMap, FxHashSet};
use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use std::fmt::Display;

use super::error::TableError;

/// Number of leading rows/columns shown when a table is printed
const PREVIEW_ROWS: usize = 5;
const PREVIEW_COLUMNS: usize = 8;

/// Format an offline channel as a column label (zero padded to 4 digits)
pub fn channel_label(offline_channel: u32) -> String {
    format!("{offline_channel:04}")
}

/// The decoded contents of one fragment dataset.
///
/// Rows are frames in the order they were decoded, indexed by frame timestamp. Columns are
/// the 256 frame channels, labeled by offline channel.
#[derive(Debug, Clone)]
pub struct DatasetTable {
    pub path: String,
    pub timestamps: Array1<u64>,
    pub labels: Vec<String>,
    pub adcs: Array2<u16>,
}

impl DatasetTable {
    pub fn new(
        path: &str,
        timestamps: Array1<u64>,
        offline_channels: &[u32],
        adcs: Array2<u16>,
    ) -> Result<Self, TableError> {
        if timestamps.len() != adcs.nrows() {
            return Err(TableError::ShapeMismatch(
                path.to_string(),
                timestamps.len(),
                adcs.nrows(),
            ));
        }
        if offline_channels.len() != adcs.ncols() {
            return Err(TableError::LabelMismatch(
                path.to_string(),
                adcs.ncols(),
                offline_channels.len(),
            ));
        }
        Ok(Self {
            path: path.to_string(),
            timestamps,
            labels: offline_channels.iter().map(|c| channel_label(*c)).collect(),
            adcs,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.timestamps.len()
    }

    pub fn n_columns(&self) -> usize {
        self.labels.len()
    }

    /// Get a column by label. If labels repeat, the first one wins.
    pub fn column(&self, label: &str) -> Option<ArrayView1<u16>> {
        let idx = self.labels.iter().position(|l| l == label)?;
        Some(self.adcs.column(idx))
    }
}

/// All datasets of one trigger record joined on their timestamp index.
///
/// Missing entries (a timestamp one dataset has and another does not) are None.
#[derive(Debug, Clone)]
pub struct TriggerTable {
    index: Vec<u64>,
    labels: Vec<String>,
    data: Array2<Option<u16>>,
}

impl Default for TriggerTable {
    /// An empty table, no rows and no columns
    fn default() -> Self {
        Self {
            index: Vec::new(),
            labels: Vec::new(),
            data: Array2::from_elem((0, 0), None),
        }
    }
}

impl TriggerTable {
    /// Join dataset tables column-wise, then sort the columns by label.
    ///
    /// If every dataset shares the same index it is used unchanged. Otherwise the index is
    /// the union of all timestamps in order of first appearance, which requires each
    /// dataset's timestamps to be unique.
    pub fn concat(tables: &[DatasetTable]) -> Result<Self, TableError> {
        let Some(first) = tables.first() else {
            return Ok(Self::default());
        };

        let n_columns: usize = tables.iter().map(|t| t.n_columns()).sum();
        let labels: Vec<String> = tables.iter().flat_map(|t| t.labels.clone()).collect();

        let mut table = if tables.iter().all(|t| t.timestamps == first.timestamps) {
            let mut data = Array2::from_elem((first.n_rows(), n_columns), None);
            let mut col_offset = 0;
            for t in tables.iter() {
                data.slice_mut(s![.., col_offset..col_offset + t.n_columns()])
                    .assign(&t.adcs.mapv(Some));
                col_offset += t.n_columns();
            }
            Self {
                index: first.timestamps.to_vec(),
                labels,
                data,
            }
        } else {
            let mut index: Vec<u64> = Vec::new();
            let mut row_of: FxHashMap<u64, usize> = FxHashMap::default();
            for t in tables.iter() {
                let mut seen = FxHashSet::default();
                for ts in t.timestamps.iter() {
                    if !seen.insert(*ts) {
                        return Err(TableError::DuplicateTimestamp(t.path.clone(), *ts));
                    }
                    row_of.entry(*ts).or_insert_with(|| {
                        index.push(*ts);
                        index.len() - 1
                    });
                }
            }

            let mut data = Array2::from_elem((index.len(), n_columns), None);
            let mut col_offset = 0;
            for t in tables.iter() {
                for (ts, adc_row) in t.timestamps.iter().zip(t.adcs.rows()) {
                    let row = row_of[ts];
                    for (col, value) in adc_row.iter().enumerate() {
                        data[[row, col_offset + col]] = Some(*value);
                    }
                }
                col_offset += t.n_columns();
            }
            Self {
                index,
                labels,
                data,
            }
        };

        table.sort_columns();
        Ok(table)
    }

    /// Reorder columns ascending by label. The sort is stable, so repeated labels keep their order.
    fn sort_columns(&mut self) {
        let mut order: Vec<usize> = (0..self.labels.len()).collect();
        order.sort_by(|a, b| self.labels[*a].cmp(&self.labels[*b]));
        self.labels = order.iter().map(|i| self.labels[*i].clone()).collect();
        self.data = self.data.select(Axis(1), &order);
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_columns(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty() && self.labels.is_empty()
    }

    pub fn index(&self) -> &[u64] {
        &self.index
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn data(&self) -> &Array2<Option<u16>> {
        &self.data
    }

    /// Get a column by label. If labels repeat, the first one wins.
    pub fn column(&self, label: &str) -> Option<ArrayView1<Option<u16>>> {
        let idx = self.labels.iter().position(|l| l == label)?;
        Some(self.data.column(idx))
    }

    /// Get the value at a timestamp for a label, None if either is absent or the value is missing
    pub fn value(&self, timestamp: u64, label: &str) -> Option<u16> {
        let row = self.index.iter().position(|ts| *ts == timestamp)?;
        self.column(label)?[row]
    }
}

/// Write a pandas style preview: the leading rows and columns, then the full shape.
/// `cell` gives the value at a (row, column), None for a missing entry.
fn write_preview<F>(
    f: &mut std::fmt::Formatter<'_>,
    index: ArrayView1<u64>,
    labels: &[String],
    cell: F,
) -> std::fmt::Result
where
    F: Fn(usize, usize) -> Option<u16>,
{
    let n_cols = labels.len().min(PREVIEW_COLUMNS);
    write!(f, "{:>20}", "ts")?;
    for label in labels.iter().take(n_cols) {
        write!(f, " {label:>6}")?;
    }
    if labels.len() > n_cols {
        write!(f, " ...")?;
    }
    writeln!(f)?;
    for (row, ts) in index.iter().enumerate().take(PREVIEW_ROWS) {
        write!(f, "{ts:>20}")?;
        for col in 0..n_cols {
            match cell(row, col) {
                Some(v) => write!(f, " {v:>6}")?,
                None => write!(f, " {:>6}", "NaN")?,
            }
        }
        if labels.len() > n_cols {
            write!(f, " ...")?;
        }
        writeln!(f)?;
    }
    if index.len() > PREVIEW_ROWS {
        writeln!(f, "{:>20}", "...")?;
    }
    write!(f, "[{} rows x {} columns]", index.len(), labels.len())
}

impl Display for DatasetTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.path)?;
        write_preview(f, self.timestamps.view(), &self.labels, |row, col| {
            Some(self.adcs[[row, col]])
        })
    }
}

impl Display for TriggerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_preview(
            f,
            ArrayView1::from(self.index.as_slice()),
            &self.labels,
            |row, col| self.data[[row, col]],
        )
    }
}
