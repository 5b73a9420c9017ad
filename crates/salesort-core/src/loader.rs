//! Record loader: reads a CSV or JSON Lines sales export and aggregates it
//! into one entry per product title.
//!
//! Individual bad lines are skipped and logged. Only a missing/unreadable
//! file, a CSV without the required columns, or a file whose products carry
//! no identifiers at all stop the run.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::events::{Event, EventLog};
use crate::records::{parse_fields, parse_json_line, InputFormat, ProductId, SalesRecord, SkipReason};

const TITLE_COLUMNS: &[&str] = &["product_title", "title", "product"];
const ID_COLUMNS: &[&str] = &["product_id", "id"];
const QUANTITY_COLUMNS: &[&str] = &["net_items_sold", "net_quantity", "quantity_sold", "quantity"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read CSV header of {}: {source}", path.display())]
    CsvHeader {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV file {} has no {column} column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("none of the {aggregated} products in {} has a product id; nothing to reorder", path.display())]
    NoIdentifiableProducts { path: PathBuf, aggregated: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedProduct {
    pub product_title: String,
    pub total_sales: i64,
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Non-blank lines (or CSV data rows) examined.
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub aggregated: usize,
    pub identifiable: usize,
}

/// Aggregated products in first-encounter order.
#[derive(Debug, Clone, Default)]
pub struct SalesTable {
    products: Vec<AggregatedProduct>,
    stats: LoadStats,
}

impl SalesTable {
    #[must_use]
    pub fn products(&self) -> &[AggregatedProduct] {
        &self.products
    }

    #[must_use]
    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn get(&self, title: &str) -> Option<&AggregatedProduct> {
        self.products.iter().find(|p| p.product_title == title)
    }
}

struct Aggregator<'a> {
    log: &'a EventLog,
    products: Vec<AggregatedProduct>,
    index: HashMap<String, usize>,
    stats: LoadStats,
}

impl<'a> Aggregator<'a> {
    fn new(log: &'a EventLog) -> Self {
        Self {
            log,
            products: Vec::new(),
            index: HashMap::new(),
            stats: LoadStats::default(),
        }
    }

    fn accept(&mut self, line_no: usize, parsed: Result<SalesRecord, SkipReason>) {
        self.stats.lines_read += 1;
        match parsed {
            Ok(record) => self.add(line_no, record),
            Err(reason) => self.skip(line_no, reason),
        }
    }

    fn skip(&mut self, line_no: usize, reason: SkipReason) {
        self.stats.lines_skipped += 1;
        self.log.record(
            &Event::warn("line_skipped").detail(format!("line {line_no}: {reason}")),
        );
    }

    fn add(&mut self, line_no: usize, record: SalesRecord) {
        let Some(&idx) = self.index.get(&record.product_title) else {
            self.index
                .insert(record.product_title.clone(), self.products.len());
            self.products.push(AggregatedProduct {
                product_title: record.product_title,
                total_sales: record.quantity_sold,
                product_id: record.product_id,
            });
            return;
        };

        let entry = &mut self.products[idx];
        entry.total_sales = match entry.total_sales.checked_add(record.quantity_sold) {
            Some(total) => total,
            None => {
                self.log.record(
                    &Event::warn("total_sales_overflow")
                        .title(entry.product_title.clone())
                        .detail(format!(
                            "line {line_no}: adding {} overflows; total clamped",
                            record.quantity_sold
                        )),
                );
                entry.total_sales.saturating_add(record.quantity_sold)
            }
        };
        let Some(other) = record.product_id else {
            return;
        };
        if entry.product_id.is_none() {
            entry.product_id = Some(other);
        } else if entry.product_id.as_ref() != Some(&other) {
            let existing = entry.product_id.as_ref().map(ToString::to_string);
            self.log.record(
                &Event::warn("conflicting_product_id")
                    .title(entry.product_title.clone())
                    .product_id(existing.unwrap_or_default())
                    .detail(format!("line {line_no}: ignoring later id {other}")),
            );
        }
    }

    fn finish(mut self) -> SalesTable {
        self.stats.aggregated = self.products.len();
        self.stats.identifiable = self
            .products
            .iter()
            .filter(|p| p.product_id.is_some())
            .count();
        SalesTable {
            products: self.products,
            stats: self.stats,
        }
    }
}

/// Loads and aggregates a sales export.
///
/// An empty result (no valid lines at all) is returned as an empty table, not
/// an error; callers treat it as a no-op run.
///
/// # Errors
///
/// - [`LoadError::FileNotFound`] if `path` does not exist.
/// - [`LoadError::Io`] / [`LoadError::CsvHeader`] if the file cannot be read.
/// - [`LoadError::MissingColumn`] if a CSV lacks a title or quantity column.
/// - [`LoadError::NoIdentifiableProducts`] if products were loaded but none
///   carries an identifier.
pub fn load_sales(
    path: &Path,
    format: InputFormat,
    log: &EventLog,
) -> Result<SalesTable, LoadError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    log.record(
        &Event::info("load_started").detail(format!("{} ({format})", path.display())),
    );

    let mut agg = Aggregator::new(log);
    match format {
        InputFormat::JsonLines => read_json_lines(path, file, &mut agg)?,
        InputFormat::Csv => read_csv(path, file, &mut agg)?,
    }
    let table = agg.finish();
    let stats = table.stats();

    log.record(&Event::info("load_completed").detail(format!(
        "read={} skipped={} aggregated={} identifiable={}",
        stats.lines_read, stats.lines_skipped, stats.aggregated, stats.identifiable
    )));

    if stats.aggregated > 0 && stats.identifiable == 0 {
        return Err(LoadError::NoIdentifiableProducts {
            path: path.to_path_buf(),
            aggregated: stats.aggregated,
        });
    }

    Ok(table)
}

fn read_json_lines(path: &Path, file: File, agg: &mut Aggregator<'_>) -> Result<(), LoadError> {
    for (idx, raw) in BufReader::new(file).split(b'\n').enumerate() {
        let mut raw = raw.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        let line_no = idx + 1;
        let Ok(line) = String::from_utf8(raw) else {
            agg.accept(line_no, Err(SkipReason::InvalidUtf8));
            continue;
        };
        let line = if idx == 0 {
            line.trim_start_matches('\u{feff}')
        } else {
            line.as_str()
        };
        if line.trim().is_empty() {
            continue;
        }
        agg.accept(line_no, parse_json_line(line));
    }
    Ok(())
}

/// Maps header names onto the expected columns. Matching ignores case and
/// treats spaces, dashes and underscores alike.
struct CsvColumns {
    title: usize,
    quantity: usize,
    product_id: Option<usize>,
}

impl CsvColumns {
    fn from_headers(path: &Path, headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| normalized.iter().position(|h| h == c))
        };

        let title = find(TITLE_COLUMNS).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: "product_title",
        })?;
        let quantity = find(QUANTITY_COLUMNS).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: "net_items_sold",
        })?;

        Ok(Self {
            title,
            quantity,
            product_id: find(ID_COLUMNS),
        })
    }

    fn parse(&self, row: &csv::StringRecord) -> Result<SalesRecord, SkipReason> {
        parse_fields(
            row.get(self.title),
            self.product_id.and_then(|i| row.get(i)),
            row.get(self.quantity),
        )
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

fn read_csv(path: &Path, file: File, agg: &mut Aggregator<'_>) -> Result<(), LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::CsvHeader {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let columns = CsvColumns::from_headers(path, &headers)?;

    for (idx, row) in reader.records().enumerate() {
        // Header occupies line 1.
        let line_no = idx + 2;
        let parsed = match row {
            Ok(row) if row.iter().all(str::is_empty) => continue,
            Ok(row) => columns.parse(&row),
            Err(err) if err.is_io_error() => {
                return Err(LoadError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::other(err),
                });
            }
            Err(_) => Err(SkipReason::MalformedRow),
        };
        agg.accept(line_no, parsed);
    }
    Ok(())
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
