use crate::error::AppError;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::de::DeserializeOwned;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A delimited-text table held in memory exactly as read: header row plus
/// string cells in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Table { headers, rows }
    }

    pub fn empty() -> Self {
        Table::default()
    }

    /// Parses CSV bytes. A leading UTF-8 BOM is skipped, short rows are
    /// padded with blanks and rows wider than the header are rejected.
    pub fn from_csv_bytes(bytes: &[u8], source: &str) -> Result<Self, AppError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(source, e))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::Csv {
                file: source.to_string(),
                message: "no columns to parse".to_string(),
            });
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| csv_error(source, e))?;
            if record.len() > headers.len() {
                return Err(AppError::Csv {
                    file: source.to_string(),
                    message: format!(
                        "row {} has {} fields, expected {}",
                        idx + 1,
                        record.len(),
                        headers.len()
                    ),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Table { headers, rows })
    }

    /// Serializes the table as UTF-8 CSV with a BOM, the format used for
    /// downloads.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, AppError> {
        let mut writer = WriterBuilder::new().from_writer(UTF8_BOM.to_vec());
        writer
            .write_record(&self.headers)
            .map_err(|e| AppError::Export(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| AppError::Export(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::Export(e.to_string()))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// True when there is nothing to show: no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.headers.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Numeric view of a column; blank or unparsable cells are `None`.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.column(name)
            .map(|cells| cells.into_iter().map(parse_number).collect())
    }

    /// Replaces the named column, or appends it when absent.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[String]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Deserializes every row into a typed record. Rows that cannot be
    /// represented are skipped.
    pub fn records<T: DeserializeOwned>(&self) -> Vec<T> {
        let headers = StringRecord::from(self.headers.clone());
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| {
                let record = StringRecord::from(row.clone());
                match record.deserialize::<T>(Some(&headers)) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::debug!(row = idx + 1, error = %e, "skipping row");
                        None
                    }
                }
            })
            .collect()
    }
}

pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Two decimal places, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Formats a derived value the way it is stored back into a table cell.
pub fn format_cell(value: Option<f64>) -> String {
    value.map(|v| round2(v).to_string()).unwrap_or_default()
}

fn csv_error(source: &str, e: csv::Error) -> AppError {
    AppError::Csv {
        file: source.to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Table {
        Table::from_csv_bytes(csv.as_bytes(), "test.csv").unwrap()
    }

    #[test]
    fn strips_bom_from_first_header() {
        let t = Table::from_csv_bytes(b"\xEF\xBB\xBFchampion,games\nAhri,10\n", "t").unwrap();
        assert_eq!(t.headers(), ["champion", "games"]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn pads_short_rows_and_rejects_wide_ones() {
        let t = table("a,b,c\n1,2\n");
        assert_eq!(t.rows()[0], vec!["1", "2", ""]);

        let err = Table::from_csv_bytes(b"a,b\n1,2,3\n", "wide.csv").unwrap_err();
        assert!(matches!(err, AppError::Csv { ref file, .. } if file == "wide.csv"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(Table::from_csv_bytes(b"", "empty.csv").is_err());
    }

    #[test]
    fn header_only_table_is_empty() {
        let t = table("champion,games\n");
        assert!(t.is_empty());
        assert_eq!(t.width(), 2);
    }

    #[test]
    fn numeric_column_treats_junk_as_missing() {
        let t = table("games\n10\n\nabc\nNaN\n2.5\n");
        assert_eq!(
            t.numeric_column("games").unwrap(),
            vec![Some(10.0), None, None, None, Some(2.5)]
        );
        assert!(t.numeric_column("wins").is_none());
    }

    #[test]
    fn set_column_appends_then_replaces() {
        let mut t = table("champion\nAhri\nLux\n");
        t.set_column("games", vec!["1".into(), "2".into()]);
        assert_eq!(t.headers(), ["champion", "games"]);
        t.set_column("games", vec!["3".into(), "4".into()]);
        assert_eq!(t.column("games").unwrap(), vec!["3", "4"]);
    }

    #[test]
    fn csv_bytes_start_with_bom_and_quote_when_needed() {
        let t = Table::new(
            vec!["champion".into(), "best_core3".into()],
            vec![vec!["Ahri".into(), "Luden, Shadowflame".into()]],
        );
        let bytes = t.to_csv_bytes().unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(text, "champion,best_core3\nAhri,\"Luden, Shadowflame\"\n");
    }

    #[test]
    fn format_cell_rounds_to_two_places() {
        assert_eq!(format_cell(Some(33.3333)), "33.33");
        assert_eq!(format_cell(Some(10.0)), "10");
        assert_eq!(format_cell(None), "");
    }

    #[test]
    fn exact_halves_round_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(format_cell(Some(12.625)), "12.62");
    }
}
