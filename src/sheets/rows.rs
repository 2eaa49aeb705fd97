use crate::sheets::gviz::GvizTable;
use serde::Deserialize;

/// Scalar cell value as the gviz export delivers it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn empty() -> Self {
        Cell::Text(String::new())
    }

    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(value) => value.trim().to_string(),
            Cell::Number(value) => {
                // Sheets deliver integral cells as floats (2013.0).
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            Cell::Bool(value) => value.to_string(),
        }
    }

    /// Coercion failure is per-field: anything non-numeric is `None`,
    /// never NaN and never an error.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) if value.is_finite() => Some(*value),
            Cell::Text(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
            }
            _ => None,
        }
    }
}

/// One spreadsheet row as ordered `(lowercased header, cell)` pairs. The pair
/// list keeps source column order, which drives `photoN` collection; scalar
/// lookup scans from the end so a duplicated header resolves last-wins.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    cells: Vec<(String, Cell)>,
}

impl RawRow {
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Cell)>) -> Self {
        Self {
            cells: pairs
                .into_iter()
                .map(|(key, cell)| (key.into().trim().to_lowercase(), cell))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, cell)| cell)
    }

    pub fn text(&self, key: &str) -> String {
        self.get(key).map(Cell::as_text).unwrap_or_default()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Cell::as_number)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(name, cell)| (name.as_str(), cell))
    }
}

/// Zip each row's cells positionally against the lowercased column labels.
/// A missing or null cell becomes an empty string, never an absent key.
pub fn map_rows(table: &GvizTable) -> Vec<RawRow> {
    let headers: Vec<String> = table
        .cols
        .iter()
        .map(|col| col.label.trim().to_lowercase())
        .collect();

    table
        .rows
        .iter()
        .map(|row| {
            let cells = headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let cell = row
                        .c
                        .get(idx)
                        .and_then(|slot| slot.as_ref())
                        .and_then(|wrapped| wrapped.v.clone())
                        .unwrap_or_else(Cell::empty);
                    (header.clone(), cell)
                })
                .collect();
            RawRow { cells }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::gviz::decode_table;

    fn sample_table() -> GvizTable {
        decode_table(concat!(
            "callback({\"table\":{",
            "\"cols\":[{\"label\":\"ID\"},{\"label\":\"Make\"},{\"label\":\"Price\"}],",
            "\"rows\":[",
            "{\"c\":[{\"v\":\"lot-1\"},{\"v\":\"Toyota\"},{\"v\":8995.0}]},",
            "{\"c\":[{\"v\":\"lot-2\"},null]}",
            "]}});"
        ))
        .expect("decode")
    }

    #[test]
    fn headers_are_lowercased() {
        let rows = map_rows(&sample_table());
        assert_eq!(rows[0].text("id"), "lot-1");
        assert_eq!(rows[0].text("make"), "Toyota");
        assert!(rows[0].get("Make").is_none());
    }

    #[test]
    fn missing_cells_become_empty_strings() {
        let rows = map_rows(&sample_table());
        assert_eq!(rows[1].text("make"), "");
        assert_eq!(rows[1].text("price"), "");
        assert_eq!(rows[1].number("price"), None);
    }

    #[test]
    fn duplicate_headers_resolve_last_wins() {
        let row = RawRow::from_pairs([
            ("Make", Cell::Text("Toyota".into())),
            ("Make", Cell::Text("Honda".into())),
        ]);
        assert_eq!(row.text("make"), "Honda");
        // both pairs stay visible for ordered iteration
        assert_eq!(row.entries().count(), 2);
    }

    #[test]
    fn numeric_cells_render_without_trailing_fraction() {
        assert_eq!(Cell::Number(2013.0).as_text(), "2013");
        assert_eq!(Cell::Number(8995.5).as_text(), "8995.5");
    }

    #[test]
    fn text_cells_coerce_to_numbers_when_parseable() {
        assert_eq!(Cell::Text(" 42000 ".into()).as_number(), Some(42000.0));
        assert_eq!(Cell::Text("12,000".into()).as_number(), None);
        assert_eq!(Cell::Text("n/a".into()).as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), None);
    }
}
