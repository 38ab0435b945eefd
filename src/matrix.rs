use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// One processable intersection of the factor matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionPair {
    pub from_label: String,
    pub to_label: String,
    pub factor: f64,
}

/// Rectangular conversion-factor matrix: first header cell is a corner
/// label, remaining header cells are column (to-unit) labels, the first cell
/// of each following row is the row (from-unit) label.
#[derive(Debug, Clone)]
pub struct ConversionMatrix {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    factors: Vec<Vec<Option<f64>>>,
}

impl ConversionMatrix {
    /// A missing or unreadable matrix file is fatal, reported before any
    /// pair is processed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("conversion matrix not found at {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("failed to parse conversion matrix {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.records();
        let header = match records.next() {
            Some(record) => record.context("failed to read matrix header row")?,
            None => bail!("conversion matrix is empty"),
        };

        let col_labels: Vec<String> = header
            .iter()
            .skip(1)
            .map(|cell| cell.trim().to_string())
            .collect();
        if col_labels.is_empty() {
            bail!("conversion matrix header has no column labels");
        }

        let mut row_labels = Vec::new();
        let mut factors = Vec::new();

        for record in records {
            let record = record.context("failed to read matrix row")?;
            let Some(label) = record.get(0) else {
                continue;
            };

            let mut row = Vec::with_capacity(col_labels.len());
            for idx in 0..col_labels.len() {
                row.push(parse_factor(record.get(idx + 1).unwrap_or("")));
            }

            row_labels.push(label.trim().to_string());
            factors.push(row);
        }

        Ok(Self {
            row_labels,
            col_labels,
            factors,
        })
    }

    /// Row-major pair enumeration. Self-pairs, blank cells and zero or
    /// non-finite factors are skipped silently; they are exclusions, not
    /// errors, and never count as processed.
    pub fn pairs(&self) -> Vec<ConversionPair> {
        let mut pairs = Vec::new();

        for (row_idx, from_label) in self.row_labels.iter().enumerate() {
            for (col_idx, to_label) in self.col_labels.iter().enumerate() {
                let Some(factor) = self.factors[row_idx][col_idx] else {
                    continue;
                };
                if factor == 0.0 || !factor.is_finite() {
                    continue;
                }
                if from_label == to_label {
                    continue;
                }

                pairs.push(ConversionPair {
                    from_label: from_label.clone(),
                    to_label: to_label.clone(),
                    factor,
                });
            }
        }

        pairs
    }
}

fn parse_factor(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Unit,Bigha - Assam,Acre,Hectare
Bigha - Assam,1,0.1652,0.0669
Acre,6.0488,,0.4047
Hectare,14.9445,2.4711,0
";

    fn matrix() -> ConversionMatrix {
        ConversionMatrix::from_reader(SAMPLE.as_bytes()).expect("parse sample matrix")
    }

    #[test]
    fn pairs_skip_self_blank_and_zero_cells() {
        let pairs = matrix().pairs();

        // Self-pairs on the diagonal, the blank Acre->Acre cell and the zero
        // Hectare->Hectare cell must all be absent.
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|p| p.from_label != p.to_label));
        assert!(pairs.iter().all(|p| p.factor > 0.0));
    }

    #[test]
    fn pairs_are_enumerated_row_major() {
        let pairs = matrix().pairs();

        assert_eq!(
            pairs[0],
            ConversionPair {
                from_label: "Bigha - Assam".to_string(),
                to_label: "Acre".to_string(),
                factor: 0.1652,
            }
        );
        assert_eq!(pairs[1].to_label, "Hectare");
        assert_eq!(pairs[2].from_label, "Acre");
    }

    #[test]
    fn self_pair_with_explicit_factor_is_still_skipped() {
        let csv = "Unit,Bigha - Assam\nBigha - Assam,1.0\n";
        let pairs = ConversionMatrix::from_reader(csv.as_bytes())
            .expect("parse")
            .pairs();
        assert!(pairs.is_empty());
    }

    #[test]
    fn unparseable_cells_are_treated_as_blank() {
        let csv = "Unit,Acre\nBigha,n/a\n";
        let pairs = ConversionMatrix::from_reader(csv.as_bytes())
            .expect("parse")
            .pairs();
        assert!(pairs.is_empty());
    }

    #[test]
    fn empty_matrix_is_an_error() {
        assert!(ConversionMatrix::from_reader("".as_bytes()).is_err());
    }
}
