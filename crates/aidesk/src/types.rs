use serde::{Deserialize, Serialize};

/// A small in-memory table: the uploaded CSV as the UI sees it, and the
/// shape the renderer hands back for `table` responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Five-number summary for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl DataTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First `n` rows, for prompt snapshots and previews.
    pub fn head(&self, n: usize) -> DataTable {
        DataTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Summaries for every column where at least one cell parses as a number.
    /// Non-numeric cells within such a column are skipped, not counted.
    pub fn describe(&self) -> Vec<ColumnSummary> {
        let mut summaries = Vec::new();

        for (idx, name) in self.columns.iter().enumerate() {
            let values: Vec<f64> = self
                .rows
                .iter()
                .filter_map(|row| row.get(idx))
                .filter_map(|cell| cell.trim().parse::<f64>().ok())
                .collect();

            if values.is_empty() {
                continue;
            }

            let count = values.len();
            let mean = values.iter().sum::<f64>() / count as f64;
            // Sample standard deviation; a single observation has no spread.
            let std = if count > 1 {
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / (count - 1) as f64;
                var.sqrt()
            } else {
                0.0
            };
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

            summaries.push(ColumnSummary {
                column: name.clone(),
                count,
                mean,
                std,
                min,
                max,
            });
        }

        summaries
    }

    /// Plain-text rendering used when the table is embedded into a prompt.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.columns.join(" | "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join(" | "));
            out.push('\n');
        }
        out
    }

    /// Head sample plus per-column statistics, formatted for the model.
    pub fn prompt_snapshot(&self, sample_rows: usize) -> String {
        let mut out = String::from("\n\nSample rows:\n");
        out.push_str(&self.head(sample_rows).to_plain_text());

        let summaries = self.describe();
        if !summaries.is_empty() {
            out.push_str("\nSummary statistics:\n");
            out.push_str("column | count | mean | std | min | max\n");
            for s in &summaries {
                out.push_str(&format!(
                    "{} | {} | {:.4} | {:.4} | {} | {}\n",
                    s.column, s.count, s.mean, s.std, s.min, s.max
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        DataTable::new(
            vec!["name".into(), "age".into(), "city".into()],
            vec![
                vec!["Alice".into(), "30".into(), "NYC".into()],
                vec!["Bob".into(), "25".into(), "LA".into()],
                vec!["Cara".into(), "35".into(), "SF".into()],
            ],
        )
    }

    #[test]
    fn head_truncates() {
        let t = sample();
        assert_eq!(t.head(2).rows.len(), 2);
        assert_eq!(t.head(10).rows.len(), 3);
    }

    #[test]
    fn describe_covers_numeric_columns_only() {
        let t = sample();
        let summaries = t.describe();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].column, "age");
        assert_eq!(summaries[0].count, 3);
        assert!((summaries[0].mean - 30.0).abs() < 1e-9);
        assert_eq!(summaries[0].min, 25.0);
        assert_eq!(summaries[0].max, 35.0);
        assert!((summaries[0].std - 5.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_contains_sample_and_stats() {
        let snapshot = sample().prompt_snapshot(2);
        assert!(snapshot.contains("Sample rows:"));
        assert!(snapshot.contains("Alice"));
        assert!(!snapshot.contains("Cara"));
        assert!(snapshot.contains("Summary statistics:"));
        assert!(snapshot.contains("age"));
    }
}
