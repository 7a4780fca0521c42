use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use tracing::{info, warn};

use crate::error::RowError;
use crate::pipeline::Pipeline;

/// One input record: a label (municipality) and the four raw indicators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    pub label: String,
    pub cof: f64,
    pub aed: f64,
    pub dop: f64,
    pub oea: f64,
}

const COLUMNS: [&str; 4] = ["cof", "aed", "dop", "oea"];

impl BatchRow {
    /// Parses `label, cof, aed, dop, oea` from raw cells. Extra cells are ignored.
    pub fn from_record<S: AsRef<str>>(record: &[S]) -> Result<Self, RowError> {
        if record.len() < 5 {
            return Err(RowError::MissingColumns {
                expected: 5,
                found: record.len(),
            });
        }

        let mut values = [0.; 4];

        for ((value, cell), column) in values.iter_mut().zip(&record[1..5]).zip(COLUMNS) {
            let cell = cell.as_ref().trim();

            *value = cell.parse().map_err(|_| RowError::NotANumber {
                column,
                value: cell.to_owned(),
            })?;
        }

        let [cof, aed, dop, oea] = values;

        Ok(Self {
            label: record[0].as_ref().trim().to_owned(),
            cof,
            aed,
            dop,
            oea,
        })
    }
}

/// One exported record. A missing IFDH exports as `"N/A"`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchResult {
    pub label: String,
    pub sif1: f64,
    #[serde(serialize_with = "serialize_or_na")]
    pub ifdh: Option<f64>,
}

fn serialize_or_na<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_f64(*value),
        None => serializer.serialize_str("N/A"),
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{:.2}\t", self.label, self.sif1)?;

        match self.ifdh {
            Some(ifdh) => write!(f, "{ifdh:.2}"),
            None => f.write_str("N/A"),
        }
    }
}

/// A row that could not be evaluated, by its position in the input.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedRow {
    pub index: usize,
    pub error: RowError,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub results: Vec<BatchResult>,
    pub skipped: Vec<SkippedRow>,
}

/// Evaluates one row through both stages.
///
/// A subsystem with no defuzzifiable output has no SIF1 to report, so the row fails.
pub fn process_row(pipeline: &Pipeline, row: &BatchRow) -> Result<BatchResult, RowError> {
    let output = pipeline.evaluate(row.cof, row.aed, row.dop, row.oea)?;
    let sif1 = output.sif1.value().ok_or(RowError::NoSif1)?;

    Ok(BatchResult {
        label: row.label.clone(),
        sif1,
        ifdh: output.ifdh.value(),
    })
}

/// Evaluates every row independently; failures are logged and collected, never fatal.
pub fn process_rows(pipeline: &Pipeline, rows: impl IntoIterator<Item = BatchRow>) -> BatchReport {
    collect(
        pipeline,
        rows.into_iter().map(Ok::<_, RowError>),
    )
}

/// Like [`process_rows`], parsing raw records first.
pub fn process_records<R, S>(pipeline: &Pipeline, records: impl IntoIterator<Item = R>) -> BatchReport
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    collect(
        pipeline,
        records.into_iter().map(|record| BatchRow::from_record(record.as_ref())),
    )
}

fn collect(pipeline: &Pipeline, rows: impl Iterator<Item = Result<BatchRow, RowError>>) -> BatchReport {
    let mut report = BatchReport::default();

    for (index, row) in rows.enumerate() {
        match row.and_then(|row| process_row(pipeline, &row)) {
            Ok(result) => report.results.push(result),
            Err(error) => {
                warn!(index, %error, "skipping row");
                report.skipped.push(SkippedRow { index, error });
            },
        }
    }

    info!(
        processed = report.results.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;

    #[test]
    fn test_from_record() {
        let row = BatchRow::from_record(&["Recife", "40", " 15.5 ", "20", "35"]).unwrap();

        assert_eq!(
            row,
            BatchRow {
                label: "Recife".into(),
                cof: 40.,
                aed: 15.5,
                dop: 20.,
                oea: 35.
            }
        );

        assert_eq!(
            BatchRow::from_record(&["Olinda", "40", "x", "20", "35"]).unwrap_err(),
            RowError::NotANumber {
                column: "aed",
                value: "x".into()
            }
        );
        assert_eq!(
            BatchRow::from_record(&["Olinda", "40"]).unwrap_err(),
            RowError::MissingColumns { expected: 5, found: 2 }
        );
    }

    #[test]
    fn test_bad_rows_do_not_abort_the_batch() {
        let pipeline = Pipeline::new().unwrap();
        let records = vec![
            vec!["A", "40", "15", "20", "35"],
            vec!["B", "abc", "15", "20", "35"],
            vec!["C", "NaN", "15", "20", "35"],
            vec!["D", "0", "0", "-50", "-50"],
            vec!["E", "80", "40", "40", "70"],
        ];

        let report = process_records(&pipeline, &records);

        assert_eq!(
            report.results.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            vec!["A", "D", "E"]
        );
        assert_eq!(report.skipped.iter().map(|s| s.index).collect::<Vec<_>>(), vec![1, 2]);
        assert!(matches!(
            report.skipped[1].error,
            RowError::Eval(EvalError::NonFiniteInput { .. })
        ));

        // D: valid SIF1 but no main-system rule fires
        assert_eq!(report.results[1].ifdh, None);
        assert_eq!(report.results[1].to_string(), "D\t10.81\tN/A");
        assert!(report.results[2].ifdh.unwrap() > 85.);
    }

    #[test]
    fn test_export_uses_na_placeholder() {
        let result = BatchResult {
            label: "D".into(),
            sif1: 10.5,
            ifdh: None,
        };

        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"label":"D","sif1":10.5,"ifdh":"N/A"}"#
        );

        let result = BatchResult {
            ifdh: Some(50.25),
            ..result
        };

        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"label":"D","sif1":10.5,"ifdh":50.25}"#
        );
    }

    #[test]
    fn test_process_rows_skips_empty_subsystem() {
        let pipeline = Pipeline::new().unwrap();
        let rows = vec![
            BatchRow {
                label: "far".into(),
                cof: 500.,
                aed: 500.,
                dop: 20.,
                oea: 35.,
            },
            BatchRow {
                label: "ok".into(),
                cof: 0.,
                aed: 0.,
                dop: 0.,
                oea: 0.,
            },
        ];

        let report = process_rows(&pipeline, rows);

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].error, RowError::NoSif1);
        assert_eq!(report.results.len(), 1);
    }
}
