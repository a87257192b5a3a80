//! CSV fixtures shared by unit tests.

use crate::ingest::REQUIRED_COLUMNS;

/// Builder for case-record CSV uploads.
pub struct CaseCsv {
    columns: Vec<String>,
    mother_name: Option<String>,
    scores: Vec<String>,
}

impl CaseCsv {
    pub fn new() -> Self {
        Self {
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            mother_name: None,
            scores: Vec::new(),
        }
    }

    pub fn without(mut self, column: &str) -> Self {
        self.columns.retain(|c| c != column);
        self
    }

    pub fn extra_column(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    pub fn reversed(mut self) -> Self {
        self.columns.reverse();
        self
    }

    pub fn mother_name(mut self, name: &str) -> Self {
        self.mother_name = Some(name.to_string());
        self
    }

    pub fn rows(mut self, scores: &[&str]) -> Self {
        self.scores = scores.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns).expect("header");
        for (i, score) in self.scores.iter().enumerate() {
            let row: Vec<String> = self
                .columns
                .iter()
                .map(|column| match (column.as_str(), &self.mother_name) {
                    ("Mother name", Some(name)) => name.clone(),
                    _ => cell_value(column, i, score),
                })
                .collect();
            writer.write_record(&row).expect("row");
        }
        writer.into_inner().expect("flush")
    }
}

/// Value of `column` for the `index`-th generated case.
pub fn cell_value(column: &str, index: usize, score: &str) -> String {
    match column {
        "Case ID" => format!("CASE-{}", index),
        "Mother name" => format!("Mother {}", index),
        "User name" => format!("worker{}", index),
        "User Phone" => format!("98765{:05}", index),
        "User Role" => "AWW".to_string(),
        "Child ID" => format!("CH-{}", index),
        "Child Name" => format!("Child {}", index),
        "Child DOB" => "2022-01-15".to_string(),
        "Child Weight Zscore" => "-1.5".to_string(),
        "Last Weight Zscore" => score.to_string(),
        "Mother Location" => format!("Village {}", index),
        "User Block/Project/Tehsil" => "Block A".to_string(),
        "User Facility/Center" => format!("Center {}", index),
        other => format!("{} {}", other, index),
    }
}

/// A CSV with every required column and one row per score.
pub fn case_csv(scores: &[&str]) -> Vec<u8> {
    CaseCsv::new().rows(scores).build()
}

/// A single data line in required-column order, newline terminated.
pub fn case_row(index: usize, score: &str) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let row: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .map(|c| cell_value(c, index, score))
        .collect();
    writer.write_record(&row).expect("row");
    String::from_utf8(writer.into_inner().expect("flush")).expect("utf8")
}
