use std::io::{BufWriter, Write};
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::model::{QuestionnaireDataset, Response, QUESTION_COLUMNS};
use crate::error::Result;

/// One row in the records layout the JSON loader reads.
struct Record<'a> {
    row: &'a Response,
    with_score: bool,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("age", &self.row.age)?;
        map.serialize_entry("gender", &self.row.gender)?;
        map.serialize_entry("email", &self.row.email)?;
        for (col, answer) in QUESTION_COLUMNS.iter().zip(&self.row.answers) {
            map.serialize_entry(col, answer)?;
        }
        if self.with_score {
            map.serialize_entry("score", &self.row.score)?;
        }
        map.end()
    }
}

/// Write `dataset` as a pretty-printed JSON array of records.
///
/// The `score` key is only written once scoring has run.
pub fn write_json<W: Write>(dataset: &QuestionnaireDataset, out: W) -> Result<()> {
    let records: Vec<Record<'_>> = dataset
        .rows
        .iter()
        .map(|row| Record {
            row,
            with_score: dataset.has_scores,
        })
        .collect();
    serde_json::to_writer_pretty(out, &records).map_err(std::io::Error::from)?;
    Ok(())
}

/// Write `dataset` to a JSON file at `path`.
pub fn save_json(dataset: &QuestionnaireDataset, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_json(dataset, &mut writer)?;
    // Dropping a BufWriter discards flush errors.
    writer.flush()?;
    log::info!("Exported {} rows to {}", dataset.len(), path.display());
    Ok(())
}
