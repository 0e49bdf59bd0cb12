use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use rusty_survey::data::export::save_json;
use rusty_survey::{QuestionnaireDataset, Response, N_QUESTIONS, QUESTION_COLUMNS};

const N_SUBJECTS: usize = 200;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Mostly valid addresses, with the malformed shapes the email filter rejects.
fn email_for(i: usize, rng: &mut SimpleRng) -> String {
    let domain = rng.pick(&["example.com", "uni.edu", "mail.org"]);
    if !rng.chance(0.1) {
        return format!("subject{i}@{domain}");
    }
    match rng.next_u64() % 5 {
        0 => format!("@{domain}"),
        1 => format!("subject{i}@@{domain}"),
        2 => format!("subject{i}@.{domain}"),
        3 => format!("subject{i}@{domain}."),
        _ => format!("subject{i}@nodomain"),
    }
}

fn generate(rng: &mut SimpleRng) -> QuestionnaireDataset {
    let genders = ["Female", "Male", "Other"];

    let rows = (0..N_SUBJECTS)
        .map(|i| {
            let age = (!rng.chance(0.05)).then(|| rng.gauss(42.0, 15.0).clamp(18.0, 95.0).round());
            let gender = rng.pick(&genders);
            let ability = rng.gauss(70.0, 10.0);

            let mut answers = [None; N_QUESTIONS];
            for answer in &mut answers {
                if !rng.chance(0.08) {
                    let v = rng.gauss(ability, 8.0).clamp(0.0, 100.0);
                    *answer = Some((v * 10.0).round() / 10.0);
                }
            }

            let email = email_for(i, rng);
            Response::new(age, gender, &email, answers)
        })
        .collect();

    QuestionnaireDataset::from_rows(rows)
}

fn to_record_batch(dataset: &QuestionnaireDataset) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new("age", DataType::Float64, true),
        Field::new("gender", DataType::Utf8, false),
        Field::new("email", DataType::Utf8, true),
    ];
    fields.extend(
        QUESTION_COLUMNS
            .iter()
            .map(|c| Field::new(*c, DataType::Float64, true)),
    );

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(
            dataset.rows.iter().map(|r| r.age).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            dataset.rows.iter().map(|r| r.gender.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(
            dataset.rows.iter().map(|r| r.email.as_deref()).collect::<Vec<_>>(),
        )),
    ];
    for j in 0..N_QUESTIONS {
        columns.push(Arc::new(Float64Array::from(
            dataset.rows.iter().map(|r| r.answers[j]).collect::<Vec<_>>(),
        )));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).context("building record batch")
}

fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let dataset = generate(&mut rng);

    let json_path = Path::new("sample_questionnaire.json");
    save_json(&dataset, json_path).context("writing JSON sample")?;

    let batch = to_record_batch(&dataset)?;
    let parquet_path = Path::new("sample_questionnaire.parquet");
    write_parquet(&batch, parquet_path)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!(
        "Wrote {} responses to {} and {}",
        dataset.len(),
        json_path.display(),
        parquet_path.display()
    );
    Ok(())
}
