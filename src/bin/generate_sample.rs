use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use gnv_panel::config::{DATA_ENV, DEFAULT_DATA_FILE};
use gnv_panel::data::schema;

const RESPONSES: usize = 240;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a>(&mut self, choices: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut roll = self.next_f64() * total;
        for (item, w) in choices {
            if roll < *w {
                return *item;
            }
            roll -= w;
        }
        choices[choices.len() - 1].0
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Per-unit-type mean daily consumption in liters.
const UNIT_TYPES: [(&str, f64); 4] = [("Taxi", 32.0), ("Colectivo", 55.0), ("Combi", 45.0), ("Carga ligera", 60.0)];
const ZONES: [(&str, f64); 4] = [("Norte", 0.65), ("Sur", 0.45), ("Centro", 0.55), ("Oriente", 0.35)];
const PROFILES: [(&str, f64); 4] = [("Visionario", 1.0), ("Pragmático", 2.0), ("Conservador", 1.5), ("Escéptico", 1.0)];
const FEARS: [(&str, f64); 4] = [("Seguridad", 3.0), ("Costo de conversión", 2.5), ("Pocas estaciones", 2.0), ("Pérdida de potencia", 1.0)];
const KNOWLEDGE: [(&str, f64); 3] = [("Bajo", 2.0), ("Medio", 2.0), ("Alto", 1.0)];
const FUELS: [(&str, f64); 3] = [("Gasolina", 3.0), ("Diésel", 1.5), ("GLP", 0.5)];
const BRANDS: [(&str, f64); 4] = [("Nissan", 3.0), ("Toyota", 2.5), ("Chevrolet", 1.5), ("Volkswagen", 1.0)];

#[derive(Default)]
struct Columns {
    zone: Vec<String>,
    profile: Vec<String>,
    consumption: Vec<Option<f64>>,
    knowledge: Vec<String>,
    willingness: Vec<String>,
    fear: Vec<String>,
    unit: Vec<String>,
    fuel: Vec<String>,
    brand: Vec<String>,
    age: Vec<f64>,
    year: Vec<i64>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();
    let zone_weights: Vec<(&str, f64)> = ZONES.iter().map(|(z, _)| (*z, 1.0)).collect();
    let unit_weights: Vec<(&str, f64)> = UNIT_TYPES.iter().map(|(u, _)| (*u, 1.0)).collect();

    for _ in 0..RESPONSES {
        let zone = rng.weighted(&zone_weights);
        let unit = rng.weighted(&unit_weights);
        let profile = rng.weighted(&PROFILES);

        let base_willing = ZONES.iter().find(|(z, _)| *z == zone).map_or(0.5, |(_, p)| *p);
        let willing = if profile == "Visionario" { 0.9 } else { base_willing };
        let base_liters = UNIT_TYPES.iter().find(|(u, _)| *u == unit).map_or(40.0, |(_, l)| *l);

        cols.zone.push(zone.to_string());
        cols.profile.push(profile.to_string());
        // Roughly 3% of respondents skip the consumption question.
        cols.consumption.push(if rng.chance(0.03) {
            None
        } else {
            Some((rng.gauss(base_liters, 8.0).max(5.0) * 10.0).round() / 10.0)
        });
        cols.knowledge.push(rng.weighted(&KNOWLEDGE).to_string());
        cols.willingness.push(if rng.chance(willing) { "Sí" } else { "No" }.to_string());
        cols.fear.push(rng.weighted(&FEARS).to_string());
        cols.unit.push(unit.to_string());
        cols.fuel.push(rng.weighted(&FUELS).to_string());
        cols.brand.push(rng.weighted(&BRANDS).to_string());
        cols.age.push(rng.gauss(42.0, 10.0).clamp(19.0, 75.0).round());
        cols.year.push(2005 + (rng.next_f64() * 19.0) as i64);
    }
    cols
}

fn strings(values: &[String]) -> ArrayRef {
    Arc::new(StringArray::from(
        values.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
    ))
}

fn to_batch(cols: &Columns) -> Result<RecordBatch> {
    let fields: Vec<Field> = schema::COLUMNS
        .iter()
        .map(|&name| {
            let dtype = match name {
                schema::DAILY_CONSUMPTION | schema::AGE => DataType::Float64,
                schema::VEHICLE_YEAR => DataType::Int64,
                _ => DataType::Utf8,
            };
            Field::new(name, dtype, name == schema::DAILY_CONSUMPTION)
        })
        .collect();

    let arrays: Vec<ArrayRef> = vec![
        strings(&cols.zone),
        strings(&cols.profile),
        Arc::new(Float64Array::from(cols.consumption.clone())),
        strings(&cols.knowledge),
        strings(&cols.willingness),
        strings(&cols.fear),
        strings(&cols.unit),
        strings(&cols.fuel),
        strings(&cols.brand),
        Arc::new(Float64Array::from(cols.age.clone())),
        Arc::new(Int64Array::from(cols.year.clone())),
    ];

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("building record batch")
}

fn write_csv(path: &Path, cols: &Columns) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(schema::COLUMNS)?;
    for i in 0..cols.zone.len() {
        writer.write_record([
            cols.zone[i].clone(),
            cols.profile[i].clone(),
            cols.consumption[i].map(|v| v.to_string()).unwrap_or_default(),
            cols.knowledge[i].clone(),
            cols.willingness[i].clone(),
            cols.fear[i].clone(),
            cols.unit[i].clone(),
            cols.fuel[i].clone(),
            cols.brand[i].clone(),
            cols.age[i].to_string(),
            cols.year[i].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);
    let batch = to_batch(&cols)?;

    // CSV next to the default workbook name: the dashboard falls back to it
    // when no spreadsheet is present.
    let default_path = Path::new(DEFAULT_DATA_FILE);
    let csv_path = default_path.with_extension("csv");
    write_csv(&csv_path, &cols)?;

    // Same responses as Parquet
    let parquet_path = default_path.with_extension("parquet");
    let file = std::fs::File::create(&parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!(
        "Wrote {RESPONSES} survey responses to {} and {}",
        csv_path.display(),
        parquet_path.display()
    );
    println!(
        "`cargo run` picks up {} by default; set {DATA_ENV}={} to view the Parquet copy",
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
