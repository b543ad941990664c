use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Index into `weights`, chosen proportionally to the weights.
    fn weighted(&mut self, weights: &[u64]) -> usize {
        let total: u64 = weights.iter().sum();
        let mut roll = self.below(total);
        for (i, &w) in weights.iter().enumerate() {
            if roll < w {
                return i;
            }
            roll -= w;
        }
        weights.len() - 1
    }
}

// Rough shares of the published data: Cartagena dominates, firearms lead.
const MUNICIPALITIES: [(&str, u64); 10] = [
    ("CARTAGENA (CT)", 60),
    ("MAGANGUÉ", 8),
    ("TURBACO", 6),
    ("ARJONA", 5),
    ("EL CARMEN DE BOLÍVAR", 4),
    ("SAN PABLO", 4),
    ("SANTA ROSA DEL SUR", 3),
    ("MARÍA LA BAJA", 3),
    ("SIMITÍ", 2),
    ("MOMPÓS", 2),
];

const WEAPONS: [(&str, u64); 8] = [
    ("ARMA DE FUEGO", 70),
    ("ARMA BLANCA / CORTOPUNZANTE", 20),
    ("CONTUNDENTES", 5),
    ("SIN EMPLEO DE ARMAS", 2),
    ("ARTEFACTO EXPLOSIVO/CARGA DINAMITA", 1),
    ("CUERDA/SOGA/CADENA", 1),
    ("ALMOHADA", 1),
    ("MINA ANTIPERSONA", 1),
];

const GENDERS: [(&str, u64); 2] = [("MASCULINO", 90), ("FEMENINO", 10)];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch date")?;
    let muni_weights: Vec<u64> = MUNICIPALITIES.iter().map(|(_, w)| *w).collect();
    let weapon_weights: Vec<u64> = WEAPONS.iter().map(|(_, w)| *w).collect();
    let gender_weights: Vec<u64> = GENDERS.iter().map(|(_, w)| *w).collect();

    let mut dates: Vec<i32> = Vec::new();
    let mut municipalities: Vec<&str> = Vec::new();
    let mut weapons: Vec<&str> = Vec::new();
    let mut genders: Vec<&str> = Vec::new();
    let mut counts: Vec<i64> = Vec::new();

    for year in 2017..=2024 {
        for month in 1..=12u32 {
            // Leave an occasional quiet month so the series has gaps.
            if rng.below(40) == 0 {
                continue;
            }
            let first = NaiveDate::from_ymd_opt(year, month, 1).context("month start")?;
            let next = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            }
            .context("next month start")?;
            let days_in_month = (next - first).num_days() as u64;

            let rows = 15 + rng.below(25);
            for _ in 0..rows {
                let day = first + chrono::Duration::days(rng.below(days_in_month) as i64);
                dates.push((day - epoch).num_days() as i32);
                municipalities.push(MUNICIPALITIES[rng.weighted(&muni_weights)].0);
                weapons.push(WEAPONS[rng.weighted(&weapon_weights)].0);
                genders.push(GENDERS[rng.weighted(&gender_weights)].0);
                counts.push(1 + (rng.below(10) / 8) as i64);
            }
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("FECHA HECHO", DataType::Date32, false),
        Field::new("MUNICIPIO", DataType::Utf8, false),
        Field::new("ARMA MEDIO", DataType::Utf8, false),
        Field::new("GENERO", DataType::Utf8, false),
        Field::new("CANTIDAD", DataType::Int64, false),
    ]));

    let n_rows = dates.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(dates)),
            Arc::new(StringArray::from(municipalities)),
            Arc::new(StringArray::from(weapons)),
            Arc::new(StringArray::from(genders)),
            Arc::new(Int64Array::from(counts)),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "homicidios_bolivar.parquet".to_string());
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!("Wrote {n_rows} incident rows (2017–2024) to {output_path}");
    Ok(())
}
