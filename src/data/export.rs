use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Record, SurveyDataset};

/// Write `records` as CSV: the dataset's header row, then one row per record.
/// Columns a record lacks are written as empty fields.
pub fn write_csv<W: Write>(writer: W, dataset: &SurveyDataset, records: &[&Record]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&dataset.column_names)
        .context("writing CSV header")?;

    for (row_no, rec) in records.iter().enumerate() {
        let row = dataset
            .column_names
            .iter()
            .map(|col| rec.get(col).map(|v| v.to_field()).unwrap_or_default());
        out.write_record(row)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }

    out.flush().context("flushing CSV output")?;
    Ok(())
}

/// Export the filtered subset to a file at `path`.
pub fn export_csv(path: &Path, dataset: &SurveyDataset, records: &[&Record]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(file, dataset, records)?;
    log::info!("Exported {} rows to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::model::CellValue;
    use std::collections::BTreeMap;

    fn dataset() -> SurveyDataset {
        let rows = [
            ("Norte", CellValue::Float(40.5), "Taxi, urbano"),
            ("Sur", CellValue::Null, "Combi"),
        ];
        let records = rows
            .into_iter()
            .map(|(zone, liters, unit)| {
                let mut fields = BTreeMap::new();
                fields.insert("Zona".to_string(), CellValue::from(zone));
                fields.insert("Consumo_Diario_Lts".to_string(), liters);
                fields.insert("Tipo de unidad".to_string(), CellValue::from(unit));
                Record::new(fields)
            })
            .collect();
        SurveyDataset::from_records(
            vec!["Zona".into(), "Consumo_Diario_Lts".into(), "Tipo de unidad".into()],
            records,
        )
    }

    #[test]
    fn writes_header_then_rows_in_column_order() {
        let ds = dataset();
        let mut buf = Vec::new();
        write_csv(&mut buf, &ds, &ds.all()).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Zona,Consumo_Diario_Lts,Tipo de unidad\nNorte,40.5,\"Taxi, urbano\"\nSur,,Combi\n"
        );
    }

    #[test]
    fn empty_subset_writes_only_the_header() {
        let ds = dataset();
        let mut buf = Vec::new();
        write_csv(&mut buf, &ds, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Zona,Consumo_Diario_Lts,Tipo de unidad\n");
    }

    #[test]
    fn exported_file_loads_back() {
        let ds = dataset();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered.csv");
        let subset = vec![&ds.records[1]];

        export_csv(&path, &ds, &subset).unwrap();

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.column_names, ds.column_names);
        assert_eq!(reloaded.records, vec![ds.records[1].clone()]);
    }

    #[test]
    fn whole_floats_reload_as_floats() {
        let mut fields = BTreeMap::new();
        fields.insert("Consumo_Diario_Lts".to_string(), CellValue::Float(40.0));
        fields.insert("Edad".to_string(), CellValue::Integer(40));
        let ds = SurveyDataset::from_records(
            vec!["Consumo_Diario_Lts".into(), "Edad".into()],
            vec![Record::new(fields)],
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whole.csv");

        export_csv(&path, &ds, &ds.all()).unwrap();

        let reloaded = load_file(&path).unwrap();
        assert_eq!(reloaded.records, ds.records);
        assert_eq!(
            reloaded.records[0].get("Consumo_Diario_Lts"),
            Some(&CellValue::Float(40.0))
        );
    }
}
