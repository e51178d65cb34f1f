use std::io::Write;

use ctc_kws::OccurrenceRecord;

pub const HEADER: [&str; 18] = [
    "SearchWord",
    "SearchWordConf",
    "SearchWordMinConf",
    "SearchWordMaxConf",
    "Document",
    "PageId",
    "LineId",
    "WordId",
    "BestWord",
    "BestWordConf",
    "BestWordMinConf",
    "BestWordMaxConf",
    "NormalizationPower",
    "OverallWordCount",
    "DocumentWordCount",
    "PageWordCount",
    "Query",
    "HitOrdinal",
];

pub fn write_csv<'a, W: Write>(
    out: &mut W,
    records: impl IntoIterator<Item = &'a OccurrenceRecord>,
    normalization_power: i32,
) -> Result<(), String> {
    let write_err = |err: std::io::Error| format!("Failed to write CSV output: {err}");
    writeln!(out, "{}", HEADER.join(",")).map_err(write_err)?;
    for record in records {
        writeln!(out, "{}", csv_row(record, normalization_power).join(",")).map_err(write_err)?;
    }
    Ok(())
}

fn csv_row(record: &OccurrenceRecord, normalization_power: i32) -> Vec<String> {
    let occurrence = &record.occurrence;
    let best = &record.best;
    vec![
        escape(&occurrence.text),
        format!("{:.4}", occurrence.confidence),
        format!("{:.4}", occurrence.min_confidence),
        format!("{:.4}", occurrence.max_confidence),
        escape(&record.document),
        escape(occurrence.location.page_id()),
        escape(occurrence.location.line_part()),
        occurrence.location.word.to_string(),
        escape(&best.text),
        format!("{:.4}", best.confidence),
        format!("{:.4}", best.min_confidence),
        format!("{:.4}", best.max_confidence),
        normalization_power.to_string(),
        record.counts.overall.to_string(),
        record.counts.document.to_string(),
        record.counts.page.to_string(),
        escape(&occurrence.query),
        occurrence.hit_ordinal.to_string(),
    ]
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
