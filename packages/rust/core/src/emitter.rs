//! Output emitter.
//!
//! Writes a [`LeadBatch`] as a pretty-printed JSON document and a flattened
//! CSV table, both named `leads-YYYY-MM-DD` after the local date.
//!
//! ```text
//! <out_dir>/
//! ├── leads-2026-10-18.json
//! └── leads-2026-10-18.csv
//! ```

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info, instrument};

use leadfinder_shared::{LeadBatch, LeadFinderError, Lead, Result};

/// CSV header, in column order.
pub const CSV_COLUMNS: [&str; 7] = [
    "source",
    "query",
    "title",
    "url",
    "snippet",
    "tags",
    "recommended_next_step",
];

/// Paths written by [`emit`].
#[derive(Debug, Clone)]
pub struct EmitResult {
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
    /// Number of leads written.
    pub count: usize,
}

/// Write both output files for today's local date.
///
/// Creates `out_dir` if needed. Output from an earlier run on the same date is
/// overwritten.
pub fn emit(batch: &LeadBatch, out_dir: &Path) -> Result<EmitResult> {
    emit_on(batch, out_dir, Local::now().date_naive())
}

/// Write both output files named after `date`.
#[instrument(skip_all, fields(out_dir = %out_dir.display(), %date, leads = batch.leads.len()))]
pub fn emit_on(batch: &LeadBatch, out_dir: &Path, date: NaiveDate) -> Result<EmitResult> {
    std::fs::create_dir_all(out_dir).map_err(|e| LeadFinderError::io(out_dir, e))?;

    let stem = output_stem(date);
    let json_path = out_dir.join(format!("{stem}.json"));
    let csv_path = out_dir.join(format!("{stem}.csv"));

    let json = serde_json::to_string_pretty(batch)?;
    write_atomic(&json_path, &json)?;
    write_atomic(&csv_path, &to_csv(&batch.leads))?;

    info!(
        json = %json_path.display(),
        csv = %csv_path.display(),
        count = batch.leads.len(),
        "wrote lead files"
    );

    Ok(EmitResult {
        json_path,
        csv_path,
        count: batch.leads.len(),
    })
}

/// `leads-YYYY-MM-DD`
pub fn output_stem(date: NaiveDate) -> String {
    format!("leads-{}", date.format("%Y-%m-%d"))
}

/// Render leads as CSV: header plus one row per lead, `\n`-separated, no trailing newline.
pub fn to_csv(leads: &[Lead]) -> String {
    let mut lines = Vec::with_capacity(leads.len() + 1);
    lines.push(CSV_COLUMNS.join(","));

    for lead in leads {
        let tags = lead.tags_joined();
        let fields = [
            lead.source.as_str(),
            lead.query.as_str(),
            lead.title.as_str(),
            lead.url.as_str(),
            lead.snippet.as_str(),
            tags.as_str(),
            lead.recommended_next_step.as_str(),
        ];
        lines.push(
            fields
                .iter()
                .map(|f| csv_field(f))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    lines.join("\n")
}

/// Quote a field if it contains a comma, quote, or line break; double inner quotes.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Write via a temp file in the same directory, then rename over the target.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| LeadFinderError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| LeadFinderError::io(path, e))?;

    debug!(path = %path.display(), size = content.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::RECOMMENDED_NEXT_STEP;
    use crate::classifier::classify;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("lf-emitter-test-{}", uuid::Uuid::now_v7()))
    }

    fn lead(url: &str, title: &str, snippet: &str) -> Lead {
        Lead {
            source: "reddit:r/Trucking".into(),
            query: "site:reddit.com/r/Trucking parking full".into(),
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            tags: classify(&format!("{title} {snippet}")),
            recommended_next_step: RECOMMENDED_NEXT_STEP.into(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    #[test]
    fn stem_is_zero_padded_date() {
        assert_eq!(output_stem(date()), "leads-2026-03-07");
    }

    #[test]
    fn csv_header_present_for_empty_list() {
        assert_eq!(
            to_csv(&[]),
            "source,query,title,url,snippet,tags,recommended_next_step"
        );
    }

    #[test]
    fn csv_escapes_commas_quotes_and_newlines() {
        let leads = vec![lead(
            "https://old.reddit.com/r/Trucking/comments/1/",
            "Parking, again",
            "He said \"full\"\nsecond line",
        )];
        let csv = to_csv(&leads);
        let expected_row = concat!(
            "reddit:r/Trucking,",
            "site:reddit.com/r/Trucking parking full,",
            "\"Parking, again\",",
            "https://old.reddit.com/r/Trucking/comments/1/,",
            "\"He said \"\"full\"\"\nsecond line\",",
            "parking,",
            "Reply publicly first. DM only opt-ins or the OP after engagement (avoid spam/bans)."
        );
        assert_eq!(
            csv,
            format!("source,query,title,url,snippet,tags,recommended_next_step\n{expected_row}")
        );
    }

    #[test]
    fn csv_quotes_only_fields_that_need_it() {
        assert_eq!(csv_field(RECOMMENDED_NEXT_STEP), RECOMMENDED_NEXT_STEP);
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\rbreak"), "\"line\rbreak\"");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn csv_joins_tags_with_pipe() {
        let leads = vec![lead("https://t/1", "Diesel", "snow")];
        let csv = to_csv(&leads);
        assert!(csv.lines().nth(1).unwrap().contains(",fuel_prices|weather_alerts,"));
    }

    #[test]
    fn emit_creates_missing_directory() {
        let root = temp_dir();
        let out = root.join("nested").join("out");
        assert!(!out.exists());

        let batch = LeadBatch::new(vec![lead("https://t/1", "Lot full", "")]);
        let result = emit_on(&batch, &out, date()).unwrap();

        assert_eq!(result.json_path, out.join("leads-2026-03-07.json"));
        assert_eq!(result.csv_path, out.join("leads-2026-03-07.csv"));
        assert_eq!(result.count, 1);
        assert!(result.json_path.exists());
        assert!(result.csv_path.exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn json_round_trip_and_csv_row_count() {
        let out = temp_dir();
        let batch = LeadBatch::new(vec![
            lead("https://t/1", "Weigh station open?", ""),
            lead("https://t/2", "Fuel prices", "storm coming"),
            lead("https://t/3", "Hiring", ""),
        ]);
        let result = emit_on(&batch, &out, date()).unwrap();

        let json = std::fs::read_to_string(&result.json_path).unwrap();
        let parsed: LeadBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.leads.len(), batch.leads.len());
        for (a, b) in parsed.leads.iter().zip(&batch.leads) {
            assert_eq!(a.url, b.url);
            assert_eq!(a.tags, b.tags);
        }
        assert!(json.contains("\"generatedAt\""));

        let csv = std::fs::read_to_string(&result.csv_path).unwrap();
        assert_eq!(csv.lines().count(), batch.leads.len() + 1);

        let _ = std::fs::remove_dir_all(&out);
    }

    #[test]
    fn same_date_overwrites() {
        let out = temp_dir();
        let first = LeadBatch::new(vec![lead("https://t/1", "a", ""), lead("https://t/2", "b", "")]);
        emit_on(&first, &out, date()).unwrap();

        let second = LeadBatch::new(vec![lead("https://t/9", "c", "")]);
        let result = emit_on(&second, &out, date()).unwrap();

        let csv = std::fs::read_to_string(&result.csv_path).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("https://t/9"));
        assert!(!out.join(".leads-2026-03-07.csv.tmp").exists());

        let _ = std::fs::remove_dir_all(&out);
    }
}
