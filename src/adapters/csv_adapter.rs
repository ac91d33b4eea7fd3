//! Daily quotation file adapter.
//!
//! Reads the exchange's `histo_cotation_*` exports from one directory. Two
//! layouts exist: semicolon-separated `.csv` files, and whitespace-aligned
//! `.txt` files whose second line is a dashed separator. Both are Latin-1.

use crate::domain::error::TradeAssistError;
use crate::domain::price_bar::{MarketDataset, PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Day-first formats, two-digit years tried before four so `%Y` cannot
/// swallow a short year.
const DATE_FORMATS: [&str; 5] = ["%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

pub struct CsvAdapter {
    dataset: MarketDataset,
}

impl CsvAdapter {
    /// Loads every `<prefix>*.csv` and `<prefix>*.txt` file in `data_dir`.
    /// Files that fail to parse are logged and skipped.
    pub fn open(data_dir: impl Into<PathBuf>, file_prefix: &str) -> Result<Self, TradeAssistError> {
        let data_dir = data_dir.into();
        let entries = fs::read_dir(&data_dir).map_err(|e| TradeAssistError::DataLoad {
            reason: format!("failed to read directory {}: {}", data_dir.display(), e),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TradeAssistError::DataLoad {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            if matches_quotation_file(&path, file_prefix) {
                files.push(path);
            }
        }
        files.sort();

        let mut bars = Vec::new();
        for path in &files {
            match load_file(path) {
                Ok(loaded) => {
                    log::info!("loaded {} with {} rows", path.display(), loaded.len());
                    bars.extend(loaded);
                }
                Err(e) => log::warn!("skipping {}: {}", path.display(), e),
            }
        }

        let dataset = MarketDataset::new(bars);
        if dataset.is_empty() {
            log::warn!("no price data loaded from {}", data_dir.display());
        } else {
            log::info!(
                "{} bars for {} symbols from {} files",
                dataset.bar_count(),
                dataset.symbols().len(),
                files.len()
            );
        }
        Ok(Self { dataset })
    }

    pub fn dataset(&self) -> &MarketDataset {
        &self.dataset
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, TradeAssistError> {
        Ok(self.dataset.series(&symbol.trim().to_uppercase()))
    }

    fn fetch_all(&self) -> Result<MarketDataset, TradeAssistError> {
        Ok(self.dataset.clone())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradeAssistError> {
        Ok(self.dataset.symbols())
    }
}

fn matches_quotation_file(path: &Path, prefix: &str) -> bool {
    if !path.is_file() {
        return false;
    }
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    let lower = name.to_lowercase();
    name.starts_with(prefix) && (lower.ends_with(".csv") || lower.ends_with(".txt"))
}

/// Every byte maps to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Column positions resolved from a header row.
#[derive(Debug, Default)]
struct Columns {
    date: Option<usize>,
    symbol: Option<usize>,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut cols = Columns::default();
        for (i, name) in headers.into_iter().enumerate() {
            let slot = match name.trim().to_uppercase().as_str() {
                "SEANCE" | "DATE" => &mut cols.date,
                "CODE" | "SYMBOL" => &mut cols.symbol,
                "OUVERTURE" | "OPEN" => &mut cols.open,
                "PLUS_HAUT" | "HIGH" => &mut cols.high,
                "PLUS_BAS" | "LOW" => &mut cols.low,
                "CLOTURE" | "CLOSE" => &mut cols.close,
                "QUANTITE_NEGOCIEE" | "VOLUME" => &mut cols.volume,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(i);
            }
        }
        cols
    }

    fn check(&self, file: &Path) -> Result<(), TradeAssistError> {
        let missing: Vec<&str> = [
            ("date", self.date),
            ("symbol", self.symbol),
            ("close", self.close),
        ]
        .iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| *name)
        .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TradeAssistError::DataParse {
                file: file.display().to_string(),
                reason: format!("missing required columns: {}", missing.join(", ")),
            })
        }
    }

    /// Builds a bar from one row; `None` when the date or symbol is unusable.
    fn bar<'a>(&self, field: impl Fn(usize) -> Option<&'a str>) -> Option<PriceBar> {
        let cell = |idx: Option<usize>| idx.and_then(&field).unwrap_or("");
        let date = parse_date(cell(self.date))?;
        let symbol = cell(self.symbol).trim().to_uppercase();
        if symbol.is_empty() {
            return None;
        }
        Some(PriceBar {
            date,
            symbol,
            open: parse_number(cell(self.open)),
            high: parse_number(cell(self.high)),
            low: parse_number(cell(self.low)),
            close: parse_number(cell(self.close)),
            volume: parse_number(cell(self.volume)),
        })
    }
}

fn load_file(path: &Path) -> Result<Vec<PriceBar>, TradeAssistError> {
    let bytes = fs::read(path)?;
    let text = decode_latin1(&bytes);
    let is_txt = path
        .extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    if is_txt {
        parse_aligned(&text, path)
    } else {
        parse_semicolon(&text, path)
    }
}

fn parse_semicolon(text: &str, path: &Path) -> Result<Vec<PriceBar>, TradeAssistError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| TradeAssistError::DataParse {
            file: path.display().to_string(),
            reason: format!("failed to read header: {}", e),
        })?
        .clone();
    let cols = Columns::from_headers(headers.iter());
    cols.check(path)?;

    let mut bars = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("{}: bad record: {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };
        match cols.bar(|i| record.get(i)) {
            Some(bar) => bars.push(bar),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("{}: skipped {} rows", path.display(), skipped);
    }
    Ok(bars)
}

fn parse_aligned(text: &str, path: &Path) -> Result<Vec<PriceBar>, TradeAssistError> {
    let mut lines = text.lines();
    let header: Vec<&str> = lines
        .next()
        .map(|l| l.split_whitespace().collect())
        .unwrap_or_default();
    if header.is_empty() {
        return Err(TradeAssistError::DataParse {
            file: path.display().to_string(),
            reason: "empty file".into(),
        });
    }
    let cols = Columns::from_headers(header.iter().copied());
    cols.check(path)?;

    // second line is the dashed separator under the header
    lines.next();

    let mut bars = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != header.len() {
            skipped += 1;
            continue;
        }
        match cols.bar(|i| fields.get(i).copied()) {
            Some(bar) => bars.push(bar),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("{}: skipped {} rows", path.display(), skipped);
    }
    Ok(bars)
}

/// Accepts a comma decimal separator; anything unparseable is 0.
fn parse_number(cell: &str) -> f64 {
    cell.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_test_data() -> TempDir {
        let dir = TempDir::new().unwrap();

        let csv_content = "SEANCE;GROUPE;CODE;VALEUR;OUVERTURE;CLOTURE;PLUS_BAS;PLUS_HAUT;\
            QUANTITE_NEGOCIEE;NB_TRANSACTION;CAPITAUX\n\
            02/01/2024;11;sfbt ;SFBT;13,50;13,70;13,40;13,80;15230;42;208651,0\n\
            03/01/2024;11;SFBT;SFBT;13,70;13,60;13,55;13,75;9800;30;133280,0\n\
            03/01/2024;11;BIAT;BIAT;95,00;96,10;94,50;96,20;1200;12;115320,0\n";
        fs::write(dir.path().join("histo_cotation_2024.csv"), csv_content).unwrap();

        let txt_content = concat!(
            "SEANCE     GROUPE CODE  VALEUR OUVERTURE CLOTURE PLUS_BAS PLUS_HAUT ",
            "QUANTITE_NEGOCIEE NB_TRANSACTION CAPITAUX\n",
            "---------- ------ ----- ------ --------- ------- -------- --------- ",
            "----------------- -------------- --------\n",
            "29/12/2023 11     SFBT  SFBT   13.30     13.45   13.20    13.50     ",
            "20000             55             269000\n",
            "29/12/2023 11     SAH   SAH    TUNISIE   10.10   10.10    10.00     ",
            "10.20             500            3      5050\n",
            "garbage line\n",
        );
        fs::write(dir.path().join("histo_cotation_2023.txt"), txt_content).unwrap();

        fs::write(dir.path().join("notes.csv"), "SEANCE;CODE;CLOTURE\n01/01/2024;X;1\n").unwrap();
        dir
    }

    #[test]
    fn loads_both_layouts() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::open(dir.path(), "histo_cotation_").unwrap();

        assert_eq!(adapter.list_symbols().unwrap(), vec!["BIAT", "SFBT"]);
        let sfbt = adapter.fetch_series("sfbt").unwrap();
        assert_eq!(sfbt.len(), 3);
        assert_eq!(sfbt.bars()[0].date, ymd(2023, 12, 29));
        assert_eq!(sfbt.bars()[0].close, 13.45);
        assert_eq!(sfbt.bars()[1].date, ymd(2024, 1, 2));
        assert_eq!(sfbt.bars()[1].open, 13.5);
        assert_eq!(sfbt.bars()[1].close, 13.7);
        assert_eq!(sfbt.bars()[1].volume, 15230.0);
    }

    #[test]
    fn misaligned_txt_rows_are_skipped() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::open(dir.path(), "histo_cotation_").unwrap();
        // the SAH row carries a two-word name, shifting every later column
        assert!(adapter.fetch_series("SAH").unwrap().is_empty());
    }

    #[test]
    fn unmatched_files_are_ignored() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::open(dir.path(), "histo_cotation_").unwrap();
        assert!(adapter.fetch_series("X").unwrap().is_empty());
    }

    #[test]
    fn unknown_symbol_is_empty() {
        let dir = setup_test_data();
        let adapter = CsvAdapter::open(dir.path(), "histo_cotation_").unwrap();
        let series = adapter.fetch_series("NOPE").unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let result = CsvAdapter::open("/nonexistent/quotes", "histo_cotation_");
        assert!(matches!(result, Err(TradeAssistError::DataLoad { .. })));
    }

    #[test]
    fn file_without_close_column_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("histo_cotation_bad.csv"),
            "SEANCE;CODE;OUVERTURE\n02/01/2024;SFBT;13,5\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("histo_cotation_good.csv"),
            "SEANCE;CODE;CLOTURE\n02/01/2024;SAH;10,5\n",
        )
        .unwrap();
        let adapter = CsvAdapter::open(dir.path(), "histo_cotation_").unwrap();
        assert_eq!(adapter.list_symbols().unwrap(), vec!["SAH"]);
    }

    #[test]
    fn latin1_bytes_decode() {
        let dir = TempDir::new().unwrap();
        let mut content = b"SEANCE;CODE;VALEUR;CLOTURE\n02/01/2024;STB;SOCI".to_vec();
        content.push(0xC9); // 'É' in Latin-1, invalid as UTF-8
        content.extend_from_slice(b"T;4,2\n");
        fs::write(dir.path().join("histo_cotation_x.csv"), content).unwrap();

        let adapter = CsvAdapter::open(dir.path(), "histo_cotation_").unwrap();
        let series = adapter.fetch_series("STB").unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.bars()[0].close, 4.2);
    }

    #[test]
    fn rows_without_date_or_symbol_are_dropped() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("histo_cotation_x.csv"),
            "SEANCE;CODE;CLOTURE\nnot a date;SAH;1\n02/01/2024;;2\n03/01/2024;SAH;3\n",
        )
        .unwrap();
        let adapter = CsvAdapter::open(dir.path(), "histo_cotation_").unwrap();
        assert_eq!(adapter.dataset().bar_count(), 1);
    }

    #[test]
    fn number_parsing() {
        assert_eq!(parse_number("13,45"), 13.45);
        assert_eq!(parse_number(" 7.5 "), 7.5);
        assert_eq!(parse_number("n/a"), 0.0);
        assert_eq!(parse_number(""), 0.0);
    }

    #[test]
    fn date_parsing_is_day_first() {
        assert_eq!(parse_date("02/01/2024"), Some(ymd(2024, 1, 2)));
        assert_eq!(parse_date("02/01/24"), Some(ymd(2024, 1, 2)));
        assert_eq!(parse_date("02-01-2024"), Some(ymd(2024, 1, 2)));
        assert_eq!(parse_date("2024-01-02"), Some(ymd(2024, 1, 2)));
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date(""), None);
    }
}
