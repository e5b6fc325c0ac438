//! Station catalog: the archive of station-year rows turned into one contiguous
//! monthly series per station.
//!
//! The archive holds one row per station and year with the columns
//! `stationcode`, `stationname`, `stationlat`, `stationlon`, `year` and the twelve
//! monthly mean temperatures `1`..`12` in degrees Celsius. It is read once, on a
//! blocking task, and is read-only afterwards.

use crate::stations::error::CatalogError;
use crate::types::calendar::YearMonth;
use crate::types::series::MonthlySeries;
use crate::types::station::{LatLon, StationSeries};
use crate::types::unit::TemperatureUnit;
use async_compression::tokio::bufread::GzipDecoder;
use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::task;

const STATION_CODE: &str = "stationcode";
const STATION_NAME: &str = "stationname";
const STATION_LAT: &str = "stationlat";
const STATION_LON: &str = "stationlon";
const YEAR: &str = "year";
const MONTH_COLUMNS: [&str; 12] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12"];

/// Archive-level statistics gathered while building the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSummary {
    /// Stations kept in the catalog.
    pub stations: usize,
    /// Station-year rows read.
    pub station_years: usize,
    /// Station codes dropped because no finite coordinate was available.
    pub without_coordinates: Vec<String>,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

/// Mapping from station id to its record, in one temperature unit.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    stations: BTreeMap<String, StationSeries>,
    unit: TemperatureUnit,
    summary: CatalogSummary,
}

#[derive(Default)]
struct StationAccumulator {
    name: String,
    latitude: (f64, usize),
    longitude: (f64, usize),
    years: BTreeMap<i32, [(f64, usize); 12]>,
}

fn accumulate(slot: &mut (f64, usize), value: Option<f64>) {
    if let Some(v) = value.filter(|v| v.is_finite()) {
        slot.0 += v;
        slot.1 += 1;
    }
}

fn mean_of(slot: (f64, usize)) -> f64 {
    if slot.1 == 0 {
        f64::NAN
    } else {
        slot.0 / slot.1 as f64
    }
}

impl StationAccumulator {
    fn into_station(self, id: String) -> Option<StationSeries> {
        let location = LatLon(mean_of(self.latitude), mean_of(self.longitude));
        if !location.is_finite() {
            return None;
        }
        let first = *self.years.keys().next()?;
        let last = *self.years.keys().next_back()?;
        let mut values = Vec::with_capacity(((last - first + 1) * 12) as usize);
        for year in first..=last {
            match self.years.get(&year) {
                Some(months) => values.extend(months.iter().map(|slot| mean_of(*slot))),
                None => values.extend([f64::NAN; 12]),
            }
        }
        let start = YearMonth::new(first, 1)?;
        Some(StationSeries::new(id, self.name, location, MonthlySeries::new(start, values)))
    }
}

impl StationCatalog {
    /// Builds a catalog from already assembled station records, expressed in `unit`.
    pub fn from_stations(stations: impl IntoIterator<Item = StationSeries>, unit: TemperatureUnit) -> Self {
        let stations: BTreeMap<String, StationSeries> =
            stations.into_iter().map(|s| (s.id.clone(), s)).collect();
        let (first_year, last_year) = year_bounds(stations.values());
        let summary = CatalogSummary {
            stations: stations.len(),
            first_year,
            last_year,
            ..Default::default()
        };
        Self {
            stations,
            unit,
            summary,
        }
    }

    /// Loads the archive at `path`. Values are in degrees Celsius.
    ///
    /// The format is chosen from the extension: `.parquet`, `.csv`, or `.csv.gz`.
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let load_start = std::time::Instant::now();
        let frame = read_archive(path).await?;
        let catalog = task::spawn_blocking(move || Self::from_dataframe(&frame)).await??;
        info!(
            "Loaded {} stations ({} station-years, {}..{}) from {} in {:?}",
            catalog.summary.stations,
            catalog.summary.station_years,
            catalog.summary.first_year.unwrap_or_default(),
            catalog.summary.last_year.unwrap_or_default(),
            path.display(),
            load_start.elapsed()
        );
        Ok(catalog)
    }

    /// Builds a catalog from an archive frame (Celsius).
    pub fn from_dataframe(frame: &DataFrame) -> Result<Self, CatalogError> {
        let present: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        for required in [STATION_CODE, STATION_LAT, STATION_LON, YEAR]
            .into_iter()
            .chain(MONTH_COLUMNS)
        {
            if !present.iter().any(|name| name == required) {
                return Err(CatalogError::MissingColumn(required.to_string()));
            }
        }
        let has_names = present.iter().any(|name| name == STATION_NAME);

        let mut selection = vec![
            col(STATION_CODE).cast(DataType::String),
            col(STATION_LAT).cast(DataType::Float64),
            col(STATION_LON).cast(DataType::Float64),
            col(YEAR).cast(DataType::Float64).cast(DataType::Int32),
        ];
        if has_names {
            selection.push(col(STATION_NAME).cast(DataType::String));
        }
        selection.extend(MONTH_COLUMNS.iter().map(|m| col(*m).cast(DataType::Float64)));
        let normalized = frame.clone().lazy().select(selection).collect()?;

        let codes = normalized.column(STATION_CODE)?.str()?;
        let latitudes = normalized.column(STATION_LAT)?.f64()?;
        let longitudes = normalized.column(STATION_LON)?.f64()?;
        let years = normalized.column(YEAR)?.i32()?;
        let names = if has_names {
            Some(normalized.column(STATION_NAME)?.str()?)
        } else {
            None
        };
        let months = MONTH_COLUMNS
            .iter()
            .map(|m| normalized.column(m).and_then(|c| c.f64()))
            .collect::<PolarsResult<Vec<_>>>()?;

        let mut accumulators: BTreeMap<String, StationAccumulator> = BTreeMap::new();
        let mut station_years = 0usize;
        for row in 0..normalized.height() {
            let (Some(code), Some(year)) = (codes.get(row), years.get(row)) else {
                debug!("Skipping archive row {} without station code or year", row);
                continue;
            };
            station_years += 1;
            let acc = accumulators.entry(code.trim().to_string()).or_default();
            if acc.name.is_empty() {
                if let Some(name) = names.and_then(|n| n.get(row)) {
                    acc.name = name.trim().to_string();
                }
            }
            accumulate(&mut acc.latitude, latitudes.get(row));
            accumulate(&mut acc.longitude, longitudes.get(row));
            let slots = acc.years.entry(year).or_insert([(0.0, 0); 12]);
            for (slot, column) in slots.iter_mut().zip(&months) {
                accumulate(slot, column.get(row));
            }
        }

        let mut without_coordinates = Vec::new();
        let mut stations = BTreeMap::new();
        for (id, acc) in accumulators {
            match acc.into_station(id.clone()) {
                Some(station) => {
                    stations.insert(id, station);
                }
                None => {
                    warn!("Station {} has no finite coordinate; excluded from catalog", id);
                    without_coordinates.push(id);
                }
            }
        }

        let (first_year, last_year) = year_bounds(stations.values());
        Ok(Self {
            summary: CatalogSummary {
                stations: stations.len(),
                station_years,
                without_coordinates,
                first_year,
                last_year,
            },
            stations,
            unit: TemperatureUnit::Celsius,
        })
    }

    /// Re-expresses every series in `unit`. A no-op if already in `unit`.
    pub fn with_unit(self, unit: TemperatureUnit) -> Self {
        if unit == self.unit {
            return self;
        }
        let from = self.unit;
        Self {
            stations: self
                .stations
                .into_iter()
                .map(|(id, station)| {
                    let converted = station.convert(from, unit);
                    (id, converted)
                })
                .collect(),
            unit,
            summary: self.summary,
        }
    }

    pub fn get(&self, id: &str) -> Option<&StationSeries> {
        self.stations.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationSeries> {
        self.stations.values()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn summary(&self) -> &CatalogSummary {
        &self.summary
    }
}

fn year_bounds<'a>(stations: impl Iterator<Item = &'a StationSeries>) -> (Option<i32>, Option<i32>) {
    MonthlySeries::union_span(stations.map(|s| &s.series))
        .map(|(start, end)| (Some(start.year()), Some(end.year())))
        .unwrap_or((None, None))
}

async fn read_archive(path: &Path) -> Result<DataFrame, CatalogError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let path_buf = path.to_path_buf();

    if file_name.ends_with(".gz") {
        let bytes = decompress(path).await?;
        task::spawn_blocking(move || csv_from_bytes(bytes, path_buf)).await?
    } else if file_name.ends_with(".csv") {
        task::spawn_blocking(move || read_csv(&path_buf)).await?
    } else if file_name.ends_with(".parquet") || file_name.ends_with(".pq") {
        task::spawn_blocking(move || {
            LazyFrame::scan_parquet(&path_buf, Default::default())
                .and_then(|frame| frame.collect())
                .map_err(|e| CatalogError::ParquetScan(path_buf.clone(), e))
        })
        .await?
    } else {
        Err(CatalogError::UnsupportedFormat(path_buf))
    }
}

async fn decompress(path: &Path) -> Result<Vec<u8>, CatalogError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| CatalogError::ArchiveRead(path.to_path_buf(), e))?;
    let mut decoder = GzipDecoder::new(BufReader::new(file));
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .await
        .map_err(|e| CatalogError::Decompression(path.to_path_buf(), e))?;
    debug!("Decompressed {} bytes from {}", decompressed.len(), path.display());
    Ok(decompressed)
}

/// Reads every column as text; typing happens in [`StationCatalog::from_dataframe`]
/// so station codes keep their leading zeros.
fn read_csv(path: &Path) -> Result<DataFrame, CatalogError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| CatalogError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })
}

fn csv_from_bytes(bytes: Vec<u8>, origin: PathBuf) -> Result<DataFrame, CatalogError> {
    let mut temp_file = NamedTempFile::new().map_err(CatalogError::TempFile)?;
    temp_file.write_all(&bytes).map_err(CatalogError::TempFile)?;
    temp_file.flush().map_err(CatalogError::TempFile)?;
    read_csv(temp_file.path()).map_err(|e| match e {
        CatalogError::CsvRead { source, .. } => CatalogError::CsvRead { path: origin, source },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive_frame() -> DataFrame {
        let mut columns = vec![
            Column::new(STATION_CODE.into(), ["039530", "039530", "039530", "010010", "999999"]),
            Column::new(STATION_NAME.into(), ["Alpha", "Alpha", "Alpha", "Beta", "Nowhere"]),
            Column::new(STATION_LAT.into(), [50.0, 50.2, 50.1, 60.0, f64::NAN]),
            Column::new(STATION_LON.into(), [-1.0, -1.0, -1.0, 10.0, f64::NAN]),
            Column::new(YEAR.into(), [1900i64, 1900, 1902, 1950, 1950]),
        ];
        for (i, m) in MONTH_COLUMNS.iter().enumerate() {
            let month = i as f64 + 1.0;
            columns.push(Column::new(
                (*m).into(),
                [month, month + 2.0, if i == 6 { f64::NAN } else { month }, 5.0, 1.0],
            ));
        }
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_from_dataframe_builds_contiguous_series() {
        let catalog = StationCatalog::from_dataframe(&archive_frame()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.unit(), TemperatureUnit::Celsius);

        let alpha = catalog.get("039530").unwrap();
        assert_eq!(alpha.name, "Alpha");
        assert!((alpha.location.0 - 50.1).abs() < 1e-12);
        // 1900, 1901 (missing), 1902
        assert_eq!(alpha.series.len(), 36);
        // Duplicate 1900 rows are averaged month by month.
        assert_eq!(alpha.series.values()[0], 2.0);
        assert!(alpha.series.values()[12..24].iter().all(|v| v.is_nan()));
        assert!(alpha.series.values()[24 + 6].is_nan());
        assert_eq!(alpha.series.values()[24 + 7], 8.0);
    }

    #[test]
    fn test_station_without_coordinates_is_reported() {
        let catalog = StationCatalog::from_dataframe(&archive_frame()).unwrap();
        assert!(catalog.get("999999").is_none());
        let summary = catalog.summary();
        assert_eq!(summary.without_coordinates, vec!["999999".to_string()]);
        assert_eq!(summary.station_years, 5);
        assert_eq!(summary.first_year, Some(1900));
        assert_eq!(summary.last_year, Some(1950));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let frame = archive_frame().drop("7").unwrap();
        assert!(matches!(
            StationCatalog::from_dataframe(&frame),
            Err(CatalogError::MissingColumn(c)) if c == "7"
        ));
    }

    #[test]
    fn test_with_unit_converts_once() {
        let catalog = StationCatalog::from_dataframe(&archive_frame())
            .unwrap()
            .with_unit(TemperatureUnit::Fahrenheit);
        assert_eq!(catalog.unit(), TemperatureUnit::Fahrenheit);
        let beta = catalog.get("010010").unwrap();
        assert_eq!(beta.series.values()[0], 41.0);

        let back = catalog.with_unit(TemperatureUnit::Celsius);
        let beta = back.get("010010").unwrap();
        assert!((beta.series.values()[0] - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let result = StationCatalog::load(Path::new("stations.xlsx")).await;
        assert!(matches!(result, Err(CatalogError::UnsupportedFormat(_))));
    }
}
