use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::codec::{decode_counter_series, decode_series};
use crate::error::{GraphError, GraphResult};

/// Transmission direction a carrier or counter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Downstream,
    Upstream,
}

/// Carrier-index range `[start, end]` allocated to one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub start: usize,
    pub end: usize,
    pub direction: Direction,
}

impl FrequencyBand {
    #[must_use]
    pub const fn new(start: usize, end: usize, direction: Direction) -> Self {
        Self {
            start,
            end,
            direction,
        }
    }
}

/// One decoded per-carrier series. Sample `i` covers carriers
/// `i * group_size .. (i + 1) * group_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinSeries {
    pub group_size: usize,
    pub data: Vec<Option<f64>>,
}

impl BinSeries {
    #[must_use]
    pub fn new(group_size: usize, data: Vec<Option<f64>>) -> Self {
        Self {
            group_size: group_size.max(1),
            data,
        }
    }

    #[must_use]
    pub fn from_encoded(group_size: usize, encoded: &str) -> Self {
        Self::new(group_size, decode_series(encoded))
    }
}

impl Default for BinSeries {
    fn default() -> Self {
        Self::new(1, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectionalSeries {
    pub downstream: BinSeries,
    pub upstream: BinSeries,
}

/// Decoded per-carrier snapshot of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct BinDataset {
    pub bin_count: usize,
    /// Carrier spacing in kHz.
    pub carrier_spacing: f64,
    pub pilot_tones: Vec<usize>,
    pub bands: Vec<FrequencyBand>,
    pub bits: DirectionalSeries,
    pub snr: DirectionalSeries,
    pub qln: DirectionalSeries,
    pub hlog: DirectionalSeries,
}

impl Default for BinDataset {
    fn default() -> Self {
        Self {
            bin_count: DEFAULT_BIN_COUNT,
            carrier_spacing: DEFAULT_CARRIER_SPACING_KHZ,
            pilot_tones: Vec::new(),
            bands: Vec::new(),
            bits: DirectionalSeries::default(),
            snr: DirectionalSeries::default(),
            qln: DirectionalSeries::default(),
            hlog: DirectionalSeries::default(),
        }
    }
}

/// Carrier layout assumed when no snapshot is available.
pub const DEFAULT_BIN_COUNT: usize = 8192;
pub const DEFAULT_CARRIER_SPACING_KHZ: f64 = 4.3125;

impl BinDataset {
    /// Parses and decodes the JSON snapshot produced by the data collector.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        let payload: BinsPayload = serde_json::from_str(json)?;
        Self::from_payload(payload)
    }

    pub fn from_value(value: serde_json::Value) -> GraphResult<Self> {
        let payload: BinsPayload = serde_json::from_value(value)?;
        Self::from_payload(payload)
    }

    fn from_payload(payload: BinsPayload) -> GraphResult<Self> {
        if payload.bin_count == 0 {
            return Err(GraphError::InvalidData(
                "bin snapshot must declare a non-zero BinCount".to_owned(),
            ));
        }
        if !payload.carrier_spacing.is_finite() || payload.carrier_spacing <= 0.0 {
            return Err(GraphError::InvalidData(
                "bin snapshot carrier spacing must be finite and > 0".to_owned(),
            ));
        }

        let mut bands = Vec::with_capacity(
            payload.bands.downstream.len() + payload.bands.upstream.len(),
        );
        bands.extend(
            payload
                .bands
                .downstream
                .iter()
                .map(|band| FrequencyBand::new(band.start, band.end, Direction::Downstream)),
        );
        bands.extend(
            payload
                .bands
                .upstream
                .iter()
                .map(|band| FrequencyBand::new(band.start, band.end, Direction::Upstream)),
        );
        bands.sort_by_key(|band| band.start);

        let dataset = Self {
            bin_count: payload.bin_count,
            carrier_spacing: payload.carrier_spacing,
            pilot_tones: payload.pilot_tones,
            bands,
            bits: payload.bits.decode(),
            snr: payload.snr.decode(),
            qln: payload.qln.decode(),
            hlog: payload.hlog.decode(),
        };
        debug!(
            bin_count = dataset.bin_count,
            bands = dataset.bands.len(),
            bits_downstream = dataset.bits.downstream.data.len(),
            "decoded bin snapshot"
        );
        Ok(dataset)
    }
}

/// Min/max of one per-carrier series over the retention window.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxSeries {
    pub group_size: usize,
    pub min: Vec<Option<f64>>,
    pub max: Vec<Option<f64>>,
}

impl Default for MinMaxSeries {
    fn default() -> Self {
        Self {
            group_size: 1,
            min: Vec::new(),
            max: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectionalMinMax {
    pub downstream: MinMaxSeries,
    pub upstream: MinMaxSeries,
}

/// Per-carrier SNR history overlay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryDataset {
    pub snr: DirectionalMinMax,
}

impl HistoryDataset {
    pub fn from_json(json: &str) -> GraphResult<Self> {
        let payload: HistoryPayload = serde_json::from_str(json)?;
        Ok(Self {
            snr: DirectionalMinMax {
                downstream: payload.snr.downstream.decode(),
                upstream: payload.snr.upstream.decode(),
            },
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        let empty = |series: &MinMaxSeries| series.min.is_empty() && series.max.is_empty();
        empty(&self.snr.downstream) && empty(&self.snr.upstream)
    }
}

/// Named error/retransmission counters tracked per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCounter {
    DownstreamRtxTx,
    UpstreamRtxTx,
    DownstreamRtxC,
    UpstreamRtxC,
    DownstreamRtxUc,
    UpstreamRtxUc,
    DownstreamFec,
    UpstreamFec,
    DownstreamCrc,
    UpstreamCrc,
    DownstreamEs,
    UpstreamEs,
    DownstreamSes,
    UpstreamSes,
}

impl ErrorCounter {
    pub const ALL: [Self; 14] = [
        Self::DownstreamRtxTx,
        Self::UpstreamRtxTx,
        Self::DownstreamRtxC,
        Self::UpstreamRtxC,
        Self::DownstreamRtxUc,
        Self::UpstreamRtxUc,
        Self::DownstreamFec,
        Self::UpstreamFec,
        Self::DownstreamCrc,
        Self::UpstreamCrc,
        Self::DownstreamEs,
        Self::UpstreamEs,
        Self::DownstreamSes,
        Self::UpstreamSes,
    ];

    /// Field name used by the JSON snapshot.
    #[must_use]
    pub const fn json_key(self) -> &'static str {
        match self {
            Self::DownstreamRtxTx => "DownstreamRTXTXCount",
            Self::UpstreamRtxTx => "UpstreamRTXTXCount",
            Self::DownstreamRtxC => "DownstreamRTXCCount",
            Self::UpstreamRtxC => "UpstreamRTXCCount",
            Self::DownstreamRtxUc => "DownstreamRTXUCCount",
            Self::UpstreamRtxUc => "UpstreamRTXUCCount",
            Self::DownstreamFec => "DownstreamFECCount",
            Self::UpstreamFec => "UpstreamFECCount",
            Self::DownstreamCrc => "DownstreamCRCCount",
            Self::UpstreamCrc => "UpstreamCRCCount",
            Self::DownstreamEs => "DownstreamESCount",
            Self::UpstreamEs => "UpstreamESCount",
            Self::DownstreamSes => "DownstreamSESCount",
            Self::UpstreamSes => "UpstreamSESCount",
        }
    }
}

/// Error counters over fixed-length periods, oldest period first.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorsHistoryDataset {
    pub period_count: usize,
    pub period_length: TimeDelta,
    pub end_time: Option<DateTime<Utc>>,
    pub series: IndexMap<ErrorCounter, Vec<Option<u64>>>,
}

impl Default for ErrorsHistoryDataset {
    fn default() -> Self {
        Self {
            period_count: 0,
            period_length: TimeDelta::minutes(5),
            end_time: None,
            series: IndexMap::new(),
        }
    }
}

impl ErrorsHistoryDataset {
    pub fn from_json(json: &str) -> GraphResult<Self> {
        let payload: ErrorsHistoryPayload = serde_json::from_str(json)?;

        let end_time = match payload.end_time.as_deref() {
            Some(text) if !text.is_empty() => Some(
                DateTime::parse_from_rfc3339(text)
                    .map_err(|err| GraphError::InvalidData(format!("EndTime: {err}")))?
                    .with_timezone(&Utc),
            ),
            _ => None,
        };

        let mut series = IndexMap::with_capacity(ErrorCounter::ALL.len());
        for counter in ErrorCounter::ALL {
            match payload.counters.get(counter.json_key()) {
                Some(serde_json::Value::String(encoded)) => {
                    series.insert(counter, decode_counter_series(encoded));
                }
                Some(serde_json::Value::Null) | None => {}
                Some(_) => {
                    return Err(GraphError::InvalidData(format!(
                        "{} must be an encoded string",
                        counter.json_key()
                    )));
                }
            }
        }

        let period_length = TimeDelta::try_seconds(payload.period_length).ok_or_else(|| {
            GraphError::InvalidData(format!(
                "PeriodLength {} seconds is out of range",
                payload.period_length
            ))
        })?;

        Ok(Self {
            period_count: payload.period_count,
            period_length,
            end_time,
            series,
        })
    }

    /// Samples of one counter; absent counters read as an empty series.
    #[must_use]
    pub fn counter(&self, counter: ErrorCounter) -> &[Option<u64>] {
        self.series.get(&counter).map_or(&[], Vec::as_slice)
    }

    /// Total covered duration in minutes, falling back to one day.
    #[must_use]
    pub fn total_minutes(&self) -> f64 {
        let total_seconds = i64::try_from(self.period_count)
            .ok()
            .and_then(|count| self.period_length.num_seconds().checked_mul(count))
            .filter(|seconds| *seconds > 0)
            .unwrap_or(24 * 60 * 60);
        total_seconds as f64 / 60.0
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BinsPayload {
    bin_count: usize,
    carrier_spacing: f64,
    #[serde(default)]
    pilot_tones: Vec<usize>,
    #[serde(default)]
    bands: BandsPayload,
    #[serde(default)]
    bits: DirectionalPayload,
    #[serde(rename = "SNR", default)]
    snr: DirectionalPayload,
    #[serde(rename = "QLN", default)]
    qln: DirectionalPayload,
    #[serde(default)]
    hlog: DirectionalPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BandsPayload {
    #[serde(default)]
    downstream: Vec<BandPayload>,
    #[serde(default)]
    upstream: Vec<BandPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BandPayload {
    start: usize,
    end: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DirectionalPayload {
    #[serde(default)]
    downstream: EncodedSeriesPayload,
    #[serde(default)]
    upstream: EncodedSeriesPayload,
}

impl DirectionalPayload {
    fn decode(&self) -> DirectionalSeries {
        DirectionalSeries {
            downstream: self.downstream.decode(),
            upstream: self.upstream.decode(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EncodedSeriesPayload {
    #[serde(default)]
    group_size: usize,
    #[serde(default)]
    data: String,
}

impl EncodedSeriesPayload {
    fn decode(&self) -> BinSeries {
        BinSeries::from_encoded(self.group_size, &self.data)
    }
}

#[derive(Debug, Deserialize)]
struct HistoryPayload {
    #[serde(rename = "SNR", default)]
    snr: DirectionalMinMaxPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DirectionalMinMaxPayload {
    #[serde(default)]
    downstream: MinMaxPayload,
    #[serde(default)]
    upstream: MinMaxPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MinMaxPayload {
    #[serde(default)]
    group_size: usize,
    #[serde(default)]
    min: String,
    #[serde(default)]
    max: String,
}

impl MinMaxPayload {
    fn decode(&self) -> MinMaxSeries {
        MinMaxSeries {
            group_size: self.group_size.max(1),
            min: decode_series(&self.min),
            max: decode_series(&self.max),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorsHistoryPayload {
    #[serde(default)]
    period_count: usize,
    /// Seconds.
    #[serde(default)]
    period_length: i64,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(flatten)]
    counters: IndexMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::{BinDataset, Direction, ErrorCounter, ErrorsHistoryDataset, HistoryDataset};
    use crate::error::GraphError;

    #[test]
    fn bins_snapshot_decodes_series_and_sorts_bands() {
        let json = r#"{
            "BinCount": 32,
            "CarrierSpacing": 4.3125,
            "PilotTones": [12],
            "Bands": {
                "Downstream": [{"Start": 20, "End": 31}],
                "Upstream": [{"Start": 2, "End": 10}]
            },
            "Bits": {"Downstream": {"Data": "Q5r31"}, "Upstream": {"Data": ""}},
            "SNR": {"Downstream": {"Data": "P40r3", "GroupSize": 8}, "Upstream": {"Data": "", "GroupSize": 1}},
            "QLN": {"Downstream": {"Data": "N120"}, "Upstream": {"Data": ""}},
            "Hlog": {"Downstream": {"Data": "N20.5"}, "Upstream": {"Data": ""}}
        }"#;

        let dataset = BinDataset::from_json(json).expect("valid snapshot");
        assert_eq!(dataset.bin_count, 32);
        assert_eq!(dataset.bits.downstream.data, vec![Some(0.5); 32]);
        assert_eq!(dataset.snr.downstream.group_size, 8);
        assert_eq!(dataset.snr.downstream.data.len(), 4);
        assert_eq!(dataset.bits.upstream.group_size, 1);
        assert_eq!(dataset.qln.downstream.data, vec![Some(-120.0)]);
        assert_eq!(dataset.bands[0].direction, Direction::Upstream);
        assert_eq!(dataset.bands[1].start, 20);
    }

    #[test]
    fn bins_snapshot_rejects_zero_bin_count() {
        let err = BinDataset::from_json(r#"{"BinCount": 0, "CarrierSpacing": 4.3125}"#);
        assert!(err.is_err());
    }

    #[test]
    fn history_snapshot_decodes_min_and_max() {
        let json = r#"{"SNR": {
            "Downstream": {"GroupSize": 2, "Min": "P30r1", "Max": "P40r1"},
            "Upstream": {"GroupSize": 1, "Min": "", "Max": ""}
        }}"#;
        let history = HistoryDataset::from_json(json).expect("valid history");
        assert_eq!(history.snr.downstream.min, vec![Some(30.0); 2]);
        assert_eq!(history.snr.downstream.max, vec![Some(40.0); 2]);
        assert!(!history.is_empty());
    }

    #[test]
    fn errors_snapshot_reads_named_counters() {
        let json = r#"{
            "PeriodCount": 4,
            "PeriodLength": 900,
            "EndTime": "2024-05-01T12:00:00Z",
            "DownstreamFECCount": "P3eP0P7",
            "UpstreamCRCCount": null
        }"#;
        let history = ErrorsHistoryDataset::from_json(json).expect("valid errors history");
        assert_eq!(
            history.counter(ErrorCounter::DownstreamFec),
            &[Some(3), None, Some(0), Some(7)]
        );
        assert!(history.counter(ErrorCounter::UpstreamCrc).is_empty());
        assert!((history.total_minutes() - 60.0).abs() < 1e-9);
        assert!(history.end_time.is_some());
    }

    #[test]
    fn errors_snapshot_rejects_out_of_range_period_length() {
        let result = ErrorsHistoryDataset::from_json(r#"{"PeriodLength": 9223372036854775807}"#);
        assert!(matches!(result, Err(GraphError::InvalidData(_))));
    }

    #[test]
    fn errors_total_duration_defaults_to_one_day() {
        let history = ErrorsHistoryDataset::default();
        assert!((history.total_minutes() - 1440.0).abs() < 1e-9);
    }
}
