//! One row of the link-health time series.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::extract::{InterfaceInfo, LinkInfo};

/// Column names in file order. The first column is always the timestamp.
pub const COLUMNS: [&str; 9] = [
    "timestamp",
    "latency_ms",
    "rx_bitrate_mbps",
    "tx_bitrate_mbps",
    "signal_strength_dbm",
    "frequency_mhz",
    "width_mhz",
    "centre_frequency_mhz",
    "tx_power_dbm",
];

/// `YYYY-MM-DD HH:MM:SS`, local wall clock.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A timestamped sample. Every metric is independently optional; absent
/// values serialize as empty CSV fields.
///
/// Field order must match [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub latency_ms: Option<f64>,
    pub rx_bitrate_mbps: Option<f64>,
    pub tx_bitrate_mbps: Option<f64>,
    pub signal_strength_dbm: Option<i32>,
    pub frequency_mhz: Option<u32>,
    pub width_mhz: Option<u32>,
    pub centre_frequency_mhz: Option<u32>,
    pub tx_power_dbm: Option<f64>,
}

impl Sample {
    /// A sample with no metrics, stamped with `timestamp` truncated to whole
    /// seconds.
    pub fn empty(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp: truncate_to_seconds(timestamp),
            latency_ms: None,
            rx_bitrate_mbps: None,
            tx_bitrate_mbps: None,
            signal_strength_dbm: None,
            frequency_mhz: None,
            width_mhz: None,
            centre_frequency_mhz: None,
            tx_power_dbm: None,
        }
    }

    /// Merge the three extractor results under one timestamp.
    pub fn from_parts(
        timestamp: NaiveDateTime,
        latency: Option<f64>,
        link: LinkInfo,
        iface: InterfaceInfo,
    ) -> Self {
        Self {
            latency_ms: latency,
            rx_bitrate_mbps: link.rx_bitrate,
            tx_bitrate_mbps: link.tx_bitrate,
            signal_strength_dbm: link.signal_strength,
            frequency_mhz: iface.frequency,
            width_mhz: iface.channel_width,
            centre_frequency_mhz: iface.centre_frequency,
            tx_power_dbm: iface.tx_power,
            ..Self::empty(timestamp)
        }
    }

    /// Numeric view of one metric, for statistics and charts.
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Latency => self.latency_ms,
            Field::RxBitrate => self.rx_bitrate_mbps,
            Field::TxBitrate => self.tx_bitrate_mbps,
            Field::SignalStrength => self.signal_strength_dbm.map(f64::from),
            Field::Frequency => self.frequency_mhz.map(f64::from),
            Field::ChannelWidth => self.width_mhz.map(f64::from),
            Field::CentreFrequency => self.centre_frequency_mhz.map(f64::from),
            Field::TxPower => self.tx_power_dbm,
        }
    }

    /// True when every metric is absent.
    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.value(*f).is_none())
    }
}

/// Current local time at second resolution.
pub fn now() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

fn truncate_to_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// The eight metric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Latency,
    RxBitrate,
    TxBitrate,
    SignalStrength,
    Frequency,
    ChannelWidth,
    CentreFrequency,
    TxPower,
}

impl Field {
    /// All metrics in column order.
    pub const ALL: [Field; 8] = [
        Field::Latency,
        Field::RxBitrate,
        Field::TxBitrate,
        Field::SignalStrength,
        Field::Frequency,
        Field::ChannelWidth,
        Field::CentreFrequency,
        Field::TxPower,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Self::Latency => "latency_ms",
            Self::RxBitrate => "rx_bitrate_mbps",
            Self::TxBitrate => "tx_bitrate_mbps",
            Self::SignalStrength => "signal_strength_dbm",
            Self::Frequency => "frequency_mhz",
            Self::ChannelWidth => "width_mhz",
            Self::CentreFrequency => "centre_frequency_mhz",
            Self::TxPower => "tx_power_dbm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Latency => "Ping latency",
            Self::RxBitrate => "RX bitrate",
            Self::TxBitrate => "TX bitrate",
            Self::SignalStrength => "Signal strength",
            Self::Frequency => "Frequency",
            Self::ChannelWidth => "Channel width",
            Self::CentreFrequency => "Centre frequency",
            Self::TxPower => "TX power",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Latency => "ms",
            Self::RxBitrate | Self::TxBitrate => "Mbit/s",
            Self::SignalStrength | Self::TxPower => "dBm",
            Self::Frequency | Self::ChannelWidth | Self::CentreFrequency => "MHz",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.unit())
    }
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
