//! Abort-range entries and the tab-delimited abort-range table.
//!
//! # Table format
//!
//! ```text
//! Label	Low	High	SafeToApproach	Launching	BrakingHigh	Crawling	Trigger	Fault
//! LVBatt_Voltage	10	15	1	1	1	1	0	0
//! Brake_Pressure	150	250	0	1	0	0	1	0
//! ```
//!
//! The first non-comment line is the header. Column order is free and
//! unknown columns are ignored. A row with a state column set to `1` creates
//! one entry for that state; rows keep their file order, which is the order
//! the evaluator walks them in.

use bitflags::bitflags;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::config::{read_config_file, ConfigError};
use crate::sensor::SensorKey;
use crate::state::PodState;

/// Safe operating range of one sensor in one state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbortRangeEntry {
    /// Inclusive lower bound.
    pub low: f64,
    /// Inclusive upper bound.
    pub high: f64,
    /// A violation aborts immediately.
    pub trigger: bool,
    /// Sticky: set on the first violation, never cleared.
    pub fault: bool,
}

impl AbortRangeEntry {
    pub const fn new(low: f64, high: f64, trigger: bool) -> Self {
        Self {
            low,
            high,
            trigger,
            fault: false,
        }
    }

    /// True when `value` lies outside `[low, high]`.
    #[inline]
    pub fn violated(&self, value: f64) -> bool {
        value < self.low || value > self.high
    }
}

bitflags! {
    /// States a table row applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MonitoredStates: u8 {
        const SAFE_TO_APPROACH = 0x01;
        const LAUNCHING        = 0x02;
        const BRAKING_HIGH     = 0x04;
        const CRAWLING         = 0x08;
    }
}

impl MonitoredStates {
    /// Flag for `state`, empty for states that never carry entries.
    pub const fn from_state(state: PodState) -> Self {
        match state {
            PodState::SafeToApproach => Self::SAFE_TO_APPROACH,
            PodState::Launching => Self::LAUNCHING,
            PodState::BrakingHigh => Self::BRAKING_HIGH,
            PodState::Crawling => Self::CRAWLING,
            _ => Self::empty(),
        }
    }

    #[inline]
    pub fn contains_state(self, state: PodState) -> bool {
        let flag = Self::from_state(state);
        !flag.is_empty() && self.contains(flag)
    }
}

/// One parsed table row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbortRow {
    pub key: SensorKey,
    pub entry: AbortRangeEntry,
    pub states: MonitoredStates,
}

/// Parsed abort-range table, rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbortTable {
    rows: Vec<AbortRow>,
}

const COL_LABEL: &str = "Label";
const COL_LOW: &str = "Low";
const COL_HIGH: &str = "High";
const COL_TRIGGER: &str = "Trigger";
const COL_FAULT: &str = "Fault";

const STATE_COLUMNS: [(&str, MonitoredStates); 4] = [
    ("SafeToApproach", MonitoredStates::SAFE_TO_APPROACH),
    ("Launching", MonitoredStates::LAUNCHING),
    ("BrakingHigh", MonitoredStates::BRAKING_HIGH),
    ("Crawling", MonitoredStates::CRAWLING),
];

/// Column positions resolved from the header line.
struct Columns {
    label: usize,
    low: usize,
    high: usize,
    trigger: usize,
    fault: usize,
    states: [(usize, MonitoredStates); 4],
    width: usize,
}

impl Columns {
    fn from_header(line_no: usize, header: &str) -> Result<Self, ConfigError> {
        let names: Vec<&str> = header.split('\t').map(str::trim).collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| table_error(line_no, format!("missing column {name:?}")))
        };

        let mut states = [(0, MonitoredStates::empty()); 4];
        for (slot, (name, flag)) in states.iter_mut().zip(STATE_COLUMNS) {
            *slot = (find(name)?, flag);
        }

        Ok(Self {
            label: find(COL_LABEL)?,
            low: find(COL_LOW)?,
            high: find(COL_HIGH)?,
            trigger: find(COL_TRIGGER)?,
            fault: find(COL_FAULT)?,
            states,
            width: names.len(),
        })
    }
}

fn table_error(line: usize, reason: impl Into<String>) -> ConfigError {
    ConfigError::AbortTable {
        line,
        reason: reason.into(),
    }
}

fn parse_number(line: usize, column: &str, raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| table_error(line, format!("{column}: not a number: {raw:?}")))?;
    if !value.is_finite() {
        return Err(table_error(line, format!("{column}: non-finite value {raw:?}")));
    }
    Ok(value)
}

fn parse_flag(line: usize, column: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(table_error(
            line,
            format!("{column}: flag must be 0 or 1, got {other:?}"),
        )),
    }
}

impl AbortTable {
    /// Parse table text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| {
                let t = l.trim();
                !t.is_empty() && !t.starts_with('#')
            });

        let (header_no, header) = lines
            .next()
            .ok_or_else(|| table_error(0, "missing header line"))?;
        let cols = Columns::from_header(header_no, header)?;

        let mut rows = Vec::new();
        let mut seen: HashMap<SensorKey, usize> = HashMap::new();

        for (line_no, line) in lines {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != cols.width {
                return Err(table_error(
                    line_no,
                    format!("expected {} fields, got {}", cols.width, fields.len()),
                ));
            }

            let label = fields[cols.label].trim();
            let key: SensorKey = label.parse().map_err(|e| table_error(line_no, e))?;
            if let Some(first) = seen.insert(key, line_no) {
                return Err(table_error(
                    line_no,
                    format!("duplicate label {label:?} (first on line {first})"),
                ));
            }

            let low = parse_number(line_no, COL_LOW, fields[cols.low])?;
            let high = parse_number(line_no, COL_HIGH, fields[cols.high])?;
            if low > high {
                return Err(table_error(
                    line_no,
                    format!("inverted range for {label}: {low} > {high}"),
                ));
            }

            let mut states = MonitoredStates::empty();
            for (idx, flag) in cols.states {
                if parse_flag(line_no, "state", fields[idx])? {
                    states |= flag;
                }
            }

            let trigger = parse_flag(line_no, COL_TRIGGER, fields[cols.trigger])?;
            let fault = parse_flag(line_no, COL_FAULT, fields[cols.fault])?;

            rows.push(AbortRow {
                key,
                entry: AbortRangeEntry {
                    low,
                    high,
                    trigger,
                    fault,
                },
                states,
            });
        }

        Ok(Self { rows })
    }

    /// Read and parse a table file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_config_file(path)?;
        let table = Self::parse(&text)?;
        debug!(path = %path.display(), rows = table.len(), "abort table loaded");
        Ok(table)
    }

    pub fn rows(&self) -> &[AbortRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<AbortRow> for AbortTable {
    fn from_iter<I: IntoIterator<Item = AbortRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
