//! Device interfaces used by the control loop.
//!
//! The controller talks to three collaborators: a clock, a distance sensor
//! and an indicator. Each is a trait so the loop can run against real
//! hardware files, a scripted simulation, or test doubles.

use crate::{Error, IndicatorColor, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ============================================================================
// Clock
// ============================================================================

/// Source of whole elapsed seconds since an arbitrary fixed epoch
pub trait Clock {
    /// Current time in whole seconds; never decreases
    fn now(&self) -> u64;

    /// Block for `secs` seconds
    fn sleep(&mut self, secs: u64);
}

/// Monotonic wall clock backed by `Instant`
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        self.epoch.elapsed().as_secs()
    }

    fn sleep(&mut self, secs: u64) {
        std::thread::sleep(Duration::from_secs(secs));
    }
}

/// Virtual clock; sleeping advances time instantly
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self { now: start }
    }

    pub fn advance(&mut self, secs: u64) {
        self.now += secs;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now
    }

    fn sleep(&mut self, secs: u64) {
        self.advance(secs);
    }
}

// ============================================================================
// Distance Sensor
// ============================================================================

/// Source of distance readings
pub trait DistanceSensor {
    /// Take one reading; units are whatever the driver reports
    fn read_distance(&mut self) -> Result<u32>;
}

impl<T: DistanceSensor + ?Sized> DistanceSensor for Box<T> {
    fn read_distance(&mut self) -> Result<u32> {
        (**self).read_distance()
    }
}

/// Sensor exposed as a text attribute, e.g. `/sys/bus/iio/devices/iio:device0/in_distance_raw`
#[derive(Debug)]
pub struct FileSensor {
    path: PathBuf,
}

impl FileSensor {
    /// Open the sensor, failing if the attribute is not readable
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::File::open(&path).map_err(|e| {
            Error::DeviceInit(format!("Distance sensor {:?} unavailable: {}", path, e))
        })?;
        tracing::debug!("Opened distance sensor at {:?}", path);
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DistanceSensor for FileSensor {
    fn read_distance(&mut self) -> Result<u32> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Sensor(format!("{:?}: {}", self.path, e)))?;
        parse_reading(&contents)
    }
}

fn parse_reading(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    trimmed
        .parse::<u32>()
        .map_err(|e| Error::Sensor(format!("Invalid reading {:?}: {}", trimmed, e)))
}

/// Sensor replaying a fixed list of readings
///
/// `None` entries and an exhausted script both read as failures.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSensor {
    readings: VecDeque<Option<u32>>,
}

impl ScriptedSensor {
    pub fn new(readings: impl IntoIterator<Item = Option<u32>>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    /// Script made only of successful readings
    pub fn from_distances(distances: impl IntoIterator<Item = u32>) -> Self {
        Self::new(distances.into_iter().map(Some))
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl DistanceSensor for ScriptedSensor {
    fn read_distance(&mut self) -> Result<u32> {
        match self.readings.pop_front() {
            Some(Some(distance)) => Ok(distance),
            Some(None) => Err(Error::Sensor("scripted dropout".into())),
            None => Err(Error::Sensor("script exhausted".into())),
        }
    }
}

// ============================================================================
// Indicator
// ============================================================================

/// Visual indicator accepting a discrete color
pub trait Indicator {
    fn set_color(&mut self, color: IndicatorColor) -> Result<()>;
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn set_color(&mut self, color: IndicatorColor) -> Result<()> {
        (**self).set_color(color)
    }
}

/// Indicator that only reports color changes in the log
#[derive(Debug, Default)]
pub struct LogIndicator {
    current: Option<IndicatorColor>,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<IndicatorColor> {
        self.current
    }
}

impl Indicator for LogIndicator {
    fn set_color(&mut self, color: IndicatorColor) -> Result<()> {
        tracing::info!(color = %color, code = color.code(), "indicator");
        self.current = Some(color);
        Ok(())
    }
}

/// Indicator driven by writing the discrete color code to a file
///
/// Suits a GPIO value attribute or a FIFO read by an LED daemon.
#[derive(Debug)]
pub struct FileIndicator {
    path: PathBuf,
}

impl FileIndicator {
    /// Open the indicator, failing if the target cannot be written
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)
            .map_err(|e| Error::DeviceInit(format!("Indicator {:?} unavailable: {}", path, e)))?;
        tracing::debug!("Opened indicator at {:?}", path);
        Ok(Self { path })
    }
}

impl Indicator for FileIndicator {
    fn set_color(&mut self, color: IndicatorColor) -> Result<()> {
        std::fs::write(&self.path, format!("{}\n", color.code()))
            .map_err(|e| Error::Indicator(format!("{:?}: {}", self.path, e)))
    }
}

/// Indicator that remembers every write
#[derive(Debug, Default)]
pub struct RecordingIndicator {
    pub writes: Vec<IndicatorColor>,
    /// Reject every write when set
    pub fail: bool,
}

impl RecordingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            writes: Vec::new(),
            fail: true,
        }
    }

    pub fn last(&self) -> Option<IndicatorColor> {
        self.writes.last().copied()
    }
}

impl Indicator for RecordingIndicator {
    fn set_color(&mut self, color: IndicatorColor) -> Result<()> {
        if self.fail {
            return Err(Error::Indicator("recording indicator set to fail".into()));
        }
        self.writes.push(color);
        Ok(())
    }
}
