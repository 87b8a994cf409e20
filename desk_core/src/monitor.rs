//! Fixed-cadence control loop.
//!
//! One cycle reads the clock, reads the sensor, classifies the reading,
//! lets the engine decide, writes the indicator and then waits one cadence
//! interval. The loop owns the controller state and all three devices.
//!
//! After a transition cycle the wait is skipped when
//! `cadence.resample_on_transition` is set, so the new posture is sampled
//! again straight away. Clearing the flag gives a uniform cadence.

use crate::config::{CadenceConfig, Config};
use crate::{
    classify, evaluate, Action, Clock, CycleReport, DeskState, DistanceSensor, Error, Indicator,
    IndicatorColor, Posture, Reading, Result, Thresholds,
};

/// Posture forced after too many consecutive failed reads
const FALLBACK_POSTURE: Posture = Posture::Sitting;

/// The posture controller: devices, thresholds and state
pub struct Monitor<C, S, I> {
    thresholds: Thresholds,
    cadence: CadenceConfig,
    max_missed_reads: u32,
    clock: C,
    sensor: S,
    indicator: I,
    state: DeskState,
    missed_reads: u32,
}

impl<C, S, I> Monitor<C, S, I>
where
    C: Clock,
    S: DistanceSensor,
    I: Indicator,
{
    /// Bring the controller up
    ///
    /// Validates the configuration and lights the indicator with the
    /// warning color, as the controller has no reading yet. Fails with
    /// [`Error::DeviceInit`] if the indicator cannot be driven.
    pub fn new(config: &Config, clock: C, sensor: S, mut indicator: I) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(Error::Config(errors.join("; ")));
        }

        indicator
            .set_color(IndicatorColor::Warning)
            .map_err(|e| Error::DeviceInit(format!("Indicator did not accept startup color: {}", e)))?;

        let state = DeskState::new(clock.now());
        tracing::info!("starting");

        Ok(Self {
            thresholds: config.thresholds.clone(),
            cadence: config.cadence.clone(),
            max_missed_reads: config.sensor.max_missed_reads,
            clock,
            sensor,
            indicator,
            state,
            missed_reads: 0,
        })
    }

    pub fn state(&self) -> &DeskState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Run forever
    pub fn run(&mut self) -> ! {
        loop {
            self.run_cycle();
        }
    }

    /// Run a bounded number of cycles
    pub fn run_cycles(&mut self, cycles: usize) -> Vec<CycleReport> {
        (0..cycles).map(|_| self.run_cycle()).collect()
    }

    /// Run one cycle including the cadence wait that follows it
    pub fn run_cycle(&mut self) -> CycleReport {
        let mut report = self.step();

        if report.decision.is_transition() && self.cadence.resample_on_transition {
            report.resampled = true;
        } else {
            self.clock.sleep(self.cadence.interval_secs);
        }

        report
    }

    /// Sample, classify, decide and drive the indicator without waiting
    pub fn step(&mut self) -> CycleReport {
        let now = self.clock.now();
        let (reading, measured) = self.measure();

        let decision = evaluate(&self.thresholds, &mut self.state, measured, now);
        self.report_status(&decision.action, reading);

        if let Some(color) = decision.indicator {
            if let Err(e) = self.indicator.set_color(color) {
                tracing::warn!("Failed to set indicator to {}: {}", color, e);
            }
        }

        CycleReport {
            at_secs: now,
            reading,
            posture: measured,
            decision,
            resampled: false,
        }
    }

    /// Read the sensor, applying the missed-read policy on failure
    fn measure(&mut self) -> (Reading, Posture) {
        match self.sensor.read_distance() {
            Ok(distance) => {
                if self.missed_reads > 0 {
                    tracing::info!("Sensor recovered after {} missed reads", self.missed_reads);
                }
                self.missed_reads = 0;
                (Reading::Measured(distance), classify(distance, &self.thresholds))
            }
            Err(e) => {
                self.missed_reads = self.missed_reads.saturating_add(1);
                if self.missed_reads > self.max_missed_reads {
                    tracing::warn!(
                        "{} ({} consecutive misses), assuming {}",
                        e,
                        self.missed_reads,
                        FALLBACK_POSTURE
                    );
                    (Reading::Fallback, FALLBACK_POSTURE)
                } else {
                    tracing::warn!("{}, holding {}", e, self.state.posture);
                    (Reading::Held, self.state.posture)
                }
            }
        }
    }

    fn report_status(&self, action: &Action, reading: Reading) {
        match action {
            Action::Transition { to, .. } => match reading {
                Reading::Measured(distance) => {
                    tracing::info!(distance, "transitioned: {}", to)
                }
                _ => tracing::info!("transitioned: {} (no reading)", to),
            },
            Action::Sitting { elapsed_secs } => tracing::info!("sitting: {}", elapsed_secs),
            Action::SittingWarning { elapsed_secs } => {
                tracing::info!("sitting: {}", elapsed_secs);
                tracing::info!("notified");
            }
            Action::StandingGoalMet { .. } => tracing::info!("met"),
            Action::Standing { elapsed_secs } => tracing::debug!("standing: {}", elapsed_secs),
            Action::Steady => {}
        }
    }
}
