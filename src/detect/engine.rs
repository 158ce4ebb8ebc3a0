use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::gap::GapDetector;
use super::policy::PolicyWindow;
use super::session::SessionDetector;
use super::spike::SpikeDetector;
use super::{Anomaly, DetectError};
use crate::config::DetectConfig;
use crate::event::Event;

/// Single-pass anomaly classifier.
///
/// Feed events one at a time with [`Engine::process`] or fold a whole
/// sequence with [`Engine::run`]. Detectors run in a fixed order for every
/// event (spike, gap, session order, policy window) so output is
/// reproducible regardless of how the input is chunked.
pub struct Engine {
    config: DetectConfig,
    spike: SpikeDetector,
    gap: GapDetector,
    session: SessionDetector,
    policy: PolicyWindow,
    processed: usize,
}

impl Engine {
    pub fn new(config: DetectConfig) -> Result<Self, DetectError> {
        config.validate()?;
        Ok(Self {
            spike: SpikeDetector::new(config.spike_threshold_count, config.spike_window_seconds),
            gap: GapDetector::new(config.gap_threshold_minutes),
            session: SessionDetector::new(),
            policy: PolicyWindow::new(config.business_start_hour, config.business_end_hour),
            processed: 0,
            config,
        })
    }

    /// Number of events accepted since construction or the last reset.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Process one event and return the anomalies it triggered, in detector order.
    pub fn process(&mut self, event: &Event) -> Result<Vec<Anomaly>, DetectError> {
        let actor = check(self.gap.previous(), event)?;
        let tags = self.config.classify(&event.activity);
        let ts = event.timestamp;

        let mut found = Vec::new();
        found.extend(self.spike.observe(&event.activity, ts));
        found.extend(self.gap.observe(ts));
        found.extend(self.session.observe(tags.session, actor, &event.activity, ts));
        found.extend(self.policy.observe(tags.critical, actor, &event.activity, ts));
        self.processed += 1;

        for anomaly in &found {
            debug!(
                kind = anomaly.kind().label(),
                at = %anomaly.started_at(),
                "anomaly detected"
            );
        }
        Ok(found)
    }

    /// Process a batch of events in order.
    ///
    /// The whole batch is checked first: if any event is rejected, none of
    /// the batch is processed and the engine state is unchanged.
    pub fn run<'a, I>(&mut self, events: I) -> Result<Vec<Anomaly>, DetectError>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let batch: Vec<&Event> = events.into_iter().collect();

        let mut previous = self.gap.previous();
        for event in &batch {
            check(previous, event)?;
            previous = Some(event.timestamp);
        }

        let mut anomalies = Vec::new();
        for event in batch {
            anomalies.extend(self.process(event)?);
        }
        Ok(anomalies)
    }

    /// Drop all per-run state, keeping the configuration.
    pub fn reset(&mut self) {
        self.spike.clear();
        self.gap.clear();
        self.session.clear();
        self.processed = 0;
    }
}

/// Reject events that break the input contract before any state changes.
fn check(previous: Option<NaiveDateTime>, event: &Event) -> Result<&str, DetectError> {
    if let Some(previous) = previous {
        if event.timestamp < previous {
            return Err(DetectError::OutOfOrder {
                previous,
                timestamp: event.timestamp,
            });
        }
    }
    if event.activity.is_empty() {
        return Err(DetectError::EmptyActivity {
            timestamp: event.timestamp,
        });
    }
    event.actor().ok_or_else(|| DetectError::MissingActor {
        timestamp: event.timestamp,
        activity: event.activity.clone(),
    })
}

/// Run a fresh engine over `events`.
pub fn detect(config: &DetectConfig, events: &[Event]) -> Result<Vec<Anomaly>, DetectError> {
    let mut engine = Engine::new(config.clone())?;
    let anomalies = engine.run(events)?;
    info!(
        events = engine.processed(),
        anomalies = anomalies.len(),
        "anomaly detection complete"
    );
    Ok(anomalies)
}
