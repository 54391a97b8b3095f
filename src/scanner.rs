//! Scanner service: a detector bound to an event source
//!
//! The service owns the attach/enable lifecycle around a [`ScanDetector`].
//! Events are pulled from the attached [`EventSource`] by [`Scanner::pump`],
//! or pushed by hosts that own their dispatch loop via [`Scanner::dispatch`].

use crate::config::{ConfigError, ScannerConfig};
use crate::detect::{EventDisposition, ScanDetector, ScanListener};
use crate::keyboard::InputEvent;
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::sync::mpsc;
use std::time::Instant;

/// Error type for scanner setup and pumping
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("No event source attached")]
    NotAttached,
    #[error("An event source is already attached")]
    AlreadyAttached,
    #[error("Event source disconnected")]
    SourceDisconnected,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Somewhere input events come from
pub trait EventSource {
    /// Next waiting event, `Ok(None)` if nothing is waiting right now
    fn try_next(&mut self) -> Result<Option<InputEvent>, ScannerError>;
}

impl EventSource for mpsc::Receiver<InputEvent> {
    fn try_next(&mut self) -> Result<Option<InputEvent>, ScannerError> {
        match self.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ScannerError::SourceDisconnected),
        }
    }
}

/// Replays a fixed list of events
impl EventSource for VecDeque<InputEvent> {
    fn try_next(&mut self) -> Result<Option<InputEvent>, ScannerError> {
        Ok(self.pop_front())
    }
}

/// A scan detector attached to an event source
pub struct Scanner<S, L> {
    detector: ScanDetector<L>,
    source: Option<S>,
    active: bool,
}

impl<S: EventSource, L: ScanListener> Scanner<S, L> {
    /// Create a detached scanner; fails on unusable settings
    pub fn new(config: ScannerConfig, listener: L) -> Result<Self, ScannerError> {
        config.validate()?;
        Ok(Self {
            detector: ScanDetector::new(config, listener),
            source: None,
            active: false,
        })
    }

    /// Start listening to `source`. Attaching enables the scanner.
    pub fn attach(&mut self, source: S) -> Result<(), ScannerError> {
        if self.source.is_some() {
            return Err(ScannerError::AlreadyAttached);
        }
        self.source = Some(source);
        self.active = true;
        info!("scanner attached");
        Ok(())
    }

    /// Stop listening and hand the source back.
    ///
    /// Cancels all timers and drops any partial scan, so nothing fires
    /// after this returns.
    pub fn detach(&mut self) -> Option<S> {
        self.detector.cancel_timers();
        self.active = false;
        let source = self.source.take();
        if source.is_some() {
            info!("scanner detached");
        }
        source
    }

    pub fn is_attached(&self) -> bool {
        self.source.is_some()
    }

    /// Resume handling input. Does nothing while detached.
    pub fn enable(&mut self) {
        if self.source.is_none() {
            debug!("enable ignored, no source attached");
            return;
        }
        if !self.active {
            info!("scanner enabled");
        }
        self.active = true;
    }

    /// Ignore input until re-enabled. Drops any partial scan.
    pub fn disable(&mut self) {
        if self.active {
            info!("scanner disabled");
        }
        self.active = false;
        self.detector.cancel_timers();
    }

    /// Attached and enabled
    pub fn is_active(&self) -> bool {
        self.active && self.source.is_some()
    }

    /// Drop the partial scan, if any, without reporting it
    pub fn clear(&mut self) {
        self.detector.clear();
    }

    /// Clear and re-attach the current source, which re-enables the scanner
    pub fn reset(&mut self) -> Result<(), ScannerError> {
        self.clear();
        let source = self.detach().ok_or(ScannerError::NotAttached)?;
        self.attach(source)
    }

    /// Feed every waiting event to the detector, then fire timers due at `now`.
    ///
    /// Returns the number of events taken from the source. Events taken while
    /// disabled are discarded.
    pub fn pump(&mut self, now: Instant) -> Result<usize, ScannerError> {
        let source = self.source.as_mut().ok_or(ScannerError::NotAttached)?;

        let mut taken = 0;
        let result = loop {
            match source.try_next() {
                Ok(Some(event)) => {
                    taken += 1;
                    if self.active {
                        self.detector.handle_event(&event);
                    }
                }
                Ok(None) => break Ok(taken),
                Err(e) => {
                    warn!("event source failed: {}", e);
                    break Err(e);
                }
            }
        };

        self.check_timers(now);
        result
    }

    /// Deliver one event directly. Ignored while disabled or detached.
    pub fn dispatch(&mut self, event: &InputEvent) -> EventDisposition {
        if !self.is_active() {
            return EventDisposition::PASS;
        }
        self.detector.handle_event(event)
    }

    /// Fire timers due at `now`; see [`ScanDetector::check_timers`]
    pub fn check_timers(&mut self, now: Instant) -> usize {
        if !self.is_active() {
            return 0;
        }
        self.detector.check_timers(now)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.detector.next_deadline()
    }

    pub fn detector(&self) -> &ScanDetector<L> {
        &self.detector
    }

    pub fn listener(&self) -> &L {
        self.detector.listener()
    }

    pub fn listener_mut(&mut self) -> &mut L {
        self.detector.listener_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::test_helpers::*;
    use crate::keyboard::KeyCode;
    use std::time::Duration;

    type TestScanner = Scanner<VecDeque<InputEvent>, RecordingListener>;

    fn scanner() -> TestScanner {
        Scanner::new(ScannerConfig::default(), RecordingListener::default()).expect("valid config")
    }

    fn burst(text: &str, start: Instant) -> VecDeque<InputEvent> {
        let mut events: VecDeque<InputEvent> = text
            .chars()
            .enumerate()
            .map(|(i, c)| char_press(c, start + Duration::from_millis(5 * i as u64)).into())
            .collect();
        let end = start + Duration::from_millis(5 * text.len() as u64);
        events.push_back(press(KeyCode::ENTER, end).into());
        events
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = ScannerConfig {
            min_length: 0,
            ..ScannerConfig::default()
        };
        let result = TestScanner::new(config, RecordingListener::default());
        assert!(matches!(result, Err(ScannerError::Config(_))));
    }

    #[test]
    fn pump_requires_a_source() {
        let mut scanner = scanner();
        assert!(matches!(
            scanner.pump(Instant::now()),
            Err(ScannerError::NotAttached)
        ));
    }

    #[test]
    fn attach_twice_fails() {
        let mut scanner = scanner();
        scanner.attach(VecDeque::new()).expect("first attach");
        assert!(matches!(
            scanner.attach(VecDeque::new()),
            Err(ScannerError::AlreadyAttached)
        ));
    }

    #[test]
    fn pump_drains_source_into_detector() {
        let t0 = Instant::now();
        let mut scanner = scanner();
        scanner.attach(burst("4006381333931", t0)).expect("attach");

        let taken = scanner.pump(t0 + Duration::from_millis(100)).expect("pump");

        assert_eq!(taken, 14);
        assert_eq!(
            scanner.listener().scans(),
            vec![("4006381333931".to_string(), 1)]
        );
    }

    #[test]
    fn disabled_scanner_discards_events() {
        let t0 = Instant::now();
        let mut scanner = scanner();
        scanner.attach(burst("4006381333931", t0)).expect("attach");
        scanner.disable();

        scanner.pump(t0).expect("pump");
        assert!(scanner.listener().events.is_empty());
        assert_eq!(
            scanner.dispatch(&char_press('A', t0).into()),
            EventDisposition::PASS
        );
    }

    #[test]
    fn disable_cancels_partial_scan() {
        let t0 = Instant::now();
        let mut scanner = scanner();
        scanner.attach(VecDeque::new()).expect("attach");

        scanner.dispatch(&char_press('A', t0).into());
        scanner.disable();
        scanner.enable();
        scanner.check_timers(t0 + Duration::from_secs(1));

        assert!(scanner.detector().is_idle());
        assert!(scanner.listener().errors().is_empty());
    }

    #[test]
    fn detach_tears_down_and_returns_source() {
        let t0 = Instant::now();
        let mut scanner = scanner();
        scanner.attach(VecDeque::new()).expect("attach");
        scanner.dispatch(&char_press('A', t0).into());

        let source = scanner.detach();

        assert!(source.is_some());
        assert!(!scanner.is_attached());
        assert!(!scanner.is_active());
        assert_eq!(scanner.next_deadline(), None);
    }

    #[test]
    fn detached_scanner_stays_inert_after_enable() {
        let t0 = Instant::now();
        let mut scanner = scanner();
        scanner.attach(VecDeque::new()).expect("attach");
        scanner.detach();

        scanner.enable();
        let disposition = scanner.dispatch(&char_press('A', t0).into());

        assert_eq!(disposition, EventDisposition::PASS);
        assert!(!scanner.is_active());
        assert_eq!(scanner.next_deadline(), None);
        assert_eq!(scanner.check_timers(t0 + Duration::from_secs(1)), 0);
        assert!(scanner.listener().events.is_empty());
    }

    #[test]
    fn never_attached_scanner_ignores_input() {
        let t0 = Instant::now();
        let mut scanner = scanner();

        scanner.enable();
        assert_eq!(
            scanner.dispatch(&char_press('A', t0).into()),
            EventDisposition::PASS
        );
        assert!(scanner.detector().is_idle());
    }

    #[test]
    fn reset_reattaches_and_enables() {
        let t0 = Instant::now();
        let mut scanner = scanner();
        scanner.attach(VecDeque::new()).expect("attach");
        scanner.dispatch(&char_press('A', t0).into());
        scanner.disable();

        scanner.reset().expect("reset");

        assert!(scanner.is_attached());
        assert!(scanner.is_active());
        assert!(scanner.detector().is_idle());
    }

    #[test]
    fn reset_without_source_fails() {
        let mut scanner = scanner();
        assert!(matches!(scanner.reset(), Err(ScannerError::NotAttached)));
    }

    #[test]
    fn disconnected_channel_is_reported_after_draining() {
        let t0 = Instant::now();
        let (tx, rx) = mpsc::channel();
        for event in burst("4006381333931", t0) {
            tx.send(event).expect("send");
        }
        drop(tx);

        let mut scanner =
            Scanner::new(ScannerConfig::default(), RecordingListener::default()).expect("config");
        scanner.attach(rx).expect("attach");

        let result = scanner.pump(t0 + Duration::from_millis(100));

        assert!(matches!(result, Err(ScannerError::SourceDisconnected)));
        assert_eq!(scanner.listener().scans().len(), 1);
    }
}
