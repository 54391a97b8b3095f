//! The scan detection state machine

use super::listener::{KeyVerdict, ScanListener};
use super::long_press::LongPressTracker;
use super::timer::OneShotTimer;
use super::validator::{ScanValidator, ScanVerdict};
use crate::config::ScannerConfig;
use crate::keyboard::{InputEvent, KeyDecoder, KeyEvent, KeyEventType, PasteEvent};
use log::{debug, trace};
use std::time::Instant;

/// What the event source should do with an event after the detector saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventDisposition {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventDisposition {
    /// Leave the event alone
    pub const PASS: Self = Self {
        prevent_default: false,
        stop_propagation: false,
    };

    /// Swallow the event completely
    pub const SUPPRESS: Self = Self {
        prevent_default: true,
        stop_propagation: true,
    };

    pub fn is_suppressed(&self) -> bool {
        self.prevent_default || self.stop_propagation
    }
}

/// Characters collected since the detector was last idle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Session {
    #[default]
    Idle,
    Accumulating {
        text: String,
        first_char_at: Instant,
        last_char_at: Instant,
    },
}

impl Session {
    fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }

    fn push(&mut self, c: char, at: Instant) {
        match self {
            Session::Idle => {
                *self = Session::Accumulating {
                    text: c.to_string(),
                    first_char_at: at,
                    last_char_at: at,
                };
            }
            Session::Accumulating {
                text, last_char_at, ..
            } => {
                text.push(c);
                *last_char_at = (*last_char_at).max(at);
            }
        }
    }

    /// Record activity that adds no character (a terminator)
    fn touch(&mut self, at: Instant) {
        if let Session::Accumulating { last_char_at, .. } = self {
            *last_char_at = (*last_char_at).max(at);
        }
    }
}

/// Classifies keyboard and paste input into scans.
///
/// Keys arrive one at a time; the detector collects decoded characters into a
/// session and closes it on a terminator key, on a paste, or when no key has
/// arrived for the quiet period. Closed sessions are validated on length and
/// typing speed and reported to the listener.
///
/// Timers are deadlines. They fire when an event arrives after the deadline or
/// when the host calls [`ScanDetector::check_timers`]; hosts with no further
/// input should call it at [`ScanDetector::next_deadline`].
pub struct ScanDetector<L> {
    config: ScannerConfig,
    decoder: KeyDecoder,
    validator: ScanValidator,
    listener: L,
    session: Session,
    quiet_timer: OneShotTimer,
    long_press: LongPressTracker,
}

impl<L: ScanListener> ScanDetector<L> {
    pub fn new(config: ScannerConfig, listener: L) -> Self {
        Self {
            decoder: KeyDecoder::new(),
            validator: ScanValidator::from_config(&config),
            long_press: LongPressTracker::new(config.long_press_threshold()),
            config,
            listener,
            session: Session::Idle,
            quiet_timer: OneShotTimer::new(),
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> EventDisposition {
        match event {
            InputEvent::Key(key) => match key.event_type {
                KeyEventType::Press => self.handle_key_down(key),
                KeyEventType::Release => self.handle_key_up(key),
            },
            InputEvent::Paste(paste) => self.handle_paste(paste),
        }
    }

    pub fn handle_key_down(&mut self, event: &KeyEvent) -> EventDisposition {
        let now = event.timestamp;
        self.check_timers(now);

        if self.listener.on_raw_key(event.code, event) == KeyVerdict::Stop {
            trace!("{} vetoed by listener", event.code);
            return EventDisposition::PASS;
        }

        if self.config.is_scan_button(event.code) {
            if self.long_press.key_down(now) {
                debug!("scan button down");
            }
            return EventDisposition::PASS;
        }

        if !self.config.react_to_keydown {
            return EventDisposition::PASS;
        }

        if !self.session.is_idle() && self.config.is_terminator(event.code) {
            trace!("terminator {}", event.code);
            self.session.touch(now);
            self.finalize();
            return EventDisposition::SUPPRESS;
        }

        if self.session.is_idle() && self.config.is_prefix(event.code) {
            trace!("prefix {} consumed", event.code);
            self.quiet_timer.arm(now, self.config.quiet_period());
            return EventDisposition::SUPPRESS;
        }

        let Some(c) = self.decoder.decode(event) else {
            return EventDisposition::PASS;
        };

        if self.session.is_idle() {
            debug!("session started");
        }
        trace!("accepted {:?} from {}", c, event.code);
        self.session.push(c, now);
        self.quiet_timer.arm(now, self.config.quiet_period());
        self.listener.on_character_processed(c, event);

        EventDisposition {
            prevent_default: self.config.prevent_default,
            stop_propagation: self.config.stop_propagation,
        }
    }

    pub fn handle_key_up(&mut self, event: &KeyEvent) -> EventDisposition {
        self.check_timers(event.timestamp);

        if self.config.is_scan_button(event.code) {
            debug!("scan button up");
            self.long_press.key_up();
        }
        EventDisposition::PASS
    }

    pub fn handle_paste(&mut self, event: &PasteEvent) -> EventDisposition {
        self.check_timers(event.timestamp);

        if !self.config.react_to_paste {
            return EventDisposition::PASS;
        }

        if !self.session.is_idle() {
            debug!("paste replaces partial session");
        }
        self.session = Session::Idle;
        self.quiet_timer.cancel_pending();

        debug!("paste of {} chars", event.text.chars().count());
        let verdict = self.validator.validate(event.text.clone(), None, None);
        self.deliver(verdict);

        EventDisposition {
            prevent_default: true,
            stop_propagation: self.config.stop_propagation,
        }
    }

    /// Fire every timer whose deadline is at or before `now`.
    ///
    /// Returns the number of timers fired.
    pub fn check_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0;

        if self.quiet_timer.fire_if_due(now).is_some() {
            fired += 1;
            if !self.session.is_idle() {
                debug!("quiet period elapsed");
                self.finalize();
            }
        }

        if self.long_press.check(now) {
            fired += 1;
            debug!("long press");
            self.listener.on_long_press();
        }

        fired
    }

    /// Earliest pending deadline, if any timer is armed
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.quiet_timer.deadline(), self.long_press.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drop the current session without reporting it
    pub fn clear(&mut self) {
        if !self.session.is_idle() {
            debug!("session cleared");
        }
        self.session = Session::Idle;
        self.quiet_timer.cancel_pending();
    }

    /// Cancel every timer and forget all in-flight state
    pub fn cancel_timers(&mut self) {
        self.clear();
        self.long_press.cancel();
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_idle()
    }

    /// Characters collected so far, empty when idle
    pub fn accumulated_text(&self) -> &str {
        match &self.session {
            Session::Idle => "",
            Session::Accumulating { text, .. } => text,
        }
    }

    pub fn first_char_at(&self) -> Option<Instant> {
        match self.session {
            Session::Idle => None,
            Session::Accumulating { first_char_at, .. } => Some(first_char_at),
        }
    }

    pub fn last_char_at(&self) -> Option<Instant> {
        match self.session {
            Session::Idle => None,
            Session::Accumulating { last_char_at, .. } => Some(last_char_at),
        }
    }

    pub fn has_pending_validation(&self) -> bool {
        self.quiet_timer.is_pending()
    }

    pub fn is_button_held(&self) -> bool {
        self.long_press.is_holding()
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }

    /// Validate and report the current session, leaving the detector idle
    fn finalize(&mut self) {
        self.quiet_timer.cancel_pending();
        let Session::Accumulating {
            text,
            first_char_at,
            last_char_at,
        } = std::mem::take(&mut self.session)
        else {
            return;
        };

        let verdict = self
            .validator
            .validate(text, Some(first_char_at), Some(last_char_at));
        self.deliver(verdict);
    }

    fn deliver(&mut self, verdict: ScanVerdict) {
        match verdict {
            ScanVerdict::Valid(scan) => {
                debug!(
                    "scan {:?} x{} in {:?}",
                    scan.text, scan.quantity, scan.duration
                );
                self.listener.on_scan_success(&scan);
            }
            ScanVerdict::Invalid { reason, details } => {
                debug!(
                    "rejected {:?}: {} ({} chars in {:?})",
                    details.candidate,
                    reason,
                    details.length(),
                    details.duration
                );
                self.listener.on_scan_error(reason, &details);
            }
        }
    }
}
