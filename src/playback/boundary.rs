//! Boundary crossing detection.
//!
//! Classifies a single position sample against a loop window. The detector
//! is pure: the caller owns the debounce flag and feeds it back on every
//! call, which keeps the detector trivially testable with synthetic sample
//! sequences.
//!
//! ```text
//!   start                     end - margin     end
//!     |--------------------------|-------------|------>
//!     ^ reset debounce here      ^ dead band   ^ crossing counted here
//! ```

use crate::config::DEFAULT_HYSTERESIS_MARGIN;
use serde::{Deserialize, Serialize};

/// A loop window `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the window in seconds.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// Result of classifying one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    /// A new pass reached the window end.
    pub crossed: bool,
    /// The position is back far enough below the end to re-arm detection.
    pub should_reset_debounce: bool,
}

/// Decides when a position sample completes a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryDetector {
    hysteresis_margin: f64,
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::new(DEFAULT_HYSTERESIS_MARGIN)
    }
}

impl BoundaryDetector {
    #[must_use]
    pub fn new(hysteresis_margin: f64) -> Self {
        Self { hysteresis_margin }
    }

    #[must_use]
    pub fn hysteresis_margin(&self) -> f64 {
        self.hysteresis_margin
    }

    /// Margin applied to `window`.
    ///
    /// Capped at half the window span so a window shorter than the margin
    /// can still re-arm after a seek back to its start.
    #[must_use]
    pub fn effective_margin(&self, window: Window) -> f64 {
        self.hysteresis_margin.min(window.span() / 2.0)
    }

    /// Classify `position` against `window`.
    ///
    /// `already_crossed` is the caller's debounce flag for the current pass.
    ///
    /// # Example
    ///
    /// ```
    /// use reprise::playback::boundary::{BoundaryDetector, Window};
    ///
    /// let detector = BoundaryDetector::new(1.0);
    /// let window = Window::new(0.0, 10.0);
    ///
    /// assert!(detector.classify(10.2, window, false).crossed);
    /// assert!(!detector.classify(10.3, window, true).crossed);
    /// assert!(detector.classify(7.0, window, true).should_reset_debounce);
    /// ```
    #[must_use]
    pub fn classify(&self, position: f64, window: Window, already_crossed: bool) -> Classification {
        Classification {
            crossed: position >= window.end && !already_crossed,
            should_reset_debounce: position < window.end - self.effective_margin(window),
        }
    }

    /// Replay a sample sequence and count the passes it completes.
    ///
    /// Applies the same debounce bookkeeping as the controller: a counted
    /// crossing sets the flag, a reset clears it.
    #[must_use]
    pub fn count_crossings(&self, samples: &[f64], window: Window) -> u32 {
        let mut crossed = false;
        let mut count = 0;
        for &position in samples {
            let result = self.classify(position, window, crossed);
            if result.crossed {
                count += 1;
                crossed = true;
            }
            if result.should_reset_debounce {
                crossed = false;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Window {
        Window::new(0.0, 10.0)
    }

    #[test]
    fn test_crossing_requires_reaching_end() {
        let detector = BoundaryDetector::default();
        assert!(!detector.classify(9.99, window(), false).crossed);
        assert!(detector.classify(10.0, window(), false).crossed);
        assert!(detector.classify(42.0, window(), false).crossed);
    }

    #[test]
    fn test_already_crossed_suppresses_count() {
        let detector = BoundaryDetector::default();
        let result = detector.classify(10.5, window(), true);
        assert!(!result.crossed);
        assert!(!result.should_reset_debounce);
    }

    #[test]
    fn test_dead_band_neither_counts_nor_resets() {
        let detector = BoundaryDetector::new(1.0);
        let result = detector.classify(9.5, window(), true);
        assert_eq!(result, Classification::default());

        // Exactly end - margin is still inside the dead band.
        let edge = detector.classify(9.0, window(), true);
        assert!(!edge.should_reset_debounce);
    }

    #[test]
    fn test_reset_below_margin() {
        let detector = BoundaryDetector::new(1.0);
        assert!(detector.classify(8.9, window(), true).should_reset_debounce);
        assert!(detector.classify(0.0, window(), true).should_reset_debounce);
    }

    #[test]
    fn test_jittery_sequence_counts_each_pass_once() {
        let detector = BoundaryDetector::new(1.0);
        let samples = [9.8, 10.2, 10.3, 10.1, 7.0, 10.5];
        assert_eq!(detector.count_crossings(&samples, window()), 2);
    }

    #[test]
    fn test_oscillation_around_end_counts_once() {
        let detector = BoundaryDetector::new(1.0);
        let samples = [9.7, 10.0, 9.95, 10.05, 9.9, 10.1, 9.2, 10.0];
        assert_eq!(detector.count_crossings(&samples, window()), 1);
    }

    #[test]
    fn test_zero_margin_re_arms_just_below_end() {
        let detector = BoundaryDetector::new(0.0);
        let samples = [10.0, 9.99, 10.0];
        assert_eq!(detector.count_crossings(&samples, window()), 2);
    }

    #[test]
    fn test_short_window_caps_margin() {
        let detector = BoundaryDetector::new(1.0);
        let short = Window::new(5.0, 5.5);
        assert_eq!(detector.effective_margin(short), 0.25);
        assert_eq!(detector.effective_margin(window()), 1.0);

        // Seeking back to the start re-arms even though start > end - 1.0.
        let samples = [5.5, 5.0, 5.6];
        assert_eq!(detector.count_crossings(&samples, short), 2);
    }

    #[test]
    fn test_window_span() {
        assert_eq!(Window::new(2.0, 12.5).span(), 10.5);
    }
}
