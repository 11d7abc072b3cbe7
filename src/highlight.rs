use std::time::Duration;

use egui::Color32;
use log::debug;

use crate::config::CanvasConfig;

/// A scheduled step of the highlight fade-out.
///
/// Ticks carry the generation they were scheduled for; restarting the
/// highlight starts a new generation, which turns older ticks into no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeTick {
    pub generation: u64,
    /// Host clock time at which the tick should fire
    pub due: Duration,
}

/// Dashed outline shown around the background while an item is dragged
/// past its edges, fading out once the drag stops violating the bounds.
#[derive(Debug, Clone, Default)]
pub struct BoundaryHighlight {
    visible: bool,
    alpha: u8,
    generation: u64,
    pending: Option<FadeTick>,
}

impl BoundaryHighlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The next fade step the host should fire, if any
    pub fn pending(&self) -> Option<FadeTick> {
        self.pending
    }

    /// Outline color at the current alpha
    pub fn color(&self) -> Color32 {
        Color32::from_rgba_unmultiplied(255, 0, 0, self.alpha)
    }

    /// Show the highlight at full alpha and schedule the first fade step,
    /// superseding any fade already in flight
    pub fn trigger(&mut self, now: Duration, config: &CanvasConfig) -> FadeTick {
        self.generation += 1;
        self.visible = true;
        self.alpha = config.highlight_alpha;
        let tick = FadeTick {
            generation: self.generation,
            due: now + Duration::from_millis(config.fade_delay_ms),
        };
        self.pending = Some(tick);
        tick
    }

    /// Apply a fade step. Returns whether anything changed; ticks from an
    /// older generation are ignored.
    pub fn fire(&mut self, tick: FadeTick, config: &CanvasConfig) -> bool {
        if tick.generation != self.generation || !self.visible {
            debug!(
                "Ignoring stale fade tick (generation {}, current {})",
                tick.generation, self.generation
            );
            return false;
        }

        self.alpha = self.alpha.saturating_sub(config.fade_step);
        if self.alpha == 0 {
            self.visible = false;
            self.pending = None;
            debug!("Boundary highlight faded out");
        } else {
            self.pending = Some(FadeTick {
                generation: self.generation,
                due: tick.due + Duration::from_millis(config.fade_interval_ms),
            });
        }
        true
    }

    /// Hide immediately and invalidate outstanding ticks
    pub fn hide(&mut self) {
        self.generation += 1;
        self.visible = false;
        self.alpha = 0;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_schedules_delayed_fade() {
        let config = CanvasConfig::default();
        let mut highlight = BoundaryHighlight::new();
        let tick = highlight.trigger(Duration::from_millis(1000), &config);
        assert!(highlight.is_visible());
        assert_eq!(highlight.alpha(), 180);
        assert_eq!(tick.due, Duration::from_millis(1500));
        assert_eq!(highlight.pending(), Some(tick));
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let config = CanvasConfig::default();
        let mut highlight = BoundaryHighlight::new();
        let old = highlight.trigger(Duration::ZERO, &config);
        highlight.trigger(Duration::from_millis(100), &config);
        assert!(!highlight.fire(old, &config));
        assert_eq!(highlight.alpha(), 180);
    }

    #[test]
    fn test_fades_to_hidden() {
        let config = CanvasConfig::default();
        let mut highlight = BoundaryHighlight::new();
        highlight.trigger(Duration::ZERO, &config);
        let mut steps = 0;
        while let Some(tick) = highlight.pending() {
            assert!(highlight.fire(tick, &config));
            steps += 1;
        }
        // 180 / 5
        assert_eq!(steps, 36);
        assert!(!highlight.is_visible());
        assert_eq!(highlight.alpha(), 0);
    }
}
