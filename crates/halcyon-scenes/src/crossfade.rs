//! The crossfade state machine.
//!
//! Scene transitions are pure opacity: fade the outgoing scene to zero,
//! swap, fade the incoming scene to one. This type tracks only the fade
//! value and phase; the orchestrator reacts to [`FadeEvent::FadedOut`] by
//! dropping the old scene and creating the new one.

/// Seconds to fade the outgoing scene to zero.
pub const FADE_OUT_SECS: f32 = 0.4;

/// Seconds to fade the incoming scene to one.
pub const FADE_IN_SECS: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadePhase {
    /// No scene visible; the gradient alone is showing.
    Hidden,
    FadingIn,
    Shown,
    FadingOut,
}

/// What `advance` observed this step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeEvent {
    None,
    /// The fade-out just completed; the old scene can be dropped now.
    FadedOut,
}

/// Linear opacity ramp between hidden and shown.
pub struct Crossfade {
    out_secs: f32,
    in_secs: f32,
    phase: FadePhase,
    fade: f32,
}

impl Crossfade {
    /// Starts hidden. Non-positive durations are treated as instant.
    pub fn new(out_secs: f32, in_secs: f32) -> Self {
        Self {
            out_secs: out_secs.max(0.0),
            in_secs: in_secs.max(0.0),
            phase: FadePhase::Hidden,
            fade: 0.0,
        }
    }

    pub fn fade(&self) -> f32 {
        self.fade
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }

    pub fn is_hidden(&self) -> bool {
        self.phase == FadePhase::Hidden
    }

    /// Begin fading in from the current opacity. Reversing an in-flight
    /// fade-out picks up where the opacity is, no jump.
    pub fn show(&mut self) {
        if self.phase != FadePhase::Shown {
            self.phase = FadePhase::FadingIn;
        }
    }

    /// Begin fading out from the current opacity.
    pub fn hide(&mut self) {
        match self.phase {
            FadePhase::Hidden => {}
            _ => self.phase = FadePhase::FadingOut,
        }
    }

    /// Advance by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> FadeEvent {
        let dt = dt.max(0.0);
        match self.phase {
            FadePhase::Hidden | FadePhase::Shown => FadeEvent::None,
            FadePhase::FadingIn => {
                self.fade = if self.in_secs > 0.0 {
                    (self.fade + dt / self.in_secs).min(1.0)
                } else {
                    1.0
                };
                if self.fade >= 1.0 {
                    self.phase = FadePhase::Shown;
                }
                FadeEvent::None
            }
            FadePhase::FadingOut => {
                self.fade = if self.out_secs > 0.0 {
                    (self.fade - dt / self.out_secs).max(0.0)
                } else {
                    0.0
                };
                if self.fade <= 0.0 {
                    self.phase = FadePhase::Hidden;
                    FadeEvent::FadedOut
                } else {
                    FadeEvent::None
                }
            }
        }
    }
}

impl Default for Crossfade {
    fn default() -> Self {
        Self::new(FADE_OUT_SECS, FADE_IN_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn run_until_event(fade: &mut Crossfade, max_steps: u32) -> (u32, FadeEvent) {
        for step in 1..=max_steps {
            let event = fade.advance(DT);
            if event != FadeEvent::None {
                return (step, event);
            }
        }
        (max_steps, FadeEvent::None)
    }

    #[test]
    fn test_fade_out_takes_four_tenths_of_a_second() {
        let mut fade = Crossfade::default();
        fade.show();
        while fade.phase() != FadePhase::Shown {
            fade.advance(DT);
        }

        fade.hide();
        let (steps, event) = run_until_event(&mut fade, 600);
        assert_eq!(event, FadeEvent::FadedOut);
        let elapsed = steps as f32 * DT;
        assert!(
            (elapsed - FADE_OUT_SECS).abs() <= DT,
            "fade out took {elapsed}s"
        );
    }

    #[test]
    fn test_fade_in_takes_half_a_second() {
        let mut fade = Crossfade::default();
        fade.show();
        let mut steps = 0;
        while fade.phase() != FadePhase::Shown {
            fade.advance(DT);
            steps += 1;
            assert!(steps < 600, "fade in never completed");
        }
        let elapsed = steps as f32 * DT;
        assert!(
            (elapsed - FADE_IN_SECS).abs() <= DT,
            "fade in took {elapsed}s"
        );
    }

    #[test]
    fn test_fade_stays_in_unit_range() {
        let mut fade = Crossfade::default();
        fade.show();
        for _ in 0..100 {
            fade.advance(DT);
            assert!((0.0..=1.0).contains(&fade.fade()));
        }
        fade.hide();
        for _ in 0..100 {
            fade.advance(DT);
            assert!((0.0..=1.0).contains(&fade.fade()));
        }
    }

    #[test]
    fn test_reversing_midway_keeps_opacity_continuous() {
        let mut fade = Crossfade::default();
        fade.show();
        for _ in 0..10 {
            fade.advance(DT);
        }
        let before = fade.fade();
        assert!(before > 0.0 && before < 1.0);

        // Reverse direction; opacity must continue from where it was.
        fade.hide();
        assert_eq!(fade.fade(), before);
        fade.advance(DT);
        assert!(fade.fade() < before);
    }

    #[test]
    fn test_hide_while_hidden_is_a_no_op() {
        let mut fade = Crossfade::default();
        fade.hide();
        assert_eq!(fade.phase(), FadePhase::Hidden);
        assert_eq!(fade.advance(DT), FadeEvent::None);
    }

    #[test]
    fn test_faded_out_fires_exactly_once() {
        let mut fade = Crossfade::default();
        fade.show();
        while fade.phase() != FadePhase::Shown {
            fade.advance(DT);
        }
        fade.hide();
        let (_, event) = run_until_event(&mut fade, 600);
        assert_eq!(event, FadeEvent::FadedOut);
        for _ in 0..10 {
            assert_eq!(fade.advance(DT), FadeEvent::None);
        }
    }

    #[test]
    fn test_zero_durations_are_instant() {
        let mut fade = Crossfade::new(0.0, 0.0);
        fade.show();
        fade.advance(DT);
        assert_eq!(fade.phase(), FadePhase::Shown);
        fade.hide();
        assert_eq!(fade.advance(DT), FadeEvent::FadedOut);
    }
}
