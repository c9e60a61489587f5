//! Dot pulse animation.
//!
//! Each prong owns a [`ProngSweep`] that walks its dots one at a time: grow, hold, then hand over
//! to the next dot while the previous one shrinks back on its own. Time left over when a stage
//! ends is carried into the next stage within the same tick, so the sweep runs at the same rate
//! regardless of frame time.

use crate::settings::SweepOrder;

/// Shortest duration any stage may have, in seconds.
pub const MIN_STAGE: f32 = 1e-3;
/// Stage transitions processed per prong per tick before leftover time is dropped.
const MAX_TRANSITIONS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotStyle {
    pub scale: f32,
    pub alpha: f32,
}

impl DotStyle {
    fn lerp(self, other: DotStyle, t: f32) -> DotStyle {
        DotStyle {
            scale: self.scale + (other.scale - self.scale) * t,
            alpha: self.alpha + (other.alpha - self.alpha) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotPhase {
    Resting,
    Growing,
    Peak,
    Shrinking,
}

/// Scale and alpha of one dot, moving linearly between styles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotPulse {
    current: DotStyle,
    from: DotStyle,
    to: DotStyle,
    elapsed: f32,
    duration: f32,
    phase: DotPhase,
}

impl DotPulse {
    pub fn at_rest(rest: DotStyle) -> Self {
        DotPulse {
            current: rest,
            from: rest,
            to: rest,
            elapsed: 0.0,
            duration: MIN_STAGE,
            phase: DotPhase::Resting,
        }
    }

    pub fn style(&self) -> DotStyle {
        self.current
    }

    pub fn phase(&self) -> DotPhase {
        self.phase
    }

    pub fn grow(&mut self, peak: DotStyle, duration: f32) {
        self.start(DotPhase::Growing, peak, duration);
    }

    pub fn shrink(&mut self, rest: DotStyle, duration: f32) {
        self.start(DotPhase::Shrinking, rest, duration);
    }

    /// Starts a new animation from wherever the dot currently is, replacing any running one.
    fn start(&mut self, phase: DotPhase, to: DotStyle, duration: f32) {
        self.from = self.current;
        self.to = to;
        self.elapsed = 0.0;
        self.duration = duration.max(MIN_STAGE);
        self.phase = phase;
    }

    pub fn advance(&mut self, dt: f32) {
        let settled = match self.phase {
            DotPhase::Growing => DotPhase::Peak,
            DotPhase::Shrinking => DotPhase::Resting,
            DotPhase::Resting | DotPhase::Peak => return,
        };
        self.elapsed += dt;
        let t = (self.elapsed / self.duration).min(1.0);
        self.current = self.from.lerp(self.to, t);
        if t >= 1.0 {
            self.current = self.to;
            self.phase = settled;
        }
    }
}

impl SweepOrder {
    /// Index of the dot pulsed at `step` of a sweep over `count` dots.
    pub fn dot_index(self, step: usize, count: usize) -> usize {
        match self {
            SweepOrder::Outward => step,
            SweepOrder::Inward => count - 1 - step,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    /// The dot at `step` has not started growing yet.
    Start,
    Growing { remaining: f32, speed: f32 },
    Waiting { remaining: f32 },
}

/// Walks the dots of one prong, one pulse at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProngSweep {
    step: usize,
    stage: Stage,
}

impl Default for ProngSweep {
    fn default() -> Self {
        ProngSweep {
            step: 0,
            stage: Stage::Start,
        }
    }
}

impl ProngSweep {
    /// Position of the current dot in the sweep, before applying the sweep order.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Advances the sweep and every dot of the prong by `dt` seconds.
    ///
    /// `speed` is asked for the pulse duration whenever a dot starts growing or shrinking.
    pub fn advance(
        &mut self,
        dt: f32,
        dots: &mut [DotPulse],
        order: SweepOrder,
        rest: DotStyle,
        peak: DotStyle,
        mut speed: impl FnMut() -> f32,
    ) {
        let count = dots.len();
        if count == 0 {
            return;
        }
        self.step %= count;

        // Dots are brought up to each transition before it is applied, so an animation started
        // mid-tick only runs for the part of the tick that follows it.
        let mut synced = 0.0;
        let mut sync_to = |dots: &mut [DotPulse], offset: f32| {
            let delta = offset - synced;
            if delta > 0.0 {
                dots.iter_mut().for_each(|dot| dot.advance(delta));
                synced = offset;
            }
        };

        let mut budget = dt.max(0.0);
        for _ in 0..MAX_TRANSITIONS {
            match self.stage {
                Stage::Start => {
                    sync_to(dots, dt - budget);
                    let speed = speed().max(MIN_STAGE);
                    let grow = (speed / 2.0).max(MIN_STAGE);
                    dots[order.dot_index(self.step, count)].grow(peak, grow);
                    self.stage = Stage::Growing {
                        remaining: grow,
                        speed,
                    };
                }
                Stage::Growing { remaining, speed } => {
                    if budget < remaining {
                        self.stage = Stage::Growing {
                            remaining: remaining - budget,
                            speed,
                        };
                        break;
                    }
                    budget -= remaining;
                    self.stage = Stage::Waiting { remaining: speed };
                }
                Stage::Waiting { remaining } => {
                    if budget < remaining {
                        self.stage = Stage::Waiting {
                            remaining: remaining - budget,
                        };
                        break;
                    }
                    budget -= remaining;
                    sync_to(dots, dt - budget);
                    let shrink = (speed().max(MIN_STAGE) / 2.0).max(MIN_STAGE);
                    dots[order.dot_index(self.step, count)].shrink(rest, shrink);
                    self.step = (self.step + 1) % count;
                    self.stage = Stage::Start;
                }
            }
        }
        sync_to(dots, dt.max(0.0));
    }
}
