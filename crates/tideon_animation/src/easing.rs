//! Easing functions for animations
//!
//! Every curve maps normalized progress `t` in `[0, 1]` to eased progress.
//! Back and elastic curves overshoot `[0, 1]` on purpose.

use std::f32::consts::PI;
use std::str::FromStr;

use thiserror::Error;

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const BOUNCE_N1: f32 = 7.5625;
const BOUNCE_D1: f32 = 2.75;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseOutElastic,
    Drag,
    Bounce,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
}

/// Returned by [`Easing::from_str`] for names outside the library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown easing: {0}")]
pub struct UnknownEasing(pub String);

impl Easing {
    /// Every easing in the library
    pub const ALL: [Easing; 19] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInExpo,
        Easing::EaseOutExpo,
        Easing::EaseInOutExpo,
        Easing::EaseInBack,
        Easing::EaseOutBack,
        Easing::EaseInOutBack,
        Easing::EaseOutElastic,
        Easing::Drag,
        Easing::Bounce,
        Easing::EaseInBounce,
        Easing::EaseOutBounce,
        Easing::EaseInOutBounce,
    ];

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => (t - 1.0).powi(3) + 1.0,
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    (t - 1.0) * (2.0 * t - 2.0).powi(2) + 1.0
                }
            }
            // 0^negative is avoided by pinning the endpoints
            Easing::EaseInExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0))
                }
            }
            Easing::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::EaseInOutExpo => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * 2f32.powf(10.0 * (t - 1.0))
                } else {
                    0.5 * (2.0 - 2f32.powf(-10.0 * (t - 1.0)))
                }
            }
            Easing::EaseInBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Easing::EaseOutBack => {
                1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }
            Easing::EaseInOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2)
                        + 2.0)
                        / 2.0
                }
            }
            Easing::EaseOutElastic => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
                }
            }
            Easing::Drag => 1.0 - (1.0 - t).powi(3),
            Easing::Bounce | Easing::EaseOutBounce => bounce_out(t),
            Easing::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Easing::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) * 0.5
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) * 0.5
                }
            }
        }
    }

    /// Look up an easing by name, falling back to [`Easing::Linear`]
    pub fn by_name(name: &str) -> Easing {
        name.parse().unwrap_or_else(|_| {
            tracing::debug!(easing = name, "Unknown easing, using linear");
            Easing::Linear
        })
    }

    /// Canonical name of this easing
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "easeIn",
            Easing::EaseOut => "easeOut",
            Easing::EaseInOut => "easeInOut",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInExpo => "easeInExpo",
            Easing::EaseOutExpo => "easeOutExpo",
            Easing::EaseInOutExpo => "easeInOutExpo",
            Easing::EaseInBack => "easeInBack",
            Easing::EaseOutBack => "easeOutBack",
            Easing::EaseInOutBack => "easeInOutBack",
            Easing::EaseOutElastic => "easeOutElastic",
            Easing::Drag => "drag",
            Easing::Bounce => "bounce",
            Easing::EaseInBounce => "easeInBounce",
            Easing::EaseOutBounce => "easeOutBounce",
            Easing::EaseInOutBounce => "easeInOutBounce",
        }
    }
}

impl FromStr for Easing {
    type Err = UnknownEasing;

    /// Accepts the canonical camelCase names and their snake_case spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Easing::ALL
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(&folded))
            .ok_or_else(|| UnknownEasing(s.to_string()))
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Four-segment bounce, the base the other bounce curves reflect
fn bounce_out(t: f32) -> f32 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}
