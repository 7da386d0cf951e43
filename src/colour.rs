use serde::{Deserialize, Serialize};

/// RGBA colour with unclamped f32 channels. Asset registers normally hold
/// values in 0.0 to 1.0 but animation tracks may step outside that range,
/// so nothing here enforces an upper bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const WHITE: Self = Self::new(1.0f32, 1.0f32, 1.0f32, 1.0f32);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the colour with each channel floored at zero. There is no
    /// upper clamp.
    #[must_use]
    pub fn clamp_negative(self) -> Self {
        Self {
            r: self.r.max(0.0f32),
            g: self.g.max(0.0f32),
            b: self.b.max(0.0f32),
            a: self.a.max(0.0f32),
        }
    }
}

impl From<[f32; 4]> for Colour {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Colour> for [f32; 4] {
    fn from(c: Colour) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// Colour register kinds addressable by colour animation tracks and
/// instance overrides. The set and its order are fixed by the model format:
/// two material colours, two ambient colours, four konstant colours, then
/// the four TEV registers with the accumulator first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum ColourKind {
    Mat0,
    Mat1,
    Amb0,
    Amb1,
    K0,
    K1,
    K2,
    K3,
    Cprev,
    C0,
    C1,
    C2,
}

impl ColourKind {
    pub const COUNT: usize = 12;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Mat0,
        Self::Mat1,
        Self::Amb0,
        Self::Amb1,
        Self::K0,
        Self::K1,
        Self::K2,
        Self::K3,
        Self::Cprev,
        Self::C0,
        Self::C1,
        Self::C2,
    ];

    /// Position of this kind in per material storage, matching the order of
    /// `ALL`
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for the kinds that floor their static and override values at
    /// zero. Konstant colours do, every other kind passes static values
    /// through unchanged. Animated values are floored for all kinds.
    #[must_use]
    pub const fn clamped(self) -> bool {
        matches!(self, Self::K0 | Self::K1 | Self::K2 | Self::K3)
    }
}
