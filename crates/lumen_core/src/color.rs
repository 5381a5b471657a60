//! Spectral colour values and the conversion to display RGB.
//!
//! The integrator only ever uses [`Color`], a fixed three band spectrum.
//! [`Spectrum`] is generic over the band count so sampled spectra can be
//! converted with a colour-matching table.

use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign};

use lumen_math::Interval;

/// Lower bound of the visible range covered by the matching table (nm).
pub const LAMBDA_LOW: f64 = 392.0;

/// Upper bound of the visible range covered by the matching table (nm).
pub const LAMBDA_HIGH: f64 = 689.0;

/// Colour-matching samples: (wavelength nm, r, g, b).
const MATCHING: [(f64, f64, f64, f64); 12] = [
    (392.0, 0.0022, -0.0006, 0.0090),
    (408.0, 0.0290, -0.0095, 0.1440),
    (425.0, 0.0760, -0.0340, 0.6300),
    (444.0, 0.0000, 0.0000, 1.0000),
    (465.0, -0.2250, 0.1630, 0.7400),
    (487.0, -0.4230, 0.4410, 0.2160),
    (512.0, -0.3220, 0.8370, 0.0278),
    (540.0, 0.5610, 1.0540, -0.0082),
    (571.0, 2.2400, 0.7590, -0.0078),
    (606.0, 3.0800, 0.1790, -0.0026),
    (645.0, 1.0000, 0.0000, 0.0000),
    (689.0, 0.0601, -0.0005, 0.0000),
];

/// Fixed-size intensity vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spectrum<const N: usize> {
    intensities: [f64; N],
}

/// The three band spectrum used by the renderer.
pub type Color = Spectrum<3>;

impl<const N: usize> Spectrum<N> {
    /// All bands zero.
    pub const BLACK: Self = Self { intensities: [0.0; N] };

    /// All bands one.
    pub const WHITE: Self = Self { intensities: [1.0; N] };

    /// Create a spectrum from its band intensities.
    pub const fn from_intensities(intensities: [f64; N]) -> Self {
        Self { intensities }
    }

    /// Every band set to `c`.
    pub const fn splat(c: f64) -> Self {
        Self { intensities: [c; N] }
    }

    /// Band intensities.
    pub fn intensities(&self) -> &[f64; N] {
        &self.intensities
    }

    /// Mean intensity over all bands.
    pub fn luminance(&self) -> f64 {
        self.intensities.iter().sum::<f64>() / N as f64
    }

    /// True if every band is exactly zero.
    pub fn is_black(&self) -> bool {
        self.intensities.iter().all(|&c| c == 0.0)
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            intensities: self.intensities.map(f),
        }
    }

    fn zip(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut intensities = self.intensities;
        for (a, b) in intensities.iter_mut().zip(other.intensities) {
            *a = f(*a, b);
        }
        Self { intensities }
    }

    /// Convert a sampled spectrum to display RGB.
    ///
    /// `lambdas` are the (ascending) sample wavelengths in nanometres. Each
    /// sample is weighted by the width of the band it closes.
    pub fn to_rgb_matched(&self, lambdas: &[f64; N]) -> Rgb {
        let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
        let mut prev = LAMBDA_LOW;

        for (&lambda, &intensity) in lambdas.iter().zip(&self.intensities) {
            let (mr, mg, mb) = color_match(lambda);
            let dl = (lambda - prev) / (LAMBDA_HIGH - LAMBDA_LOW);
            r += mr * intensity * dl;
            g += mg * intensity * dl;
            b += mb * intensity * dl;
            prev = lambda;
        }

        Rgb::new(r, g, b)
    }
}

impl Color {
    /// Create a colour from its three bands.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self {
            intensities: [r, g, b],
        }
    }
}

impl<const N: usize> Default for Spectrum<N> {
    fn default() -> Self {
        Self::BLACK
    }
}

impl<const N: usize> Index<usize> for Spectrum<N> {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.intensities[i]
    }
}

impl<const N: usize> Add for Spectrum<N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a + b)
    }
}

impl<const N: usize> AddAssign for Spectrum<N> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const N: usize> Mul for Spectrum<N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a * b)
    }
}

impl<const N: usize> MulAssign for Spectrum<N> {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<const N: usize> Mul<f64> for Spectrum<N> {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        self.map(|c| c * s)
    }
}

impl<const N: usize> Mul<Spectrum<N>> for f64 {
    type Output = Spectrum<N>;

    fn mul(self, s: Spectrum<N>) -> Spectrum<N> {
        s * self
    }
}

impl<const N: usize> Div<f64> for Spectrum<N> {
    type Output = Self;

    fn div(self, s: f64) -> Self {
        self.map(|c| c / s)
    }
}

impl<const N: usize> DivAssign<f64> for Spectrum<N> {
    fn div_assign(&mut self, s: f64) {
        *self = *self / s;
    }
}

impl<const N: usize> std::iter::Sum for Spectrum<N> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::BLACK, |acc, c| acc + c)
    }
}

/// Linear interpolation into the matching table.
fn color_match(lambda: f64) -> (f64, f64, f64) {
    for pair in MATCHING.windows(2) {
        let (l0, r0, g0, b0) = pair[0];
        let (l1, r1, g1, b1) = pair[1];
        if lambda < l1 {
            let w1 = (lambda - l0).max(0.0) / (l1 - l0);
            let w0 = 1.0 - w1;
            return (w0 * r0 + w1 * r1, w0 * g0 + w1 * g1, w0 * b0 + w1 * b1);
        }
    }
    (0.0, 0.0, 0.0)
}

/// A display colour with every channel in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    /// Create a display colour, clamping each channel to [0, 1].
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: Interval::UNIT.clamp(r),
            g: Interval::UNIT.clamp(g),
            b: Interval::UNIT.clamp(b),
        }
    }

    /// Quantize to 8 bits per channel.
    pub fn to_bytes(&self) -> [u8; 3] {
        [
            (255.0 * self.r) as u8,
            (255.0 * self.g) as u8,
            (255.0 * self.b) as u8,
        ]
    }

    /// Inverse of [`Rgb::to_bytes`].
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self {
            r: bytes[0] as f64 / 255.0,
            g: bytes[1] as f64 / 255.0,
            b: bytes[2] as f64 / 255.0,
        }
    }
}

impl From<Color> for Rgb {
    fn from(c: Color) -> Self {
        Rgb::new(c[0], c[1], c[2])
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::new(rgb.r, rgb.g, rgb.b)
    }
}
