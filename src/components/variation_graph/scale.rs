//! Sequential and diverging colour ramps for sequence links.
//!
//! Each ramp maps `t` in `[0, 1]` to a colour. Turbo and Viridis use
//! polynomial fits, Rainbow walks the cubehelix space, and the two
//! ColorBrewer schemes are eleven-stop basis splines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::GraphError;

/// An sRGB colour with channels in `0..=255`, not yet clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
	pub r: f64,
	pub g: f64,
	pub b: f64,
}

/// A colour ramp; any function works, the named schemes are provided below.
pub type ColorFn = fn(f64) -> Rgb;

const BRIGHTER: f64 = 1.0 / 0.7;

impl Rgb {
	pub const fn new(r: f64, g: f64, b: f64) -> Self {
		Self { r, g, b }
	}

	const fn from_hex(hex: u32) -> Self {
		Self::new(
			((hex >> 16) & 0xff) as f64,
			((hex >> 8) & 0xff) as f64,
			(hex & 0xff) as f64,
		)
	}

	/// Clamped integer channels.
	pub fn channels(&self) -> [u8; 3] {
		[self.r, self.g, self.b].map(|c| c.round().clamp(0.0, 255.0) as u8)
	}

	pub fn to_css(&self) -> String {
		let [r, g, b] = self.channels();
		format!("rgb({r}, {g}, {b})")
	}

	/// Darken by `k` steps, scaling HSL lightness by 0.7 per step.
	pub fn darker(&self, k: f64) -> Self {
		let (h, s, l) = self.to_hsl();
		hsl_to_rgb(h, s, l * BRIGHTER.powf(-k))
	}

	fn to_hsl(self) -> (f64, f64, f64) {
		let (r, g, b) = (self.r / 255.0, self.g / 255.0, self.b / 255.0);
		let (min, max) = (r.min(g).min(b), r.max(g).max(b));
		let l = (max + min) / 2.0;
		let spread = max - min;
		if spread == 0.0 {
			return (0.0, 0.0, l);
		}
		let h = if r == max {
			(g - b) / spread + if g < b { 6.0 } else { 0.0 }
		} else if g == max {
			(b - r) / spread + 2.0
		} else {
			(r - g) / spread + 4.0
		};
		let s = spread / if l < 0.5 { max + min } else { 2.0 - max - min };
		(h * 60.0, s, l)
	}
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
	let h = h.rem_euclid(360.0);
	let m2 = l + (if l < 0.5 { l } else { 1.0 - l }) * s;
	let m1 = 2.0 * l - m2;
	let channel = |h: f64| {
		255.0
			* if h < 60.0 {
				m1 + (m2 - m1) * h / 60.0
			} else if h < 180.0 {
				m2
			} else if h < 240.0 {
				m1 + (m2 - m1) * (240.0 - h) / 60.0
			} else {
				m1
			}
	};
	Rgb::new(
		channel(if h >= 240.0 { h - 240.0 } else { h + 120.0 }),
		channel(h),
		channel(if h < 120.0 { h + 240.0 } else { h - 120.0 }),
	)
}

/// The palettes offered for colouring sequences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorScheme {
	Turbo,
	#[default]
	Rainbow,
	Spectral,
	Viridis,
	RdYlBu,
}

impl ColorScheme {
	pub const ALL: [ColorScheme; 5] = [
		ColorScheme::Turbo,
		ColorScheme::Rainbow,
		ColorScheme::Spectral,
		ColorScheme::Viridis,
		ColorScheme::RdYlBu,
	];

	pub fn name(self) -> &'static str {
		match self {
			ColorScheme::Turbo => "Turbo",
			ColorScheme::Rainbow => "Rainbow",
			ColorScheme::Spectral => "Spectral",
			ColorScheme::Viridis => "Viridis",
			ColorScheme::RdYlBu => "RdYlBu",
		}
	}

	pub fn interpolator(self) -> ColorFn {
		match self {
			ColorScheme::Turbo => turbo,
			ColorScheme::Rainbow => rainbow,
			ColorScheme::Spectral => spectral,
			ColorScheme::Viridis => viridis,
			ColorScheme::RdYlBu => rd_yl_bu,
		}
	}

	pub fn interpolate(self, t: f64) -> Rgb {
		(self.interpolator())(t)
	}
}

impl fmt::Display for ColorScheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for ColorScheme {
	type Err = GraphError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ColorScheme::ALL
			.into_iter()
			.find(|scheme| scheme.name().eq_ignore_ascii_case(s))
			.ok_or_else(|| GraphError::Config(format!("unknown colour scheme {s:?}")))
	}
}

pub fn turbo(t: f64) -> Rgb {
	let t = t.clamp(0.0, 1.0);
	Rgb::new(
		34.61 + t * (1172.33 - t * (10793.56 - t * (33300.12 - t * (38394.49 - t * 14825.05)))),
		23.31 + t * (557.33 + t * (1225.33 - t * (3574.96 - t * (1073.77 + t * 707.56)))),
		27.2 + t * (3211.1 - t * (15327.97 - t * (27814.0 - t * (22569.18 - t * 6838.66)))),
	)
	.clamped()
}

/// Cyclical: `t` outside `[0, 1]` wraps around.
pub fn rainbow(t: f64) -> Rgb {
	let t = if (0.0..=1.0).contains(&t) { t } else { t - t.floor() };
	let ts = (t - 0.5).abs();
	cubehelix(360.0 * t - 100.0, 1.5 - 1.5 * ts, 0.8 - 0.9 * ts)
}

fn cubehelix(h: f64, s: f64, l: f64) -> Rgb {
	const A: f64 = -0.14861;
	const B: f64 = 1.78277;
	const C: f64 = -0.29227;
	const D: f64 = -0.90649;
	const E: f64 = 1.97294;

	let h = (h + 120.0).to_radians();
	let a = s * l * (1.0 - l);
	let (sin_h, cos_h) = h.sin_cos();
	Rgb::new(
		255.0 * (l + a * (A * cos_h + B * sin_h)),
		255.0 * (l + a * (C * cos_h + D * sin_h)),
		255.0 * (l + a * (E * cos_h)),
	)
}

pub fn viridis(t: f64) -> Rgb {
	const COEFFS: [[f64; 3]; 7] = [
		[0.277_727_327_223_417_7, 0.005_407_344_544_966_578, 0.334_099_805_335_306_1],
		[0.105_093_043_108_577_4, 1.404_613_529_898_575, 1.384_590_162_594_685],
		[-0.330_861_828_725_556_3, 0.214_847_559_468_213, 0.095_095_163_028_236_59],
		[-4.634_230_498_983_486, -5.799_100_973_351_585, -19.332_440_956_279_87],
		[6.228_269_936_347_081, 14.179_933_366_805_09, 56.690_552_600_681_05],
		[4.776_384_997_670_288, -13.745_145_377_746_01, -65.353_032_633_372_34],
		[-5.435_455_855_934_631, 4.645_852_612_178_535, 26.312_435_249_583_2],
	];
	let t = t.clamp(0.0, 1.0);
	let [r, g, b] = [0, 1, 2].map(|c| {
		255.0 * COEFFS.iter().rev().fold(0.0, |acc, row| acc * t + row[c])
	});
	Rgb::new(r, g, b).clamped()
}

const SPECTRAL: [u32; 11] = [
	0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4, 0x66c2a5,
	0x3288bd, 0x5e4fa2,
];

const RD_YL_BU: [u32; 11] = [
	0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9, 0x74add1,
	0x4575b4, 0x313695,
];

pub fn spectral(t: f64) -> Rgb {
	rgb_basis(&SPECTRAL, t)
}

pub fn rd_yl_bu(t: f64) -> Rgb {
	rgb_basis(&RD_YL_BU, t)
}

/// Uniform cubic B-spline through the stops, per channel.
fn rgb_basis(stops: &[u32], t: f64) -> Rgb {
	let colors: Vec<Rgb> = stops.iter().map(|&hex| Rgb::from_hex(hex)).collect();
	let channels: [fn(&Rgb) -> f64; 3] = [|c| c.r, |c| c.g, |c| c.b];
	let [r, g, b] =
		channels.map(|channel| basis(&colors.iter().map(channel).collect::<Vec<_>>(), t));
	Rgb::new(r, g, b)
}

fn basis(values: &[f64], t: f64) -> f64 {
	let n = values.len() - 1;
	let (t, i) = if t <= 0.0 {
		(0.0, 0)
	} else if t >= 1.0 {
		(1.0, n - 1)
	} else {
		(t, (t * n as f64).floor() as usize)
	};
	let v1 = values[i];
	let v2 = values[i + 1];
	let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
	let v3 = if i < n - 1 { values[i + 2] } else { 2.0 * v2 - v1 };

	let t1 = (t - i as f64 / n as f64) * n as f64;
	let (t2, t3) = (t1 * t1, t1 * t1 * t1);
	((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
		+ (4.0 - 6.0 * t2 + 3.0 * t3) * v1
		+ (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
		+ t3 * v3)
		/ 6.0
}

impl Rgb {
	fn clamped(self) -> Self {
		Self::new(
			self.r.clamp(0.0, 255.0),
			self.g.clamp(0.0, 255.0),
			self.b.clamp(0.0, 255.0),
		)
	}
}
