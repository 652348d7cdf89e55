//! CSS-style colour literals as used in style paint properties.

use std::fmt;

/// Straight-alpha colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
	pub r: f32,
	pub g: f32,
	pub b: f32,
	pub a: f32,
}

impl Rgba {
	pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
	pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

	pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
		Self { r, g, b, a }
	}

	/// Builds an opaque colour from 8-bit channels.
	pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
		Self::new(f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0, 1.0)
	}

	/// Returns a copy with the alpha channel replaced.
	pub fn with_alpha(self, alpha: f64) -> Self {
		Self {
			a: alpha.clamp(0.0, 1.0) as f32,
			..self
		}
	}

	/// Parses a colour literal: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
	/// `rgb()`, `rgba()`, `hsl()`, `hsla()` or a common colour name.
	pub fn parse(input: &str) -> Option<Self> {
		let s = input.trim();
		if let Some(hex) = s.strip_prefix('#') {
			return parse_hex(hex);
		}
		if let Some(args) = function_args(s, "rgba").or_else(|| function_args(s, "rgb")) {
			return parse_rgb(args);
		}
		if let Some(args) = function_args(s, "hsla").or_else(|| function_args(s, "hsl")) {
			return parse_hsl(args);
		}
		named(&s.to_ascii_lowercase())
	}

	fn channel8(value: f32) -> u8 {
		(value.clamp(0.0, 1.0) * 255.0).round() as u8
	}
}

/// Formats as `rgba(r, g, b, a)`, the form written back into paint blocks.
impl fmt::Display for Rgba {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let alpha = (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0;
		write!(
			f,
			"rgba({}, {}, {}, {})",
			Self::channel8(self.r),
			Self::channel8(self.g),
			Self::channel8(self.b),
			alpha
		)
	}
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
	s.strip_prefix(name)?.trim_start().strip_prefix('(')?.strip_suffix(')')
}

fn parse_hex(hex: &str) -> Option<Rgba> {
	let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok().map(|v| v * 17);
	let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
	let (r, g, b, a) = match hex.len() {
		3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
		4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
		6 => (byte(0)?, byte(2)?, byte(4)?, 255),
		8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
		_ => return None,
	};
	Some(Rgba::from_rgb8(r, g, b).with_alpha(f64::from(a) / 255.0))
}

fn split_args(args: &str) -> Vec<&str> {
	args.split(',').map(str::trim).collect()
}

fn parse_alpha(part: Option<&&str>) -> Option<f32> {
	match part {
		Some(raw) => raw.parse::<f32>().ok().map(|a| a.clamp(0.0, 1.0)),
		None => Some(1.0),
	}
}

fn parse_rgb(args: &str) -> Option<Rgba> {
	let parts = split_args(args);
	if !(3..=4).contains(&parts.len()) {
		return None;
	}
	let channel = |raw: &str| -> Option<f32> {
		let value = match raw.strip_suffix('%') {
			Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0,
			None => raw.parse::<f32>().ok()? / 255.0,
		};
		Some(value.clamp(0.0, 1.0))
	};
	Some(Rgba::new(
		channel(parts[0])?,
		channel(parts[1])?,
		channel(parts[2])?,
		parse_alpha(parts.get(3))?,
	))
}

fn parse_hsl(args: &str) -> Option<Rgba> {
	let parts = split_args(args);
	if !(3..=4).contains(&parts.len()) {
		return None;
	}
	let percent = |raw: &str| raw.strip_suffix('%')?.trim().parse::<f32>().ok().map(|v| (v / 100.0).clamp(0.0, 1.0));
	let hue = parts[0].parse::<f32>().ok()?.rem_euclid(360.0) / 360.0;
	let (r, g, b) = hsl_to_rgb(hue, percent(parts[1])?, percent(parts[2])?);
	Some(Rgba::new(r, g, b, parse_alpha(parts.get(3))?))
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
	if s == 0.0 {
		return (l, l, l);
	}
	let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
	let p = 2.0 * l - q;
	(
		hue_to_channel(p, q, h + 1.0 / 3.0),
		hue_to_channel(p, q, h),
		hue_to_channel(p, q, h - 1.0 / 3.0),
	)
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
	let t = t.rem_euclid(1.0);
	if t < 1.0 / 6.0 {
		p + (q - p) * 6.0 * t
	} else if t < 0.5 {
		q
	} else if t < 2.0 / 3.0 {
		p + (q - p) * (2.0 / 3.0 - t) * 6.0
	} else {
		p
	}
}

fn named(name: &str) -> Option<Rgba> {
	let (r, g, b) = match name {
		"transparent" => return Some(Rgba::new(0.0, 0.0, 0.0, 0.0)),
		"black" => (0, 0, 0),
		"white" => (255, 255, 255),
		"red" => (255, 0, 0),
		"green" => (0, 128, 0),
		"lime" => (0, 255, 0),
		"blue" => (0, 0, 255),
		"yellow" => (255, 255, 0),
		"cyan" | "aqua" => (0, 255, 255),
		"magenta" | "fuchsia" => (255, 0, 255),
		"gray" | "grey" => (128, 128, 128),
		"silver" => (192, 192, 192),
		"orange" => (255, 165, 0),
		"purple" => (128, 0, 128),
		"brown" => (165, 42, 42),
		"pink" => (255, 192, 203),
		"navy" => (0, 0, 128),
		"teal" => (0, 128, 128),
		_ => return None,
	};
	Some(Rgba::from_rgb8(r, g, b))
}
