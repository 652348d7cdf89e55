//! Geographic envelopes in longitude/latitude degrees.

use serde::{Deserialize, Serialize};

/// A `[lon, lat]` position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
	pub lon: f64,
	pub lat: f64,
}

impl LngLat {
	pub const fn new(lon: f64, lat: f64) -> Self {
		Self { lon, lat }
	}
}

impl From<[f64; 2]> for LngLat {
	fn from([lon, lat]: [f64; 2]) -> Self {
		Self { lon, lat }
	}
}

impl From<LngLat> for [f64; 2] {
	fn from(p: LngLat) -> Self {
		[p.lon, p.lat]
	}
}

/// Axis-aligned box with south-west and north-east corners.
///
/// Boxes never wrap the antimeridian; `sw.lon <= ne.lon` holds for every box
/// built through this API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
	pub sw: LngLat,
	pub ne: LngLat,
}

impl BoundingBox {
	pub const WORLD: Self = Self {
		sw: LngLat::new(-180.0, -90.0),
		ne: LngLat::new(180.0, 90.0),
	};

	/// Builds a box from two corners given in any order.
	pub fn new(a: LngLat, b: LngLat) -> Self {
		Self {
			sw: LngLat::new(a.lon.min(b.lon), a.lat.min(b.lat)),
			ne: LngLat::new(a.lon.max(b.lon), a.lat.max(b.lat)),
		}
	}

	pub fn from_point(p: LngLat) -> Self {
		Self { sw: p, ne: p }
	}

	/// Parses a `[west, south, east, north]` array as used by tile sources.
	pub fn from_wsen(values: &[serde_json::Value]) -> Option<Self> {
		let [w, s, e, n] = values else {
			return None;
		};
		Some(Self::new(
			LngLat::new(w.as_f64()?, s.as_f64()?),
			LngLat::new(e.as_f64()?, n.as_f64()?),
		))
	}

	/// Grows the box to include `p`.
	pub fn extend(&mut self, p: LngLat) {
		self.sw.lon = self.sw.lon.min(p.lon);
		self.sw.lat = self.sw.lat.min(p.lat);
		self.ne.lon = self.ne.lon.max(p.lon);
		self.ne.lat = self.ne.lat.max(p.lat);
	}

	pub fn union(mut self, other: &Self) -> Self {
		self.extend(other.sw);
		self.extend(other.ne);
		self
	}

	/// Closed-interval overlap test; touching edges intersect.
	pub fn intersects(&self, other: &Self) -> bool {
		self.sw.lon <= other.ne.lon
			&& other.sw.lon <= self.ne.lon
			&& self.sw.lat <= other.ne.lat
			&& other.sw.lat <= self.ne.lat
	}

	pub fn contains(&self, p: LngLat) -> bool {
		(self.sw.lon..=self.ne.lon).contains(&p.lon) && (self.sw.lat..=self.ne.lat).contains(&p.lat)
	}
}
