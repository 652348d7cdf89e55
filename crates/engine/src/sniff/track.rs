//! GPX import: tracks and routes become line features, waypoints points.

use serde_json::{Value, json};

use super::geometry::{Buckets, Family, build, feature_of};
use crate::config::groups;
use crate::transport::LayerDefinitionTransport;

pub(super) fn from_gpx(bytes: &[u8], name_hint: Option<&str>) -> Option<LayerDefinitionTransport> {
	let gpx = gpx::read(bytes).ok()?;
	if gpx.tracks.is_empty() && gpx.waypoints.is_empty() {
		return None;
	}

	let mut buckets = Buckets::default();
	for track in &gpx.tracks {
		for segment in &track.segments {
			push_line(&mut buckets, &segment.points, track.name.as_deref());
		}
	}
	for route in &gpx.routes {
		push_line(&mut buckets, &route.points, route.name.as_deref());
	}
	for waypoint in &gpx.waypoints {
		let geometry = json!({ "type": "Point", "coordinates": position(waypoint) });
		buckets.push(Family::Points, feature_of(geometry, json!({ "name": waypoint.name })));
	}

	let name = gpx
		.metadata
		.as_ref()
		.and_then(|metadata| metadata.name.as_deref())
		.or_else(|| gpx.tracks.iter().find_map(|track| track.name.as_deref()))
		.or(name_hint)
		.unwrap_or("Track");
	build(buckets, name, groups::TRACKS)
}

fn push_line(buckets: &mut Buckets, points: &[gpx::Waypoint], name: Option<&str>) {
	if points.len() < 2 {
		return;
	}
	let coordinates: Vec<Value> = points.iter().map(|point| json!(position(point))).collect();
	let geometry = json!({ "type": "LineString", "coordinates": coordinates });
	buckets.push(Family::Lines, feature_of(geometry, json!({ "name": name })));
}

fn position(waypoint: &gpx::Waypoint) -> [f64; 2] {
	let point = waypoint.point();
	[point.x(), point.y()]
}
