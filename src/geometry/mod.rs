//! Geometry Kernel (§4.1's sibling in §2): polygon buffer, intersection,
//! coverage, dissolve-by-key and hole extraction.
//!
//! This is a thin adaptor over the `geo` / `geo-buffer` crates — the rest of
//! the crate never imports `geo` traits directly, it calls through here, so a
//! future geometry backend swap touches one module.

use geo::{Area, BooleanOps, Contains, Coord, Intersects, LineString, MultiPolygon, Point, Polygon, Relate};

use crate::config::BUFFER_CIRCLE_SEGMENTS;

/// Build a circular polygon of the given `radius` centred on `center`,
/// approximated with [`BUFFER_CIRCLE_SEGMENTS`] vertices.
///
/// `geo`/`geo-buffer` buffer polygons and linestrings via a straight-skeleton
/// offset, but neither buffers a bare point into a disc, so the disc is
/// generated directly: it is the regular polygon inscribed in the circle of
/// the given radius, which is standard practice for "seed buffer" discs in
/// GIS tooling and converges to the true circle as segment count grows.
pub fn circle_polygon(center: Point<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let segments = segments.max(3);
    let coords: Vec<Coord<f64>> = (0..=segments)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * (i as f64) / (segments as f64);
            Coord {
                x: center.x() + radius * theta.cos(),
                y: center.y() + radius * theta.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::new(coords), vec![])
}

/// Buffer every component of `geometry` outward by `distance` and union the
/// results back into a single [`MultiPolygon`]. Used to apply the
/// `dissolve_epsilon` contiguity tolerance to an already-dissolved ACDP
/// region (§4.3 step 3/4).
pub fn buffer_tolerance(geometry: &MultiPolygon<f64>, distance: f64) -> MultiPolygon<f64> {
    geo_buffer::buffer_multi_polygon(geometry, distance)
}

/// Do `a` and `b` share any point (boundary or interior)?
pub fn intersects(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    a.intersects(b)
}

/// Does a point lie anywhere on or inside `region`?
pub fn point_intersects(point: Point<f64>, region: &MultiPolygon<f64>) -> bool {
    region.intersects(&point)
}

/// Does `region` fully contain `point` in its interior (used for the
/// skip-if-covered test, §4.2 step 1)?
pub fn contains_point(region: &MultiPolygon<f64>, point: Point<f64>) -> bool {
    region.contains(&point)
}

/// Strict coverage test used by Hole Repair (§4.4 step 3): is `inner` covered
/// by `outer`, boundary-inclusive (the DE-9IM `covered_by` predicate, not the
/// stricter interior-only `within`)?
pub fn covered_by(inner: &MultiPolygon<f64>, outer: &MultiPolygon<f64>) -> bool {
    inner.relate(outer).is_coveredby()
}

/// Union `members` into a single dissolved geometry (§4.5 "Dissolve semantics").
/// Returns `None` for an empty slice — the caller must special-case the
/// "no members yet" state during growth (§4.3: `dissolved` is "undefined when
/// empty").
pub fn dissolve<'a>(members: impl Iterator<Item = &'a MultiPolygon<f64>>) -> Option<MultiPolygon<f64>> {
    members.fold(None, |acc, geom| match acc {
        None => Some(geom.clone()),
        Some(acc) => Some(acc.union(geom)),
    })
}

/// Rounded area in CRS units² (§4.5: "area = area(dissolved) rounded to 2
/// decimals").
pub fn rounded_area(geometry: &MultiPolygon<f64>) -> f64 {
    (geometry.unsigned_area() * 100.0).round() / 100.0
}

/// Fill every component polygon's interior rings (holes), producing the
/// "exterior envelope" used as the coverage test region in Hole Repair
/// (§4.4 steps 1-2).
pub fn exterior_envelope(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    let filled: Vec<Polygon<f64>> = geometry
        .iter()
        .map(|polygon| Polygon::new(polygon.exterior().clone(), vec![]))
        .collect();
    MultiPolygon::new(filled)
}
