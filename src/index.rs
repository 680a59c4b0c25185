//! Spatial Index (§4.1): an R-tree over sector envelopes, used to narrow
//! candidate queries during growth (§4.3) from "every remaining sector" to
//! "sectors whose bounding box intersects the current buffer disc".

use geo::{BoundingRect, MultiPolygon};
use rstar::{RTree, RTreeObject, AABB};

/// One sector's bounding box, tagged with its code so a query result can be
/// mapped back to the sector it came from without re-walking `Vec<Sector>`.
#[derive(Debug, Clone)]
pub struct SectorEnvelope {
    pub sector_code: String,
    envelope: AABB<[f64; 2]>,
}

impl SectorEnvelope {
    pub fn new(sector_code: String, geometry: &MultiPolygon<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        Some(Self {
            sector_code,
            envelope: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
        })
    }
}

impl RTreeObject for SectorEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PartialEq for SectorEnvelope {
    fn eq(&self, other: &Self) -> bool {
        self.sector_code == other.sector_code
    }
}

/// A mutable R-tree of a district's not-yet-assigned sectors.
///
/// Sectors are removed as they are claimed by a growth loop, so that later
/// seeds within the same district only ever see the remaining pool — this is
/// what gives "skip sectors already in an ACDP" (§4.2) its O(log n) per-query
/// cost instead of a linear scan.
pub struct SectorIndex {
    tree: RTree<SectorEnvelope>,
}

impl SectorIndex {
    pub fn build<'a>(sectors: impl Iterator<Item = (&'a str, &'a MultiPolygon<f64>)>) -> Self {
        let envelopes: Vec<SectorEnvelope> = sectors
            .filter_map(|(code, geometry)| SectorEnvelope::new(code.to_string(), geometry))
            .collect();
        Self {
            tree: RTree::bulk_load(envelopes),
        }
    }

    /// Sector codes whose bounding box intersects `region`'s bounding box.
    /// A bounding-box hit is a candidate, not a guarantee — callers must
    /// still run the exact `geometry::intersects` test.
    pub fn query_candidates(&self, region: &MultiPolygon<f64>) -> Vec<String> {
        let Some(rect) = region.bounding_rect() else {
            return Vec::new();
        };
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|candidate| candidate.sector_code.clone())
            .collect()
    }

    pub fn remove(&mut self, sector_code: &str) {
        let found = self
            .tree
            .iter()
            .find(|envelope| envelope.sector_code == sector_code)
            .cloned();
        if let Some(found) = found {
            self.tree.remove(&found);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }
}
