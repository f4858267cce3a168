use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Square {
    pub(super) min: Vec2,
    pub(super) size: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        Some(Self {
            min: min - Vec2::splat(1.0),
            size: (max - min).max_elem().max(1.0) + 2.0,
        })
    }

    fn center(self) -> Vec2 {
        self.min + Vec2::splat(self.size * 0.5)
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let max = self.min + Vec2::splat(self.size);
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }

    // bit 0: right half, bit 1: lower half
    fn quadrant_of(self, point: Vec2) -> usize {
        let center = self.center();
        usize::from(point.x >= center.x) | (usize::from(point.y >= center.y) << 1)
    }

    fn quarter(self, quadrant: usize) -> Self {
        let half = self.size * 0.5;
        Self {
            min: self.min + vec2((quadrant & 1) as f32, (quadrant >> 1) as f32) * half,
            size: half,
        }
    }

    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let axis_gap = |a_min: f32, b_min: f32| {
            ((b_min - (a_min + self.size)).max(a_min - (b_min + other.size))).max(0.0)
        };
        let dx = axis_gap(self.min.x, other.min.x);
        let dy = axis_gap(self.min.y, other.min.y);
        dx * dx + dy * dy
    }
}

pub(super) struct QuadNode {
    pub(super) square: Square,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: Vec<QuadNode>,
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        if positions.is_empty() {
            return None;
        }
        let square = Square::enclosing(positions)?;
        Some(Self::grow(square, (0..positions.len()).collect(), positions, 0))
    }

    fn grow(square: Square, indices: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mass = indices.len() as f32;
        let sum = indices
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + positions[index]);
        let center_of_mass = sum / mass.max(1.0);

        let leaf = |indices| Self {
            square,
            center_of_mass,
            mass,
            indices,
            children: Vec::new(),
        };
        if depth >= MAX_DEPTH || indices.len() <= LEAF_CAPACITY {
            return leaf(indices);
        }

        let mut buckets: [Vec<usize>; 4] = Default::default();
        for &index in &indices {
            buckets[square.quadrant_of(positions[index])].push(index);
        }
        // All points in one quadrant (coincident or nearly so): splitting
        // would only recurse to the depth limit.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() < 2 {
            return leaf(indices);
        }

        let children = buckets
            .into_iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(quadrant, bucket)| Self::grow(square.quarter(quadrant), bucket, positions, depth + 1))
            .collect();

        Self {
            square,
            center_of_mass,
            mass,
            indices: Vec::new(),
            children,
        }
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_indices(node: &QuadNode, out: &mut Vec<usize>) {
        out.extend_from_slice(&node.indices);
        for child in &node.children {
            collect_indices(child, out);
        }
    }

    #[test]
    fn every_point_lands_in_exactly_one_leaf() {
        let positions = (0..200)
            .map(|index| {
                let angle = index as f32 * 0.618_034 * std::f32::consts::TAU;
                vec2(angle.cos(), angle.sin()) * (index as f32 * 3.0)
            })
            .collect::<Vec<_>>();
        let tree = QuadNode::build(&positions).unwrap();
        assert!(!tree.is_leaf());
        assert_eq!(tree.mass, 200.0);

        let mut seen = Vec::new();
        collect_indices(&tree, &mut seen);
        seen.sort_unstable();
        assert_eq!(seen, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn small_sets_stay_a_single_leaf() {
        let positions = vec![vec2(0.0, 0.0), vec2(9.0, 0.0), vec2(0.0, 9.0)];
        let tree = QuadNode::build(&positions).unwrap();
        assert!(tree.is_leaf());
        assert_eq!(tree.center_of_mass, vec2(3.0, 3.0));
        assert!(positions.iter().all(|point| tree.square.contains(*point)));
    }

    #[test]
    fn quarters_tile_their_parent() {
        let square = Square {
            min: vec2(0.0, 0.0),
            size: 8.0,
        };
        assert_eq!(square.quarter(3).min, vec2(4.0, 4.0));
        assert_eq!(square.quadrant_of(vec2(5.0, 1.0)), 1);
        assert_eq!(square.quadrant_of(vec2(1.0, 5.0)), 2);

        let far = Square {
            min: vec2(11.0, 12.0),
            size: 2.0,
        };
        assert_eq!(square.gap_sq(far), 25.0);
        assert_eq!(square.gap_sq(square.quarter(0)), 0.0);
    }

    #[test]
    fn empty_input_has_no_tree() {
        assert!(QuadNode::build(&[]).is_none());
    }
}
