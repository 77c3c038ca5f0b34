//! Overlap of bridges of a cycle
//!
//! Attachments are preorder numbers in ascending order without repetitions.
//! All attachments of the segments around a failed test lie on one tree path
//! that a back arc closes into a cycle, so ascending preorder is the order
//! along that cycle.

/// Why two bridges cannot lie on the same side of the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Overlap {
    /// Both bridges attach to the same three nodes
    Equivalent([usize; 3]),
    /// Two attachments of the first bridge alternate with two of the second
    Skew { first: [usize; 2], second: [usize; 2] },
}

impl Overlap {
    /// Attachments of the first and of the second bridge that keep the overlap
    pub fn witnesses(&self) -> (&[usize], &[usize]) {
        match self {
            Overlap::Equivalent(common) => (&common[..], &common[..]),
            Overlap::Skew { first, second } => (&first[..], &second[..]),
        }
    }
}

/// Decide whether two bridges with the given attachments overlap
pub(crate) fn overlap(first: &[usize], second: &[usize]) -> Option<Overlap> {
    // (attachment, of first, of second)
    let mut points = Vec::with_capacity(first.len() + second.len());
    let (mut i, mut j) = (0, 0);
    while i < first.len() || j < second.len() {
        match (first.get(i), second.get(j)) {
            (Some(&x), Some(&y)) if x == y => {
                points.push((x, true, true));
                i += 1;
                j += 1;
            }
            (Some(&x), Some(&y)) if x < y => {
                points.push((x, true, false));
                i += 1;
            }
            (Some(&x), None) => {
                points.push((x, true, false));
                i += 1;
            }
            (_, Some(&y)) => {
                points.push((y, false, true));
                j += 1;
            }
            (None, None) => break,
        }
    }

    let mut common = points.iter().filter(|p| p.1 && p.2).map(|p| p.0);
    if let (Some(a), Some(b), Some(c)) = (common.next(), common.next(), common.next()) {
        return Some(Overlap::Equivalent([a, b, c]));
    }

    if let Some([a, b, c, d]) = alternation(&points, true) {
        return Some(Overlap::Skew {
            first: [a, c],
            second: [b, d],
        });
    }
    alternation(&points, false).map(|[a, b, c, d]| Overlap::Skew {
        first: [b, d],
        second: [a, c],
    })
}

/// Four distinct points taken alternately from both bridges
///
/// Leftmost matching finds such points whenever they exist.
fn alternation(points: &[(usize, bool, bool)], first_leads: bool) -> Option<[usize; 4]> {
    let mut found = [0; 4];
    let mut stage = 0;
    for &(p, of_first, of_second) in points {
        let wants_first = (stage % 2 == 0) == first_leads;
        if (wants_first && of_first) || (!wants_first && of_second) {
            found[stage] = p;
            stage += 1;
            if stage == 4 {
                return Some(found);
            }
        }
    }
    None
}
