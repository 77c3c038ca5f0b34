//! Dense attribute registers indexed by node, arc or edge

use std::ops::{Index, IndexMut};

use serde::Serialize;

use crate::graph::{ArcId, EdgeId, NodeId};

macro_rules! register {
    ($(#[$meta:meta])* $name:ident, $id:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
        pub struct $name<T>(Vec<T>);

        impl<T: Clone> $name<T> {
            pub fn new(len: usize, init: T) -> Self {
                Self(vec![init; len])
            }

            /// Reset every entry to `value`
            pub fn fill(&mut self, value: T) {
                self.0.fill(value);
            }
        }

        impl<T> $name<T> {
            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn get(&self, id: $id) -> Option<&T> {
                self.0.get(id.0)
            }

            pub fn iter(&self) -> impl Iterator<Item = ($id, &T)> {
                self.0.iter().enumerate().map(|(i, value)| ($id(i), value))
            }

            pub fn as_slice(&self) -> &[T] {
                &self.0
            }

            pub fn into_inner(self) -> Vec<T> {
                self.0
            }
        }

        impl<T> From<Vec<T>> for $name<T> {
            fn from(values: Vec<T>) -> Self {
                Self(values)
            }
        }

        impl<T> FromIterator<T> for $name<T> {
            fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl<T> Index<$id> for $name<T> {
            type Output = T;

            fn index(&self, id: $id) -> &T {
                &self.0[id.0]
            }
        }

        impl<T> IndexMut<$id> for $name<T> {
            fn index_mut(&mut self, id: $id) -> &mut T {
                &mut self.0[id.0]
            }
        }
    };
}

register!(
    /// One value per node
    NodeMap,
    NodeId
);
register!(
    /// One value per arc, both directions of an edge are separate entries
    ArcMap,
    ArcId
);
register!(
    /// One value per undirected edge
    EdgeMap,
    EdgeId
);

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_register_indexing() {
        let mut colour = EdgeMap::new(3, None);
        colour[EdgeId(1)] = Some(4);
        assert_eq!(colour[EdgeId(1)], Some(4));
        assert_eq!(colour.get(EdgeId(3)), None);
        assert_eq!(
            colour.iter().filter(|(_, c)| c.is_some()).map(|(e, _)| e).collect::<Vec<_>>(),
            vec![EdgeId(1)]
        );

        colour.fill(None);
        assert!(colour.iter().all(|(_, c)| c.is_none()));
    }

    #[test]
    fn test_register_from_iterator() {
        let pred: ArcMap<ArcId> = (0..4).map(|a| ArcId(a ^ 1)).collect();
        assert_eq!(pred.len(), 4);
        assert_eq!(pred[ArcId(2)], ArcId(3));
    }
}
