//! Forest builder: leaf count in, laid-out forest out.

use tracing::{debug, instrument};

use crate::domain::arena::ForestArena;
use crate::domain::entities::NodeId;
use crate::domain::fingerprint::leaf_fingerprint;
use crate::domain::forest::Forest;
use crate::domain::layout::Canvas;

/// Reconstructs the forest of perfect binary trees implied by a leaf count.
///
/// Pure: the result depends only on the leaf count, the canvas and the salt.
/// The salt only feeds leaf fingerprints, never the shape.
#[derive(Debug, Clone, Default)]
pub struct ForestBuilder {
    canvas: Canvas,
    salt: u64,
}

/// Largest leaf count the CLI and config accept.
pub const MAX_LEAVES: usize = 1 << 20;

impl ForestBuilder {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas, salt: 0 }
    }

    pub fn with_salt(mut self, salt: u64) -> Self {
        self.salt = salt;
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Builds the forest for `leaf_count` leaves.
    ///
    /// Pairable nodes of each level are joined left to right under a new
    /// parent one level up. An unpaired trailing node has no partner of equal
    /// height left: it moves up into the next row unchanged and becomes the
    /// root of its tree. The last remaining pairable node is the final root,
    /// so the root count equals the number of set bits in `leaf_count`.
    #[instrument(level = "debug", skip(self), fields(salt = self.salt))]
    pub fn build(&self, leaf_count: usize) -> Forest {
        if leaf_count == 0 {
            return Forest::empty().with_salt(self.salt);
        }

        let mut arena = ForestArena::with_capacity(leaf_count.saturating_mul(2));
        let mut pairable: Vec<_> = (0..leaf_count)
            .map(|i| {
                arena.insert_leaf(
                    NodeId::Leaf(i),
                    self.canvas.position(0, i, leaf_count),
                    leaf_fingerprint(i, self.salt),
                )
            })
            .collect();

        let mut roots = Vec::new();
        let mut internal = 0;
        let mut level = 1;

        while pairable.len() > 1 {
            let pairs = pairable.len() / 2;
            let row_len = pairable.len().div_ceil(2);
            let mut next = Vec::with_capacity(pairs);

            for (slot, chunk) in pairable.chunks(2).enumerate() {
                let position = self.canvas.position(level, slot, row_len);
                match chunk {
                    &[left, right] => {
                        let parent =
                            arena.join(left, right, NodeId::Internal(internal), level, position);
                        internal += 1;
                        next.push(parent);
                    }
                    &[odd] => {
                        arena.promote(odd, level, position);
                        roots.push(odd);
                    }
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                }
            }

            debug!(level, pairs, promoted = row_len - pairs, "level folded");
            pairable = next;
            level += 1;
        }
        roots.extend(pairable);

        // Largest tree first: the last root found spans the most leaves.
        for &root in roots.iter().rev() {
            arena.mark_root(root);
        }

        let forest = arena.freeze(self.salt);
        debug_assert!(
            forest.validate().is_ok(),
            "forest invariants violated: {:?}",
            forest.validate()
        );
        forest
    }
}
