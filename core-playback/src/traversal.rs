//! Queue traversal policies
//!
//! A [`QueueTraversal`] decides which queue entry `next()` and `previous()`
//! move to. The session owns the queue and applies the decision; policies are
//! pure functions of a [`TraversalContext`].

use std::sync::Arc;

use crate::queue::Cursor;
use crate::types::RepeatMode;

/// What the policy sees when asked for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalContext {
    pub len: usize,
    pub cursor: Cursor,
    pub repeat: RepeatMode,
    pub shuffle: bool,
}

/// Outcome of a forward move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Play(usize),
    /// Past the last entry with nothing to wrap to.
    EndOfQueue,
}

pub trait QueueTraversal: Send + Sync {
    /// Entry to play after the current one. Never called on an empty queue.
    fn next(&self, ctx: &TraversalContext) -> Step;

    /// Entry to play before the current one. `None` only for an empty queue.
    fn previous(&self, ctx: &TraversalContext) -> Option<usize>;
}

/// Plays the queue in order and ignores the shuffle flag.
///
/// `next()` wraps only with [`RepeatMode::All`]; `previous()` always wraps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialTraversal;

impl QueueTraversal for SequentialTraversal {
    fn next(&self, ctx: &TraversalContext) -> Step {
        if ctx.len == 0 {
            return Step::EndOfQueue;
        }

        let candidate = match ctx.cursor {
            Cursor::Unset => 0,
            Cursor::At(current) => current + 1,
            Cursor::Detached { follower } => follower,
        };

        if candidate < ctx.len {
            Step::Play(candidate)
        } else if ctx.repeat == RepeatMode::All {
            Step::Play(0)
        } else {
            Step::EndOfQueue
        }
    }

    fn previous(&self, ctx: &TraversalContext) -> Option<usize> {
        if ctx.len == 0 {
            return None;
        }

        let anchor = match ctx.cursor {
            Cursor::Unset => 0,
            Cursor::At(current) => current,
            Cursor::Detached { follower } => follower,
        };

        Some(if anchor == 0 || anchor > ctx.len {
            ctx.len - 1
        } else {
            anchor - 1
        })
    }
}

/// Picks a random other entry when shuffle is on; sequential otherwise.
///
/// Shuffled playback never reaches an end of queue.
#[cfg(feature = "shuffle-traversal")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ShuffleTraversal;

#[cfg(feature = "shuffle-traversal")]
impl QueueTraversal for ShuffleTraversal {
    fn next(&self, ctx: &TraversalContext) -> Step {
        use rand::seq::IteratorRandom;

        if !ctx.shuffle {
            return SequentialTraversal.next(ctx);
        }

        let current = match ctx.cursor {
            Cursor::At(current) => Some(current),
            _ => None,
        };

        let mut rng = rand::thread_rng();
        (0..ctx.len)
            .filter(|index| ctx.len == 1 || Some(*index) != current)
            .choose(&mut rng)
            .map(Step::Play)
            .unwrap_or(Step::EndOfQueue)
    }

    fn previous(&self, ctx: &TraversalContext) -> Option<usize> {
        SequentialTraversal.previous(ctx)
    }
}

/// Policy used by `PlaybackSession::new`.
///
/// [`ShuffleTraversal`] when built with `shuffle-traversal`, otherwise
/// [`SequentialTraversal`].
pub fn default_traversal() -> Arc<dyn QueueTraversal> {
    #[cfg(feature = "shuffle-traversal")]
    {
        Arc::new(ShuffleTraversal)
    }
    #[cfg(not(feature = "shuffle-traversal"))]
    {
        Arc::new(SequentialTraversal)
    }
}
