//! State combiners: how a group of source states becomes one result state.
//!
//! Determinization, epsilon elimination and minimization all build result
//! states from non-empty [`StateSet`]s of source states. The combiner
//! picks the label of each result state:
//!
//! - [`SetCombiner`] keeps the set itself, so every result state can be
//!   traced back to its sources.
//! - [`Renumber`] hands out fresh sequential ids for compact machines.
//! - Any `FnMut(&StateSet) -> L` closure works as an ad-hoc combiner.

use super::StateSet;

pub trait StateCombiner {
    type Label;

    /// Produces the label for a result state built from `members`.
    fn combine(&mut self, members: &StateSet) -> Self::Label;
}

/// Labels each result state with the set of source states it stands for.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetCombiner;

impl StateCombiner for SetCombiner {
    type Label = StateSet;

    fn combine(&mut self, members: &StateSet) -> StateSet {
        members.clone()
    }
}

/// Labels result states `0, 1, 2, ...` in creation order.
#[derive(Debug, Clone, Default)]
pub struct Renumber {
    next: u32,
}

impl StateCombiner for Renumber {
    type Label = u32;

    fn combine(&mut self, _members: &StateSet) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl<F, L> StateCombiner for F
where
    F: FnMut(&StateSet) -> L,
{
    type Label = L;

    fn combine(&mut self, members: &StateSet) -> L {
        self(members)
    }
}
