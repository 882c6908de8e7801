use super::track::{Component, State, Track};

/// Computes the successor track of every legal state-transition edge.
///
/// The motif is treated as a circular template: Match and Del edges advance
/// one motif position, wrapping past the end and bumping the copy counter,
/// while Ins and Tail edges consume only a read base and hold the motif
/// coordinate. A read that has cycled through the motif many times is
/// modeled identically to one that cycled once; the counter is carried for
/// presentation, not for scoring.
#[derive(Debug, Clone)]
pub(crate) struct MoveTable {
    mlen: u16,
}

impl MoveTable {
    pub fn new(mlen: usize) -> MoveTable {
        MoveTable { mlen: mlen as u16 }
    }

    /// `None` when the edge is structurally inapplicable, e.g. when the
    /// predecessor track lies before the origin or outside the model.
    pub fn apply(&self, from: State, to: State, prev: Track) -> Option<Track> {
        use State::{Del, Ins, Match, Start, Tail};
        match (from, to) {
            (Start | Match | Del | Ins, Match) | (Start | Match | Del, Del) => {
                self.step_motif(from, prev)
            }
            (Start | Match | Ins, Ins) | (Match | Del | Ins | Tail, Tail) => {
                self.hold_motif(from, prev)
            }
            _ => None,
        }
    }

    fn step_motif(&self, from: State, prev: Track) -> Option<Track> {
        if !carries_motif_coordinate(prev) {
            return None;
        }
        let (pos, copies) = if prev.pos == self.mlen {
            (1, prev.copies + 1)
        } else {
            (prev.pos + 1, prev.copies)
        };
        Some(Track {
            state: from,
            component: Component::Motif,
            copies,
            pos,
        })
    }

    fn hold_motif(&self, from: State, prev: Track) -> Option<Track> {
        if !carries_motif_coordinate(prev) {
            return None;
        }
        Some(Track {
            state: from,
            component: Component::Read,
            copies: prev.copies,
            pos: prev.pos,
        })
    }
}

/// Boundary and not-yet-computed tracks have no motif coordinate to extend.
/// Read-component tracks do: Ins and Tail hold the position they left off at.
fn carries_motif_coordinate(prev: Track) -> bool {
    matches!(prev.component, Component::Motif | Component::Read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::track::{BOUNDARY_TRACK, NULL_TRACK, START_TRACK, UNCERTAIN_TRACK};

    fn motif_track(state: State, copies: u16, pos: u16) -> Track {
        Track {
            state,
            component: Component::Motif,
            copies,
            pos,
        }
    }

    #[test]
    fn match_moves_advance_one_motif_position() {
        let moves = MoveTable::new(3);
        let prev = motif_track(State::Match, 0, 1);
        let next = moves.apply(State::Match, State::Match, prev).unwrap();
        assert_eq!(next, motif_track(State::Match, 0, 2));
    }

    #[test]
    fn advancing_past_the_motif_end_wraps_and_counts_a_copy() {
        let moves = MoveTable::new(3);
        let prev = motif_track(State::Match, 1, 3);
        let next = moves.apply(State::Match, State::Del, prev).unwrap();
        assert_eq!(next, motif_track(State::Match, 2, 1));
    }

    #[test]
    fn the_origin_advances_to_the_first_motif_base() {
        let moves = MoveTable::new(2);
        let next = moves.apply(State::Start, State::Match, START_TRACK).unwrap();
        assert_eq!(next, motif_track(State::Start, 0, 1));
    }

    #[test]
    fn read_only_moves_hold_the_motif_coordinate() {
        let moves = MoveTable::new(3);
        let prev = motif_track(State::Match, 2, 3);
        let next = moves.apply(State::Match, State::Ins, prev).unwrap();
        assert_eq!(
            next,
            Track {
                state: State::Match,
                component: Component::Read,
                copies: 2,
                pos: 3,
            }
        );

        let held = moves.apply(State::Ins, State::Ins, next).unwrap();
        assert_eq!(held, next.with_state(State::Ins));
    }

    #[test]
    fn moves_from_unmodeled_cells_are_inapplicable() {
        let moves = MoveTable::new(3);
        assert_eq!(moves.apply(State::Match, State::Match, BOUNDARY_TRACK), None);
        assert_eq!(moves.apply(State::Start, State::Del, NULL_TRACK), None);
        assert_eq!(moves.apply(State::Ins, State::Ins, UNCERTAIN_TRACK), None);
    }

    #[test]
    fn edges_outside_the_model_are_inapplicable() {
        let moves = MoveTable::new(3);
        let prev = motif_track(State::Match, 0, 1);
        assert_eq!(moves.apply(State::Start, State::Tail, prev), None);
        assert_eq!(moves.apply(State::Tail, State::Match, prev), None);
        assert_eq!(moves.apply(State::Del, State::Ins, prev), None);
        assert_eq!(moves.apply(State::Ins, State::Del, prev), None);
    }

    #[test]
    fn single_base_motifs_wrap_on_every_advance() {
        let moves = MoveTable::new(1);
        let mut track = moves.apply(State::Start, State::Match, START_TRACK).unwrap();
        assert_eq!((track.copies, track.pos), (0, 1));
        for expected_copies in 1..5 {
            track = moves.apply(State::Match, State::Match, track).unwrap();
            assert_eq!((track.copies, track.pos), (expected_copies, 1));
        }
    }
}
