mod aligner;
mod moves;
mod qual;
pub mod render;
mod track;
mod transitions;

pub use aligner::{AlignError, Aligner, MAX_MOTIF_LEN, MAX_SEQ_LEN};
pub use qual::{QualLookup, MAX_PHRED};
pub use track::{Component, State, Track, NULL_TRACK, START_TRACK};
pub use transitions::{Priors, TransitionMatrix};
