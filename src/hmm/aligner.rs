use super::moves::MoveTable;
use super::qual::QualLookup;
use super::track::{
    Component, State, Track, BOUNDARY_TRACK, NULL_TRACK, NUM_DP_STATES, START_TRACK,
    UNCERTAIN_TRACK,
};
use super::transitions::{Priors, TransitionMatrix};
use arrayvec::ArrayVec;
use std::fmt;

/// Longest read the fixed-size scratch matrices can hold.
pub const MAX_SEQ_LEN: usize = 256;

/// Longest supported motif; one less than the matrix dimension so the
/// synthetic traceback seed position (motif length + 1) stays in range.
pub const MAX_MOTIF_LEN: usize = MAX_SEQ_LEN - 1;

const DIM: usize = MAX_SEQ_LEN + 1;
const PATH_CAPACITY: usize = MAX_SEQ_LEN * 4;

/// Phred+33 quality encoding offset.
const QUAL_OFFSET: u8 = 33;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    EmptyMotif,
    MotifTooLong { len: usize, max: usize },
    ReadTooLong { len: usize, max: usize },
    QualLenMismatch { read_len: usize, qual_len: usize },
    BrokenTraceback { probe_pos: usize, read_pos: usize },
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::EmptyMotif => write!(f, "Motif must not be empty"),
            AlignError::MotifTooLong { len, max } => {
                write!(f, "Motif of length {} exceeds the supported {}", len, max)
            }
            AlignError::ReadTooLong { len, max } => {
                write!(f, "Read of length {} exceeds the supported {}", len, max)
            }
            AlignError::QualLenMismatch {
                read_len,
                qual_len,
            } => write!(
                f,
                "Quality string of length {} does not match read length {}",
                qual_len, read_len
            ),
            AlignError::BrokenTraceback {
                probe_pos,
                read_pos,
            } => write!(
                f,
                "Traceback failed to reach the origin (stalled at probe {}, read {})",
                probe_pos, read_pos
            ),
        }
    }
}

impl std::error::Error for AlignError {}

/// Dense (probe, read) matrix of the fixed maximum dimension, allocated once
/// and overwritten in place on every alignment.
#[derive(Clone)]
struct Grid<T> {
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    fn new(fill: T) -> Grid<T> {
        Grid {
            cells: vec![fill; DIM * DIM],
        }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        self.cells[i * DIM + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: T) {
        self.cells[i * DIM + j] = value;
    }
}

/// Base-match requirement of a candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveKind {
    Match,
    ReadOnly,
    ProbeOnly,
}

/// Running maximum over the candidate moves of one cell; ties keep the
/// first-seen candidate.
struct Candidate {
    score: f64,
    track: Track,
}

impl Candidate {
    fn unset() -> Candidate {
        Candidate {
            score: f64::NEG_INFINITY,
            track: NULL_TRACK,
        }
    }
}

/// Log-space Viterbi aligner of a read against an endlessly repeating motif.
///
/// The probe axis of the dynamic program walks synthetic repeat-cycle
/// positions bounded by the read length; the read axis walks the input.
/// One instance owns all scratch state and supports one alignment at a
/// time; the intended multi-worker pattern is an instance per thread.
pub struct Aligner {
    motif: Vec<u8>,
    mlen: usize,
    transitions: TransitionMatrix,
    moves: MoveTable,
    lookup: QualLookup,

    scores: [Grid<f64>; NUM_DP_STATES],
    tracks: [Grid<Track>; NUM_DP_STATES],

    read: Vec<u8>,
    qual: Vec<u8>,
    rlen: usize,
    plen: usize,

    optimal_score: f64,
    optimal_track: Track,
    optimal_state: State,
    optimal_probe_len: usize,
    path: ArrayVec<Track, PATH_CAPACITY>,
    traced: bool,
}

impl Aligner {
    pub fn new(motif: &[u8]) -> Result<Aligner, AlignError> {
        Self::build(
            motif,
            TransitionMatrix::new(&Priors::default()),
            QualLookup::new(),
        )
    }

    /// Constructor with a custom quality conversion table.
    pub fn with_qual_lookup(motif: &[u8], lookup: QualLookup) -> Result<Aligner, AlignError> {
        Self::build(motif, TransitionMatrix::new(&Priors::default()), lookup)
    }

    /// Constructor with custom transition probabilities.
    pub fn with_transitions(
        motif: &[u8],
        transitions: TransitionMatrix,
    ) -> Result<Aligner, AlignError> {
        Self::build(motif, transitions, QualLookup::new())
    }

    fn build(
        motif: &[u8],
        transitions: TransitionMatrix,
        lookup: QualLookup,
    ) -> Result<Aligner, AlignError> {
        if motif.is_empty() {
            return Err(AlignError::EmptyMotif);
        }
        if motif.len() > MAX_MOTIF_LEN {
            return Err(AlignError::MotifTooLong {
                len: motif.len(),
                max: MAX_MOTIF_LEN,
            });
        }

        let scores = [(); NUM_DP_STATES].map(|_| Grid::new(f64::NEG_INFINITY));
        let mut tracks = [(); NUM_DP_STATES].map(|_| Grid::new(UNCERTAIN_TRACK));

        // The Start matrix carries no computed back-pointers; every cell but
        // the origin is the null sentinel. The other matrices get unmodeled
        // boundary rows and columns.
        tracks[State::Start as usize] = Grid::new(NULL_TRACK);
        for state in [State::Match, State::Del, State::Ins, State::Tail] {
            for k in 0..DIM {
                tracks[state as usize].set(0, k, BOUNDARY_TRACK);
                tracks[state as usize].set(k, 0, BOUNDARY_TRACK);
            }
        }

        let mut aligner = Aligner {
            mlen: motif.len(),
            motif: motif.to_vec(),
            moves: MoveTable::new(motif.len()),
            transitions,
            lookup,
            scores,
            tracks,
            read: Vec::with_capacity(MAX_SEQ_LEN),
            qual: Vec::with_capacity(MAX_SEQ_LEN),
            rlen: 0,
            plen: 0,
            optimal_score: f64::NEG_INFINITY,
            optimal_track: NULL_TRACK,
            optimal_state: State::Tbd,
            optimal_probe_len: 0,
            path: ArrayVec::new(),
            traced: false,
        };

        aligner.scores[State::Start as usize].set(0, 0, 0.0);
        aligner.tracks[State::Start as usize].set(0, 0, START_TRACK);
        Ok(aligner)
    }

    /// Aligns `read` against the repeating motif and records the optimal
    /// path; results are exposed through the accessors below. `quals` must
    /// be the phred+33 encoded base qualities of the read.
    pub fn align(&mut self, read: &[u8], quals: &[u8]) -> Result<(), AlignError> {
        self.traced = false;

        if read.len() > MAX_SEQ_LEN {
            return Err(AlignError::ReadTooLong {
                len: read.len(),
                max: MAX_SEQ_LEN,
            });
        }
        if quals.len() != read.len() {
            return Err(AlignError::QualLenMismatch {
                read_len: read.len(),
                qual_len: quals.len(),
            });
        }

        self.read.clear();
        self.read.extend_from_slice(read);
        self.qual.clear();
        self.qual.extend_from_slice(quals);
        self.rlen = read.len();
        self.plen = self.rlen;

        for i in 1..=self.plen {
            for j in 1..=self.rlen {
                self.fill_cell(i, j);
            }
        }

        self.trace_path()
    }

    fn fill_cell(&mut self, i: usize, j: usize) {
        use State::{Del, Ins, Match, Start, Tail};

        let mut best = Candidate::unset();
        for from in [Start, Match, Del, Ins] {
            self.score_move(from, Match, i - 1, j - 1, MoveKind::Match, &mut best);
        }
        self.scores[Match as usize].set(i, j, best.score);
        self.tracks[Match as usize].set(i, j, best.track);

        let mut best = Candidate::unset();
        for from in [Start, Match, Del] {
            self.score_move(from, Del, i - 1, j, MoveKind::ProbeOnly, &mut best);
        }
        self.scores[Del as usize].set(i, j, best.score);
        self.tracks[Del as usize].set(i, j, best.track);

        let mut best = Candidate::unset();
        for from in [Start, Match, Ins] {
            self.score_move(from, Ins, i, j - 1, MoveKind::ReadOnly, &mut best);
        }
        self.scores[Ins as usize].set(i, j, best.score);
        self.tracks[Ins as usize].set(i, j, best.track);

        let mut best = Candidate::unset();
        for from in [Match, Del, Ins, Tail] {
            self.score_move(from, Tail, i, j - 1, MoveKind::ReadOnly, &mut best);
        }
        self.scores[Tail as usize].set(i, j, best.score);
        self.tracks[Tail as usize].set(i, j, best.track);
    }

    /// Scores extending a path that ends in `from` at (pi, pj) into `to`,
    /// folding the result into the running maximum. For `MoveKind::Match`
    /// the consumed read base is the one at column pj + 1, i.e. index pj.
    fn score_move(
        &self,
        from: State,
        to: State,
        pi: usize,
        pj: usize,
        kind: MoveKind,
        best: &mut Candidate,
    ) {
        let prev = self.tracks[from as usize].get(pi, pj);
        let track = self.moves.apply(from, to, prev);

        let mut emission = 0.0;
        let mut validity = 0.0;
        match track {
            None => validity = f64::NEG_INFINITY,
            Some(t) if kind == MoveKind::Match => {
                let probe_base = self.motif[t.pos as usize - 1];
                let phred = self.qual[pj].saturating_sub(QUAL_OFFSET);
                emission = self
                    .lookup
                    .log10_emission_odds(probe_base, self.read[pj], phred);
            }
            Some(_) => {}
        }

        let score =
            self.scores[from as usize].get(pi, pj) + self.transitions.lp(from, to) + emission + validity;

        if score > best.score {
            best.score = score;
            best.track = track.unwrap_or(NULL_TRACK);
        }
    }

    /// Finds the best-scoring terminal cell in the final read column and
    /// walks the stored back-pointers to the origin, reversing them into
    /// the optimal path.
    fn trace_path(&mut self) -> Result<(), AlignError> {
        let tail = State::Tail as usize;

        self.optimal_score = f64::NEG_INFINITY;
        self.optimal_track = NULL_TRACK;
        self.optimal_state = State::Tbd;
        self.optimal_probe_len = 0;
        for i in 0..=self.plen {
            let score = self.scores[tail].get(i, self.rlen);
            if score >= self.optimal_score {
                self.optimal_score = score;
                self.optimal_track = self.tracks[tail].get(i, self.rlen);
                self.optimal_state = State::Tail;
                self.optimal_probe_len = i;
            }
        }

        self.path.clear();
        if self.optimal_score == f64::NEG_INFINITY {
            // Nothing reaches the terminal state (e.g. an empty read, or one
            // too short to leave the repeat run); there is no path to trace.
            self.traced = true;
            return Ok(());
        }

        let mut i = self.optimal_probe_len;
        let mut j = self.rlen;
        let mut last = Track {
            state: self.optimal_state,
            component: Component::Motif,
            copies: 0,
            pos: self.mlen as u16 + 1,
        };

        loop {
            let consumed = last.state;
            let broken = AlignError::BrokenTraceback {
                probe_pos: i,
                read_pos: j,
            };

            let Some(matrix) = consumed.dp_index() else {
                return Err(broken);
            };
            last = self.tracks[matrix].get(i, j);
            if self.path.try_push(last.with_state(consumed)).is_err() {
                return Err(broken);
            }

            match consumed {
                State::Match if i > 0 && j > 0 => {
                    i -= 1;
                    j -= 1;
                }
                State::Del if i > 0 => i -= 1,
                State::Ins | State::Tail if j > 0 => j -= 1,
                _ => return Err(broken),
            }

            if last.state == State::Start {
                break;
            }
        }

        self.path.reverse();
        self.traced = true;
        Ok(())
    }

    pub fn motif(&self) -> &[u8] {
        &self.motif
    }

    pub fn optimal_score(&self) -> f64 {
        self.optimal_score
    }

    pub fn optimal_state(&self) -> State {
        self.optimal_state
    }

    pub fn optimal_track(&self) -> Track {
        self.optimal_track
    }

    /// Number of probe positions the optimal alignment spans.
    pub fn optimal_probe_len(&self) -> usize {
        self.optimal_probe_len
    }

    /// The traced path, one track per consumed cell; empty until a
    /// successful [`Aligner::align`] call.
    pub fn optimal_path(&self) -> &[Track] {
        if self.traced {
            &self.path
        } else {
            &[]
        }
    }

    /// How many times the optimal path wrapped around the motif.
    pub fn motif_wraps(&self) -> usize {
        self.optimal_path()
            .iter()
            .map(|t| t.copies)
            .max()
            .unwrap_or(0) as usize
    }
}
