//! Log-space profile HMM alignment of sequencing reads against tandem
//! repeat motifs.
//!
//! The aligner treats a repeat motif as a circular template that a read can
//! traverse an unbounded number of times, scores the read against it with a
//! Viterbi-style dynamic program over Match/Del/Ins states plus an unmodeled
//! tail, and reconstructs the optimal path by traceback:
//!
//! ```
//! use trhmm::hmm::{render, Aligner};
//!
//! let mut aligner = Aligner::new(b"CAG").unwrap();
//! aligner.align(b"CAGCAGCAGT", b"IIIIIIIIII").unwrap();
//!
//! assert!(aligner.optimal_score() > 0.0);
//! assert_eq!(aligner.motif_wraps(), 2);
//! let ops = render::cigar_ops(aligner.motif(), b"CAGCAGCAGT", aligner.optimal_path());
//! assert_eq!(ops, "SMMMMMMMMMZE");
//! ```

pub mod hmm;
