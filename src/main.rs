//! # Tandem Repeat HMM Aligner (trhmm)
//! trhmm scores how well a sequencing read matches a repeating motif by
//! aligning the read against an endlessly repeating copy of the motif with
//! a log-space profile HMM, and prints the optimal alignment path.
//!
//! trhmm can be run like so:
//! ```bash
//!  ./trhmm --motif CAG \
//!          --read CAGCAGCAGTTGTTG \
//!          --quals "IIIIIIIIIIIIIII"
//! ```

use cli::{get_cli_params, handle_error_and_exit};
use std::time;
use trhmm::hmm::{render, Aligner, TransitionMatrix};
mod cli;

fn main() {
    let params = get_cli_params();

    log::info!(
        "Running {}-{}",
        env!("CARGO_PKG_NAME"),
        *crate::cli::FULL_VERSION
    );
    let start_timer = time::Instant::now();

    let transitions = if params.ins_to_match {
        TransitionMatrix::with_ins_to_match(&params.priors)
    } else {
        TransitionMatrix::new(&params.priors)
    };

    let mut aligner = Aligner::with_transitions(params.motif.as_bytes(), transitions)
        .unwrap_or_else(|err| handle_error_and_exit(err.to_string()));

    let quals = params
        .quals
        .clone()
        .unwrap_or_else(|| "I".repeat(params.read.len()));
    if let Err(err) = aligner.align(params.read.as_bytes(), quals.as_bytes()) {
        handle_error_and_exit(err.to_string());
    }

    let read = params.read.as_bytes();
    let path = aligner.optimal_path();
    log::debug!("optimal path: {}", render::path_to_string(path));

    println!("{}", render::render_alignment(aligner.motif(), read, path));
    println!();
    println!("ops         : {}", render::cigar_ops(aligner.motif(), read, path));
    println!("score       : {:.4}", aligner.optimal_score());
    println!("end state   : {}", aligner.optimal_state());
    println!("path length : {}", path.len());
    println!("motif wraps : {}", aligner.motif_wraps());

    log::info!("Total execution time: {:?}", start_timer.elapsed());
    log::info!("{} end", env!("CARGO_PKG_NAME"));
}
