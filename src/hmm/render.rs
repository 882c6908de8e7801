use super::track::{State, Track};
use itertools::Itertools;

/// One operation character per track, bracketed by S and E. Match steps are
/// rendered `M` when the motif and read bases agree and `*` when they do not;
/// the remaining states render as their own symbols.
pub fn cigar_ops(motif: &[u8], read: &[u8], path: &[Track]) -> String {
    let mut ops = String::with_capacity(path.len() + 2);
    ops.push('S');
    let mut j = 1;
    for track in path {
        ops.push(op_symbol(motif, read, track, j));
        if track.state.consumes_read() {
            j += 1;
        }
    }
    ops.push('E');
    ops
}

fn op_symbol(motif: &[u8], read: &[u8], track: &Track, j: usize) -> char {
    match track.state {
        State::Match => {
            if motif[track.pos as usize - 1] == read[j - 1] {
                'M'
            } else {
                '*'
            }
        }
        other => other.symbol(),
    }
}

/// Motif-copy parity per step: `+` on even copies, `o` on odd ones, so
/// consecutive copies are visually distinguishable.
pub fn copy_parity(path: &[Track]) -> String {
    path.iter().map(parity_symbol).collect()
}

fn parity_symbol(track: &Track) -> char {
    match track.state {
        State::Match | State::Del | State::Ins => {
            if track.copies % 2 == 0 {
                '+'
            } else {
                'o'
            }
        }
        _ => ' ',
    }
}

/// Four-line alignment block: motif bases over operation characters over
/// copy parity over read bases, with dashes where a line consumes nothing.
pub fn render_alignment(motif: &[u8], read: &[u8], path: &[Track]) -> String {
    let mut model_line = String::from("Motif:  ");
    let mut ops_line = String::from("       S");
    let mut parity_line = String::from("        ");
    let mut read_line = String::from("Read:   ");

    let mut j = 1;
    for track in path {
        model_line.push(if track.state.consumes_motif() {
            motif[track.pos as usize - 1] as char
        } else {
            '-'
        });
        ops_line.push(op_symbol(motif, read, track, j));
        parity_line.push(parity_symbol(track));
        read_line.push(if track.state.consumes_read() {
            read[j - 1] as char
        } else {
            '-'
        });
        if track.state.consumes_read() {
            j += 1;
        }
    }
    ops_line.push('E');

    [model_line, ops_line, parity_line, read_line].join("\n")
}

/// Space-separated track dump, for debug logging.
pub fn path_to_string(path: &[Track]) -> String {
    path.iter().join(" ")
}
