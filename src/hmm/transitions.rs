use super::track::State;

/// States covered by the transition table (Start through End).
pub const NUM_STATES: usize = 6;

/// Scalar priors of the transition model.
///
/// `delta` is the indel-open rate, `epsilon` the per-base error rate, `tau`
/// the repeat-termination rate and `eta` the read-boundary rate of the null
/// model that every transition probability is normalized against.
#[derive(Debug, Clone, PartialEq)]
pub struct Priors {
    pub delta: f64,
    pub epsilon: f64,
    pub tau: f64,
    pub eta: f64,
}

impl Default for Priors {
    fn default() -> Self {
        Priors {
            delta: 0.001,
            epsilon: 0.05,
            tau: 0.01,
            eta: 0.01,
        }
    }
}

/// Fixed state-by-state log10 transition probabilities; disallowed pairs
/// are negative infinity. Built once, immutable afterwards.
#[derive(Debug, Clone)]
pub struct TransitionMatrix {
    lps: [[f64; NUM_STATES]; NUM_STATES],
}

impl TransitionMatrix {
    /// Ins cannot hand back to Match here; insertions dead-end into the
    /// unmodeled tail. Use [`TransitionMatrix::with_ins_to_match`] to lift
    /// that restriction.
    pub fn new(priors: &Priors) -> TransitionMatrix {
        Self::build(priors, false)
    }

    /// Variant that allows matching to resume after an insertion, scored
    /// like the Del-to-Match edge.
    pub fn with_ins_to_match(priors: &Priors) -> TransitionMatrix {
        Self::build(priors, true)
    }

    fn build(priors: &Priors, ins_to_match: bool) -> TransitionMatrix {
        let Priors {
            delta,
            epsilon,
            tau,
            eta,
        } = *priors;

        let (s, m, d, i, z) = (
            State::Start as usize,
            State::Match as usize,
            State::Del as usize,
            State::Ins as usize,
            State::Tail as usize,
        );

        let mut lps = [[f64::NEG_INFINITY; NUM_STATES]; NUM_STATES];

        lps[s][m] = ((1.0 - 2.0 * delta - tau) / (eta * (1.0 - eta) * (1.0 - eta))).log10();
        lps[m][m] = ((1.0 - 2.0 * delta - tau) / ((1.0 - eta) * (1.0 - eta))).log10();
        lps[d][m] = ((1.0 - epsilon - tau) / ((1.0 - eta) * (1.0 - eta))).log10();
        if ins_to_match {
            lps[i][m] = lps[d][m];
        }

        lps[s][d] = (delta / (eta * (1.0 - eta))).log10();
        lps[m][d] = (delta / (1.0 - eta)).log10();
        lps[d][d] = (delta / (1.0 - eta)).log10();

        lps[s][i] = (delta / (eta * (1.0 - eta))).log10();
        lps[m][i] = (delta / (1.0 - eta)).log10();
        lps[i][i] = (delta / (1.0 - eta)).log10();

        lps[m][z] = (tau / (eta * (1.0 - eta))).log10();
        lps[d][z] = (tau / (eta * (1.0 - eta))).log10();
        lps[i][z] = (tau / (eta * (1.0 - eta))).log10();
        lps[z][z] = 0.0;

        TransitionMatrix { lps }
    }

    pub fn lp(&self, from: State, to: State) -> f64 {
        self.lps[from as usize][to as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use State::{Del, End, Ins, Match, Start, Tail};

    #[test]
    fn entries_follow_the_closed_form_expressions() {
        let priors = Priors::default();
        let tm = TransitionMatrix::new(&priors);
        let no_end: f64 = 0.99 * 0.99; // (1 - eta)^2

        assert_relative_eq!(tm.lp(Start, Match), (0.988 / (0.01 * no_end)).log10());
        assert_relative_eq!(tm.lp(Match, Match), (0.988 / no_end).log10());
        assert_relative_eq!(tm.lp(Del, Match), (0.94 / no_end).log10());
        assert_relative_eq!(tm.lp(Start, Del), (0.001_f64 / (0.01 * 0.99)).log10());
        assert_relative_eq!(tm.lp(Match, Del), (0.001_f64 / 0.99).log10());
        assert_relative_eq!(tm.lp(Match, Tail), (0.01_f64 / (0.01 * 0.99)).log10());
        assert_relative_eq!(tm.lp(Tail, Tail), 0.0);
    }

    #[test]
    fn disallowed_transitions_are_negative_infinity() {
        let tm = TransitionMatrix::new(&Priors::default());
        assert_eq!(tm.lp(Ins, Match), f64::NEG_INFINITY);
        assert_eq!(tm.lp(Tail, Match), f64::NEG_INFINITY);
        assert_eq!(tm.lp(Del, Ins), f64::NEG_INFINITY);
        assert_eq!(tm.lp(Start, Tail), f64::NEG_INFINITY);
        assert_eq!(tm.lp(Match, Start), f64::NEG_INFINITY);
        assert_eq!(tm.lp(End, End), f64::NEG_INFINITY);
    }

    #[test]
    fn ins_to_match_variant_mirrors_del_to_match() {
        let priors = Priors::default();
        let tm = TransitionMatrix::with_ins_to_match(&priors);
        assert_eq!(tm.lp(Ins, Match), tm.lp(Del, Match));
        assert!(tm.lp(Ins, Match).is_finite());
    }

    /// The factor of the read-boundary null model that an entry was divided
    /// by; multiplying it back recovers the underlying model probability.
    fn null_factor(from: State, to: State, eta: f64) -> f64 {
        match to {
            Match if from == Start => eta * (1.0 - eta) * (1.0 - eta),
            Match => (1.0 - eta) * (1.0 - eta),
            Del | Ins if from == Start => eta * (1.0 - eta),
            Del | Ins => 1.0 - eta,
            Tail if from == Tail => 1.0,
            Tail => eta * (1.0 - eta),
            _ => 1.0,
        }
    }

    #[test]
    fn outgoing_mass_is_a_valid_distribution() {
        let priors = Priors::default();
        let eta = priors.eta;
        for tm in [
            TransitionMatrix::new(&priors),
            TransitionMatrix::with_ins_to_match(&priors),
        ] {
            for from in [Start, Match, Del, Ins, Tail] {
                let mass: f64 = [Start, Match, Del, Ins, Tail]
                    .into_iter()
                    .filter(|to| tm.lp(from, *to).is_finite())
                    .map(|to| 10f64.powf(tm.lp(from, to)) * null_factor(from, to, eta))
                    .sum();
                assert!(mass <= 1.0 + 1e-9, "outgoing mass of {from} is {mass}");
                assert!(mass > 0.0, "state {from} has no outgoing mass");
            }
        }
    }
}
