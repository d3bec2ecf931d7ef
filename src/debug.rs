use std::fmt::Display;

use pleco::{core::score::Score, Player};

use super::consts::PAWN_EG;

/// Which evaluation term produced a recorded score. The first entries line up
/// with `PieceType as usize` so per-piece scores can be stored by type.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Term {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
    Material = 8,
    Imbalance = 9,
    Mobility = 10,
    Threat = 11,
    Passed = 12,
    Space = 13,
    Winnable = 14,
    #[default]
    Total = 15,
}

const TERM_NB: usize = 16;

impl Term {
    /// Rows which are not produced by a single per-color evaluator and so
    /// only have a meaningful difference column.
    fn is_synthetic(self) -> bool {
        matches!(self, Term::Material | Term::Imbalance | Term::Winnable | Term::Total)
    }
}

#[derive(Clone, Copy)]
pub struct Entry {
    white_score: Score,
    black_score: Score,
    term: Term,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            white_score: Score::ZERO,
            black_score: Score::ZERO,
            term: Term::default(),
        }
    }
}

/// Formats a score in pawns, middlegame then endgame.
pub fn score_str(score: Score) -> String {
    format!(
        "{:5.2} {:5.2}",
        to_pawns(score.mg()),
        to_pawns(score.eg())
    )
}

#[inline]
pub fn to_pawns(v: i32) -> f64 {
    v as f64 / PAWN_EG as f64
}

impl Entry {
    pub fn set_type(&mut self, player: Player, val: Score, term: Term) {
        match player {
            Player::White => self.white_score = val,
            Player::Black => self.black_score = val,
        }
        self.term = term;
    }

    pub fn white(&self) -> Score {
        self.white_score
    }

    pub fn black(&self) -> Score {
        self.black_score
    }

    pub fn total(&self) -> Score {
        self.white_score - self.black_score
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.term.is_synthetic() {
            write!(f, " ----  ---- |  ----  ----")?;
        } else {
            write!(f, "{} | {}", score_str(self.white_score), score_str(self.black_score))?;
        }
        write!(f, " | {}", score_str(self.total()))
    }
}

/// Compile-time switch between recording evaluation details and not.
/// `NoTrace` always hands back `None`, so every recording site folds away.
pub trait Tracing<T> {
    fn trace(&mut self) -> Option<&mut T>;

    fn new() -> Self;
}

pub struct NoTrace<T> {
    _t: Option<T>, //Unused, always set to None
}

pub struct Trace<T> {
    t: T,
}

impl<T> Tracing<T> for NoTrace<T> {
    #[inline(always)]
    fn trace(&mut self) -> Option<&mut T> {
        None
    }

    fn new() -> Self {
        NoTrace { _t: None }
    }
}

impl<T> Trace<T> {
    pub fn into_inner(self) -> T {
        self.t
    }
}

pub trait Debugger {
    fn new() -> Self;
}

impl<T: Debugger> Tracing<T> for Trace<T> {
    #[inline(always)]
    fn trace(&mut self) -> Option<&mut T> {
        Some(&mut self.t)
    }

    fn new() -> Self {
        Trace { t: T::new() }
    }
}

/// Per-term record of one traced evaluation.
#[derive(Clone)]
pub struct EvalDebugger {
    evals: [Entry; TERM_NB],
    final_eval: i32,
}

impl Debugger for EvalDebugger {
    fn new() -> Self {
        Self {
            evals: [Entry::default(); TERM_NB],
            final_eval: 0,
        }
    }
}

impl EvalDebugger {
    pub fn set_eval(&mut self, term: Term, player: Player, val: Score) {
        self.evals[term as usize].set_type(player, val, term);
    }

    pub fn set_two_eval(&mut self, term: Term, white_score: Score, black_score: Score) {
        self.evals[term as usize].set_type(Player::White, white_score, term);
        self.evals[term as usize].set_type(Player::Black, black_score, term);
    }

    /// Records a white-relative score for a synthetic row.
    pub fn set_total(&mut self, term: Term, val: Score) {
        self.set_two_eval(term, val, Score::ZERO);
    }

    pub fn eval(&self, term: Term) -> Entry {
        let mut e = self.evals[term as usize];
        e.term = term;
        e
    }

    pub fn set_final_eval(&mut self, v: i32) {
        self.final_eval = v;
    }

    /// White-relative final value, tempo included.
    pub fn final_eval(&self) -> i32 {
        self.final_eval
    }
}

impl Display for EvalDebugger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "     Term    |    White    |    Black    |    Total   ")?;
        writeln!(f, "             |   MG    EG  |   MG    EG  |   MG    EG ")?;
        writeln!(f, " ------------+-------------+-------------+------------")?;
        writeln!(f, "    Material | {}", self.eval(Term::Material))?;
        writeln!(f, "   Imbalance | {}", self.eval(Term::Imbalance))?;
        writeln!(f, "       Pawns | {}", self.eval(Term::Pawn))?;
        writeln!(f, "     Knights | {}", self.eval(Term::Knight))?;
        writeln!(f, "     Bishops | {}", self.eval(Term::Bishop))?;
        writeln!(f, "       Rooks | {}", self.eval(Term::Rook))?;
        writeln!(f, "      Queens | {}", self.eval(Term::Queen))?;
        writeln!(f, "    Mobility | {}", self.eval(Term::Mobility))?;
        writeln!(f, " King safety | {}", self.eval(Term::King))?;
        writeln!(f, "     Threats | {}", self.eval(Term::Threat))?;
        writeln!(f, "      Passed | {}", self.eval(Term::Passed))?;
        writeln!(f, "       Space | {}", self.eval(Term::Space))?;
        writeln!(f, "    Winnable | {}", self.eval(Term::Winnable))?;
        writeln!(f, " ------------+-------------+-------------+------------")?;
        writeln!(f, "       Total | {}", self.eval(Term::Total))?;
        writeln!(f)?;
        writeln!(f, "Final evaluation: {:.2} (white side)", to_pawns(self.final_eval))
    }
}

#[cfg(test)]
mod tests {
    use pleco::Player;

    use super::*;

    #[test]
    fn test_synthetic_rows_hide_sides() {
        let mut dbg = EvalDebugger::new();
        dbg.set_total(Term::Material, Score::new(206, 412));
        dbg.set_two_eval(Term::Threat, Score::new(206, 0), Score::ZERO);

        let material = format!("{}", dbg.eval(Term::Material));
        assert_eq!(material, " ----  ---- |  ----  ---- |  1.00  2.00");

        let threat = format!("{}", dbg.eval(Term::Threat));
        assert_eq!(threat, " 1.00  0.00 |  0.00  0.00 |  1.00  0.00");
    }

    #[test]
    fn test_report_lists_every_row() {
        let mut dbg = EvalDebugger::new();
        dbg.set_eval(Term::Knight, Player::Black, Score::new(-103, 0));
        dbg.set_final_eval(103);

        let report = format!("{dbg}");
        for row in [
            "Material", "Imbalance", "Pawns", "Knights", "Bishops", "Rooks", "Queens",
            "Mobility", "King safety", "Threats", "Passed", "Space", "Winnable", "Total",
        ] {
            assert!(report.contains(row), "missing row {row}");
        }
        assert!(report.contains("Final evaluation: 0.50 (white side)"));
        assert!(report.contains("     Knights |  0.00  0.00 | -0.50  0.00 |  0.50  0.00"));
    }
}
