use pleco::{
    core::{
        mono_traits::{BlackType, WhiteType},
        score::Score,
    },
    Board, PieceType, Player,
};

use super::attacks::AttackModel;
use crate::{
    consts::EvalVal,
    debug::{EvalDebugger, Term, Tracing},
    tables::{
        material::{self, Material},
        pawn_table::{self, PawnTable},
    },
};

/// One classical evaluation of one position. Holds the attack tables built
/// for that position; nothing outlives the call to [`white_score`].
///
/// [`white_score`]: ClassicalEvaluator::white_score
pub struct ClassicalEvaluator<'a, T: Tracing<EvalDebugger>> {
    pub(super) board: &'a Board,
    pub(super) tracer: T,
    pub(super) pawns: &'a pawn_table::Entry,
    pub(super) material: &'a material::Entry,
    pub(super) attacks: AttackModel,
    pub(super) mobility: [Score; 2],
    contempt: Score,
}

impl<'a, T: Tracing<EvalDebugger>> ClassicalEvaluator<'a, T> {
    pub fn new(
        board: &'a Board,
        tracer: T,
        pawn_table: &'a mut PawnTable,
        material: &'a mut Material,
        contempt: Score,
    ) -> Self {
        let pawns = pawn_table.probe(board);
        let material = material.probe(board);

        Self {
            board,
            tracer,
            pawns,
            material,
            attacks: AttackModel::new(board, pawns),
            mobility: [Score::ZERO; 2],
            contempt,
        }
    }

    /// The tapered evaluation from White's point of view, before tempo.
    pub fn white_score(&mut self) -> EvalVal {
        let material = self.board.psq();

        let mut score = material + self.material.imbalance() + self.contempt;
        score += self.pawns.pawn_score(Player::White) - self.pawns.pawn_score(Player::Black);

        score += self.piece_terms();

        score += self.king::<WhiteType>() - self.king::<BlackType>();
        score += self.threats::<WhiteType>() - self.threats::<BlackType>();
        score += self.passed::<WhiteType>() - self.passed::<BlackType>();
        score += self.space::<WhiteType>() - self.space::<BlackType>();

        let v = self.winnable(score);

        if let Some(dbg) = self.tracer.trace() {
            dbg.set_total(Term::Material, material);
            dbg.set_total(Term::Imbalance, self.material.imbalance());
            dbg.set_two_eval(
                Term::Pawn,
                self.pawns.pawn_score(Player::White),
                self.pawns.pawn_score(Player::Black),
            );
            dbg.set_two_eval(
                Term::Mobility,
                self.mobility[Player::White as usize],
                self.mobility[Player::Black as usize],
            );
        }

        v
    }

    /// Placement terms of both sides, which also completes the attack maps
    /// and the mobility every later term reads.
    pub(super) fn piece_terms(&mut self) -> Score {
        let mut score = Score::ZERO;
        for piece in [PieceType::N, PieceType::B, PieceType::R, PieceType::Q] {
            score += self.pieces::<WhiteType>(piece) - self.pieces::<BlackType>(piece);
        }
        score + self.mobility[Player::White as usize] - self.mobility[Player::Black as usize]
    }

    pub fn into_tracer(self) -> T {
        self.tracer
    }
}

/// Runs `check` against an evaluator whose attack maps are complete.
#[cfg(test)]
pub(super) fn with_attacks<F>(fen: &str, check: F)
where
    F: FnOnce(&ClassicalEvaluator<crate::debug::NoTrace<EvalDebugger>>),
{
    let board = Board::from_fen(fen).unwrap();
    let mut pawn_table = PawnTable::with_size(1);
    let mut material = Material::with_size(1);
    let mut ev = ClassicalEvaluator::new(
        &board,
        crate::debug::NoTrace::new(),
        &mut pawn_table,
        &mut material,
        Score::ZERO,
    );
    ev.piece_terms();
    check(&ev);
}
