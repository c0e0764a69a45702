//! Rules engine backed by shakmaty.
//!
//! Positions are FEN strings; moves arrive in UCI coordinate form and leave
//! with SAN notation plus the resulting FEN.

use shakmaty::{
    CastlingMode, Chess, EnPassantMode, Move, Position, fen::Fen, san::San, uci::UciMove,
};

use crate::{
    Result,
    error::Error,
    ports::{AppliedMove, CandidateMove, MoveRequest, RulesEngine},
};

/// Standard chess rules via shakmaty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyEngine;

impl ShakmatyEngine {
    pub fn new() -> Self {
        Self
    }

    fn parse_position(&self, position: &str) -> Result<Chess> {
        let invalid = |reason: String| Error::InvalidPosition {
            position: position.to_string(),
            reason,
        };
        let fen: Fen = position.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))
    }

    fn candidate(&self, position: &Chess, m: &Move) -> Result<CandidateMove> {
        let san = San::from_move(position, m);
        let uci = UciMove::from_move(m, CastlingMode::Standard);
        Ok(CandidateMove {
            san: san.to_string(),
            move_code: uci.to_string().parse()?,
        })
    }
}

impl RulesEngine for ShakmatyEngine {
    fn legal_moves(&self, position: &str) -> Result<Vec<CandidateMove>> {
        let chess = self.parse_position(position)?;
        chess
            .legal_moves()
            .iter()
            .map(|m| self.candidate(&chess, m))
            .collect()
    }

    fn apply_move(&self, position: &str, request: &MoveRequest) -> Result<AppliedMove> {
        let chess = self.parse_position(position)?;
        let illegal = |reason: &str| Error::IllegalMove {
            request: request.to_string(),
            reason: reason.to_string(),
        };

        let uci: UciMove = request
            .to_string()
            .parse()
            .map_err(|_| illegal("unreadable coordinate move"))?;
        let m = uci
            .to_move(&chess)
            .map_err(|_| illegal("not legal in this position"))?;
        if !chess.is_legal(&m) {
            return Err(illegal("not legal in this position"));
        }

        // SAN depends on the position before the move
        let CandidateMove { san, move_code } = self.candidate(&chess, &m)?;
        let next = chess
            .play(&m)
            .map_err(|_| illegal("rejected while playing"))?;

        Ok(AppliedMove {
            san,
            move_code,
            position: Fen::from_position(next, EnPassantMode::Legal).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn request(code: &str) -> MoveRequest {
        code.parse().unwrap()
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let moves = ShakmatyEngine::new().legal_moves(START).unwrap();
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().any(|m| m.san == "Nf3" && m.move_code.to_string() == "g1f3"));
    }

    #[test]
    fn applies_legal_move() {
        let applied = ShakmatyEngine::new()
            .apply_move(START, &request("e2e4"))
            .unwrap();
        assert_eq!(applied.san, "e4");
        assert_eq!(applied.move_code.to_string(), "e2e4");
        assert_eq!(
            applied.position,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn rejects_illegal_move() {
        let err = ShakmatyEngine::new()
            .apply_move(START, &request("e2e5"))
            .unwrap_err();
        assert!(matches!(err, Error::IllegalMove { request, .. } if request == "e2e5"));
    }

    #[test]
    fn rejects_unreadable_position() {
        let err = ShakmatyEngine::new().legal_moves("not a fen").unwrap_err();
        assert!(matches!(err, Error::InvalidPosition { .. }));
    }

    #[test]
    fn reports_promotion_notation() {
        let applied = ShakmatyEngine::new()
            .apply_move("8/P7/8/8/8/8/8/k6K w - - 0 1", &request("a7a8q"))
            .unwrap();
        assert_eq!(applied.san, "a8=Q");
        assert_eq!(applied.move_code.to_string(), "a7a8q");
    }
}
