//! One physical game, observed photo by photo.

use chess_eye_calib::{
    quarter_turns_for_start, CalibrationError, CalibrationParams, GridCalibrator,
};
use chess_eye_core::{rotation_about_center, BoardGrid, GrayImage};
use chess_eye_diff::{ChangeScorer, ScoreError, ScoreParams};
use chess_eye_rules::{resolve_move, CastlingRequest, GameState, MoveRecord, NoLegalMove, Square};
use thiserror::Error;

/// Session flow failures, wrapping each stage's own error.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A photo was observed before the grid was calibrated.
    #[error("the session has no calibrated grid yet")]
    NotCalibrated,
    /// A move was observed before the starting position was photographed.
    #[error("no reference photo of the starting position yet")]
    NotStarted,
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Move(#[from] NoLegalMove),
}

/// Digital twin of one game on a physical board.
///
/// Drive it in order: [`BoardSession::initialize`] with a photo of the
/// empty board, [`BoardSession::place_pieces`] once the starting position
/// is set up, then [`BoardSession::observe_move`] after every move. Every
/// failing call leaves the session exactly as it was, so a bad photo can
/// simply be retaken.
pub struct BoardSession {
    calibrator: GridCalibrator,
    scorer: ChangeScorer,
    grid: Option<BoardGrid>,
    empty_photo: Option<GrayImage>,
    reference: Option<GrayImage>,
    game: GameState,
    history: Vec<MoveRecord>,
}

impl Default for BoardSession {
    fn default() -> Self {
        Self::new(CalibrationParams::default(), ScoreParams::default())
    }
}

impl BoardSession {
    pub fn new(calibration: CalibrationParams, scoring: ScoreParams) -> Self {
        Self {
            calibrator: GridCalibrator::new(calibration),
            scorer: ChangeScorer::new(scoring),
            grid: None,
            empty_photo: None,
            reference: None,
            game: GameState::new(),
            history: Vec::new(),
        }
    }

    /// Restore a session from a persisted grid, a rotation-corrected
    /// reference photo of the current position, and the game standing.
    pub fn from_parts(grid: BoardGrid, reference: GrayImage, game: GameState) -> Self {
        Self {
            calibrator: GridCalibrator::new(CalibrationParams::default()),
            scorer: ChangeScorer::new(ScoreParams::default()),
            grid: Some(grid),
            empty_photo: None,
            reference: Some(reference),
            game,
            history: Vec::new(),
        }
    }

    /// Calibrate the board grid from a photo of the empty board. The
    /// photo is kept for the re-calibration that may follow
    /// [`BoardSession::place_pieces`].
    pub fn initialize(&mut self, photo: &GrayImage) -> Result<(), SessionError> {
        let grid = self.calibrator.calibrate(&photo.view())?;
        log::info!("calibrated board grid at {:.1} deg rotation", grid.rotation_deg);
        self.grid = Some(grid);
        self.empty_photo = Some(photo.clone());
        Ok(())
    }

    /// Pin the board orientation from a photo of the starting position
    /// and adopt that photo as the move reference.
    ///
    /// The empty board fixes the grid only up to a quarter turn; the
    /// placed pieces tell which edge is white's. When the orientation
    /// moves, the stored empty-board photo is calibrated once more at the
    /// corrected rotation.
    pub fn place_pieces(&mut self, photo: &GrayImage) -> Result<(), SessionError> {
        let grid = self.grid.as_ref().ok_or(SessionError::NotCalibrated)?;

        let rotated = rotation_about_center(&photo.view(), grid.rotation_deg);
        let turns = quarter_turns_for_start(grid, &rotated.view());
        if turns == 0 {
            self.reference = Some(rotated);
        } else {
            let empty = self.empty_photo.as_ref().ok_or(SessionError::NotCalibrated)?;
            let rotation_deg = grid.rotation_deg + 90.0 * turns as f32;
            log::info!("white plays from another edge, recalibrating at {rotation_deg:.0} deg");
            let regrid = self
                .calibrator
                .calibrate_with_rotation(&empty.view(), rotation_deg)?;
            self.reference = Some(rotation_about_center(&photo.view(), regrid.rotation_deg));
            self.grid = Some(regrid);
        }

        self.game = GameState::new();
        self.history.clear();
        Ok(())
    }

    /// Recover the move played since the last accepted photo, apply it to
    /// the game and adopt the photo as the new reference.
    pub fn observe_move(&mut self, photo: &GrayImage) -> Result<MoveRecord, SessionError> {
        let grid = self.grid.as_ref().ok_or(SessionError::NotCalibrated)?;
        let reference = self.reference.as_ref().ok_or(SessionError::NotStarted)?;

        let rotated = rotation_about_center(&photo.view(), grid.rotation_deg);
        let report = self.scorer.score(&reference.view(), &rotated.view(), grid)?;

        let candidates: Vec<Square> = report
            .candidates
            .iter()
            .filter_map(|c| Square::new(c.rank, c.file))
            .collect();
        let castling = report.castling.map(|sig| CastlingRequest {
            rank: sig.rank,
            rook_file: sig.rook_file,
        });

        let (next, record) = resolve_move(&self.game, &candidates, castling)?;
        self.game = next;
        self.history.push(record.clone());
        self.reference = Some(rotated);
        Ok(record)
    }

    pub fn grid(&self) -> Option<&BoardGrid> {
        self.grid.as_ref()
    }

    pub fn state(&self) -> &GameState {
        &self.game
    }

    pub fn fen(&self) -> String {
        self.game.fen()
    }

    /// Accepted moves, oldest first.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Display crop of the calibrated board area of `photo`.
    pub fn render_board(&self, photo: &GrayImage) -> Result<GrayImage, SessionError> {
        let grid = self.grid.as_ref().ok_or(SessionError::NotCalibrated)?;
        Ok(crate::photo::render_board(grid, &photo.view()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> GrayImage {
        GrayImage::new(64, 64)
    }

    #[test]
    fn moves_cannot_be_observed_before_calibration() {
        let mut session = BoardSession::default();
        let err = session.observe_move(&photo()).unwrap_err();
        assert!(matches!(err, SessionError::NotCalibrated));
    }

    #[test]
    fn pieces_cannot_be_placed_before_calibration() {
        let mut session = BoardSession::default();
        let err = session.place_pieces(&photo()).unwrap_err();
        assert!(matches!(err, SessionError::NotCalibrated));
    }

    #[test]
    fn failed_calibration_keeps_the_session_empty() {
        let mut session = BoardSession::default();
        let err = session.initialize(&photo()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Calibration(CalibrationError::LatticeNotFound { .. })
        ));
        assert!(session.grid().is_none());
        assert!(matches!(
            session.observe_move(&photo()).unwrap_err(),
            SessionError::NotCalibrated
        ));
    }

    #[test]
    fn restored_sessions_start_from_the_given_state() {
        let state = GameState::from_fen("8/8/8/4k3/8/8/4P3/4K3 w - - 3 40").unwrap();
        let session = BoardSession::from_parts(grid_stub(), photo(), state.clone());
        assert_eq!(session.state(), &state);
        assert_eq!(session.fen(), state.fen());
        assert!(session.moves().is_empty());
    }

    fn grid_stub() -> BoardGrid {
        let mut anchors = [[nalgebra::Point2::new(0.0_f32, 0.0); 8]; 8];
        for (r, row) in anchors.iter_mut().enumerate() {
            for (f, a) in row.iter_mut().enumerate() {
                *a = nalgebra::Point2::new(4.0 + f as f32 * 7.0, 60.0 - r as f32 * 7.0);
            }
        }
        BoardGrid {
            anchors,
            cell_w: 7.0,
            cell_h: -7.0,
            rotation_deg: 0.0,
        }
    }
}
