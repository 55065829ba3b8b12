use super::*;

#[test]
fn test_stone_opponent() {
    assert_eq!(Stone::Black.opponent(), Stone::White);
    assert_eq!(Stone::White.opponent(), Stone::Black);
    assert_eq!(Stone::Empty.opponent(), Stone::Empty);
}

#[test]
fn test_pos_conversion() {
    let pos = Pos::new(7, 7); // Center
    assert_eq!(pos.to_index(), 7 * 15 + 7);
    assert_eq!(Pos::from_index(112), pos);
    assert_eq!(Pos::CENTER, pos);
}

#[test]
fn test_pos_validity() {
    assert!(Pos::is_valid(0, 0));
    assert!(Pos::is_valid(14, 14));
    assert!(!Pos::is_valid(-1, 0));
    assert!(!Pos::is_valid(15, 0));
    assert!(!Pos::is_valid(0, 15));
}

#[test]
fn test_pos_try_new_rejects_out_of_range() {
    assert_eq!(Pos::try_new(3, 4), Ok(Pos::new(3, 4)));
    assert!(matches!(Pos::try_new(15, 0), Err(EngineError::InvalidInput(_))));
    assert!(matches!(Pos::try_new(0, -1), Err(EngineError::InvalidInput(_))));
}

#[test]
fn test_pos_step() {
    let pos = Pos::new(0, 14);
    assert_eq!(pos.step(1, -1, 2), Some(Pos::new(2, 12)));
    assert_eq!(pos.step(0, 1, 1), None);
    assert_eq!(pos.step(-1, 0, 1), None);
}

#[test]
fn test_board_constants() {
    assert_eq!(BOARD_SIZE, 15);
    assert_eq!(TOTAL_CELLS, 225);
}

#[test]
fn test_pos_corner_indices() {
    assert_eq!(Pos::new(0, 0).to_index(), 0);
    assert_eq!(Pos::new(0, 14).to_index(), 14);
    assert_eq!(Pos::new(14, 0).to_index(), 210);
    assert_eq!(Pos::new(14, 14).to_index(), 224);
}

#[test]
fn test_bitboard_iter_last_cell() {
    let mut bb = Bitboard::new();
    bb.set(Pos::new(14, 14));
    bb.set(Pos::new(0, 3));
    let cells: Vec<Pos> = bb.iter_ones().collect();
    assert_eq!(cells, vec![Pos::new(0, 3), Pos::new(14, 14)]);
    assert_eq!(bb.count(), 2);
}

#[test]
fn test_trial_move_reverts_on_drop() {
    let mut board = Board::new();
    board.place_stone(Pos::new(7, 7), Stone::Black);
    let before = board.clone();
    {
        let mut trial = board.trial(Pos::new(7, 8), Stone::White);
        assert_eq!(trial.get(Pos::new(7, 8)), Stone::White);
        let nested = trial.trial(Pos::new(7, 9), Stone::Black);
        assert_eq!(nested.stone_count(), 3);
    }
    assert_eq!(board, before);
}

#[test]
fn test_from_rows_rejects_wrong_shape() {
    let rows = vec![vec![Stone::Empty; BOARD_SIZE]; BOARD_SIZE - 1];
    assert!(matches!(Board::from_rows(&rows), Err(EngineError::InvalidInput(_))));

    let mut rows = vec![vec![Stone::Empty; BOARD_SIZE]; BOARD_SIZE];
    rows[3].push(Stone::Black);
    assert!(matches!(Board::from_rows(&rows), Err(EngineError::InvalidInput(_))));
}

#[test]
fn test_diagram_round_trip() {
    let mut board = Board::new();
    board.place_stone(Pos::new(7, 7), Stone::Black);
    board.place_stone(Pos::new(6, 8), Stone::White);
    let parsed = Board::from_diagram(&board.to_diagram());
    assert_eq!(parsed, Ok(board));
}

#[test]
fn test_from_moves_alternates_and_rejects_repeats() {
    let board = Board::from_moves(&[Pos::new(7, 7), Pos::new(7, 8)]).unwrap();
    assert_eq!(board.get(Pos::new(7, 7)), Stone::Black);
    assert_eq!(board.get(Pos::new(7, 8)), Stone::White);

    let err = Board::from_moves(&[Pos::new(7, 7), Pos::new(7, 7)]);
    assert!(matches!(err, Err(EngineError::InvalidInput(_))));
}

#[test]
fn test_is_full() {
    let mut board = Board::new();
    for idx in 0..TOTAL_CELLS {
        assert!(!board.is_full());
        let stone = if idx % 2 == 0 { Stone::Black } else { Stone::White };
        board.place_stone(Pos::from_index(idx), stone);
    }
    assert!(board.is_full());
    assert_eq!(board.empty_cells().count(), 0);
}
