#![no_main]
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use rookery::chess::board::Board;
use rookery::chess::scanner;
use shakmaty::{CastlingMode, Chess, Position};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(board) = Board::from_fen(input) else {
        return;
    };
    let Ok(shakmaty_setup) = format!("{board} 1").parse::<shakmaty::fen::Fen>() else {
        return;
    };
    // Positions shakmaty considers impossible (e.g. the side not to move is in
    // check) are accepted here.
    let Ok(shakmaty_position) = shakmaty_setup.into_position::<Chess>(CastlingMode::Standard)
    else {
        return;
    };
    assert_eq!(
        scanner::legal_moves(&board)
            .iter()
            .map(|m| m.to_string())
            .sorted()
            .collect::<Vec<_>>(),
        shakmaty_position
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string()[..4].to_string())
            .sorted()
            .dedup()
            .collect::<Vec<_>>()
    );
});
