#![no_main]
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use rookery::chess::board::Board;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(board) = Board::try_from(input) else {
        return;
    };
    board.assert_consistent();
    let encoded = board.to_string();
    let decoded = Board::try_from(encoded.as_str())
        .expect("encoded position should be decoded back");
    assert_eq!(decoded.to_string(), encoded);
    assert_eq!(decoded.state(), board.state());
});
