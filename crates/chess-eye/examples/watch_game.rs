use chess_eye::{load_photo, BoardSession};

#[cfg(feature = "tracing")]
use chess_eye::core::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);

    let mut args = std::env::args().skip(1);
    let (Some(empty), Some(start)) = (args.next(), args.next()) else {
        eprintln!("Usage: watch_game <empty_board> <start_position> <move_photos>...");
        return Ok(());
    };

    let mut session = BoardSession::default();
    session.initialize(&load_photo(empty)?)?;
    session.place_pieces(&load_photo(start)?)?;
    println!("board locked, white plays from the bottom edge");

    for path in args {
        let record = session.observe_move(&load_photo(path)?)?;
        println!("{}  {}", record.notation, session.fen());
    }

    Ok(())
}
