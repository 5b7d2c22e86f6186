//! Chess rules engine: authoritative board state, legal move generation,
//! special moves (castling, en passant, promotion) and game termination
//! (checkmate, stalemate and draws). For more information, see [README].
//!
//! The crate does not render anything: a front end polls the read accessors
//! of [`chess::game::Game`], forwards clicks to [`chess::game::Game::select`]
//! and answers promotion requests through
//! [`chess::game::PromotionChooser`]. [`interface`] provides a text front end
//! that is used by the `rookery` binary.
//!
//! [README]: https://github.com/rookery-chess/rookery/blob/main/README.md

// Rustdoc lints.
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]

pub mod chess;
pub mod interface;

use shadow_rs::shadow;

shadow!(build);

/// Returns the full version that can be used to identify how the binary was
/// built in the first place.
#[must_use]
pub fn version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the version and the build type on startup.
pub fn print_binary_info() {
    println!("Rookery chess rules engine {}", version());
    println!("Release build: {}", !shadow_rs::is_debug());
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
