//! Core engine for a box-sorting puzzle: colored boxes stacked in
//! fixed-capacity containers, moved as same-color runs until every color is
//! consolidated into its own container.
//!
//! The engine ([`gameplay::GameEngine`]) is a synchronous state machine with
//! an explicit two-phase move: a click *accepts* a move and hands back a
//! [`gameplay::SettleToken`]; the presentation layer *settles* it after its
//! own animation delay. The bundled [`renderer`] and binary are a minimal
//! terminal front-end that settles immediately.

pub mod gameplay;
pub mod model;
pub mod renderer;

pub use gameplay::{
    ClickOutcome, EngineConfig, GameEngine, PendingAction, Selection, SettleToken, UndoOutcome,
};
pub use model::{Board, BoxPiece, Container, MoveRecord};
