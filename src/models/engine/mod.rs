pub mod hit_window;
pub mod note;
pub mod playfield;

pub use hit_window::HitWindow;
pub use note::{Direction, Note, NoteId, NoteSet, NoteState};
pub use playfield::Playfield;
