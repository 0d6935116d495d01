//! Keeping the page view, the caret and the document in step while the
//! user types.

pub mod cursor;
pub mod debounce;
pub mod session;
pub mod sync;

pub use cursor::{
    CanonicalOffset, CursorAddress, Selection, SelectionSurface, SurfacePoint, carry,
    from_canonical, resolve, restore_cursor, save_cursor, to_canonical,
};
pub use debounce::{DEFAULT_QUIET_PERIOD, Debouncer};
pub use session::{EditSurface, EditorSession, ReflowOutcome};
pub use sync::{flatten, flatten_markup, reflow, split};
