pub mod config;
pub mod drag;
pub mod hit;
pub mod history;
pub mod placement;
pub mod sensor;
pub mod session;
pub mod shortcuts;
pub mod text_edit;

pub use config::EditorConfig;
pub use drag::{DragController, DragOutcome};
pub use history::{HistoryManager, HistoryState};
pub use hit::{BoundsMap, DropSurface};
pub use placement::{DragSource, DropPosition, DropTarget, PlacementResolver, PointerSample};
pub use sensor::{DragSensor, PointerKind, SensorState};
pub use session::EditorSession;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use text_edit::TextEdit;

// Re-export geometry types so hosts don't need a direct kurbo dependency
pub use kurbo::{Point, Rect};
