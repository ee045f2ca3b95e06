//! What the user sees and clicks: vertex lists, the context menu, and the
//! viewport math needed to tell which vertex a click landed on.

pub mod context_menu;
pub mod vertex_list;
pub mod viewport;

pub use context_menu::{ContextMenu, MenuTarget};
pub use vertex_list::{render_feature_list, render_vertex_list};
pub use viewport::{MapView, Pixel, VERTEX_RADIUS_PX};
