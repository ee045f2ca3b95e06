use geo_types::Coord;
use serde::{Deserialize, Serialize};

use super::viewport::Pixel;

/// The vertex a context menu was opened on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MenuTarget {
    pub index: usize,
    #[serde(with = "crate::models::lon_lat")]
    pub position: Coord<f64>,
}

/// Right-click menu over the map. Only two states: hidden, or shown at the
/// click pixel for one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContextMenu {
    #[default]
    Hidden,
    Visible { pixel: Pixel, target: MenuTarget },
}

impl ContextMenu {
    /// A right click shows the menu if it landed on a vertex, otherwise hides it.
    pub fn right_click(&mut self, pixel: Pixel, hit: Option<MenuTarget>) {
        *self = match hit {
            Some(target) => Self::Visible { pixel, target },
            None => Self::Hidden,
        };
    }

    /// Any left click on the map dismisses the menu.
    pub fn click(&mut self) {
        *self = Self::Hidden;
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible { .. })
    }

    pub fn target(&self) -> Option<MenuTarget> {
        match self {
            Self::Visible { target, .. } => Some(*target),
            Self::Hidden => None,
        }
    }

    /// Hide the menu and hand out its target, for the delete action.
    pub fn take_target(&mut self) -> Option<MenuTarget> {
        let target = self.target();
        *self = Self::Hidden;
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> MenuTarget {
        MenuTarget {
            index: 2,
            position: Coord { x: 3.0, y: 3.0 },
        }
    }

    #[test]
    fn starts_hidden() {
        assert_eq!(ContextMenu::default(), ContextMenu::Hidden);
    }

    #[test]
    fn right_click_on_vertex_shows_menu_at_pixel() {
        let mut menu = ContextMenu::default();
        menu.right_click(Pixel::new(10.0, 20.0), Some(target()));
        assert_eq!(
            menu,
            ContextMenu::Visible {
                pixel: Pixel::new(10.0, 20.0),
                target: target()
            }
        );
    }

    #[test]
    fn right_click_elsewhere_hides_menu() {
        let mut menu = ContextMenu::default();
        menu.right_click(Pixel::new(10.0, 20.0), Some(target()));
        menu.right_click(Pixel::new(50.0, 50.0), None);
        assert!(!menu.is_visible());
    }

    #[test]
    fn click_hides_menu() {
        let mut menu = ContextMenu::default();
        menu.right_click(Pixel::new(1.0, 1.0), Some(target()));
        menu.click();
        assert!(!menu.is_visible());
    }

    #[test]
    fn take_target_hides_and_returns_target() {
        let mut menu = ContextMenu::default();
        menu.right_click(Pixel::new(1.0, 1.0), Some(target()));
        assert_eq!(menu.take_target(), Some(target()));
        assert!(!menu.is_visible());
        assert_eq!(menu.take_target(), None);
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(ContextMenu::Hidden).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "hidden" }));
    }
}
