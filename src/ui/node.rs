//! Immutable UI description tree.
//!
//! Screens describe what they show as a [`Node`] tree assembled with
//! builder calls. Nothing here draws; a frontend walks the tree. Once built,
//! a tree can only be read.

use crate::database::{BeatmapId, BeatmapSetId};

/// RGBA colour, components in `0.0..=1.0`.
pub type Colour = [f32; 4];

pub mod colours {
    use super::Colour;

    pub const WHITE: Colour = [1.0, 1.0, 1.0, 1.0];
    pub const BACKDROP: Colour = [0.0, 0.0, 0.0, 0.5];
    pub const PINK: Colour = rgba8(238, 51, 153, 255);
    pub const YELLOW: Colour = rgba8(255, 217, 102, 255);

    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Colour {
        [
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axes {
    #[default]
    None,
    X,
    Y,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    TopLeft,
    TopCentre,
    TopRight,
    CentreLeft,
    Centre,
    CentreRight,
    BottomLeft,
    BottomCentre,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarginPadding {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    InfoCircle,
}

/// Run of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub bold: bool,
    pub colour: Option<Colour>,
}

impl TextSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            colour: None,
        }
    }

    pub fn bold(text: impl Into<String>, colour: Colour) -> Self {
        Self {
            text: text.into(),
            bold: true,
            colour: Some(colour),
        }
    }
}

/// What activating a node asks its screen to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Play,
    SelectSet(BeatmapSetId),
    SelectBeatmap(BeatmapSetId, BeatmapId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Container,
    Box,
    Scroll,
    Flow {
        direction: FlowDirection,
        spacing: Vec2,
    },
    Button {
        text: String,
    },
    /// Paragraphs of styled spans.
    Text {
        font_size: f32,
        paragraphs: Vec<Vec<TextSpan>>,
    },
    Icon(Icon),
    Dropdown {
        label: String,
        items: Vec<String>,
        selected: Option<usize>,
        notice: Option<String>,
    },
    Checkbox {
        label: String,
        checked: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    name: Option<String>,
    relative_size_axes: Axes,
    relative_position_axes: Axes,
    auto_size_axes: Axes,
    size: Vec2,
    position: Vec2,
    anchor: Anchor,
    origin: Anchor,
    padding: MarginPadding,
    colour: Colour,
    shear: Vec2,
    action: Option<UiAction>,
    children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            relative_size_axes: Axes::None,
            relative_position_axes: Axes::None,
            auto_size_axes: Axes::None,
            size: Vec2::ZERO,
            position: Vec2::ZERO,
            anchor: Anchor::TopLeft,
            origin: Anchor::TopLeft,
            padding: MarginPadding::default(),
            colour: colours::WHITE,
            shear: Vec2::ZERO,
            action: None,
            children: Vec::new(),
        }
    }

    pub fn container() -> Self {
        Self::new(NodeKind::Container)
    }

    pub fn boxed() -> Self {
        Self::new(NodeKind::Box)
    }

    pub fn scroll() -> Self {
        Self::new(NodeKind::Scroll)
    }

    pub fn flow(direction: FlowDirection, spacing: Vec2) -> Self {
        Self::new(NodeKind::Flow { direction, spacing })
    }

    pub fn button(text: impl Into<String>, action: UiAction) -> Self {
        let mut node = Self::new(NodeKind::Button { text: text.into() });
        node.action = Some(action);
        node
    }

    pub fn text(font_size: f32, paragraphs: Vec<Vec<TextSpan>>) -> Self {
        Self::new(NodeKind::Text {
            font_size,
            paragraphs,
        })
    }

    pub fn icon(icon: Icon) -> Self {
        Self::new(NodeKind::Icon(icon))
    }

    pub fn dropdown(
        label: impl Into<String>,
        items: Vec<String>,
        selected: Option<usize>,
        notice: Option<String>,
    ) -> Self {
        Self::new(NodeKind::Dropdown {
            label: label.into(),
            items,
            selected,
            notice,
        })
    }

    pub fn checkbox(label: impl Into<String>, checked: bool) -> Self {
        Self::new(NodeKind::Checkbox {
            label: label.into(),
            checked,
        })
    }

    // Builder setters.

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn relative_size(mut self, axes: Axes) -> Self {
        self.relative_size_axes = axes;
        self
    }

    pub fn relative_position(mut self, axes: Axes) -> Self {
        self.relative_position_axes = axes;
        self
    }

    pub fn auto_size(mut self, axes: Axes) -> Self {
        self.auto_size_axes = axes;
        self
    }

    pub fn size(mut self, x: f32, y: f32) -> Self {
        self.size = Vec2::new(x, y);
        self
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// Sets anchor and origin together, the usual case.
    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self.origin = anchor;
        self
    }

    pub fn padding(mut self, padding: MarginPadding) -> Self {
        self.padding = padding;
        self
    }

    pub fn colour(mut self, colour: Colour) -> Self {
        self.colour = colour;
        self
    }

    pub fn shear(mut self, x: f32, y: f32) -> Self {
        self.shear = Vec2::new(x, y);
        self
    }

    pub fn action(mut self, action: UiAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    // Read access.

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn relative_size_axes(&self) -> Axes {
        self.relative_size_axes
    }

    pub fn relative_position_axes(&self) -> Axes {
        self.relative_position_axes
    }

    pub fn auto_size_axes(&self) -> Axes {
        self.auto_size_axes
    }

    pub fn size_value(&self) -> Vec2 {
        self.size
    }

    pub fn position_value(&self) -> Vec2 {
        self.position
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn origin(&self) -> Anchor {
        self.origin
    }

    pub fn padding_value(&self) -> MarginPadding {
        self.padding
    }

    pub fn colour_value(&self) -> Colour {
        self.colour
    }

    pub fn shear_value(&self) -> Vec2 {
        self.shear
    }

    pub fn action_value(&self) -> Option<UiAction> {
        self.action
    }

    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    /// Depth-first search by name, including `self`.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Every node of the tree in depth-first order, including `self`.
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }

    /// Actions reachable from this subtree, in depth-first order.
    pub fn actions(&self) -> Vec<UiAction> {
        self.descendants()
            .into_iter()
            .filter_map(|n| n.action)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let tree = Node::container()
            .named("root")
            .relative_size(Axes::Both)
            .size(1.0, 1.0)
            .child(Node::boxed().named("backdrop").shear(0.15, 0.0))
            .child(
                Node::flow(FlowDirection::Vertical, Vec2::new(0.0, 25.0))
                    .named("list")
                    .child(Node::button("Play", UiAction::Play).anchored(Anchor::Centre)),
            );

        assert_eq!(tree.descendants().len(), 4);
        assert_eq!(tree.find("backdrop").unwrap().shear_value(), Vec2::new(0.15, 0.0));
        assert!(tree.find("missing").is_none());
        assert_eq!(tree.actions(), vec![UiAction::Play]);

        let list = tree.find("list").unwrap();
        assert_eq!(list.child_nodes()[0].origin(), Anchor::Centre);
    }

    #[test]
    fn test_rgba8_conversion() {
        assert_eq!(colours::rgba8(255, 0, 0, 255), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(colours::BACKDROP[3], 0.5);
    }
}
