//! Pre-gameplay warning overlays.

use crate::database::{BeatmapOnlineStatus, BeatmapSetInfo};
use crate::ui::{Anchor, Axes, FlowDirection, Icon, Node, TextSpan, Vec2, colours};
use std::time::Duration;

const ICON_SIZE: f32 = 50.0;
const FONT_SIZE: f32 = 25.0;

/// Shown before playing a beatmap that is qualified but not ranked yet.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedWarning {
    display_duration: Duration,
}

impl QualifiedWarning {
    pub const DISPLAY_DURATION: Duration = Duration::from_millis(4000);

    pub fn new() -> Self {
        Self {
            display_duration: Self::DISPLAY_DURATION,
        }
    }

    pub fn applies_to(set: &BeatmapSetInfo) -> bool {
        set.status == BeatmapOnlineStatus::Qualified
    }

    pub fn display_duration(&self) -> Duration {
        self.display_duration
    }

    pub fn paragraphs() -> Vec<Vec<TextSpan>> {
        vec![
            vec![
                TextSpan::plain("This map is in a "),
                TextSpan::bold("qualified state", colours::YELLOW),
                TextSpan::plain("."),
            ],
            vec![TextSpan::plain("No performance points will be awarded.")],
            vec![TextSpan::plain("All scores will be deleted when it is ranked.")],
        ]
    }

    pub fn build(&self) -> Node {
        Node::flow(FlowDirection::Vertical, Vec2::ZERO)
            .named("qualified-warning")
            .anchored(Anchor::Centre)
            .relative_size(Axes::X)
            .auto_size(Axes::Y)
            .size(1.0, 0.0)
            .child(
                Node::icon(Icon::InfoCircle)
                    .colour(colours::YELLOW)
                    .anchored(Anchor::Centre)
                    .size(ICON_SIZE, ICON_SIZE),
            )
            .child(
                Node::text(FONT_SIZE, Self::paragraphs())
                    .named("qualified-text")
                    .relative_size(Axes::X)
                    .auto_size(Axes::Y)
                    .anchored(Anchor::Centre),
            )
    }
}

impl Default for QualifiedWarning {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins the paragraphs of a text node into plain lines.
pub fn plain_text(paragraphs: &[Vec<TextSpan>]) -> Vec<String> {
    paragraphs
        .iter()
        .map(|spans| spans.iter().map(|s| s.text.as_str()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::fixtures::set_with_maps;
    use crate::ui::NodeKind;

    #[test]
    fn test_applies_only_to_qualified_sets() {
        let mut set = set_with_maps(1, 1);
        assert!(!QualifiedWarning::applies_to(&set));
        set.status = BeatmapOnlineStatus::Qualified;
        assert!(QualifiedWarning::applies_to(&set));
    }

    #[test]
    fn test_content() {
        let warning = QualifiedWarning::new();
        assert_eq!(warning.display_duration(), Duration::from_secs(4));

        let node = warning.build();
        let NodeKind::Text { font_size, paragraphs } = node.find("qualified-text").unwrap().kind()
        else {
            panic!("qualified-text is not a text node");
        };
        assert_eq!(*font_size, 25.0);
        assert_eq!(
            plain_text(paragraphs),
            vec![
                "This map is in a qualified state.",
                "No performance points will be awarded.",
                "All scores will be deleted when it is ranked.",
            ]
        );
        assert!(paragraphs[0][1].bold);
        assert!(matches!(node.child_nodes()[0].kind(), NodeKind::Icon(Icon::InfoCircle)));
    }
}
