//! One beatmap set in the song select list.

use crate::database::{BeatmapId, BeatmapInfo, BeatmapSetId, BeatmapSetInfo};
use crate::ui::{Anchor, Axes, FlowDirection, MarginPadding, Node, Signal, UiAction, Vec2, colours};

const HEADER_HEIGHT: f32 = 80.0;
const PANEL_HEIGHT: f32 = 50.0;
const PANEL_INDENT: f32 = 20.0;

/// Header plus (when expanded) one panel per difficulty.
///
/// A group starts collapsed with its first difficulty selected. It never
/// changes its own collapse state; the owning screen does.
#[derive(Debug)]
pub struct BeatmapGroup {
    set: BeatmapSetInfo,
    collapsed: bool,
    selected_beatmap: Option<BeatmapId>,
    /// Fired when the header is activated.
    pub set_selected: Signal<BeatmapSetId>,
    /// Fired when a difficulty panel is activated.
    pub beatmap_selected: Signal<(BeatmapSetId, BeatmapId)>,
}

impl BeatmapGroup {
    pub fn new(set: BeatmapSetInfo) -> Self {
        let selected_beatmap = set.beatmaps.first().map(|b| b.id);
        Self {
            set,
            collapsed: true,
            selected_beatmap,
            set_selected: Signal::new(),
            beatmap_selected: Signal::new(),
        }
    }

    pub fn id(&self) -> BeatmapSetId {
        self.set.id
    }

    pub fn set(&self) -> &BeatmapSetInfo {
        &self.set
    }

    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    pub fn selected_beatmap(&self) -> Option<BeatmapId> {
        self.selected_beatmap
    }

    pub fn selected_beatmap_info(&self) -> Option<&BeatmapInfo> {
        self.selected_beatmap.and_then(|id| self.set.beatmap(id))
    }

    /// Header click.
    pub fn activate(&self) {
        self.set_selected.emit(&self.set.id);
    }

    /// Difficulty panel click. Returns `false` (and emits nothing) when the
    /// beatmap is not part of this set.
    pub fn activate_beatmap(&mut self, beatmap: BeatmapId) -> bool {
        if !self.set.contains(beatmap) {
            return false;
        }
        self.selected_beatmap = Some(beatmap);
        self.beatmap_selected.emit(&(self.set.id, beatmap));
        true
    }

    /// Swaps in a newer copy of the same set. The current difficulty stays
    /// selected if it still exists, otherwise the first one is.
    pub fn refresh(&mut self, set: BeatmapSetInfo) {
        debug_assert_eq!(set.id, self.set.id);
        self.set = set;
        if !self.selected_beatmap.is_some_and(|id| self.set.contains(id)) {
            self.selected_beatmap = self.set.beatmaps.first().map(|b| b.id);
        }
    }

    pub fn build(&self) -> Node {
        let header = Node::button(self.set.display_title(), UiAction::SelectSet(self.set.id))
            .named(format!("header:{}", self.set.id.0))
            .relative_size(Axes::X)
            .size(1.0, HEADER_HEIGHT);

        let mut group = Node::flow(FlowDirection::Vertical, Vec2::new(0.0, 5.0))
            .named(format!("group:{}", self.set.id.0))
            .relative_size(Axes::X)
            .auto_size(Axes::Y)
            .size(1.0, 0.0)
            .child(header);

        if !self.collapsed {
            group = group.children(self.set.beatmaps.iter().map(|b| self.build_panel(b)));
        }
        group
    }

    fn build_panel(&self, beatmap: &BeatmapInfo) -> Node {
        let selected = self.selected_beatmap == Some(beatmap.id);
        Node::button(
            beatmap.version.clone(),
            UiAction::SelectBeatmap(self.set.id, beatmap.id),
        )
        .named(format!("panel:{}", beatmap.id.0))
        .relative_size(Axes::X)
        .size(1.0, PANEL_HEIGHT)
        .padding(MarginPadding {
            left: PANEL_INDENT,
            ..MarginPadding::default()
        })
        .anchored(Anchor::TopRight)
        .colour(if selected { colours::PINK } else { colours::WHITE })
    }
}
