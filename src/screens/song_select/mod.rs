//! Song select screen.
//!
//! Holds the ordered list of [`BeatmapGroup`]s, the current selection, and
//! the rule that at most one group is expanded at a time.
//!
//! ## Threading
//!
//! Everything here runs on the UI thread. The registry may announce new sets
//! from the database thread; those announcements only enqueue work on the
//! screen's [`Scheduler`], which [`PlaySongSelect::update`] drains once per
//! frame. Group signals are funnelled through a channel and applied right
//! after the activation that produced them.

mod group;

pub use group::BeatmapGroup;

use crate::database::{BeatmapId, BeatmapInfo, BeatmapRegistry, BeatmapSetId, BeatmapSetInfo, RegistryError};
use crate::models::{Bindable, PlayMode};
use crate::screens::warning::QualifiedWarning;
use crate::system::{Scheduler, Subscription};
use crate::ui::{Anchor, Axes, FlowDirection, MarginPadding, Node, UiAction, Vec2, colours};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

const SCROLL_WIDTH: f32 = 500.0;
const LIST_PADDING: f32 = 25.0;
const LIST_SPACING: f32 = 25.0;
const BACKDROP_SHEAR: f32 = 0.15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no group for beatmap set {0}")]
    UnknownSet(BeatmapSetId),
    #[error("beatmap {beatmap} does not belong to set {set}")]
    BeatmapNotInSet {
        set: BeatmapSetId,
        beatmap: BeatmapId,
    },
}

#[derive(Debug, Clone, Copy)]
enum GroupEvent {
    SetSelected(BeatmapSetId),
    BeatmapSelected(BeatmapSetId, BeatmapId),
}

pub struct PlaySongSelect {
    registry: Arc<dyn BeatmapRegistry>,
    groups: Vec<BeatmapGroup>,
    index: HashMap<BeatmapSetId, usize>,
    selected_beatmap_set: Option<BeatmapSetId>,
    selected_beatmap: Option<BeatmapId>,
    play_mode: PlayMode,
    toolbar_height: f32,
    scheduler: Scheduler<PlaySongSelect>,
    group_events_tx: Sender<GroupEvent>,
    group_events_rx: Receiver<GroupEvent>,
    play_mode_subscription: Option<Subscription>,
    set_added_subscription: Option<Subscription>,
    loaded: bool,
}

impl PlaySongSelect {
    pub fn new(registry: Arc<dyn BeatmapRegistry>, toolbar_height: f32) -> Self {
        let (group_events_tx, group_events_rx) = unbounded();
        Self {
            registry,
            groups: Vec::new(),
            index: HashMap::new(),
            selected_beatmap_set: None,
            selected_beatmap: None,
            play_mode: PlayMode::default(),
            toolbar_height,
            scheduler: Scheduler::new(),
            group_events_tx,
            group_events_rx,
            play_mode_subscription: None,
            set_added_subscription: None,
            loaded: false,
        }
    }

    /// Attaches the screen: hooks the play mode and registry events, loads
    /// every known set, and selects the first one.
    pub fn load(&mut self, play_mode: Option<&Bindable<PlayMode>>) {
        if self.loaded {
            log::warn!("SELECT: load() called twice, ignoring");
            return;
        }
        self.loaded = true;

        if let Some(play_mode) = play_mode {
            self.play_mode = play_mode.value();
            let handle = self.scheduler.handle();
            self.play_mode_subscription = Some(play_mode.subscribe(move |mode| {
                let mode = *mode;
                handle.enqueue(move |screen: &mut PlaySongSelect| screen.on_play_mode_changed(mode));
            }));
        }

        let handle = self.scheduler.handle();
        self.set_added_subscription = Some(self.registry.subscribe_set_added(Box::new(move |set: &BeatmapSetInfo| {
            let set = set.clone();
            handle.enqueue(move |screen: &mut PlaySongSelect| {
                if let Err(e) = screen.add_beatmap_set(&set) {
                    log::warn!("SELECT: Dropping added set: {}", e);
                }
            });
        })));

        self.add_beatmap_sets();

        if let Some(first) = self.groups.first().map(BeatmapGroup::id) {
            self.select_beatmap_set(first);
        }
        log::info!(
            "SELECT: Loaded {} group(s), selected {:?}",
            self.groups.len(),
            self.selected_beatmap_set
        );
    }

    /// Releases the event subscriptions and discards queued work.
    ///
    /// The scheduler is replaced, so handles still held by a handler that is
    /// running on another thread can no longer reach this screen.
    pub fn dispose(&mut self) {
        let had_subscriptions =
            self.play_mode_subscription.is_some() || self.set_added_subscription.is_some();
        self.play_mode_subscription = None;
        self.set_added_subscription = None;
        self.scheduler = Scheduler::new();
        if had_subscriptions {
            log::debug!("SELECT: Disposed");
        }
    }

    /// Per-frame tick. Runs scheduled work, then any group signals it caused.
    /// Returns the number of scheduled tasks run.
    pub fn update(&mut self) -> usize {
        let tasks = self.scheduler.take_pending();
        let count = tasks.len();
        for task in tasks {
            task(self);
        }
        self.process_group_events();
        count
    }

    /// Makes `set` the selected set and expands its group, collapsing all
    /// others. Unknown sets leave the screen untouched and return `false`.
    pub fn select_beatmap_set(&mut self, set: BeatmapSetId) -> bool {
        let Some(&position) = self.index.get(&set) else {
            log::warn!("SELECT: Ignoring selection of unknown {}", set);
            return false;
        };

        self.selected_beatmap_set = Some(set);
        for (i, group) in self.groups.iter_mut().enumerate() {
            group.set_collapsed(i != position);
        }
        self.selected_beatmap = self.groups[position].selected_beatmap();
        true
    }

    /// Selects `set`, then forces `beatmap` as the selected difficulty
    /// regardless of what the group itself has selected.
    pub fn select_beatmap(
        &mut self,
        set: BeatmapSetId,
        beatmap: BeatmapId,
    ) -> Result<(), SelectionError> {
        let position = *self
            .index
            .get(&set)
            .ok_or(SelectionError::UnknownSet(set))?;
        if !self.groups[position].set().contains(beatmap) {
            return Err(SelectionError::BeatmapNotInSet { set, beatmap });
        }

        self.select_beatmap_set(set);
        self.selected_beatmap = Some(beatmap);
        Ok(())
    }

    /// Appends a group for `set`, loading its difficulties from the registry
    /// first (add events may carry a set without them).
    ///
    /// A set that already has a group refreshes that group in place.
    pub fn add_beatmap_set(&mut self, set: &BeatmapSetInfo) -> Result<(), RegistryError> {
        let full = self.registry.fetch_with_children(set.id)?;

        if let Some(&position) = self.index.get(&full.id) {
            log::debug!("SELECT: Refreshing existing group for {}", full.id);
            self.groups[position].refresh(full);
            if self.selected_beatmap_set == Some(set.id)
                && !self
                    .selected_beatmap
                    .is_some_and(|b| self.groups[position].set().contains(b))
            {
                self.selected_beatmap = self.groups[position].selected_beatmap();
            }
            return Ok(());
        }

        let mut group = BeatmapGroup::new(full);
        let tx = self.group_events_tx.clone();
        group
            .set_selected
            .connect(move |id| {
                let _ = tx.send(GroupEvent::SetSelected(*id));
            });
        let tx = self.group_events_tx.clone();
        group
            .beatmap_selected
            .connect(move |(set, beatmap)| {
                let _ = tx.send(GroupEvent::BeatmapSelected(*set, *beatmap));
            });

        self.index.insert(group.id(), self.groups.len());
        self.groups.push(group);
        Ok(())
    }

    /// Adds every set the registry knows, in registry order.
    pub fn add_beatmap_sets(&mut self) {
        for set in self.registry.query_all() {
            if let Err(e) = self.add_beatmap_set(&set) {
                log::warn!("SELECT: Skipping set during bulk load: {}", e);
            }
        }
    }

    /// Header click on the group for `set`.
    pub fn activate_set(&mut self, set: BeatmapSetId) -> Result<(), SelectionError> {
        let position = *self
            .index
            .get(&set)
            .ok_or(SelectionError::UnknownSet(set))?;
        self.groups[position].activate();
        self.process_group_events();
        Ok(())
    }

    /// Difficulty panel click inside the group for `set`.
    pub fn activate_beatmap(
        &mut self,
        set: BeatmapSetId,
        beatmap: BeatmapId,
    ) -> Result<(), SelectionError> {
        let position = *self
            .index
            .get(&set)
            .ok_or(SelectionError::UnknownSet(set))?;
        if !self.groups[position].activate_beatmap(beatmap) {
            return Err(SelectionError::BeatmapNotInSet { set, beatmap });
        }
        self.process_group_events();
        Ok(())
    }

    /// Dispatches an action taken from a node of [`build`](Self::build).
    /// `Play` yields the beatmap to start.
    pub fn handle_action(
        &mut self,
        action: UiAction,
    ) -> Result<Option<BeatmapInfo>, SelectionError> {
        match action {
            UiAction::Play => Ok(self.play()),
            UiAction::SelectSet(set) => self.activate_set(set).map(|_| None),
            UiAction::SelectBeatmap(set, beatmap) => {
                self.activate_beatmap(set, beatmap).map(|_| None)
            }
        }
    }

    /// The beatmap the play button would start.
    pub fn play(&self) -> Option<BeatmapInfo> {
        let beatmap = self.selected_beatmap_info().cloned();
        match &beatmap {
            Some(b) => log::info!("SELECT: Play {} [{}]", b.path, b.version),
            None => log::info!("SELECT: Play pressed with nothing selected"),
        }
        beatmap
    }

    /// Warning to show before gameplay for the current selection, if any.
    pub fn pending_warning(&self) -> Option<QualifiedWarning> {
        self.selected_group()
            .filter(|g| QualifiedWarning::applies_to(g.set()))
            .map(|_| QualifiedWarning::new())
    }

    fn process_group_events(&mut self) {
        while let Ok(event) = self.group_events_rx.try_recv() {
            match event {
                GroupEvent::SetSelected(set) => {
                    self.select_beatmap_set(set);
                }
                GroupEvent::BeatmapSelected(set, beatmap) => {
                    if let Err(e) = self.select_beatmap(set, beatmap) {
                        log::warn!("SELECT: {}", e);
                    }
                }
            }
        }
    }

    fn on_play_mode_changed(&mut self, mode: PlayMode) {
        log::info!("SELECT: Play mode changed to {}", mode.display_name());
        self.play_mode = mode;
    }

    pub fn build(&self) -> Node {
        let backdrop = Node::container()
            .named("backdrop")
            .relative_size(Axes::Both)
            .size(1.0, 1.0)
            .padding(MarginPadding {
                right: SCROLL_WIDTH - 100.0,
                ..MarginPadding::default()
            })
            .child(
                Node::boxed()
                    .relative_size(Axes::Both)
                    .size(1.0, 0.5)
                    .colour(colours::BACKDROP)
                    .shear(BACKDROP_SHEAR, 0.0),
            )
            .child(
                Node::boxed()
                    .relative_size(Axes::Both)
                    .relative_position(Axes::Y)
                    .size(1.0, -0.5)
                    .position(0.0, 1.0)
                    .colour(colours::BACKDROP)
                    .shear(-BACKDROP_SHEAR, 0.0),
            );

        let set_list = Node::flow(FlowDirection::Vertical, Vec2::new(0.0, LIST_SPACING))
            .named("set-list")
            .relative_size(Axes::X)
            .size(1.0, 0.0)
            .padding(MarginPadding {
                left: LIST_PADDING,
                top: LIST_PADDING,
                bottom: LIST_PADDING,
                right: 0.0,
            })
            .children(self.groups.iter().map(BeatmapGroup::build));

        let scroll = Node::scroll()
            .named("scroll")
            .relative_size(Axes::Y)
            .size(SCROLL_WIDTH, 1.0)
            .anchored(Anchor::CentreRight)
            .padding(MarginPadding {
                top: self.toolbar_height,
                ..MarginPadding::default()
            })
            .child(set_list);

        let play = Node::button("Play", UiAction::Play)
            .named("play")
            .anchored(Anchor::Centre)
            .relative_position(Axes::Both)
            .colour(colours::PINK);

        Node::container()
            .named("song-select")
            .relative_size(Axes::Both)
            .size(1.0, 1.0)
            .child(backdrop)
            .child(scroll)
            .child(play)
    }

    pub fn groups(&self) -> &[BeatmapGroup] {
        &self.groups
    }

    pub fn group(&self, set: BeatmapSetId) -> Option<&BeatmapGroup> {
        self.index.get(&set).map(|&i| &self.groups[i])
    }

    pub fn selected_beatmap_set(&self) -> Option<BeatmapSetId> {
        self.selected_beatmap_set
    }

    pub fn selected_beatmap(&self) -> Option<BeatmapId> {
        self.selected_beatmap
    }

    pub fn selected_beatmap_info(&self) -> Option<&BeatmapInfo> {
        let beatmap = self.selected_beatmap?;
        self.selected_group()?.set().beatmap(beatmap)
    }

    fn selected_group(&self) -> Option<&BeatmapGroup> {
        self.selected_beatmap_set.and_then(|set| self.group(set))
    }

    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending_count()
    }
}

impl Drop for PlaySongSelect {
    fn drop(&mut self) {
        self.dispose();
    }
}
