//! Graphics > Renderer settings subsection.
//!
//! Renderer changes only apply after a restart, so switching away from the
//! renderer the host is running posts a notification offering to exit.

use crate::models::Bindable;
use crate::system::Subscription;
use crate::ui::{Axes, FlowDirection, Node, Notification, NotificationActivation, NotificationQueue, Vec2};
use serde::{Deserialize, Serialize};

pub const RESTART_REQUIRED_TEXT: &str = "This setting requires a restart to take effect.";
pub const ANDROID_NOTICE_TEXT: &str = "New renderer support for android is coming soon!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RendererType {
    #[default]
    Automatic,
    Metal,
    Vulkan,
    Direct3D11,
    OpenGl,
    OpenGlLegacy,
}

impl RendererType {
    pub fn description(&self) -> &'static str {
        match self {
            RendererType::Automatic => "Automatic",
            RendererType::Metal => "Metal",
            RendererType::Vulkan => "Vulkan",
            RendererType::Direct3D11 => "Direct3D 11",
            RendererType::OpenGl => "OpenGL",
            RendererType::OpenGlLegacy => "OpenGL (Legacy)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameSync {
    VSync,
    #[default]
    Limit2x,
    Limit4x,
    Limit8x,
    Unlimited,
}

impl FrameSync {
    pub const ALL: [FrameSync; 5] = [
        FrameSync::VSync,
        FrameSync::Limit2x,
        FrameSync::Limit4x,
        FrameSync::Limit8x,
        FrameSync::Unlimited,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            FrameSync::VSync => "VSync",
            FrameSync::Limit2x => "2x refresh rate",
            FrameSync::Limit4x => "4x refresh rate",
            FrameSync::Limit8x => "8x refresh rate",
            FrameSync::Unlimited => "Basically unlimited",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    SingleThread,
    #[default]
    MultiThreaded,
}

impl ExecutionMode {
    pub const ALL: [ExecutionMode; 2] = [ExecutionMode::SingleThread, ExecutionMode::MultiThreaded];

    pub fn description(&self) -> &'static str {
        match self {
            ExecutionMode::SingleThread => "Single thread",
            ExecutionMode::MultiThreaded => "Multithreaded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Android,
    Ios,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            _ => Platform::Linux,
        }
    }

    /// Renderers the host can start with on this platform, in no particular order.
    pub fn preferred_renderers(&self) -> Vec<RendererType> {
        match self {
            Platform::Windows => vec![
                RendererType::Automatic,
                RendererType::Direct3D11,
                RendererType::OpenGl,
                RendererType::Vulkan,
                RendererType::OpenGlLegacy,
            ],
            Platform::MacOs | Platform::Ios => vec![
                RendererType::Automatic,
                RendererType::Metal,
                RendererType::OpenGlLegacy,
                RendererType::Vulkan,
            ],
            Platform::Linux => vec![
                RendererType::Automatic,
                RendererType::OpenGl,
                RendererType::Vulkan,
                RendererType::OpenGlLegacy,
            ],
            Platform::Android => vec![RendererType::Automatic, RendererType::OpenGlLegacy],
        }
    }
}

/// What the running host reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostInfo {
    pub platform: Platform,
    /// Renderer actually in use (never `Automatic`).
    pub resolved_renderer: RendererType,
}

/// Persisted graphics section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsSettings {
    pub renderer: RendererType,
    pub frame_sync: FrameSync,
    pub execution_mode: ExecutionMode,
    pub show_fps: bool,
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            renderer: RendererType::Automatic,
            frame_sync: FrameSync::default(),
            execution_mode: ExecutionMode::default(),
            show_fps: false,
        }
    }
}

/// Live, observable copy of [`GraphicsSettings`].
#[derive(Debug, Clone)]
pub struct GraphicsBindables {
    pub renderer: Bindable<RendererType>,
    pub frame_sync: Bindable<FrameSync>,
    pub execution_mode: Bindable<ExecutionMode>,
    pub show_fps: Bindable<bool>,
}

impl GraphicsBindables {
    pub fn from_settings(settings: &GraphicsSettings) -> Self {
        Self {
            renderer: Bindable::new(settings.renderer),
            frame_sync: Bindable::new(settings.frame_sync),
            execution_mode: Bindable::new(settings.execution_mode),
            show_fps: Bindable::new(settings.show_fps),
        }
    }

    pub fn to_settings(&self) -> GraphicsSettings {
        GraphicsSettings {
            renderer: self.renderer.value(),
            frame_sync: self.frame_sync.value(),
            execution_mode: self.execution_mode.value(),
            show_fps: self.show_fps.value(),
        }
    }
}

pub struct RendererSettings {
    bindables: GraphicsBindables,
    host: HostInfo,
    automatic_renderer_in_use: bool,
    _renderer_changed: Subscription,
}

impl RendererSettings {
    pub fn new(bindables: GraphicsBindables, host: HostInfo, notifications: NotificationQueue) -> Self {
        // Captured once: "automatic" must be judged against the startup value.
        let automatic_renderer_in_use = bindables.renderer.value() == RendererType::Automatic;

        let renderer_changed = bindables.renderer.subscribe(move |renderer| {
            if !needs_restart(*renderer, host.resolved_renderer, automatic_renderer_in_use) {
                return;
            }
            notifications.post(Notification {
                text: RESTART_REQUIRED_TEXT.to_string(),
                important: true,
                activation: NotificationActivation::AttemptExit,
            });
        });

        Self {
            bindables,
            host,
            automatic_renderer_in_use,
            _renderer_changed: renderer_changed,
        }
    }

    /// Renderer dropdown entries.
    pub fn renderer_items(&self) -> Vec<RendererType> {
        if self.host.platform == Platform::Android {
            return vec![RendererType::Automatic, RendererType::OpenGlLegacy];
        }

        let mut items: Vec<RendererType> = self
            .host
            .platform
            .preferred_renderers()
            .into_iter()
            .filter(|r| *r != RendererType::Vulkan)
            .collect();
        items.sort();
        items
    }

    pub fn renderer_notice(&self) -> Option<&'static str> {
        (self.host.platform == Platform::Android).then_some(ANDROID_NOTICE_TEXT)
    }

    /// Dropdown label for `item`. While running on automatic, the automatic
    /// entry also names what it resolved to.
    pub fn renderer_item_text(&self, item: RendererType) -> String {
        if item == RendererType::Automatic && self.automatic_renderer_in_use {
            return format!(
                "{} ({})",
                item.description(),
                self.host.resolved_renderer.description()
            );
        }
        item.description().to_string()
    }

    pub fn build(&self) -> Node {
        let renderer_items = self.renderer_items();
        let current = self.bindables.renderer.value();
        let renderer = Node::dropdown(
            "Renderer",
            renderer_items
                .iter()
                .map(|r| self.renderer_item_text(*r))
                .collect(),
            renderer_items.iter().position(|r| *r == current),
            self.renderer_notice().map(str::to_string),
        )
        .named("renderer");

        let frame_sync = self.bindables.frame_sync.value();
        let frame_limiter = Node::dropdown(
            "Frame limiter",
            FrameSync::ALL.iter().map(|f| f.description().to_string()).collect(),
            FrameSync::ALL.iter().position(|f| *f == frame_sync),
            None,
        )
        .named("frame-limiter");

        let execution_mode = self.bindables.execution_mode.value();
        let threading = Node::dropdown(
            "Threading mode",
            ExecutionMode::ALL
                .iter()
                .map(|m| m.description().to_string())
                .collect(),
            ExecutionMode::ALL.iter().position(|m| *m == execution_mode),
            None,
        )
        .named("threading-mode");

        let show_fps = Node::checkbox("Show FPS", self.bindables.show_fps.value()).named("show-fps");

        Node::flow(FlowDirection::Vertical, Vec2::new(0.0, 10.0))
            .named("renderer-settings")
            .relative_size(Axes::X)
            .auto_size(Axes::Y)
            .size(1.0, 0.0)
            .children([renderer, frame_limiter, threading, show_fps])
    }
}

fn needs_restart(new: RendererType, resolved: RendererType, automatic_in_use: bool) -> bool {
    if new == resolved {
        return false;
    }
    !(new == RendererType::Automatic && automatic_in_use)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::NodeKind;

    fn host(platform: Platform) -> HostInfo {
        HostInfo {
            platform,
            resolved_renderer: RendererType::OpenGl,
        }
    }

    fn panel(start: RendererType, platform: Platform) -> (RendererSettings, GraphicsBindables, NotificationQueue) {
        let bindables = GraphicsBindables::from_settings(&GraphicsSettings {
            renderer: start,
            ..GraphicsSettings::default()
        });
        let notifications = NotificationQueue::new();
        let settings = RendererSettings::new(bindables.clone(), host(platform), notifications.clone());
        (settings, bindables, notifications)
    }

    #[test]
    fn test_items_are_sorted_without_vulkan() {
        let (settings, _, _) = panel(RendererType::Automatic, Platform::Windows);
        assert_eq!(
            settings.renderer_items(),
            vec![
                RendererType::Automatic,
                RendererType::Direct3D11,
                RendererType::OpenGl,
                RendererType::OpenGlLegacy,
            ]
        );
        assert_eq!(settings.renderer_notice(), None);
    }

    #[test]
    fn test_android_gets_fixed_items_and_notice() {
        let (settings, _, _) = panel(RendererType::Automatic, Platform::Android);
        assert_eq!(
            settings.renderer_items(),
            vec![RendererType::Automatic, RendererType::OpenGlLegacy]
        );
        assert_eq!(settings.renderer_notice(), Some(ANDROID_NOTICE_TEXT));
    }

    #[test]
    fn test_automatic_label_names_resolved_renderer() {
        let (settings, _, _) = panel(RendererType::Automatic, Platform::Linux);
        assert_eq!(settings.renderer_item_text(RendererType::Automatic), "Automatic (OpenGL)");
        assert_eq!(settings.renderer_item_text(RendererType::Metal), "Metal");

        let (settings, _, _) = panel(RendererType::OpenGl, Platform::Linux);
        assert_eq!(settings.renderer_item_text(RendererType::Automatic), "Automatic");
    }

    #[test]
    fn test_switching_renderer_asks_for_restart() {
        let (_settings, bindables, notifications) = panel(RendererType::Automatic, Platform::Linux);

        bindables.renderer.set(RendererType::OpenGlLegacy);
        let posted = notifications.drain();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].important);
        assert_eq!(posted[0].activation, NotificationActivation::AttemptExit);
        assert_eq!(posted[0].text, RESTART_REQUIRED_TEXT);

        // Back to what the host is running: nothing to restart for.
        bindables.renderer.set(RendererType::OpenGl);
        // Back to automatic while automatic was the startup value.
        bindables.renderer.set(RendererType::Automatic);
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_automatic_needs_restart_when_started_explicit() {
        let (_settings, bindables, notifications) = panel(RendererType::OpenGl, Platform::Linux);
        bindables.renderer.set(RendererType::Automatic);
        assert_eq!(notifications.len(), 1);
    }

    #[test]
    fn test_dropping_panel_stops_notifications() {
        let (settings, bindables, notifications) = panel(RendererType::Automatic, Platform::Linux);
        drop(settings);
        bindables.renderer.set(RendererType::OpenGlLegacy);
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_build_reflects_current_values() {
        let (settings, bindables, _) = panel(RendererType::OpenGl, Platform::Windows);
        bindables.show_fps.set(true);
        bindables.frame_sync.set(FrameSync::Unlimited);

        let tree = settings.build();
        assert_eq!(tree.child_nodes().len(), 4);

        let NodeKind::Dropdown { items, selected, .. } = tree.find("renderer").unwrap().kind() else {
            panic!("renderer is not a dropdown");
        };
        assert_eq!(items[*selected.as_ref().unwrap()], "OpenGL");

        let NodeKind::Dropdown { selected, .. } = tree.find("frame-limiter").unwrap().kind() else {
            panic!("frame-limiter is not a dropdown");
        };
        assert_eq!(*selected, Some(4));

        assert!(matches!(
            tree.find("show-fps").unwrap().kind(),
            NodeKind::Checkbox { checked: true, .. }
        ));
        assert!(bindables.to_settings().show_fps);
    }
}
