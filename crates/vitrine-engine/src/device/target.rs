use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use winit::dpi::LogicalSize;
use winit::window::{Window, WindowId};

static NEXT_OFFSCREEN_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a drawing surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TargetId {
    Window(WindowId),
    Offscreen(u64),
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetId::Window(id) => write!(f, "window {id:?}"),
            TargetId::Offscreen(id) => write!(f, "offscreen #{id}"),
        }
    }
}

/// An off-screen drawing surface (a texture nobody presents).
///
/// `width` and `height` are logical pixels; the backing texture is scaled by the
/// renderer's pixel ratio.
#[derive(Debug, Clone)]
pub struct OffscreenTarget {
    id: u64,
    pub width: u32,
    pub height: u32,
    pub label: Option<String>,
}

impl OffscreenTarget {
    /// Creates a target with a process-unique id.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: NEXT_OFFSCREEN_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> TargetId {
        TargetId::Offscreen(self.id)
    }
}

/// Surface a renderer is bound to for its whole lifetime.
#[derive(Debug, Clone)]
pub enum DrawTarget {
    /// On-screen window. The renderer keeps the window alive.
    Window(Arc<Window>),
    Offscreen(OffscreenTarget),
}

impl DrawTarget {
    pub fn id(&self) -> TargetId {
        match self {
            DrawTarget::Window(w) => TargetId::Window(w.id()),
            DrawTarget::Offscreen(o) => o.id(),
        }
    }

    /// Logical size of the surface at this moment.
    pub fn logical_size(&self) -> LogicalSize<f64> {
        match self {
            DrawTarget::Window(w) => w.inner_size().to_logical(w.scale_factor()),
            DrawTarget::Offscreen(o) => LogicalSize::new(o.width as f64, o.height as f64),
        }
    }
}

impl From<Arc<Window>> for DrawTarget {
    fn from(window: Arc<Window>) -> Self {
        DrawTarget::Window(window)
    }
}

impl From<OffscreenTarget> for DrawTarget {
    fn from(target: OffscreenTarget) -> Self {
        DrawTarget::Offscreen(target)
    }
}
