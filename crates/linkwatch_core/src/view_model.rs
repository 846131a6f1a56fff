use crate::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Success,
    Warning,
    Error,
}

impl Tone {
    /// Overlay background for hosts that render with CSS.
    pub fn css_color(self) -> &'static str {
        match self {
            Tone::Neutral => "rgba(0, 0, 0, 0.6)",
            Tone::Success => "rgba(91,201,53,0.8)",
            Tone::Warning => "rgba(230,162,60,0.8)",
            Tone::Error => "rgba(190,25,43,0.8)",
        }
    }
}

/// Content of the single status overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayView {
    pub message: String,
    pub tone: Tone,
}

impl OverlayView {
    pub fn new(message: impl Into<String>, tone: Tone) -> Self {
        Self {
            message: message.into(),
            tone,
        }
    }

    pub fn neutral(message: impl Into<String>) -> Self {
        Self::new(message, Tone::Neutral)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonitorView {
    pub session: SessionState,
    pub overlay: OverlayView,
    pub matches: u64,
    pub last_link: Option<String>,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
}
