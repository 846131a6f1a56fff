use std::time::Duration;

use crate::probe::ProbeSettings;
use crate::types::{QueryError, StructuralQuery};

/// Structural knowledge about the monitored web application.
///
/// CAUTION: these selectors track the host page's generated class names and
/// break whenever the page markup changes.
#[derive(Debug, Clone)]
pub struct PageProfile {
    /// Landmarks that signal a settled page; found ones are removed.
    pub landmarks: Vec<StructuralQuery>,
    /// Removed after the landmarks, if present. Never waited for.
    pub extra_cleanup: Vec<StructuralQuery>,
    pub message_container: StructuralQuery,
    pub message_item: StructuralQuery,
    pub settle_before_probe: Duration,
    pub settle_after_cleanup: Duration,
    pub probe: ProbeSettings,
}

impl PageProfile {
    pub fn discord() -> Result<Self, QueryError> {
        Ok(Self {
            landmarks: vec![
                StructuralQuery::parse(r#"[aria-label="Servers sidebar"]"#)?,
                StructuralQuery::parse(r#"[class^="sidebar_"]"#)?,
                StructuralQuery::parse(r#"[aria-label="Channel header"]"#)?,
                StructuralQuery::parse(r#"[class^="form_"]"#)?,
            ],
            extra_cleanup: vec![StructuralQuery::parse(
                "[class^=content_] > [class^=container_]",
            )?],
            message_container: StructuralQuery::parse(r#"[data-list-id="chat-messages"]"#)?,
            message_item: StructuralQuery::parse(r#"[class^="messageListItem_"]"#)?,
            settle_before_probe: Duration::from_millis(2000),
            settle_after_cleanup: Duration::from_millis(1000),
            probe: ProbeSettings::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PageProfile;

    #[test]
    fn discord_profile_selectors_parse() {
        let profile = PageProfile::discord().unwrap();
        assert_eq!(profile.landmarks.len(), 4);
        assert_eq!(profile.probe.max_attempts, 200);
    }
}
