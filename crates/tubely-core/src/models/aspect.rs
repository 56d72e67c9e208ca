use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Geometry bucket of an uploaded video.
///
/// Derived once per upload from the display aspect ratio of its first video stream
/// and only used to pick the storage path prefix; it is never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectClassification {
    Landscape,
    Portrait,
    Other,
}

impl AspectClassification {
    pub const ALL: [AspectClassification; 3] = [
        AspectClassification::Landscape,
        AspectClassification::Portrait,
        AspectClassification::Other,
    ];

    /// Classify a display aspect ratio such as `"16:9"`.
    ///
    /// Only exact `16:9` and `9:16` matches are recognised; anything else,
    /// including a missing ratio, is `Other`.
    pub fn from_display_aspect_ratio(ratio: Option<&str>) -> Self {
        match ratio {
            Some("16:9") => AspectClassification::Landscape,
            Some("9:16") => AspectClassification::Portrait,
            _ => AspectClassification::Other,
        }
    }

    /// Storage path segment for this classification.
    pub fn as_prefix(&self) -> &'static str {
        match self {
            AspectClassification::Landscape => "landscape",
            AspectClassification::Portrait => "portrait",
            AspectClassification::Other => "other",
        }
    }
}

impl Display for AspectClassification {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_ratios() {
        assert_eq!(
            AspectClassification::from_display_aspect_ratio(Some("16:9")),
            AspectClassification::Landscape
        );
        assert_eq!(
            AspectClassification::from_display_aspect_ratio(Some("9:16")),
            AspectClassification::Portrait
        );
    }

    #[test]
    fn test_everything_else_is_other() {
        for ratio in [Some("4:3"), Some("16:10"), Some(" 16:9"), Some(""), None] {
            assert_eq!(
                AspectClassification::from_display_aspect_ratio(ratio),
                AspectClassification::Other,
                "ratio {:?}",
                ratio
            );
        }
    }

    #[test]
    fn test_prefixes() {
        let prefixes: Vec<_> = AspectClassification::ALL
            .iter()
            .map(|c| c.as_prefix())
            .collect();
        assert_eq!(prefixes, vec!["landscape", "portrait", "other"]);
    }
}
