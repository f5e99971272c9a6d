use strum::{AsRefStr, Display, EnumString, VariantNames};

/// Coarse progress of the ingestion pipeline.
///
/// ```text
/// idle --start--> uploading --ok--> processing --ok--> ready
///                     |                 |
///                     +-----fail--------+--> error
/// any --flush--> idle
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, AsRefStr, EnumString, VariantNames,
)]
#[strum(serialize_all = "lowercase")]
pub enum IngestionStatus {
    #[default]
    Idle,
    Uploading,
    Processing,
    Ready,
    Error,
}

impl IngestionStatus {
    /// An ingestion is between start and its final status.
    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Uploading | Self::Processing)
    }

    #[must_use]
    pub fn accepts_start(self) -> bool {
        !self.is_in_flight()
    }

    #[must_use]
    pub fn chat_available(self) -> bool {
        self == Self::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_names_are_lowercase() {
        assert_eq!(IngestionStatus::Idle.to_string(), "idle");
        assert_eq!(IngestionStatus::Processing.as_ref(), "processing");
        assert_eq!(
            IngestionStatus::VARIANTS,
            &["idle", "uploading", "processing", "ready", "error"]
        );
        assert_eq!(
            IngestionStatus::from_str("ready").unwrap(),
            IngestionStatus::Ready
        );
    }

    #[test]
    fn test_start_and_chat_gates() {
        for status in [
            IngestionStatus::Idle,
            IngestionStatus::Ready,
            IngestionStatus::Error,
        ] {
            assert!(status.accepts_start(), "{status} should accept start");
        }
        for status in [IngestionStatus::Uploading, IngestionStatus::Processing] {
            assert!(!status.accepts_start(), "{status} should reject start");
        }

        assert!(IngestionStatus::Ready.chat_available());
        assert!(!IngestionStatus::Error.chat_available());
        assert!(!IngestionStatus::Idle.chat_available());
    }
}
