use std::time::Duration;

/// How long an admin success/error banner stays up.
pub const STATUS_BANNER_WINDOW: Duration = Duration::from_secs(3);

/// How long the lead form shows its confirmation before reverting.
pub const LEAD_CONFIRMATION_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

impl BannerKind {
    pub fn css_class(self) -> &'static str {
        match self {
            BannerKind::Success => "flash-ok",
            BannerKind::Error => "flash-warn",
        }
    }
}

/// A transient status message shown after a mutating action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
}

impl Banner {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }

    pub fn window(&self) -> Duration {
        STATUS_BANNER_WINDOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banners_carry_kind_and_window() {
        let ok = Banner::success("Installer added successfully!");
        assert!(!ok.is_error());
        assert_eq!(ok.kind.css_class(), "flash-ok");
        assert_eq!(ok.window().as_millis(), 3000);

        let err = Banner::error("Failed to save installer. Please try again.");
        assert!(err.is_error());
        assert_eq!(LEAD_CONFIRMATION_WINDOW.as_secs(), 5);
    }
}
