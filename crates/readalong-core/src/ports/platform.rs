//! Platform capability probe.
//!
//! Some host speech engines (notably on iOS) neither honor pause/resume nor
//! emit boundary signals reliably. The probe answers one question, and the
//! answer is turned into strategy selectors once per session so the
//! controller and synchronizer never branch on the platform directly.

use serde::{Deserialize, Serialize};

/// Port for probing the host platform.
pub trait PlatformProbe: Send + Sync {
    /// Whether the host is the constrained mobile platform.
    fn is_constrained_mobile(&self) -> bool;
}

/// Probe for the platform this binary was compiled for.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatformProbe;

impl PlatformProbe for HostPlatformProbe {
    fn is_constrained_mobile(&self) -> bool {
        cfg!(target_os = "ios")
    }
}

/// Where highlight progress comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStrategy {
    /// Engine boundary signals drive the highlight.
    NativeProgress,

    /// A timer estimates progress until the first boundary signal arrives.
    TimeEstimatedProgress,
}

/// How pause and resume are carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseStrategy {
    /// The engine's own pause/resume.
    NativePauseResume,

    /// Pause cancels the utterance; resume submits a fresh one from the top.
    CancelAndRestartPauseResume,
}

/// Strategy selectors resolved once at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    pub progress: ProgressStrategy,
    pub pause: PauseStrategy,
}

impl PlatformCapabilities {
    /// Capabilities of a fully capable engine.
    pub const CAPABLE: Self = Self {
        progress: ProgressStrategy::NativeProgress,
        pause: PauseStrategy::NativePauseResume,
    };

    /// Capabilities of the constrained mobile engine.
    pub const CONSTRAINED: Self = Self {
        progress: ProgressStrategy::TimeEstimatedProgress,
        pause: PauseStrategy::CancelAndRestartPauseResume,
    };

    /// Resolve capabilities from a probe, honoring an explicit override.
    pub fn resolve(probe: &dyn PlatformProbe, constrained_override: Option<bool>) -> Self {
        let constrained = constrained_override.unwrap_or_else(|| probe.is_constrained_mobile());
        let caps = if constrained {
            Self::CONSTRAINED
        } else {
            Self::CAPABLE
        };
        tracing::debug!(
            constrained,
            overridden = constrained_override.is_some(),
            "Resolved platform capabilities"
        );
        caps
    }

    /// Whether these are the constrained-platform code paths.
    #[must_use]
    pub fn is_constrained(self) -> bool {
        self.pause == PauseStrategy::CancelAndRestartPauseResume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(bool);

    impl PlatformProbe for FixedProbe {
        fn is_constrained_mobile(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn resolve_follows_probe() {
        assert_eq!(
            PlatformCapabilities::resolve(&FixedProbe(true), None),
            PlatformCapabilities::CONSTRAINED
        );
        assert_eq!(
            PlatformCapabilities::resolve(&FixedProbe(false), None),
            PlatformCapabilities::CAPABLE
        );
    }

    #[test]
    fn override_wins_over_probe() {
        let caps = PlatformCapabilities::resolve(&FixedProbe(false), Some(true));
        assert!(caps.is_constrained());
        assert_eq!(caps.progress, ProgressStrategy::TimeEstimatedProgress);

        let caps = PlatformCapabilities::resolve(&FixedProbe(true), Some(false));
        assert!(!caps.is_constrained());
    }

    #[test]
    fn host_probe_is_capable_off_ios() {
        if !cfg!(target_os = "ios") {
            assert!(!HostPlatformProbe.is_constrained_mobile());
        }
    }
}
