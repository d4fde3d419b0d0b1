//! Port definitions (trait abstractions) for the host environment.
//!
//! Ports define what the domain expects from the platform it runs on. They
//! contain no implementation details beyond a host default.

pub mod platform;

pub use platform::{
    HostPlatformProbe, PauseStrategy, PlatformCapabilities, PlatformProbe, ProgressStrategy,
};
