#![forbid(unsafe_code)]

//! Runtime: the mode coordinator and everything that runs on deadlines.
//!
//! Nothing here owns a thread or a timer. Every component takes the current
//! monotonic time as a [`std::time::Duration`] and is polled by the host loop,
//! which keeps behavior identical under [`clock::DeterministicClock`].

pub mod audio;
pub mod clock;
pub mod logo;
pub mod mode;
pub mod pop;
pub mod preloader;
pub mod scheduler;

pub use clock::DeterministicClock;
pub use mode::{Banner, Mode, ModeCoordinator, ModeDurations, ModeRequest, ModeSignal};
