// SPDX-License-Identifier: MIT

//! Shared types for the ZTP engine: clock abstraction, status enums,
//! filesystem layout, and the subprocess PID registry used by the
//! supervisor's signal-drain loop.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod activity;
pub mod clock;
pub mod fsutil;
pub mod macros;
pub mod paths;
pub mod pidset;
pub mod status;

pub use activity::update_activity;
pub use clock::{Clock, FakeClock, SystemClock};
pub use fsutil::{atomic_write, atomic_write_json};
pub use paths::Paths;
pub use pidset::PidRegistry;
pub use status::{DocumentStatus, RestartDecision, SectionStatus};
