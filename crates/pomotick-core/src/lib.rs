//! # Pomotick Core Library
//!
//! This library provides the core logic for the Pomotick Pomodoro timer.
//! Front ends (the `pomotick` CLI today) are thin layers that feed commands
//! and scheduler wakeups into a [`Session`] and render its [`Projection`].
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine over Work, Short Break and
//!   Long Break periods, with a pure transition policy deciding what follows
//!   each period
//! - **Settings**: user durations and toggles, normalized from any raw input
//! - **Storage**: a string key-value store (SQLite or in-memory) and a TOML
//!   runtime configuration
//! - **Scheduler**: injectable tick and delayed-start capability with
//!   cancellation handles (tokio-backed or virtual clock)
//! - **Session**: the controller that owns all of the above
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Session`]: Command handling, tick sourcing, notification and auto-start
//! - [`Settings`]: Normalized user preferences
//! - [`KeyValueStore`]: Trait for persistence backends

pub mod display;
pub mod error;
pub mod events;
pub mod notify;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod storage;
pub mod timer;

pub use display::{format_time, Projection};
pub use error::{ConfigError, CoreError, NotifyError, StorageError};
pub use events::Event;
pub use notify::{Notifier, SilentNotifier, TerminalBell};
pub use scheduler::{ManualScheduler, ScheduleHandle, Scheduler, TokioScheduler, Wakeup, WakeupKind};
pub use session::{parse_adjustment, Session, SessionSnapshot, MAX_PENDING_EVENTS, STATE_KEY};
pub use settings::{Settings, SettingsCandidate};
pub use storage::{open_store, AppConfig, Database, KeyValueStore, MemoryStore};
pub use timer::{Mode, TimerEngine};
