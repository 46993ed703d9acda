//! Live driving telemetry.
//!
//! Location samples flow through a single consumer that derives speed,
//! keeps the speed limit fresh and drives the alert state machine.
//!
//! # Architecture
//!
//! ```text
//! LocationEvent ──► TelemetrySession ──► TelemetryProcessor ──┬──► SpeedLimitLookup ──► (task)
//!                        ▲    │                                └──► HazardAlertStateMachine
//!                        │    ├──► AlertSink (tones)                         │
//!                        │    └──► watch<TelemetryDisplay>                   │
//!                        └────────── SpeedLimitUpdate ◄──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use roadpilot::telemetry::TelemetrySession;
//!
//! let (session, mut outputs) = TelemetrySession::with_provider(provider, config, classifier, sink);
//! tokio::spawn(session.run(location_rx, shutdown.clone()));
//!
//! while outputs.display.changed().await.is_ok() {
//!     let display = outputs.display.borrow().clone();
//!     println!("{} / {} km/h", display.speed_kph, display.limit_kph);
//! }
//! ```

mod processor;
mod sample;
mod session;

pub use processor::{
    speed_kph, CameraDirective, RecenterHandle, TelemetryProcessor, TelemetryUpdate,
    DEFAULT_FOLLOW_ZOOM, FOLLOW_TILT_DEGREES,
};
pub use sample::{LocationEvent, LocationSample};
pub use session::{FixStatus, SessionStats, TelemetryDisplay, TelemetryOutputs, TelemetrySession};
