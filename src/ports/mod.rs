//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the lottery core and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `PresentationAdapter` - Chat surface: announcements, notices, toggle re-fetch
//! - `ParticipantDirectory` - Eligible participants for a voice scope
//! - `WorkspaceProvisioner` - Scoped private channels
//! - `Clock` - Monotonic time for deadlines
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events

mod clock;
mod directory;
mod event_publisher;
mod event_subscriber;
mod presentation;
mod workspace;

pub use clock::{Clock, TokioClock};
pub use directory::{ParticipantDirectory, VoiceScope};
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use presentation::{Notice, PresentationAdapter, SessionAnnouncement};
pub use workspace::{WorkspaceProvisioner, WorkspaceRequest};
