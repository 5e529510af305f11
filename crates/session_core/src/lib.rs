//! Speaker-selection core: the per-sector session state machine, the draw
//! selector and the controller that ties them to a roster store.

pub mod controller;
pub mod selector;
pub mod session;
pub mod summary;

pub use controller::{is_rejection, ControllerError, StandupController};
pub use selector::{RandomSelector, ScriptedSelector, Selector};
pub use session::{MemberStatus, Phase, Session, SessionError};
pub use summary::Summary;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
