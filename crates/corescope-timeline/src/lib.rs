//! Corescope Timeline — revision tree, navigation planning, and sessions

pub mod error;
pub mod navigator;
pub mod revision;
pub mod script;
pub mod session;
pub mod timeline;


pub use error::TimelineError;
pub use navigator::{lowest_common_ancestor, plan, NavigationPlan, Relation};
pub use revision::{Action, Change, Revision, RevisionId, RevisionSnapshot, RevisionTree};
pub use script::{Script, ScriptCommand, ScriptError};
pub use session::{Session, SessionRegistry, SharedSession};
pub use timeline::Timeline;
