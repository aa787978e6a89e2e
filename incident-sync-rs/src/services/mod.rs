//! Remote collaborators
//!
//! - `incidents`: the incident REST service
//! - `content`: the UI content source

pub mod common;
pub mod content;
pub mod incidents;

pub use common::{ReqwestTransport, UserAgent};
pub use content::{ContentSource, StaticContentSource};
pub use incidents::{IncidentApi, IncidentService};
