//! The numeric short-entry code: layout, per-keystroke grammar, auto-fill,
//! and conversion to and from [`crate::models::Observation`].

pub mod autofill;
pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod grammar;
pub mod guide;
pub mod layout;
pub mod sector;
pub mod validator;

pub use autofill::{RegionRequest, SiteSelector};
pub use buffer::InputBuffer;
pub use decoder::{decode, DecodeError};
pub use encoder::encode;
pub use grammar::{FieldGrammar, Verdict};
pub use guide::Guide;
pub use validator::{Accepted, IncrementalValidator, Keystroke};
