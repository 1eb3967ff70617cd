//! # patchwire-core
//!
//! Shared vocabulary for the patchwire control-surface client:
//!
//! - **Data model**: [`Input`], [`InputGroup`], [`InputNode`], [`Patch`],
//!   [`Product`] — the shapes mirrored from the server
//! - **Wire protocol**: [`RequestMessage`] / [`ResponseMessage`], the tagged
//!   JSON messages exchanged over the persistent connection
//! - **Logging**: [`logging::init_subscriber`] for the `tracing` setup

#![deny(unsafe_code)]

pub mod input;
pub mod logging;
pub mod patch;
pub mod product;
pub mod request;
pub mod response;

pub use input::{DataType, Flow, Input, InputGroup, InputNode};
pub use patch::{Patch, PatchCategory, PatchCredits, PatchDimensions, PatchLicense};
pub use product::Product;
pub use request::{RequestAction, RequestMessage, input_path, trigger_path};
pub use response::ResponseMessage;
