//! HTTP handlers, one module per resource

pub mod account;
pub mod admin;
pub mod groups;
pub mod health;
pub mod hires;
pub mod listings;
pub mod trades;
pub mod wanted;

pub use account::*;
pub use admin::*;
pub use groups::*;
pub use health::*;
pub use hires::*;
pub use listings::*;
pub use trades::*;
pub use wanted::*;
