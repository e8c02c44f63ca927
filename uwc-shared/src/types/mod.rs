pub mod api;
pub mod auth;
pub mod media;
pub mod profile;

pub use api::*;
pub use auth::*;
pub use media::*;
pub use profile::*;
