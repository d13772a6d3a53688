mod billing;
mod consultant;
mod followup;
mod invoice;
mod status;
mod user;

pub mod dtos {
    pub use crate::billing::dtos::*;
    pub use crate::invoice::dtos::*;
    pub use crate::user::dtos::*;
}

pub use crate::billing::api::*;
pub use crate::consultant::api::*;
pub use crate::followup::api::*;
pub use crate::invoice::api::*;
pub use crate::status::api::*;
pub use crate::user::api::*;
