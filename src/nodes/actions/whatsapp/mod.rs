mod action;
mod models;
mod payload;

pub use action::WhatsappAction;
pub use models::MessageKind;
