pub mod api;
pub mod manage;
pub mod notify;
pub mod policy;
pub mod selection;
pub mod slots;
pub mod wizard;
