pub mod catalog;
pub mod health;
pub mod manage;
pub mod wizard;
