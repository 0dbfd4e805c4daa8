pub mod code;
pub mod delivery;
pub mod view;
