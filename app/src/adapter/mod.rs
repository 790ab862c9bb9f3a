pub mod host;
pub mod uiot;
