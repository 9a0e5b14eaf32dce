pub mod lap;
pub mod record;
pub mod synop;
