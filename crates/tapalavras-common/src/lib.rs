pub mod protocol;
pub mod room;
pub mod room_code;
