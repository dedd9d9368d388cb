//! UseCase layer (the message broker).
//!
//! One usecase per inbound operation. Each validates its input, mutates the
//! room through [`RoomRepository`](crate::domain::RoomRepository) and emits
//! events through [`MessagePusher`](crate::domain::MessagePusher).

mod create_room;
mod error;
mod get_room_info;
mod join_room;
mod leave_room;
mod reap_room;
mod send_message;
mod typing;

#[cfg(test)]
pub(crate) mod testing;

pub use create_room::{CreateRoomUseCase, CreatedRoom};
pub use error::RelayError;
pub use get_room_info::GetRoomInfoUseCase;
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use leave_room::{LeaveOutcome, LeaveRoomUseCase};
pub use reap_room::{IdleRoomReaper, reap_if_idle};
pub use send_message::SendMessageUseCase;
pub use typing::TypingUseCase;
