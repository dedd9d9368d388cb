//! Domain layer: entities, value objects, events and the interfaces the
//! usecase layer depends on.

pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{
    AppendOutcome, ChatMessage, JoinedRoom, LeftRoom, MessageKind, MessageStatus, Participant,
    Room, StatusChange,
};
pub use error::{MessagePushError, RepositoryError, RoomError, ValueObjectError};
pub use event::RoomEvent;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::RoomRepository;
#[cfg(test)]
pub use repository::MockRoomRepository;
pub use value_object::{
    ConnectionId, ConnectionIdFactory, MessageId, MessageIdFactory, MessageText, RoomId,
    RoomIdFactory, RoomName, Timestamp, Username,
};
