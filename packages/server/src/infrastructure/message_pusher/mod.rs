//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `channel`: 接続ごとの mpsc チャンネルを使った実装。
//!   WebSocket と SSE のどちらの配信タスクもこのチャンネルを読み出す。

pub mod channel;

pub use channel::ChannelMessagePusher;
