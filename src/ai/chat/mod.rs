mod core;
pub mod models;
pub use self::core::{Chat, ChatBuilder, UserInput};
pub use models::{ChatLog, RenderMessage, RenderMessageView, Transcript};
