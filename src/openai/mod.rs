mod core;
pub use self::core::{
    ContentPart, ImageUrl, Message, MessageContent, Role, completion, completion_content,
};
