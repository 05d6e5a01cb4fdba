pub mod attachments;
pub mod chat;
pub mod notice;
pub mod prompt;
pub mod title;
