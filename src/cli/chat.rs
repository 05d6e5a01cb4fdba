use std::path::Path;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::ai::attachments::ImageAttachment;
use crate::ai::chat::{ChatBuilder, UserInput};
use crate::ai::notice::ErrorNotice;
use crate::api::public::chat::CAPTION;
use crate::core::AppConfig;

const HELP: &str = "Commands:
  /image <path>  attach a jpg or png to the next message
                 (send a blank line to send images without text)
  /clear         start over
  /help          show this message
Ctrl-D or Ctrl-C to quit";

/// A line typed at the prompt
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Attach(&'a str),
    Clear,
    Help,
    Message(&'a str),
    Empty,
}

fn parse_line(line: &str) -> Line<'_> {
    let line = line.trim();
    if let Some(path) = line.strip_prefix("/image ") {
        return Line::Attach(path.trim());
    }
    match line {
        "" => Line::Empty,
        "/clear" => Line::Clear,
        // `/image` without a path
        "/help" | "/image" => Line::Help,
        _ => Line::Message(line),
    }
}

/// The next turn's input, or `None` if there is nothing to send. A
/// blank line still sends any queued images.
fn turn_input(text: Option<&str>, pending: &mut Vec<ImageAttachment>) -> Option<UserInput> {
    if text.is_none() && pending.is_empty() {
        return None;
    }
    Some(UserInput::new(text, std::mem::take(pending)))
}

pub async fn run(config: AppConfig) -> Result<()> {
    // Keep the terminal quiet unless asked for more
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=warn", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut rl = DefaultEditor::new()?;
    let mut chat = ChatBuilder::from_config(&config).build();
    let mut pending: Vec<ImageAttachment> = Vec::new();

    println!("{}", chat.title().await);
    println!("{}", CAPTION);
    println!("Type /help for commands\n");

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                let text = match parse_line(&line) {
                    Line::Empty => None,
                    Line::Message(text) => Some(text),
                    Line::Help => {
                        println!("{}", HELP);
                        continue;
                    }
                    Line::Clear => {
                        chat.clear();
                        pending.clear();
                        println!("Chat cleared");
                        continue;
                    }
                    Line::Attach(path) => {
                        if pending.len() >= config.max_images {
                            println!("At most {} images per message", config.max_images);
                            continue;
                        }
                        match ImageAttachment::from_path(Path::new(path)) {
                            Ok(img) => {
                                println!("Attached {} ({})", img.name, img.mime_type());
                                pending.push(img);
                            }
                            Err(e) => println!("{:#}", e),
                        }
                        continue;
                    }
                };

                let Some(input) = turn_input(text, &mut pending) else {
                    continue;
                };
                match chat.next_msg(input).await {
                    Ok(Some(reply)) => println!("{}\n", reply),
                    Ok(None) => {}
                    Err(e) => {
                        let notice = ErrorNotice::classify(&e);
                        println!("{}\n{}\n", notice.heading(), notice.help());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
