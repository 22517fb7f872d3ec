//! Streaming a reply through the dispatcher, asking for more when it is cut off.
//!
//! To run this example, set the OPENAI_API_KEY environment variable (a `.env`
//! file works too). OPENAI_ENGINE picks the engine; a legacy engine such as
//! `davinci` goes through the completion endpoint instead of chat.
//!
//! ```bash
//! export OPENAI_API_KEY=your_api_key_here
//! OPENAI_ENGINE=gpt-3.5-turbo OPENAI_MAX_TOKENS=64 cargo run --example stream_chat
//! ```

use platformed_completions::{Client, Conversation, Error, Message, StreamAccumulator};
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const MAX_CONTINUATIONS: usize = 2;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let client = Client::from_env()?;
    println!("Using engine {} (chat: {})", client.engine(), client.engine().is_chat());

    let mut conversation = Conversation::system("You are a helpful assistant that responds concisely.")
        .with_user("Tell me a short story about a robot learning to paint.");

    // Ctrl-C stops the stream between frames.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    for round in 0..=MAX_CONTINUATIONS {
        let mut reply = StreamAccumulator::new();
        let result = client
            .do_stream(&conversation, &cancel, |chunk| {
                print!("{}", chunk.text());
                let _ = std::io::stdout().flush();
                reply.push(chunk);
            })
            .await;
        println!();

        match result {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {
                println!("Interrupted after {} chunks", reply.chunks());
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        println!(
            "-- round {round}: {} chunks, {} tokens reported",
            reply.chunks(),
            reply.total_tokens()
        );

        if !reply.can_continue() {
            break;
        }

        conversation.push(reply.into_message());
        conversation.push(Message::user("continue"));
    }

    Ok(())
}
