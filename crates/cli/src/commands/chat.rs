//! Chat command handler.
//!
//! Interactive session against one agent. A document loaded at startup (or
//! with `/load`) stays available for the whole session.

use clap::Args;
use skydoc_agent::Agent;
use skydoc_core::{config::AppConfig, AppResult};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Start an interactive chat session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Document to load before the session starts
    #[arg(short, long)]
    pub document: Option<PathBuf>,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let agent = Agent::from_config(config)?;

        if let Some(ref document) = self.document {
            load_document(&agent, document).await;
        }

        println!("skydoc chat. Ask about the weather or a loaded document.");
        println!("Commands: /load <path> to load a document, /quit to exit.");

        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        loop {
            print!("> ");
            stdout.flush().ok();

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break; // EOF
            }

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if input == "/quit" || input == "/exit" {
                break;
            }

            if let Some(path) = input.strip_prefix("/load ") {
                load_document(&agent, Path::new(path.trim())).await;
                continue;
            }

            match agent.answer(input).await {
                Ok(response) => println!("{}", response.answer),
                Err(e) => eprintln!("error: {}", e),
            }
        }

        Ok(())
    }
}

/// Load a document, reporting failure without ending the session.
async fn load_document(agent: &Agent, path: &Path) {
    match agent.ingest(path).await {
        Ok(commit) => {
            println!(
                "Loaded {} ({} chunks, {} bytes)",
                commit.source, commit.chunk_count, commit.byte_count
            );
        }
        Err(e) => eprintln!("Failed to load {}: {}", path.display(), e),
    }
}
