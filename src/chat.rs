//! Chat sessions and the interactive terminal loop
//!
//! A session owns its conversation log and a response router; the
//! knowledgebase table is shared, immutable data. Logs are append-only and
//! live only as long as the session.

use crate::config::Config;
use crate::error::Result;
use crate::generation::GenerationClient;
use crate::kb::{KbSearch, KbTable};
use crate::router::ResponseRouter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Arc;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A single conversation over a shared knowledgebase.
pub struct ChatSession {
    router: ResponseRouter,
    turns: Vec<Turn>,
}

impl ChatSession {
    pub fn new(table: Arc<KbTable>, config: &Config) -> Result<Self> {
        let search = KbSearch::new(table)?;
        let client = GenerationClient::new(&config.generation)?;

        Ok(Self {
            router: ResponseRouter::new(search, client),
            turns: Vec::new(),
        })
    }

    pub fn router(&self) -> &ResponseRouter {
        &self.router
    }

    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Resolve one query and record both sides of the turn. A failed turn is
    /// logged as an error-shaped reply; the session stays usable.
    pub async fn respond(&mut self, query: &str) -> String {
        self.push(Role::User, query.to_string());

        let reply = match self.router.respond(query).await {
            Ok(reply) => reply,
            Err(err) => {
                log::error!("Turn failed: {}", err);
                format!("Error: {}", err)
            }
        };

        self.push(Role::Assistant, reply.clone());
        reply
    }

    fn push(&mut self, role: Role, text: String) {
        self.turns.push(Turn {
            role,
            text,
            timestamp: Utc::now(),
        });
    }

    /// Export the log as `[{"human": …, "assistant": …}]` pairs. An unpaired
    /// user turn is exported with an empty assistant side.
    pub fn transcript_json(&self) -> Result<String> {
        let mut pairs = Vec::new();
        let mut pending: Option<&Turn> = None;

        for turn in &self.turns {
            match turn.role {
                Role::User => {
                    if let Some(user) = pending.take() {
                        pairs.push(json!({ "human": user.text, "assistant": "" }));
                    }
                    pending = Some(turn);
                }
                Role::Assistant => {
                    let human = pending.take().map(|t| t.text.clone()).unwrap_or_default();
                    pairs.push(json!({ "human": human, "assistant": turn.text }));
                }
            }
        }
        if let Some(user) = pending {
            pairs.push(json!({ "human": user.text, "assistant": "" }));
        }

        Ok(serde_json::to_string_pretty(&pairs)?)
    }
}

/// Interactive chat session over stdin/stdout.
pub async fn run_chat_loop(mut session: ChatSession) -> Result<()> {
    println!("💬 Interactive Chat Mode");
    println!("   Type 'quit' or 'exit' to end the session");
    println!("   Type 'help' for more commands");

    let stats = session.router().search().table().stats();
    println!("\nKnowledgebase loaded: {} rows", stats.rows);
    println!("Generation endpoint: {}", session.router().client().endpoint());

    println!("\nType 'help' for commands, 'exit' to quit");
    println!("{}", "-".repeat(50));

    loop {
        print!("\nYou: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "help" => {
                println!("\nCommands:");
                println!("  search <query> - Show the raw knowledgebase answer");
                println!("  stats          - Show knowledgebase statistics");
                println!("  clear          - Clear conversation history");
                println!("  help           - Show this help");
                println!("  exit/quit      - End session");
                continue;
            }
            "stats" => {
                let stats = session.router().search().table().stats();
                println!("\nKnowledgebase statistics:");
                println!("  Rows: {}", stats.rows);
                println!("  Searchable rows: {}", stats.searchable_rows);
                println!("  Populated answer cells: {}", stats.answer_cells);
                println!("  Conversation turns: {}", session.history().len());
                continue;
            }
            "clear" => {
                session.clear();
                println!("Conversation history cleared.");
                continue;
            }
            _ => {
                // Handle search command
                if input.to_lowercase().starts_with("search ") {
                    let query = &input[7..];
                    println!("\nSearching: '{}'", query);

                    match session.router().search().answer(query) {
                        Ok(answer) => println!("\n{}", answer),
                        Err(e) => println!("❌ Search error: {}", e),
                    }
                    continue;
                }

                // Regular chat - route the query
                let start_time = std::time::Instant::now();
                let reply = session.respond(input).await;
                let elapsed = start_time.elapsed();

                println!("\nAssistant: {}", reply);
                println!("[{:.1}s]", elapsed.as_secs_f64());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::KbRecord;

    fn session_over(records: Vec<KbRecord>) -> ChatSession {
        let table = Arc::new(KbTable::from_records(records));
        ChatSession::new(table, &Config::default()).unwrap()
    }

    fn flashing_record() -> KbRecord {
        KbRecord {
            module: Some("CFI flashing unit".to_string()),
            problem: Some("Flash write aborts".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_turns_are_appended_in_order() {
        let mut session = session_over(vec![flashing_record()]);

        let reply = session.respond("thank you so much").await;
        assert_eq!(reply, "Aww! So sweet of you! You're Welcome");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text, "thank you so much");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].text, reply);
    }

    #[tokio::test]
    async fn test_kb_trigger_answers_from_table() {
        let mut session = session_over(vec![flashing_record()]);

        let reply = session.respond("I am having a flashing error").await;
        assert_eq!(reply, "**Problem:**\nFlash write aborts");
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_session_usable() {
        let mut session = session_over(vec![]);

        // Empty table makes the knowledgebase path fail for this turn.
        let reply = session.respond("I am having a flashing error").await;
        assert!(reply.starts_with("Error:"));
        assert_eq!(session.history().len(), 2);

        let reply = session.respond("hello").await;
        assert_eq!(reply, "Hello! Have a great day.");
        assert_eq!(session.history().len(), 4);
    }

    #[tokio::test]
    async fn test_clear_resets_history() {
        let mut session = session_over(vec![flashing_record()]);
        session.respond("hello").await;
        assert!(!session.history().is_empty());

        session.clear();
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_transcript_json_pairs_turns() {
        let mut session = session_over(vec![flashing_record()]);
        session.respond("hello").await;
        session.respond("thank you so much").await;

        let transcript = session.transcript_json().unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&transcript).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["human"], "hello");
        assert_eq!(parsed[0]["assistant"], "Hello! Have a great day.");
        assert_eq!(parsed[1]["human"], "thank you so much");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let table = Arc::new(KbTable::from_records(vec![flashing_record()]));
        let mut first = ChatSession::new(table.clone(), &Config::default()).unwrap();
        let mut second = ChatSession::new(table, &Config::default()).unwrap();

        first.respond("hello").await;
        second.respond("thank you so much").await;

        assert_eq!(first.history().len(), 2);
        assert_eq!(second.history().len(), 2);
        assert_eq!(first.history()[0].text, "hello");
        assert_eq!(second.history()[0].text, "thank you so much");
    }
}
