//! Chat command handler.
//!
//! Interactive REPL over the question-answering pipeline. Keeps the
//! session history across turns and supports rating, clearing, and
//! exporting the conversation.

use crate::commands::{build_pipeline, format_sources, trailing_answer};
use clap::Args;
use mevzuat_chat::{
    FeedbackEntry, FeedbackSink, Rating, SessionContext, SqliteFeedbackSink, TurnRole,
};
use mevzuat_core::{AppConfig, AppResult};
use std::io::{BufRead, Write};

/// Interactive chat session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Disable feedback recording
    #[arg(long)]
    pub no_feedback: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting interactive chat session");

        let pipeline = build_pipeline(config)?;

        let feedback: Option<SqliteFeedbackSink> = if self.no_feedback {
            None
        } else {
            match SqliteFeedbackSink::open(&config.feedback_db) {
                Ok(sink) => Some(sink),
                Err(e) => {
                    // Feedback is an auxiliary concern; the session
                    // continues without it
                    tracing::warn!("Feedback db unavailable: {}", e);
                    eprintln!("Uyarı: geri bildirim kaydı devre dışı ({})", e);
                    None
                }
            }
        };

        println!("Mevzuat Asistanı — hukuk alanları:");
        for partition in pipeline.registry().all() {
            println!("  {} {}", partition.icon, partition.display_name);
        }
        println!(
            "\nKomutlar: /iyi /kötü /temizle /kaydet <dosya> — çıkmak için 'çık'"
        );

        let mut session = SessionContext::new();
        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("\nSoru> ");
            std::io::stdout().flush().ok();

            let line = match lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
                None => break,
            };
            let input = line.trim();

            if input.is_empty() {
                continue;
            }

            if matches!(input, "çık" | "çıkış" | "exit" | "quit") {
                break;
            }

            if let Some(command) = input.strip_prefix('/') {
                self.handle_command(command, &mut session, feedback.as_ref());
                continue;
            }

            let mut printed = 0usize;
            let result = pipeline
                .run_turn(&mut session, input, |partial| {
                    print!("{}", &partial[printed..]);
                    std::io::stdout().flush().ok();
                    printed = partial.len();
                })
                .await;

            match result {
                Ok(outcome) => {
                    if let Some(text) =
                        trailing_answer(&outcome.answer, printed, outcome.degraded)
                    {
                        print!("{}", text);
                    }
                    println!();

                    if let Some(badge) = &outcome.partition_badge {
                        eprintln!("[{}]", badge);
                    }

                    let sources = format_sources(&outcome.sources);
                    if !sources.is_empty() {
                        println!("\nKullanılan Referanslar:");
                        for source in &sources {
                            println!("  {}", source);
                        }
                    }

                    if !outcome.citations.is_empty() {
                        println!("\nİlgili Mevzuat:");
                        for citation in &outcome.citations {
                            println!(
                                "  {} — {} (indir: {})",
                                citation.display_name,
                                citation.canonical_url,
                                citation.download_url
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Turn failed: {}", e);
                    eprintln!("Hata: {}", e);
                }
            }
        }

        println!("Görüşmek üzere.");
        Ok(())
    }

    /// Handle a slash command.
    fn handle_command(
        &self,
        command: &str,
        session: &mut SessionContext,
        feedback: Option<&SqliteFeedbackSink>,
    ) {
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "iyi" => self.record_rating(session, feedback, Rating::Positive),
            "kötü" => self.record_rating(session, feedback, Rating::Negative),
            "temizle" => {
                session.clear();
                println!("Geçmiş temizlendi.");
            }
            "kaydet" => {
                if arg.is_empty() {
                    eprintln!("Kullanım: /kaydet <dosya>");
                    return;
                }
                match std::fs::write(arg, session.transcript()) {
                    Ok(()) => println!("Görüşme kaydedildi: {}", arg),
                    Err(e) => eprintln!("Kaydedilemedi: {}", e),
                }
            }
            _ => eprintln!("Bilinmeyen komut: /{}", name),
        }
    }

    /// Record a rating for the most recent question/answer pair.
    fn record_rating(
        &self,
        session: &SessionContext,
        feedback: Option<&SqliteFeedbackSink>,
        rating: Rating,
    ) {
        let Some(sink) = feedback else {
            eprintln!("Geri bildirim kaydı devre dışı.");
            return;
        };

        let turns = session.turns();
        let answer = turns.iter().rev().find(|t| t.role == TurnRole::Assistant);
        let question = turns.iter().rev().find(|t| t.role == TurnRole::User);

        let (Some(question), Some(answer)) = (question, answer) else {
            eprintln!("Henüz değerlendirilecek bir cevap yok.");
            return;
        };

        let entry = FeedbackEntry {
            question: question.content.clone(),
            answer: answer.content.clone(),
            rating,
        };

        match sink.record(&entry) {
            Ok(()) => println!("Geri bildiriminiz kaydedildi, teşekkürler."),
            Err(e) => eprintln!("Geri bildirim kaydedilemedi: {}", e),
        }
    }
}
