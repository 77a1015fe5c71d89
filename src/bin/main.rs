use crossterm::style::Stylize;
use speller_core::config::EngineSettings;
use speller_core::core::bigram::BigramMaskModel;
use speller_core::core::context::{MaskedLanguageModel, ModelLoader};
use speller_core::core::types::{SuggestionResponse, SuggestionStatus};
use speller_core::dictionary::WordList;
use speller_core::SuggestionEngine;
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;

const USER_ID: &str = "local";
const FALLBACK_WORDS: &[&str] = &[
    "friend", "field", "fry", "the", "because", "their", "there", "they're", "bed", "dad", "bad",
    "big", "dog", "quite", "quiet", "here", "hear", "school", "said", "was",
];

/// Usage: speller_engine [word_list.txt] [corpus.txt]
#[tokio::main]
async fn main() {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let dictionary_path = args.next().map(PathBuf::from);
    let corpus_path = args.next().map(PathBuf::from);

    let mut settings = EngineSettings::load_or_default(None);
    if settings.profile_dir.is_none() {
        settings.profile_dir = EngineSettings::default_profile_dir();
    }

    let dictionary = match dictionary_path {
        Some(path) => WordList::from_file(&path).unwrap_or_else(|e| {
            eprintln!("[ERROR] Could not read word list: {}", e);
            WordList::new(FALLBACK_WORDS.iter().copied())
        }),
        None => WordList::new(FALLBACK_WORDS.iter().copied()),
    };

    let loader: ModelLoader = Arc::new(move || -> speller_core::Result<Arc<dyn MaskedLanguageModel>> {
        let model = match &corpus_path {
            Some(path) => BigramMaskModel::from_file(path)?,
            None => BigramMaskModel::new(),
        };
        Ok(Arc::new(model) as Arc<dyn MaskedLanguageModel>)
    });

    let mut engine = SuggestionEngine::from_settings(settings, Arc::new(dictionary), loader);
    engine.init().await;

    println!("Dyslexia-aware speller. Type 'exit' to quit.");
    println!("---------------------------------------------------------------");
    println!("Enter '<sentence> | <word>' to get suggestions.");
    println!("Then ':1'..':3' to accept one, or ':ignore' to stop flagging the word.\n");

    let mut last: Option<(String, SuggestionResponse)> = None;
    loop {
        print!("> ");
        let _ = stdout().flush();
        let mut input = String::new();
        match stdin().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            "" => continue,
            ":ignore" => {
                if let Some((word, _)) = last.take() {
                    match engine.record_feedback(&word, "", "ignored", USER_ID) {
                        Ok(_) => println!("'{}' will no longer be flagged.", word),
                        Err(e) => eprintln!("[ERROR] {}", e),
                    }
                }
            }
            s if s.starts_with(':') && s.len() > 1 => {
                let Some((word, response)) = &last else { continue };
                if let Ok(n) = s[1..].parse::<usize>() {
                    if n > 0 && n <= response.suggestions.len() {
                        let chosen = &response.suggestions[n - 1].word;
                        if let Err(e) = engine.record_feedback(word, chosen, "accepted", USER_ID) {
                            eprintln!("[ERROR] {}", e);
                        } else {
                            println!("Learned: {} -> {}", word, chosen.as_str().green());
                        }
                    }
                }
            }
            s => {
                let Some((sentence, word)) = s.rsplit_once('|') else {
                    println!("Expected '<sentence> | <word>'.");
                    continue;
                };
                let (sentence, word) = (sentence.trim(), word.trim());
                match engine.generate_suggestions(sentence, word, USER_ID).await {
                    Ok(response) => {
                        print_response(word, &response);
                        last = Some((word.to_string(), response));
                    }
                    Err(e) => eprintln!("[ERROR] {}", e),
                }
            }
        }
    }

    engine.shutdown();
    let failures = engine.profiles().persistence_failures();
    if failures > 0 {
        eprintln!("[WARN] {} profile read/write failures this session.", failures);
    }
}

fn print_response(word: &str, response: &SuggestionResponse) {
    match response.status {
        SuggestionStatus::Ignored => println!("'{}' is on your ignore list.", word),
        SuggestionStatus::NoMatch => println!("No suggestions for '{}'.", word),
        SuggestionStatus::Success => {
            println!("\nSuggestions for '{}':", word.bold());
            for (i, s) in response.suggestions.iter().enumerate() {
                println!("  :{}: {} ({})", i + 1, s.word.as_str().green().bold(), s.confidence_percent);
                println!("      {}", s.example_sentence.as_str().dim());
                if let Some(hint) = &s.homophone_hint {
                    println!("      {}", hint.as_str().yellow());
                }
            }
            let adaptations = serde_json::to_string(&response.ui_adaptations).unwrap_or_default();
            println!("UI: {}\n", adaptations);
        }
    }
}
