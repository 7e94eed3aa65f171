//! identikit command-line shell.
//!
//! Thin composition root for the studio core: wires the HTTP client, the
//! generation engine, and the operation wrappers together, then drives them
//! from the terminal. The real product front-end renders the same progress
//! stream and notification channel this binary prints.

use identikit_core::{
    GeneratedIdentity, GenerationEngine, IdentityBackend, IdentityClient, StudioConfig, StudioOps,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage:
  identikit generate <description> [--save <name>]
  identikit profiles";

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("no .env loaded: {e}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StudioConfig::load().expect("load StudioConfig");
    tracing::debug!(backend_url = %config.backend_url, mode = ?config.generation_mode, "studio config");

    let backend: Arc<dyn IdentityBackend> = Arc::new(IdentityClient::from_config(&config));
    let engine = Arc::new(GenerationEngine::new(
        Arc::clone(&backend),
        config.generation_mode,
    ));
    let (ops, mut notifications) = StudioOps::new(backend, Arc::clone(&engine));

    // Toast stream → stderr, like the product UI renders it.
    tokio::spawn(async move {
        while let Some(toast) = notifications.recv().await {
            eprintln!("[{}] {}", toast.title, toast.message);
        }
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    let exit = match args.first().map(String::as_str) {
        Some("generate") => run_generate(&ops, engine, &args[1..]).await,
        Some("profiles") => run_profiles(&ops).await,
        _ => {
            eprintln!("{USAGE}");
            2
        }
    };
    std::process::exit(exit);
}

async fn run_generate(ops: &StudioOps, engine: Arc<GenerationEngine>, args: &[String]) -> i32 {
    let mut description = String::new();
    let mut save_name: Option<String> = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--save" {
            save_name = iter.next().cloned();
            if save_name.is_none() {
                eprintln!("{USAGE}");
                return 2;
            }
        } else {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(arg);
        }
    }
    if description.trim().is_empty() {
        eprintln!("{USAGE}");
        return 2;
    }

    // Mirror progress snapshots to the terminal while the attempt runs.
    let mut progress_rx = engine.subscribe();
    let printer = tokio::spawn(async move {
        while progress_rx.changed().await.is_ok() {
            if let Some(p) = progress_rx.borrow_and_update().clone() {
                let message = p.message.unwrap_or_else(|| p.step.label().to_string());
                eprintln!("  {:>3}% {}", p.progress, message);
            }
        }
    });

    let identity = tokio::select! {
        result = ops.generate(&description) => match result {
            Ok(identity) => identity,
            Err(_) => return 1,
        },
        _ = tokio::signal::ctrl_c() => {
            engine.reset();
            eprintln!("generation cancelled");
            return 130;
        }
    };
    printer.abort();

    print_identity(&identity);

    if let Some(name) = save_name {
        if let Err(e) = ops.save_profile(&name, &identity.bio, &identity).await {
            tracing::error!(error = %e, "save failed");
            return 1;
        }
    }
    0
}

async fn run_profiles(ops: &StudioOps) -> i32 {
    match ops.profiles().await {
        Ok(profiles) if profiles.is_empty() => {
            println!("no saved profiles");
            0
        }
        Ok(profiles) => {
            for profile in profiles {
                println!("{}\n  {}\n  image: {}  voice: {}", profile.name, profile.bio, profile.image_url, profile.audio_url);
            }
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "could not list profiles");
            1
        }
    }
}

fn print_identity(identity: &GeneratedIdentity) {
    println!("bio:\n{}\n", identity.bio);
    println!("image prompt: {}", identity.image_prompt);
    println!("voice prompt: {}", identity.voice_prompt);
    println!(
        "image: {} base64 bytes, audio: {} base64 bytes",
        identity.image_base64.len(),
        identity.audio_base64.len()
    );
}
