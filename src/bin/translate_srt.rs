//! Translates SRT subtitle files into one or more languages.
//!
//! Usage: `translate_srt --lang fr --lang de [--dictionary terms.json] [--out-dir DIR] FILE...`.
//! Writes one `<stem>_<lang>.srt` per file and language into the output directory.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use translation_handler::HandlerConfig;
use translation_handler::srt::{DataDictionary, SrtOptions, SrtTranslator, translated_file_name};

#[derive(Parser, Debug)]
#[command(name = "translate_srt", about = "Translate SRT subtitle files")]
struct Cli {
    /// SRT files to translate.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Target language; repeat for several.
    #[arg(short, long = "lang", required = true)]
    languages: Vec<String>,

    /// JSON term dictionary applied after translation.
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "translation_handler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let dictionary = match &cli.dictionary {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read dictionary {}", path.display()))?;
            DataDictionary::from_json(&raw)
                .with_context(|| format!("failed to load dictionary {}", path.display()))?
        }
        None => DataDictionary::default(),
    };

    let config = HandlerConfig::from_env().context("invalid handler configuration")?;
    let translator = SrtTranslator::from_config(&config, SrtOptions::default())
        .context("failed to build subtitle translator")?;

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    for path in &cli.files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let documents = translator
            .translate_document(&content, &cli.languages, &dictionary)
            .await
            .with_context(|| format!("failed to translate {}", path.display()))?;

        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "subtitles.srt".to_string());
        for (language, document) in documents {
            let target = cli.out_dir.join(translated_file_name(&source_name, &language));
            std::fs::write(&target, document)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(file = %target.display(), "wrote translation");
        }
    }

    Ok(())
}
