use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::HandlerConfig;
use crate::core::error::{ConfigError, ProviderError, SrtError};
use crate::core::traits::CompletionProvider;
use crate::handler::{build_provider, request_translation};
use crate::srt::dictionary::{DataDictionary, refine_entries};
use crate::srt::parser::{SrtEntry, format_srt, parse_srt};

pub const DEFAULT_MAX_CHUNK_CHARS: usize = 1000;
pub const DEFAULT_MAX_CHUNK_ENTRIES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLimits {
    pub max_chars: usize,
    pub max_entries: usize,
}

impl Default for ChunkLimits {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHUNK_CHARS,
            max_entries: DEFAULT_MAX_CHUNK_ENTRIES,
        }
    }
}

/// Splits cues into consecutive chunks.
///
/// A chunk closes before the cue that would push its text past `max_chars`
/// (counted in chars, newlines between cues excluded) or when it already
/// holds `max_entries` cues. A single cue longer than `max_chars` forms its
/// own chunk.
pub fn chunk_entries(entries: &[SrtEntry], limits: ChunkLimits) -> Vec<&[SrtEntry]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chunk_chars = 0;

    for (index, entry) in entries.iter().enumerate() {
        let entry_chars = entry.text.chars().count();
        let chunk_len = index - start;

        if chunk_len > 0
            && (chunk_chars + entry_chars > limits.max_chars || chunk_len >= limits.max_entries)
        {
            chunks.push(&entries[start..index]);
            start = index;
            chunk_chars = 0;
        }
        chunk_chars += entry_chars;
    }

    if start < entries.len() {
        chunks.push(&entries[start..]);
    }
    chunks
}

/// Maps a translated chunk reply back onto its cues.
///
/// When the reply has exactly as many lines as the chunk's cues had in
/// total, multi-line cues get their own lines back. Otherwise cue `i` takes
/// reply line `i`. A cue whose share of the reply is blank keeps its source
/// text.
pub fn split_translation(chunk: &[SrtEntry], translated: &str) -> Vec<SrtEntry> {
    let lines: Vec<&str> = translated.split('\n').collect();
    let source_line_counts: Vec<usize> = chunk
        .iter()
        .map(|entry| entry.text.split('\n').count())
        .collect();

    if lines.len() == source_line_counts.iter().sum::<usize>() {
        let mut offset = 0;
        return chunk
            .iter()
            .zip(source_line_counts)
            .map(|(entry, line_count)| {
                let text = lines[offset..offset + line_count].join("\n");
                offset += line_count;
                with_text_or_source(entry, text)
            })
            .collect();
    }

    warn!(
        cues = chunk.len(),
        reply_lines = lines.len(),
        "translated chunk line count does not match its cues"
    );

    chunk
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let text = lines.get(index).map(|line| line.to_string()).unwrap_or_default();
            with_text_or_source(entry, text)
        })
        .collect()
}

fn with_text_or_source(entry: &SrtEntry, text: String) -> SrtEntry {
    let text = if text.trim().is_empty() {
        entry.text.clone()
    } else {
        text
    };
    SrtEntry {
        text,
        ..entry.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrtOptions {
    pub chunk_limits: ChunkLimits,
    /// Extra attempts per chunk after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_delay_ms: u64,
    /// Pause between consecutive chunks.
    pub chunk_delay_ms: u64,
}

impl Default for SrtOptions {
    fn default() -> Self {
        Self {
            chunk_limits: ChunkLimits::default(),
            max_retries: 3,
            retry_delay_ms: 1_000,
            chunk_delay_ms: 1_500,
        }
    }
}

impl SrtOptions {
    fn retry_delay(&self, retry_index: u32) -> Duration {
        let multiplier = 1_u64.checked_shl(retry_index.min(63)).unwrap_or(u64::MAX);
        Duration::from_millis(self.retry_delay_ms.saturating_mul(multiplier))
    }
}

/// Translates whole subtitle documents chunk by chunk.
pub struct SrtTranslator {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    max_output_tokens: u32,
    options: SrtOptions,
}

impl SrtTranslator {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        config: &HandlerConfig,
        options: SrtOptions,
    ) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            options,
        }
    }

    pub fn from_config(config: &HandlerConfig, options: SrtOptions) -> Result<Self, ConfigError> {
        Ok(Self::new(build_provider(config)?, config, options))
    }

    /// Translates one chunk of newline-joined cue text, retrying any failure.
    pub async fn translate_chunk(&self, text: &str, language: &str) -> Result<String, ProviderError> {
        let mut retry_index = 0;
        loop {
            let attempt = request_translation(
                self.provider.as_ref(),
                &self.model,
                self.max_output_tokens,
                language,
                text,
            )
            .await;

            match attempt {
                Ok(translated) => return Ok(translated),
                Err(error) if retry_index < self.options.max_retries => {
                    let delay = self.options.retry_delay(retry_index);
                    warn!(%error, retry = retry_index + 1, delay_ms = delay.as_millis() as u64, "retrying chunk");
                    tokio::time::sleep(delay).await;
                    retry_index += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    pub async fn translate_entries(
        &self,
        entries: &[SrtEntry],
        language: &str,
    ) -> Result<Vec<SrtEntry>, SrtError> {
        let chunks = chunk_entries(entries, self.options.chunk_limits);
        let chunk_count = chunks.len();
        debug!(language, cues = entries.len(), chunks = chunk_count, "translating cues");

        let mut translated = Vec::with_capacity(entries.len());
        for (index, chunk) in chunks.into_iter().enumerate() {
            if index > 0 && self.options.chunk_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.options.chunk_delay_ms)).await;
            }

            let text = chunk
                .iter()
                .map(|entry| entry.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let reply = self
                .translate_chunk(&text, language)
                .await
                .map_err(|source| SrtError::Translation {
                    language: language.to_string(),
                    chunk: index + 1,
                    chunks: chunk_count,
                    source,
                })?;

            translated.extend(split_translation(chunk, &reply));
            info!(
                language,
                progress = ((index + 1) * 100) / chunk_count,
                "translated chunk {}/{}",
                index + 1,
                chunk_count
            );
        }

        Ok(translated)
    }

    /// Parses `content` once and renders a refined translation per language,
    /// keyed by language code. Stops at the first language that fails.
    pub async fn translate_document(
        &self,
        content: &str,
        languages: &[String],
        dictionary: &DataDictionary,
    ) -> Result<BTreeMap<String, String>, SrtError> {
        let entries = parse_srt(content)?;
        let mut documents = BTreeMap::new();

        for language in languages {
            let translated = self.translate_entries(&entries, language).await?;
            let refined = refine_entries(&translated, dictionary, language);
            documents.insert(language.clone(), format_srt(&refined));
        }

        Ok(documents)
    }
}

/// Output name for a translated file: `talk.srt` becomes `talk_fr.srt`.
pub fn translated_file_name(source_name: &str, language: &str) -> String {
    let stem = source_name.strip_suffix(".srt").unwrap_or(source_name);
    format!("{stem}_{language}.srt")
}
