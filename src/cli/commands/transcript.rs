//! Transcript command - fetch, parse and optionally chunk a video's captions.

use crate::caption_source::{VideoId, YtDlpSource};
use crate::chunking::{chunk_transcript, select_best_chunk};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::TranscriptService;
use anyhow::Result;
use std::sync::Arc;

/// Run the transcript command.
pub async fn run_transcript(
    url: &str,
    chunk_chars: Option<usize>,
    query: Option<&str>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Transcript, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tldw doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let video = VideoId::from_url(url)?;
    let source = Arc::new(YtDlpSource::new(&settings.acquisition)?);
    let service = TranscriptService::new(source, settings.acquisition.min_transcript_chars);

    let spinner = Output::spinner(&format!("Fetching transcript for {}...", video));
    let result = service.fetch(&video).await;
    spinner.finish_and_clear();
    let fetched = result?;

    Output::header(&fetched.video_title);
    Output::kv("Video", &video.watch_url());
    Output::kv("Length", &format!("{} chars", fetched.transcript.chars().count()));
    println!();

    let Some(max_chars) = chunk_chars else {
        println!("{}", fetched.transcript);
        return Ok(());
    };

    let chunks = chunk_transcript(&fetched.transcript, max_chars);

    if let Some(query) = query {
        let best = select_best_chunk(&chunks, query);
        Output::info(&format!("Best of {} chunks for \"{}\":", chunks.len(), query));
        println!("{}", best);
        return Ok(());
    }

    for (i, chunk) in chunks.iter().enumerate() {
        Output::header(&format!(
            "Chunk {}/{} ({} chars)",
            i + 1,
            chunks.len(),
            chunk.chars().count()
        ));
        println!("{}", chunk);
    }

    Ok(())
}
