//! Line-preserving transcript chunking.

/// Split a transcript into chunks of at most `max_chars` characters.
///
/// Lines are packed greedily and never split, so a chunk only exceeds the
/// bound when a single line is longer than `max_chars`. A transcript that
/// already fits comes back whole as the only chunk.
pub fn chunk_transcript(transcript: &str, max_chars: usize) -> Vec<String> {
    if transcript.chars().count() <= max_chars {
        return vec![transcript.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in transcript.split('\n') {
        let line_len = line.chars().count();

        if current_len + line_len + 1 > max_chars {
            flush(&mut chunks, &current);
            current = line.to_string();
            current_len = line_len;
        } else {
            if !current.is_empty() {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(line);
            current_len += line_len;
        }
    }
    flush(&mut chunks, &current);

    chunks
}

fn flush(chunks: &mut Vec<String>, buffer: &str) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
