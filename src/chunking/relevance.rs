//! Lexical relevance scoring for picking the chunk that best matches a question.

use std::collections::HashSet;

/// Query words of this many characters or fewer carry no signal.
const MIN_TOKEN_CHARS: usize = 3;

/// Pick the chunk sharing the most distinct query words.
///
/// Scoring is case-insensitive substring matching. Ties go to the earliest
/// chunk, so a query with no usable words selects the first chunk.
pub fn select_best_chunk<'a>(chunks: &'a [String], query: &str) -> &'a str {
    match chunks {
        [] => "",
        [only] => only.as_str(),
        _ => {
            let tokens = query_tokens(query);
            let mut best = &chunks[0];
            let mut best_score = 0;

            for chunk in chunks {
                let score = score_chunk(chunk, &tokens);
                if score > best_score {
                    best = chunk;
                    best_score = score;
                }
            }

            best.as_str()
        }
    }
}

/// Lower-cased, distinct whitespace tokens longer than three characters.
fn query_tokens(query: &str) -> HashSet<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

fn score_chunk(chunk: &str, tokens: &HashSet<String>) -> usize {
    let haystack = chunk.to_lowercase();
    tokens
        .iter()
        .filter(|t| haystack.contains(t.as_str()))
        .count()
}
