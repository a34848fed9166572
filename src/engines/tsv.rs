//! Tesseract TSV output parsing

use crate::engine::Token;

/// TSV level for word rows
const WORD_LEVEL: i32 = 5;

/// Parse Tesseract TSV output into word tokens
///
/// TSV fields: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text
pub fn parse_words(tsv: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    for line in tsv.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 11 {
            continue;
        }

        // Header row fails to parse and is skipped here
        let level: i32 = match fields[0].trim().parse() {
            Ok(level) => level,
            Err(_) => continue,
        };
        if level != WORD_LEVEL {
            continue;
        }

        let confidence = fields[10]
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|c| c.is_finite());
        let text = fields.get(11).map(|t| t.trim()).unwrap_or_default();

        tokens.push(Token {
            text: text.to_string(),
            confidence,
        });
    }

    tokens
}
