//! Heading candidate scanning and module-name cleanup.
//!
//! Markdown uses `##`-and-deeper headings. Plain text without any markdown
//! headings falls back to numbered-heading and short-title heuristics. Lines
//! inside fenced code blocks are never candidates.

use crate::format::DocumentFormat;
use crate::page_type::contains_keyword;
use regex::Regex;
use std::sync::OnceLock;

/// Longest description kept for a module, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

const MAX_NUMBERED_CHARS: usize = 40;
const MAX_TITLE_CHARS: usize = 30;
const MAX_TITLE_WORDS: usize = 6;

const SENTENCE_PUNCT: &[char] = &[
    '。', '！', '？', '；', '，', '、', '.', '!', '?', ';', ',',
];

const PAGE_KEYWORDS: &[&str] = &[
    "页面", "首页", "页", "列表", "详情", "弹窗", "对话框", "管理", "page", "screen", "dialog",
    "list", "detail", "form",
];

const TITLE_SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

/// A line recognized as a heading, before name cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCandidate {
    /// Zero-based line index.
    pub line: usize,
    pub level: u8,
    /// Heading text with markers removed but not yet cleaned.
    pub text: String,
    /// First content line under the heading.
    pub description: String,
}

fn markdown_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{2,})[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").unwrap())
}

fn numbered_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<dotted>\d+(?:\.\d+)+)\.?|(?P<num>\d+)[.、．]|(?P<cn>[一二三四五六七八九十]+)[、.．]|[（(](?P<paren>\d+)[）)])\s*(?P<text>\S.*)$",
        )
        .unwrap()
    })
}

fn enumeration_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:\d+(?:\.\d+)+[.、．]?\s*|\d+[.、．]\s*|[一二三四五六七八九十]+[、.．]\s*|[（(]\d+[）)]\s*)",
        )
        .unwrap()
    })
}

fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

/// Parse a markdown heading of level 2 or deeper into `(level, text)`.
pub fn markdown_heading(line: &str) -> Option<(u8, &str)> {
    let caps = markdown_heading_re().captures(line)?;
    let level = caps.get(1)?.as_str().len().min(usize::from(u8::MAX)) as u8;
    Some((level, caps.get(2)?.as_str()))
}

/// Parse a numbered plain-text heading (`1.`, `1.1`, `2、`, `一、`, `（1）`)
/// into `(level, text)`. Level is the numbering depth plus one.
pub fn numbered_heading(line: &str) -> Option<(u8, &str)> {
    let trimmed = line.trim();
    let caps = numbered_heading_re().captures(trimmed)?;
    let text = caps.name("text")?.as_str().trim();
    if text.chars().count() > MAX_NUMBERED_CHARS || text.ends_with(SENTENCE_PUNCT) {
        return None;
    }
    let level = if let Some(dotted) = caps.name("dotted") {
        dotted.as_str().split('.').count() + 1
    } else if caps.name("paren").is_some() {
        3
    } else {
        2
    };
    Some((level.min(usize::from(u8::MAX)) as u8, text))
}

/// Whether the document contains at least one markdown heading of level 2+.
pub fn has_markdown_headings(text: &str) -> bool {
    let mut in_fence = false;
    for line in text.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence && markdown_heading(line).is_some() {
            return true;
        }
    }
    false
}

/// Scan `text` for heading candidates according to `format`.
pub fn scan(text: &str, format: DocumentFormat) -> Vec<HeadingCandidate> {
    let lines: Vec<&str> = text.lines().collect();
    let mut candidates = match format {
        DocumentFormat::Markdown => scan_markdown(&lines),
        DocumentFormat::PlainText | DocumentFormat::WordDerived => {
            if has_markdown_headings(text) {
                scan_markdown(&lines)
            } else {
                scan_plaintext(&lines)
            }
        }
    };
    attach_descriptions(&lines, &mut candidates);
    candidates
}

fn scan_markdown(lines: &[&str]) -> Vec<HeadingCandidate> {
    let mut out = Vec::new();
    let mut in_fence = false;
    for (i, line) in lines.iter().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some((level, text)) = markdown_heading(line) {
            out.push(HeadingCandidate {
                line: i,
                level,
                text: text.to_string(),
                description: String::new(),
            });
        }
    }
    out
}

fn scan_plaintext(lines: &[&str]) -> Vec<HeadingCandidate> {
    let mut out = Vec::new();
    let mut in_fence = false;
    for (i, line) in lines.iter().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        let trimmed = line.trim();
        if in_fence || trimmed.is_empty() {
            continue;
        }
        if let Some((level, text)) = numbered_heading(trimmed) {
            out.push(HeadingCandidate {
                line: i,
                level,
                text: text.to_string(),
                description: String::new(),
            });
        } else if is_title_line(trimmed) && followed_by_description(lines, i, trimmed) {
            out.push(HeadingCandidate {
                line: i,
                level: 2,
                text: trimmed.to_string(),
                description: String::new(),
            });
        }
    }
    out
}

/// Short unnumbered line that reads like a page title.
fn is_title_line(line: &str) -> bool {
    if line.chars().count() > MAX_TITLE_CHARS
        || line.contains(SENTENCE_PUNCT)
        || line.starts_with(['-', '*', '+', '>', '|', '•', '#'])
    {
        return false;
    }
    let lowered = line.to_lowercase();
    PAGE_KEYWORDS.iter().any(|kw| contains_keyword(&lowered, kw)) || is_title_case(line)
}

fn is_title_case(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_TITLE_WORDS {
        return false;
    }
    if !line
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '&' | '/' | '\''))
    {
        return false;
    }
    words.iter().enumerate().all(|(i, word)| {
        let first = word.chars().next().unwrap_or(' ');
        first.is_ascii_uppercase()
            || first.is_ascii_digit()
            || (i > 0 && TITLE_SMALL_WORDS.contains(&word.to_ascii_lowercase().as_str()))
    }) && line.chars().any(|c| c.is_ascii_alphabetic())
}

/// The next non-blank line is prose rather than another heading.
fn followed_by_description(lines: &[&str], index: usize, candidate: &str) -> bool {
    let Some(next) = lines[index + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
    else {
        return false;
    };
    if is_fence(next) || numbered_heading(next).is_some() {
        return false;
    }
    next.chars().count() > candidate.chars().count() || next.ends_with(SENTENCE_PUNCT)
}

fn attach_descriptions(lines: &[&str], candidates: &mut [HeadingCandidate]) {
    let starts: Vec<usize> = candidates.iter().map(|c| c.line).collect();
    for (idx, candidate) in candidates.iter_mut().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(lines.len());
        let mut in_fence = false;
        for line in &lines[candidate.line + 1..end] {
            if is_fence(line) {
                in_fence = !in_fence;
                continue;
            }
            let trimmed = line.trim();
            if in_fence || trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            candidate.description = trimmed.chars().take(MAX_DESCRIPTION_CHARS).collect();
            break;
        }
    }
}

fn strip_emphasis(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, '*' | '_' | '`')).trim()
}

/// Normalize heading text into a module name: drop heading markers, one
/// enumeration prefix, emphasis marks and leading punctuation.
pub fn clean_name(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('#').trim();
    let s = strip_emphasis(s);
    let s = enumeration_prefix_re()
        .find(s)
        .map_or(s, |m| &s[m.end()..]);
    let s = strip_emphasis(s);
    s.trim_start_matches(|c: char| matches!(c, '-' | ':' | '：') || c.is_whitespace())
        .trim()
        .to_string()
}

/// A usable module name has at least one letter; digits and punctuation alone
/// do not name a page.
pub fn is_valid_name(name: &str) -> bool {
    name.chars().any(char::is_alphabetic)
}
