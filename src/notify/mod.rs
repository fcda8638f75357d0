// src/notify/mod.rs
pub mod telegram;

use crate::listing::ScoredListing;
use anyhow::Result;

/// Listings shown in one digest unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 10;

pub const DIGEST_HEADING: &str = "🚀 *New High-Priority Internships Found!*";
const SEPARATOR: &str = "─────────────────────";

/// Delivery channel for the cycle digest.
///
/// `send` receives the full ordered list; truncation to top-K is the
/// notifier's job. An unconfigured notifier returns `Ok(())` without doing
/// anything.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, scored: &[ScoredListing]) -> Result<()>;
}

/// Notifier that never delivers; used when no channel is configured.
pub struct NoopNotifier;

#[async_trait::async_trait]
impl Notifier for NoopNotifier {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn send(&self, _scored: &[ScoredListing]) -> Result<()> {
        Ok(())
    }
}

/// Escape characters that carry meaning in Telegram's legacy Markdown.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Percent-encode the characters that would end a Markdown link target early.
pub fn escape_link(url: &str) -> String {
    url.replace('(', "%28").replace(')', "%29")
}

/// One message block per listing.
pub fn render_block(s: &ScoredListing) -> String {
    let l = &s.listing;
    format!(
        "🏢 *{}*\n💼 {}\n🔗 [Apply Here]({})\n⭐ Priority: {}\n{}\n",
        escape_markdown(&l.company),
        escape_markdown(&l.role),
        escape_link(&l.apply_link),
        s.priority,
        SEPARATOR
    )
}

/// Render the digest for the first `top_k` listings. `None` when there is
/// nothing to say.
pub fn render_digest(scored: &[ScoredListing], top_k: usize) -> Option<String> {
    let top = &scored[..scored.len().min(top_k)];
    if top.is_empty() {
        return None;
    }
    let mut msg = format!("{DIGEST_HEADING}\n\n");
    for s in top {
        msg.push_str(&render_block(s));
    }
    Some(msg)
}

/// Split `text` into chunks of at most `limit` chars, breaking only between
/// lines. A single line longer than `limit` becomes its own chunk.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut cur = String::new();
    for line in text.split_inclusive('\n') {
        if !cur.is_empty() && cur.chars().count() + line.chars().count() > limit {
            chunks.push(std::mem::take(&mut cur));
        }
        cur.push_str(line);
    }
    if !cur.is_empty() {
        chunks.push(cur);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{NormalizedListing, Priority};

    fn scored(company: &str, score: u32) -> ScoredListing {
        ScoredListing::new(
            NormalizedListing {
                company: company.into(),
                role: "UX_Intern".into(),
                apply_link: format!("https://jobs.test/{company}"),
                ..Default::default()
            },
            score,
        )
    }

    #[test]
    fn digest_truncates_to_top_k() {
        let list: Vec<ScoredListing> = (0..15).map(|i| scored(&format!("C{i}"), 4)).collect();
        let msg = render_digest(&list, 10).unwrap();
        assert_eq!(msg.matches("🏢").count(), 10);
        assert!(msg.contains("*C9*"));
        assert!(!msg.contains("*C10*"));
        assert!(msg.contains("⭐ Priority: High"));
        assert!(msg.contains("UX\\_Intern"));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render_digest(&[], 10).is_none());
        assert!(render_digest(&[scored("A", 1)], 0).is_none());
    }

    #[test]
    fn block_has_all_parts() {
        let b = render_block(&scored("Acme", 2));
        assert!(b.contains("*Acme*"));
        assert!(b.contains("(https://jobs.test/Acme)"));
        assert!(b.contains(Priority::Medium.as_str()));
    }

    #[test]
    fn parentheses_in_links_do_not_break_markdown() {
        let mut s = scored("Acme", 3);
        s.listing.apply_link = "https://jobs.test/ux_(intern)".into();
        let b = render_block(&s);
        assert!(b.contains("[Apply Here](https://jobs.test/ux_%28intern%29)\n"));
        assert_eq!(escape_link("https://a.test/x"), "https://a.test/x");
    }

    #[test]
    fn split_respects_limit_on_line_boundaries() {
        let text = "aaaa\nbbbb\ncccc\n";
        let parts = split_message(text, 10);
        assert_eq!(parts, vec!["aaaa\nbbbb\n", "cccc\n"]);
        assert_eq!(split_message(text, 100).len(), 1);
    }

    #[tokio::test]
    async fn noop_never_fails() {
        assert!(NoopNotifier.send(&[scored("A", 5)]).await.is_ok());
    }
}
