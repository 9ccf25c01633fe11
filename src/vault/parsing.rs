use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// A fenced code block (```lang ... ``` or ~~~ ... ~~~), as a byte span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MDCodeBlock {
    pub range: Range<usize>,
}

impl MDCodeBlock {
    pub fn new(text: &str) -> impl Iterator<Item = MDCodeBlock> {
        static FENCE_RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}(?<fence>`{3,}|~{3,})").unwrap());

        let mut blocks = Vec::new();
        let mut open: Option<(usize, String)> = None;

        for captures in FENCE_RE.captures_iter(text) {
            let (Some(whole), Some(fence)) = (captures.get(0), captures.name("fence")) else {
                continue;
            };

            match &open {
                None => open = Some((whole.start(), fence.as_str().to_string())),
                Some((start, opening))
                    if fence.as_str().starts_with(&opening[..1])
                        && fence.as_str().len() >= opening.len() =>
                {
                    let end = text[fence.end()..]
                        .find('\n')
                        .map_or(text.len(), |idx| fence.end() + idx);
                    blocks.push(MDCodeBlock { range: *start..end });
                    open = None;
                }
                Some(_) => {}
            }
        }

        // An unclosed fence runs to the end of the file.
        if let Some((start, _)) = open {
            blocks.push(MDCodeBlock {
                range: start..text.len(),
            });
        }

        blocks.into_iter()
    }

    /// Inline code spans (`` `code` ``) on a single line.
    pub fn inline(text: &str) -> impl Iterator<Item = MDCodeBlock> + '_ {
        static INLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]+`").unwrap());

        INLINE_RE.find_iter(text).map(|found| MDCodeBlock {
            range: found.range(),
        })
    }

    pub fn includes(&self, range: &Range<usize>) -> bool {
        self.range.start <= range.start && range.end <= self.range.end
    }
}
