// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt text for generation and refinement.

use crate::browser::Viewport;
use crate::capture::ScrapedPage;
use crate::design::DesignHints;
use rp_core::ArtifactTriple;
use std::fmt::Write;
use std::path::Path;

pub const PAGE_HTML_CHARS: usize = 10_000;
pub const PAGE_STYLE_ENTRIES: usize = 50;
pub const PAGE_SHEETS: usize = 3;
pub const PAGE_SHEET_CHARS: usize = 2_000;

pub const REFINE_HTML_CHARS: usize = 5_000;
pub const REFINE_CSS_CHARS: usize = 3_000;
pub const REFINE_JS_CHARS: usize = 2_000;

pub const PAGE_SYSTEM_PROMPT: &str = "You are an expert at replicating websites. \
From the scraped data you are given, produce a visually identical copy. \
Always answer in JSON only, without explanations.";

pub const IMAGE_SYSTEM_PROMPT: &str = "You are an expert in pixel-perfect web design. \
Analyse the screenshot precisely and produce HTML/CSS/JS whose rendering matches it exactly. \
Use exact hex or rgb colours, pixel-accurate font sizes, line heights and spacing, and \
Flexbox or Grid for layout. Always answer in JSON only.";

const OUTPUT_FORMAT: &str = r#"## Output format (strict)
Reply with this JSON object and nothing else.

```json
{
  "html": "<!DOCTYPE html>... (complete HTML)",
  "css": "/* contents of styles.css */...",
  "js": "// contents of script.js (if needed)..."
}
```
"#;

/// First `max` characters of `text`.
pub fn head(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn hint_lines(out: &mut String, hints: Option<&DesignHints>) {
    let Some(hints) = hints.filter(|h| !h.is_empty()) else { return };
    let _ = writeln!(out, "## Design hints (extracted)");
    let _ = writeln!(out, "- Colours: {}", hints.colors.join(", "));
    let _ = writeln!(out, "- Fonts: {}", hints.fonts.join(", "));
    let _ = writeln!(out, "Prefer these colours and fonts.\n");
}

/// Prompt for generating code from a scraped page.
pub fn page_prompt(page: &ScrapedPage, hints: Option<&DesignHints>) -> String {
    let styles: Vec<_> = page.computed_styles.iter().take(PAGE_STYLE_ENTRIES).collect();
    let styles = serde_json::to_string_pretty(&styles).unwrap_or_else(|_| "[]".to_string());
    let sheets = page
        .stylesheets
        .iter()
        .take(PAGE_SHEETS)
        .map(|s| head(s, PAGE_SHEET_CHARS))
        .collect::<Vec<_>>()
        .join("\n---\n");

    let mut out = String::new();
    let _ = writeln!(out, "Replicate the web page described by the scraped data below.\n");
    let _ = writeln!(out, "## Requirements");
    let _ = writeln!(out, "1. Produce three files: index.html, styles.css, script.js");
    let _ = writeln!(out, "2. Reproduce the original's appearance exactly");
    let _ = writeln!(
        out,
        "3. Viewport size: {}x{}px",
        page.viewport.width, page.viewport.height
    );
    let _ = writeln!(out, "4. Keep external image URLs as they are in the original");
    let _ = writeln!(out, "5. Organise the CSS by class");
    let _ = writeln!(out, "6. Use semantic HTML elements");
    let _ = writeln!(out, "7. Reference the CSS as styles.css and the JS as script.js\n");
    hint_lines(&mut out, hints);
    let _ = writeln!(out, "## Scraped data");
    let _ = writeln!(out, "URL: {}", page.url);
    let _ = writeln!(out, "Title: {}\n", page.title);
    let _ = writeln!(out, "### HTML structure\n{}\n", head(&page.html, PAGE_HTML_CHARS));
    let _ = writeln!(out, "### Computed styles (main elements)\n{styles}\n");
    let _ = writeln!(out, "### Existing stylesheets\n{sheets}\n");
    out.push_str(OUTPUT_FORMAT);
    out
}

/// Prompt for generating code from a screenshot.
///
/// `attached_at` names the image on disk when the backend reads files itself
/// rather than receiving the image inline.
pub fn image_prompt(
    viewport: Viewport,
    hints: Option<&DesignHints>,
    attached_at: Option<&Path>,
) -> String {
    let mut out = String::new();
    match attached_at {
        Some(path) => {
            let _ = writeln!(
                out,
                "The image at {} is a screenshot of a web page. Read it first.",
                path.display()
            );
        }
        None => {
            let _ = writeln!(out, "The attached image is a screenshot of a web page.");
        }
    }
    let _ = writeln!(out, "Reproduce its appearance as responsive HTML/CSS/JS.\n");
    hint_lines(&mut out, hints);
    let _ = writeln!(out, "## Requirements");
    let _ = writeln!(
        out,
        "- Desktop baseline: match the screenshot at {}px width",
        viewport.width
    );
    let _ = writeln!(out, "- Apply `box-sizing: border-box` to every element");
    let _ = writeln!(out, "- Lay out with Flexbox or Grid and use `gap` for spacing");
    let _ = writeln!(out, "- Keep the header, navigation, content and footer structure");
    let _ = writeln!(
        out,
        "- Include <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    );
    let _ = writeln!(out, "- Add media queries at 1024px and 768px");
    let _ = writeln!(out, "- Use https://picsum.photos/WIDTH/HEIGHT for every image");
    let _ = writeln!(
        out,
        "- Reference <link rel=\"stylesheet\" href=\"styles.css\"> and <script src=\"script.js\"></script>\n"
    );
    out.push_str(OUTPUT_FORMAT);
    out
}

/// Prompt asking for a revision of `current` that fixes the reported differences.
pub fn refine_prompt(current: &ArtifactTriple, similarity: f64, report: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Revise the code you generated previously.\n");
    let _ = writeln!(out, "## Verification result");
    let _ = writeln!(out, "- Similarity: {similarity}%");
    let _ = writeln!(out, "- Differences:\n{report}\n");
    let _ = writeln!(out, "## Previous code\n");
    let _ = writeln!(out, "### HTML\n```html\n{}\n```\n", head(&current.html, REFINE_HTML_CHARS));
    let _ = writeln!(out, "### CSS\n```css\n{}\n```\n", head(&current.css, REFINE_CSS_CHARS));
    let _ = writeln!(
        out,
        "### JS\n```javascript\n{}\n```\n",
        head(&current.js, REFINE_JS_CHARS)
    );
    let _ = writeln!(out, "## What to fix");
    let _ = writeln!(out, "Remove the differences above and bring the page closer to the original:");
    let _ = writeln!(out, "- correct layout offsets");
    let _ = writeln!(out, "- correct colour and font differences");
    let _ = writeln!(out, "- add missing elements");
    let _ = writeln!(out, "Leave everything that was not reported unchanged.\n");
    out.push_str(OUTPUT_FORMAT);
    out
}

#[cfg(test)]
#[path = "prompts_tests.rs"]
mod tests;
