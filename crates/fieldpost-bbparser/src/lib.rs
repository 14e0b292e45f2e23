//! BBCode-to-HTML tag parser for forum markup rendering.
//!
//! This crate converts `[tag]content[/tag]` style forum markup into HTML.
//! It tokenizes the input into tag and text runs, pairs opening and closing
//! tags with stack discipline, and rewrites each pair according to a
//! per-tag-name [`TagRule`]. Malformed input never errors: unmatched or
//! unknown tags are left in the output as literal text.
//!
//! # Example
//!
//! ```rust
//! use fieldpost_bbparser::BBParser;
//!
//! let parser = BBParser::forum();
//!
//! assert_eq!(parser.parse("[b]hello[/b]"), "<b>hello</b>");
//! assert_eq!(
//!     parser.parse("[url=http://example.com]here[/url]"),
//!     "<a href=\"http://example.com\">here</a>"
//! );
//!
//! // Tags inside [noparse] are never rewritten.
//! assert_eq!(parser.parse("[noparse][b]x[/b][/noparse]"), "[b]x[/b]");
//!
//! // Plain-text preview: known tags dropped, content kept.
//! assert_eq!(parser.strip("[b]hello[/b]"), "hello");
//! ```
//!
//! # Tag Syntax
//!
//! A tag token is any bracket run with no `]` and no newline inside:
//! `[name]`, `[name=attribute]` or `[/name]`. Anything else — including a
//! lone `[`, a bracket run spanning a line break, or `[]` — is literal
//! text. Attributes are everything after the first `=`, uninterpreted.
//!
//! # Escaping
//!
//! [`BBParser::parse`] HTML-escapes `<` and `>` in the input before
//! scanning, so user content cannot break the generated structure, and
//! turns newlines in text runs into `<br />` markers.

use std::collections::BTreeMap;

pub mod rules;

pub use rules::{forum_rules, FORUM_HOST};

/// The open or close replacement text of a [`TagRule::Replace`] rule.
#[derive(Debug, Clone)]
pub enum TagText {
    /// A fixed literal emitted as-is.
    Static(&'static str),
    /// Text computed from the opening tag's attribute.
    Computed(fn(Option<&str>) -> String),
}

impl TagText {
    fn render(&self, attr: Option<&str>) -> String {
        match self {
            TagText::Static(text) => (*text).to_string(),
            TagText::Computed(f) => f(attr),
        }
    }
}

/// How a matched tag pair is rewritten.
#[derive(Debug, Clone)]
pub enum TagRule {
    /// Substitute the opening and closing tokens independently; the
    /// enclosed content is rendered between them.
    Replace {
        /// Replacement for the opening token.
        open: TagText,
        /// Replacement for the closing token.
        close: TagText,
    },

    /// Rewrite the entire pair from its attribute and enclosed content.
    /// An empty content makes the pair vanish.
    ContentTransform(fn(Option<&str>, &str) -> String),

    /// The tag may appear with or without an explicit `=` attribute.
    /// Without one, the enclosed content is promoted to serve as the
    /// attribute value (and still rendered as the body); the `bool`
    /// passed to `open` is true only for the explicit form.
    OptionalAttribute {
        /// Builds the opening replacement from `(attribute, had_explicit)`.
        open: fn(&str, bool) -> String,
        /// Fixed closing replacement.
        close: &'static str,
    },

    /// Both tokens are deleted; the content is kept as-is.
    Ignore,
}

/// A BBCode-to-HTML parser over a [`TagRule`] table.
///
/// The parser holds no mutable state; building one up front and sharing
/// it across threads is safe.
#[derive(Debug, Clone)]
pub struct BBParser {
    rules: BTreeMap<&'static str, TagRule>,
}

/// Output flavor selected by [`BBParser::parse`] vs [`BBParser::strip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Html,
    Plain,
}

impl BBParser {
    /// Creates a parser with the default forum rule table.
    pub fn forum() -> Self {
        Self {
            rules: rules::forum_rules(),
        }
    }

    /// Creates a parser with a custom rule table.
    pub fn with_rules(rules: BTreeMap<&'static str, TagRule>) -> Self {
        Self { rules }
    }

    /// Returns whether a rule exists for the given tag name.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Converts forum markup to HTML.
    ///
    /// The input is HTML-escaped first (`<` and `>` become entities) and
    /// newlines in text runs become `<br />`. Never fails: the worst case
    /// for malformed or unknown markup is literal bracketed text in the
    /// output.
    pub fn parse(&self, input: &str) -> String {
        let escaped = escape_html(input);
        let tokens: Vec<Token> = Tokenizer::new(&escaped).collect();
        self.render_region(&tokens, Output::Html)
    }

    /// Renders a plain-text preview: known tag pairs are dropped and
    /// their content kept. No escaping or line-break conversion is
    /// applied; unknown tags stay literal.
    pub fn strip(&self, input: &str) -> String {
        let tokens: Vec<Token> = Tokenizer::new(input).collect();
        self.render_region(&tokens, Output::Plain)
    }

    /// Renders a token region, pairing tags recursively so rules that
    /// consume their enclosed content see it already rendered.
    fn render_region(&self, tokens: &[Token], output: Output) -> String {
        let mut out = String::new();
        let mut i = 0;

        while i < tokens.len() {
            match &tokens[i] {
                Token::Text(text) => {
                    push_text(&mut out, text, output);
                    i += 1;
                }
                Token::Tag(tag) if tag.closing => {
                    // A close token reachable here has no matching open.
                    out.push_str(tag.raw);
                    i += 1;
                }
                Token::Tag(tag) => {
                    // [noparse] suppresses all rule processing for its
                    // enclosed region, tags included.
                    if tag.name == "noparse" {
                        if let Some(end) = find_close(&tokens[i + 1..], "noparse") {
                            for token in &tokens[i + 1..i + 1 + end] {
                                match token {
                                    Token::Text(text) => push_text(&mut out, text, output),
                                    Token::Tag(inner) => out.push_str(inner.raw),
                                }
                            }
                            i = i + 1 + end + 1;
                        } else {
                            out.push_str(tag.raw);
                            i += 1;
                        }
                        continue;
                    }

                    let Some(rule) = self.rules.get(tag.name) else {
                        out.push_str(tag.raw);
                        i += 1;
                        continue;
                    };
                    let Some(end) = find_close(&tokens[i + 1..], tag.name) else {
                        out.push_str(tag.raw);
                        i += 1;
                        continue;
                    };

                    let inner = self.render_region(&tokens[i + 1..i + 1 + end], output);
                    match output {
                        Output::Plain => out.push_str(&inner),
                        Output::Html => out.push_str(&apply_rule(rule, tag, &inner)),
                    }
                    i = i + 1 + end + 1;
                }
            }
        }

        out
    }
}

/// Applies a rule to a matched pair with already-rendered content.
fn apply_rule(rule: &TagRule, tag: &TagToken, inner: &str) -> String {
    match rule {
        TagRule::Replace { open, close } => {
            format!("{}{}{}", open.render(tag.attr), inner, close.render(tag.attr))
        }
        TagRule::ContentTransform(transform) => {
            if inner.is_empty() {
                String::new()
            } else {
                transform(tag.attr, inner)
            }
        }
        TagRule::OptionalAttribute { open, close } => match tag.attr {
            Some(attr) => format!("{}{}{}", open(attr, true), inner, close),
            None => format!("{}{}{}", open(inner, false), inner, close),
        },
        TagRule::Ignore => inner.to_string(),
    }
}

/// Finds the matching close for an already-consumed open tag, counting
/// nested opens of the same name. Returns the index into `tokens`.
fn find_close(tokens: &[Token], name: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, token) in tokens.iter().enumerate() {
        if let Token::Tag(tag) = token {
            if tag.name == name {
                if tag.closing {
                    depth -= 1;
                    if depth == 0 {
                        return Some(idx);
                    }
                } else {
                    depth += 1;
                }
            }
        }
    }
    None
}

fn push_text(out: &mut String, text: &str, output: Output) {
    match output {
        Output::Plain => out.push_str(text),
        Output::Html => {
            for c in text.chars() {
                match c {
                    '\r' => {}
                    '\n' => out.push_str("<br />"),
                    c => out.push(c),
                }
            }
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Token types produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    /// Plain text content.
    Text(&'a str),
    /// A bracket run: `[name]`, `[name=attr]` or `[/name]`.
    Tag(TagToken<'a>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TagToken<'a> {
    /// The full bracketed text, for literal fallback.
    raw: &'a str,
    name: &'a str,
    /// Raw attribute text after the first `=`, uninterpreted.
    attr: Option<&'a str>,
    closing: bool,
}

/// Tokenizer for bracket-delimited tag runs.
struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Returns the index of the closing `]` if `s` (starting at `[`)
    /// opens a tag run: non-empty, no `]`, no newline inside.
    fn tag_end(s: &str) -> Option<usize> {
        for (i, c) in s.char_indices().skip(1) {
            match c {
                ']' => return if i > 1 { Some(i) } else { None },
                '\r' | '\n' => return None,
                _ => {}
            }
        }
        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = &self.input[self.pos..];
        if remaining.is_empty() {
            return None;
        }

        match remaining.find('[') {
            None => {
                self.pos = self.input.len();
                Some(Token::Text(remaining))
            }
            Some(0) => match Self::tag_end(remaining) {
                Some(end) => {
                    let raw = &remaining[..=end];
                    let body = &remaining[1..end];
                    self.pos += end + 1;

                    let (closing, body) = match body.strip_prefix('/') {
                        Some(rest) => (true, rest),
                        None => (false, body),
                    };
                    let (name, attr) = match body.split_once('=') {
                        Some((name, attr)) => (name, Some(attr)),
                        None => (body, None),
                    };
                    Some(Token::Tag(TagToken {
                        raw,
                        name,
                        attr,
                        closing,
                    }))
                }
                None => {
                    // Not a tag run; emit the bracket itself so a later
                    // `[` can still start one.
                    self.pos += 1;
                    Some(Token::Text(&remaining[..1]))
                }
            },
            Some(i) => {
                self.pos += i;
                Some(Token::Text(&remaining[..i]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> BBParser {
        BBParser::forum()
    }

    // ==================== Character Formatting ====================

    mod formatting {
        use super::*;

        #[test]
        fn plain_text_unchanged() {
            assert_eq!(parser().parse("hello world"), "hello world");
        }

        #[test]
        fn bold_italic_underline() {
            assert_eq!(parser().parse("[b]x[/b]"), "<b>x</b>");
            assert_eq!(parser().parse("[i]x[/i]"), "<i>x</i>");
            assert_eq!(parser().parse("[u]x[/u]"), "<u>x</u>");
            assert_eq!(parser().parse("[s]x[/s]"), "<s>x</s>");
        }

        #[test]
        fn sub_and_superscript() {
            assert_eq!(parser().parse("H[sub]2[/sub]O"), "H<sub>2</sub>O");
            assert_eq!(parser().parse("x[sup]2[/sup]"), "x<sup>2</sup>");
        }

        #[test]
        fn nested_tags() {
            assert_eq!(
                parser().parse("[b][i]both[/i][/b]"),
                "<b><i>both</i></b>"
            );
        }

        #[test]
        fn color_attribute() {
            assert_eq!(
                parser().parse("[color=red]x[/color]"),
                "<font color=\"red\">x</font>"
            );
        }

        #[test]
        fn size_and_font() {
            assert_eq!(
                parser().parse("[size=4]x[/size]"),
                "<font size=\"4\">x</font>"
            );
            assert_eq!(
                parser().parse("[font=Verdana]x[/font]"),
                "<font face=\"Verdana\">x</font>"
            );
        }

        #[test]
        fn highlight_defaults_to_yellow() {
            assert_eq!(
                parser().parse("[highlight]x[/highlight]"),
                "<span style=\"background-color: yellow\">x</span>"
            );
        }

        #[test]
        fn alignment_blocks() {
            assert_eq!(
                parser().parse("[center]x[/center]"),
                "<div style=\"text-align: center;\">x</div>"
            );
        }

        #[test]
        fn indent_is_blockquote() {
            assert_eq!(
                parser().parse("[indent]x[/indent]"),
                "<blockquote>x</blockquote>"
            );
        }
    }

    // ==================== Escaping & Line Breaks ====================

    mod escaping {
        use super::*;

        #[test]
        fn angle_brackets_escaped() {
            assert_eq!(parser().parse("a < b > c"), "a &lt; b &gt; c");
        }

        #[test]
        fn escaping_applies_inside_tags() {
            assert_eq!(parser().parse("[b]<script>[/b]"), "<b>&lt;script&gt;</b>");
        }

        #[test]
        fn newlines_become_breaks() {
            assert_eq!(parser().parse("a\nb"), "a<br />b");
            assert_eq!(parser().parse("a\r\nb"), "a<br />b");
        }
    }

    // ==================== Links ====================

    mod links {
        use super::*;

        #[test]
        fn bare_url_is_target_and_text() {
            assert_eq!(
                parser().parse("[url]http://example.com[/url]"),
                "<a href=\"http://example.com\">http://example.com</a>"
            );
        }

        #[test]
        fn explicit_url_with_label() {
            assert_eq!(
                parser().parse("[url=http://example.com]label[/url]"),
                "<a href=\"http://example.com\">label</a>"
            );
        }

        #[test]
        fn forum_url_scheme_upgraded() {
            assert_eq!(
                parser().parse("[url]http://forums.dragonflycave.com/f[/url]"),
                "<a href=\"https://forums.dragonflycave.com/f\">http://forums.dragonflycave.com/f</a>"
            );
        }

        #[test]
        fn other_host_scheme_untouched() {
            let out = parser().parse("[url]http://other.example.net/x[/url]");
            assert!(out.contains("href=\"http://other.example.net/x\""));
        }

        #[test]
        fn email_gets_mailto() {
            assert_eq!(
                parser().parse("[email]a@b.com[/email]"),
                "<a href=\"mailto:a@b.com\">a@b.com</a>"
            );
        }

        #[test]
        fn thread_from_bare_id() {
            assert_eq!(
                parser().parse("[thread]42[/thread]"),
                "<a href=\"https://forums.dragonflycave.com/showthread.php?t=42\">42</a>"
            );
        }

        #[test]
        fn thread_from_explicit_id_has_title() {
            assert_eq!(
                parser().parse("[thread=42]the thread[/thread]"),
                "<a href=\"https://forums.dragonflycave.com/showthread.php?t=42\" \
                 title=\"Thread 42\">the thread</a>"
            );
        }

        #[test]
        fn post_from_bare_id() {
            assert_eq!(
                parser().parse("[post]99[/post]"),
                "<a href=\"https://forums.dragonflycave.com/showthread.php?p=99#post99\">99</a>"
            );
        }
    }

    // ==================== Lists ====================

    mod lists {
        use super::*;

        #[test]
        fn unordered_list() {
            assert_eq!(
                parser().parse("[list][*]a[*]b[/list]"),
                "<ul><li>a</li><li>b</li></ul>"
            );
        }

        #[test]
        fn ordered_list_with_type() {
            assert_eq!(
                parser().parse("[list=1][*]a[*]b[/list]"),
                "<ol type=\"1\"><li>a</li><li>b</li></ol>"
            );
        }

        #[test]
        fn empty_list_vanishes() {
            assert_eq!(parser().parse("[list][/list]"), "");
        }

        #[test]
        fn formatted_items() {
            assert_eq!(
                parser().parse("[list][*][b]a[/b][/list]"),
                "<ul><li><b>a</b></li></ul>"
            );
        }
    }

    // ==================== Content Constructs ====================

    mod content {
        use super::*;

        #[test]
        fn img_from_content() {
            assert_eq!(
                parser().parse("[img]http://example.com/a.png[/img]"),
                "<img src=\"http://example.com/a.png\" />"
            );
        }

        #[test]
        fn empty_img_vanishes() {
            assert_eq!(parser().parse("[img][/img]"), "");
        }

        #[test]
        fn img_forum_host_upgraded() {
            let out = parser().parse("[img]http://forums.dragonflycave.com/a.png[/img]");
            assert!(out.contains("src=\"https://forums.dragonflycave.com/a.png\""));
        }

        #[test]
        fn youtube_embed() {
            let out = parser().parse("[youtube]dQw4w9WgXcQ[/youtube]");
            assert!(out.contains("https://www.youtube.com/v/dQw4w9WgXcQ"));
            assert!(out.starts_with("<object"));
        }

        #[test]
        fn empty_youtube_vanishes() {
            assert_eq!(parser().parse("[youtube][/youtube]"), "");
        }

        #[test]
        fn attach_is_dropped_content_kept() {
            assert_eq!(parser().parse("[attach]12[/attach]"), "12");
        }
    }

    // ==================== Blocks ====================

    mod blocks {
        use super::*;

        #[test]
        fn code_block_labeled() {
            let out = parser().parse("[code]let x = 1;[/code]");
            assert!(out.contains("<div class=\"code-label\">Code:</div>"));
            assert!(out.contains("<pre>let x = 1;</pre>"));
        }

        #[test]
        fn php_and_html_blocks_distinct() {
            assert!(parser().parse("[php]$x[/php]").contains("PHP Code:"));
            assert!(parser().parse("[html]&x[/html]").contains("HTML Code:"));
        }

        #[test]
        fn bare_quote() {
            assert_eq!(
                parser().parse("[quote]words[/quote]"),
                "<div class=\"quote\"><blockquote>words</blockquote></div>"
            );
        }

        #[test]
        fn cited_quote() {
            let out = parser().parse("[quote=May]words[/quote]");
            assert!(out.contains("Originally Posted by <strong>May</strong>"));
            assert!(out.contains("<blockquote>words</blockquote>"));
        }

        #[test]
        fn cited_quote_with_post_link() {
            let out = parser().parse("[quote=May;123]words[/quote]");
            assert!(out.contains("showthread.php?p=123#post123"));
        }

        #[test]
        fn spoiler_is_collapsed_by_default() {
            let out = parser().parse("[spoiler]secret[/spoiler]");
            assert!(out.contains("class=\"spoiler\""));
            assert!(out.contains("style=\"display: none\""));
            assert!(out.contains("secret"));
            assert!(out.ends_with("</div></div>"));
        }
    }

    // ==================== Noparse ====================

    mod noparse {
        use super::*;

        #[test]
        fn tags_inside_stay_literal() {
            assert_eq!(parser().parse("[noparse][b]x[/b][/noparse]"), "[b]x[/b]");
        }

        #[test]
        fn surrounding_tags_still_processed() {
            assert_eq!(
                parser().parse("[i]a[/i][noparse][i]b[/i][/noparse]"),
                "<i>a</i>[i]b[/i]"
            );
        }

        #[test]
        fn unclosed_noparse_is_literal() {
            assert_eq!(parser().parse("[noparse][b]x[/b]"), "[noparse]<b>x</b>");
        }
    }

    // ==================== Strip Mode ====================

    mod strip_mode {
        use super::*;

        #[test]
        fn known_tags_dropped() {
            assert_eq!(parser().strip("[b]hello[/b]"), "hello");
            assert_eq!(parser().strip("[b][i]x[/i][/b]"), "x");
        }

        #[test]
        fn unknown_tags_literal() {
            assert_eq!(parser().strip("[wat]x[/wat]"), "[wat]x[/wat]");
        }

        #[test]
        fn no_escaping_applied() {
            assert_eq!(parser().strip("a < b\nc"), "a < b\nc");
        }
    }

    // ==================== Edge Cases ====================

    mod edge_cases {
        use super::*;

        #[test]
        fn empty_input() {
            assert_eq!(parser().parse(""), "");
        }

        #[test]
        fn unknown_tag_passthrough() {
            assert_eq!(parser().parse("[wat]x[/wat]"), "[wat]x[/wat]");
        }

        #[test]
        fn unclosed_tag_is_literal() {
            assert_eq!(parser().parse("[b]hello"), "[b]hello");
        }

        #[test]
        fn orphan_close_is_literal() {
            assert_eq!(parser().parse("hello[/b]"), "hello[/b]");
        }

        #[test]
        fn empty_brackets_are_literal() {
            assert_eq!(parser().parse("a[]b"), "a[]b");
        }

        #[test]
        fn bracket_run_with_newline_is_literal() {
            assert_eq!(parser().parse("[b\nc]"), "[b<br />c]");
        }

        #[test]
        fn lone_open_bracket() {
            assert_eq!(parser().parse("a[b"), "a[b");
        }

        #[test]
        fn mismatched_nesting_tolerated() {
            // [i] has no close inside the [b] region, so it stays
            // literal; the trailing [/i] is an orphan.
            assert_eq!(
                parser().parse("[b]a[i]b[/b]c[/i]"),
                "<b>a[i]b</b>c[/i]"
            );
        }

        #[test]
        fn empty_pair_renders_empty_body() {
            assert_eq!(parser().parse("[b][/b]"), "<b></b>");
        }

        #[test]
        fn repeated_same_tag_pairs() {
            assert_eq!(
                parser().parse("[b]a[/b][b]b[/b]"),
                "<b>a</b><b>b</b>"
            );
        }

        #[test]
        fn same_tag_nested() {
            assert_eq!(
                parser().parse("[b]a[b]c[/b]d[/b]"),
                "<b>a<b>c</b>d</b>"
            );
        }
    }

    // ==================== Tokenizer ====================

    mod tokenizer {
        use super::*;

        #[test]
        fn tokenize_plain_text() {
            let tokens: Vec<_> = Tokenizer::new("hello world").collect();
            assert_eq!(tokens, vec![Token::Text("hello world")]);
        }

        #[test]
        fn tokenize_open_and_close() {
            let tokens: Vec<_> = Tokenizer::new("[b]x[/b]").collect();
            assert_eq!(
                tokens,
                vec![
                    Token::Tag(TagToken {
                        raw: "[b]",
                        name: "b",
                        attr: None,
                        closing: false
                    }),
                    Token::Text("x"),
                    Token::Tag(TagToken {
                        raw: "[/b]",
                        name: "b",
                        attr: None,
                        closing: true
                    }),
                ]
            );
        }

        #[test]
        fn tokenize_attribute() {
            let tokens: Vec<_> = Tokenizer::new("[quote=May;123]").collect();
            assert_eq!(
                tokens,
                vec![Token::Tag(TagToken {
                    raw: "[quote=May;123]",
                    name: "quote",
                    attr: Some("May;123"),
                    closing: false
                })]
            );
        }

        #[test]
        fn item_marker_is_a_tag_token() {
            let tokens: Vec<_> = Tokenizer::new("[*]a").collect();
            assert_eq!(
                tokens,
                vec![
                    Token::Tag(TagToken {
                        raw: "[*]",
                        name: "*",
                        attr: None,
                        closing: false
                    }),
                    Token::Text("a"),
                ]
            );
        }

        #[test]
        fn newline_aborts_tag_run() {
            let tokens: Vec<_> = Tokenizer::new("[a\nb]").collect();
            assert_eq!(
                tokens,
                vec![Token::Text("["), Token::Text("a\nb]")]
            );
        }

        #[test]
        fn empty_brackets_not_a_tag() {
            let tokens: Vec<_> = Tokenizer::new("[]").collect();
            assert_eq!(tokens, vec![Token::Text("["), Token::Text("]")]);
        }
    }
}
