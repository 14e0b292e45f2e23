//! The forum tag-rule table.
//!
//! This module defines the default rule set used by [`BBParser::forum`],
//! covering the tags the forum's post editor emits. Each tag name maps to
//! exactly one [`TagRule`]; tags without a rule pass through as literal
//! text.
//!
//! Links pointing at the forum's own host are upgraded from `http://` to
//! `https://` (the forum serves everything over TLS; old posts predate
//! that). `[thread]` and `[post]` accept either a full URL or a bare
//! numeric id, in which case the canonical `showthread.php` URL is
//! synthesized.
//!
//! [`BBParser::forum`]: crate::BBParser::forum

use std::collections::BTreeMap;

use crate::{TagRule, TagText};

/// The forum host whose links are rewritten to `https`.
pub const FORUM_HOST: &str = "forums.dragonflycave.com";

/// Builds the default forum rule table.
///
/// The returned map can be extended or pruned before handing it to
/// [`BBParser::with_rules`](crate::BBParser::with_rules).
pub fn forum_rules() -> BTreeMap<&'static str, TagRule> {
    let mut rules = BTreeMap::new();

    // Plain character formatting.
    rules.insert("b", fixed("<b>", "</b>"));
    rules.insert("i", fixed("<i>", "</i>"));
    rules.insert("u", fixed("<u>", "</u>"));
    rules.insert("s", fixed("<s>", "</s>"));
    rules.insert("sub", fixed("<sub>", "</sub>"));
    rules.insert("sup", fixed("<sup>", "</sup>"));

    // Attribute-bearing wrappers.
    rules.insert(
        "color",
        TagRule::Replace {
            open: TagText::Computed(color_open),
            close: TagText::Static("</font>"),
        },
    );
    rules.insert(
        "size",
        TagRule::Replace {
            open: TagText::Computed(size_open),
            close: TagText::Static("</font>"),
        },
    );
    rules.insert(
        "font",
        TagRule::Replace {
            open: TagText::Computed(font_open),
            close: TagText::Static("</font>"),
        },
    );
    rules.insert(
        "highlight",
        TagRule::Replace {
            open: TagText::Computed(highlight_open),
            close: TagText::Static("</span>"),
        },
    );

    // Block alignment.
    rules.insert("left", fixed("<div style=\"text-align: left;\">", "</div>"));
    rules.insert(
        "center",
        fixed("<div style=\"text-align: center;\">", "</div>"),
    );
    rules.insert(
        "right",
        fixed("<div style=\"text-align: right;\">", "</div>"),
    );
    rules.insert("indent", fixed("<blockquote>", "</blockquote>"));

    // Links. All of these accept `[tag]target[/tag]` (content doubles as
    // the target) as well as `[tag=target]label[/tag]`.
    rules.insert(
        "email",
        TagRule::OptionalAttribute {
            open: email_open,
            close: "</a>",
        },
    );
    rules.insert(
        "url",
        TagRule::OptionalAttribute {
            open: url_open,
            close: "</a>",
        },
    );
    rules.insert(
        "thread",
        TagRule::OptionalAttribute {
            open: thread_open,
            close: "</a>",
        },
    );
    rules.insert(
        "post",
        TagRule::OptionalAttribute {
            open: post_open,
            close: "</a>",
        },
    );

    // Self-contained constructs built from their content.
    rules.insert("list", TagRule::ContentTransform(list_transform));
    rules.insert("img", TagRule::ContentTransform(img_transform));
    rules.insert("youtube", TagRule::ContentTransform(youtube_transform));

    // Preformatted blocks, each with its own label.
    rules.insert(
        "code",
        fixed(
            "<div class=\"code-block\"><div class=\"code-label\">Code:</div><pre>",
            "</pre></div>",
        ),
    );
    rules.insert(
        "php",
        fixed(
            "<div class=\"code-block\"><div class=\"code-label\">PHP Code:</div><pre>",
            "</pre></div>",
        ),
    );
    rules.insert(
        "html",
        fixed(
            "<div class=\"code-block\"><div class=\"code-label\">HTML Code:</div><pre>",
            "</pre></div>",
        ),
    );

    rules.insert(
        "quote",
        TagRule::Replace {
            open: TagText::Computed(quote_open),
            close: TagText::Static("</blockquote></div>"),
        },
    );

    rules.insert("spoiler", fixed(SPOILER_OPEN, "</div></div>"));

    // Attachment ids only resolve inside the forum itself.
    rules.insert("attach", TagRule::Ignore);

    rules
}

const SPOILER_OPEN: &str = concat!(
    "<div class=\"spoiler\"><input type=\"button\" value=\"Show\" ",
    "onclick=\"var body = this.parentNode.getElementsByTagName('div')[0]; ",
    "if (body.style.display == 'none') { body.style.display = ''; this.value = 'Hide'; } ",
    "else { body.style.display = 'none'; this.value = 'Show'; }\" />",
    "<div class=\"spoiler-body\" style=\"display: none\">",
);

fn fixed(open: &'static str, close: &'static str) -> TagRule {
    TagRule::Replace {
        open: TagText::Static(open),
        close: TagText::Static(close),
    }
}

fn color_open(attr: Option<&str>) -> String {
    format!("<font color=\"{}\">", attr.unwrap_or(""))
}

fn size_open(attr: Option<&str>) -> String {
    format!("<font size=\"{}\">", attr.unwrap_or(""))
}

fn font_open(attr: Option<&str>) -> String {
    format!("<font face=\"{}\">", attr.unwrap_or(""))
}

fn highlight_open(attr: Option<&str>) -> String {
    format!(
        "<span style=\"background-color: {}\">",
        attr.unwrap_or("yellow")
    )
}

fn email_open(address: &str, _explicit: bool) -> String {
    format!("<a href=\"mailto:{address}\">")
}

fn url_open(target: &str, _explicit: bool) -> String {
    format!("<a href=\"{}\">", upgrade_forum_scheme(target))
}

fn thread_open(target: &str, explicit: bool) -> String {
    forum_id_link(target, explicit, "t", "Thread")
}

fn post_open(target: &str, explicit: bool) -> String {
    forum_id_link(target, explicit, "p", "Post")
}

/// Builds the opening anchor for `[thread]` and `[post]`.
///
/// A bare numeric target becomes a canonical `showthread.php` link.
/// Anything else is treated as a URL. The title attribute is only added
/// when the id came from an explicit `=` attribute; in the bare form the
/// id is already the visible link text.
fn forum_id_link(target: &str, explicit: bool, param: &str, label: &str) -> String {
    if !target.is_empty() && target.bytes().all(|b| b.is_ascii_digit()) {
        let mut href = format!("https://{FORUM_HOST}/showthread.php?{param}={target}");
        if param == "p" {
            href.push_str(&format!("#post{target}"));
        }
        if explicit {
            format!("<a href=\"{href}\" title=\"{label} {target}\">")
        } else {
            format!("<a href=\"{href}\">")
        }
    } else {
        format!("<a href=\"{}\">", upgrade_forum_scheme(target))
    }
}

/// Rewrites `http://` to `https://` for links into the forum itself.
/// Other hosts are left alone.
fn upgrade_forum_scheme(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) if rest.starts_with(FORUM_HOST) => format!("https://{rest}"),
        _ => url.to_string(),
    }
}

fn list_transform(attr: Option<&str>, content: &str) -> String {
    let mut items = String::new();
    for part in content.split("[*]") {
        let item = trim_item(part);
        if item.is_empty() {
            continue;
        }
        items.push_str("<li>");
        items.push_str(item);
        items.push_str("</li>");
    }
    match attr {
        Some(kind) => format!("<ol type=\"{kind}\">{items}</ol>"),
        None => format!("<ul>{items}</ul>"),
    }
}

/// Strips the line-break markers and whitespace the editor leaves around
/// `[*]` items.
fn trim_item(mut item: &str) -> &str {
    loop {
        let next = item.trim();
        let next = next.strip_prefix("<br />").unwrap_or(next);
        let next = next.strip_suffix("<br />").unwrap_or(next);
        if next == item {
            return item;
        }
        item = next;
    }
}

fn img_transform(_attr: Option<&str>, content: &str) -> String {
    format!("<img src=\"{}\" />", upgrade_forum_scheme(content))
}

fn youtube_transform(_attr: Option<&str>, content: &str) -> String {
    format!(
        concat!(
            "<object width=\"425\" height=\"350\">",
            "<param name=\"movie\" value=\"https://www.youtube.com/v/{id}\" />",
            "<embed src=\"https://www.youtube.com/v/{id}\" ",
            "type=\"application/x-shockwave-flash\" width=\"425\" height=\"350\" />",
            "</object>"
        ),
        id = content
    )
}

/// Builds the opening framing for `[quote]`.
///
/// The attribute takes zero, one or two semicolon-delimited parts:
/// nothing (plain blockquote), a citation, or `citation;postId`. A post
/// id adds a deep link back to the quoted post.
fn quote_open(attr: Option<&str>) -> String {
    let attr = match attr {
        None | Some("") => return "<div class=\"quote\"><blockquote>".to_string(),
        Some(a) => a,
    };
    let (who, post_id) = match attr.split_once(';') {
        Some((who, id)) => (who, Some(id)),
        None => (attr, None),
    };
    let mut open = format!(
        "<div class=\"quote\"><div class=\"quote-title\">Originally Posted by <strong>{who}</strong>"
    );
    if let Some(id) = post_id {
        open.push_str(&format!(
            " <a href=\"https://{FORUM_HOST}/showthread.php?p={id}#post{id}\" \
             class=\"quote-postlink\" title=\"View Post\">&rarr;</a>"
        ));
    }
    open.push_str("</div><blockquote>");
    open
}
