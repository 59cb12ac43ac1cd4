//! Rule tables for content normalization

use crate::dom::Element;

/// Bumped whenever a rule change can move flattened-text offsets
pub const NORMALIZER_VERSION: u32 = 1;

/// Removed together with their contents
pub const DISALLOWED_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "object", "embed", "applet", "form", "input",
    "button", "select", "option", "textarea", "label", "fieldset", "nav", "aside", "head",
    "title", "meta", "link", "template", "svg", "canvas", "dialog",
];

/// Class/id tokens marking navigation, ads, social and comment regions
pub const BOILERPLATE_TOKENS: &[&str] = &[
    "ad", "ads", "advert", "advertisement", "sponsor", "sponsored", "social", "share",
    "sharing", "comment", "comments", "newsletter", "promo", "sidebar", "menu", "breadcrumb",
    "breadcrumbs", "related", "navbar", "navigation",
];

pub const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "dl", "dt", "dd",
    "blockquote", "pre", "code", "kbd", "samp", "var", "em", "strong", "b", "i", "u", "s", "del",
    "ins", "mark", "small", "sub", "sup", "abbr", "cite", "q", "time", "a", "img", "picture",
    "source", "figure", "figcaption", "table", "caption", "thead", "tbody", "tfoot", "tr", "th",
    "td", "div", "span", "section", "article", "main", "header", "details", "summary",
];

/// Document wrappers whose children replace them
pub const UNWRAPPED_TAGS: &[&str] = &["html", "body"];

pub const ALLOWED_ATTRIBUTES: &[&str] = &[
    "href", "src", "alt", "title", "class", "id", "loading", "width", "height", "role", "lang",
    "dir",
];

/// Presence of any of these means the input already has block structure
pub const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "dl", "blockquote", "pre",
    "table", "figure", "section", "article", "main", "header", "hr", "details",
];

/// Elements that keep an otherwise text-free paragraph alive
pub const MEDIA_TAGS: &[&str] = &["img", "picture", "video", "audio", "figure", "source"];

/// Elements that may only contain phrasing content
pub const PHRASING_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "a", "em", "strong", "b", "i", "u", "s",
    "del", "ins", "mark", "small", "sub", "sup", "abbr", "cite", "q", "time", "code", "kbd",
    "samp", "var", "pre", "dt", "figcaption", "caption", "summary",
];

/// URL schemes removed from `href` and `src`
pub const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "avif", "bmp"];

pub const IMAGE_LINK_WORDS: &[&str] = &["photo", "image", "picture", "img"];

/// Simple selectors used to find the main content of a full document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Tag(&'static str),
    Id(&'static str),
    Class(&'static str),
    AttrEq(&'static str, &'static str),
}

impl Selector {
    pub fn matches(&self, el: &Element) -> bool {
        match self {
            Selector::Tag(name) => el.name == *name,
            Selector::Id(id) => el.attr("id") == Some(*id),
            Selector::Class(class) => el.has_class(class),
            Selector::AttrEq(name, value) => el
                .attr(name)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(value)),
        }
    }
}

/// Main-content candidates, most specific first
pub const MAIN_CONTENT_SELECTORS: &[Selector] = &[
    Selector::Tag("article"),
    Selector::Tag("main"),
    Selector::AttrEq("role", "main"),
    Selector::Id("content"),
    Selector::Id("main-content"),
    Selector::Class("post-content"),
    Selector::Class("entry-content"),
    Selector::Class("article-content"),
    Selector::Class("article-body"),
    Selector::Class("story-body"),
    Selector::Class("content"),
];

pub fn is_allowed_attribute(name: &str) -> bool {
    ALLOWED_ATTRIBUTES.contains(&name) || name.starts_with("data-") || name.starts_with("aria-")
}

/// Whether an element's class or id names a boilerplate region
pub fn is_boilerplate_region(el: &Element) -> bool {
    let id = el.attr("id").unwrap_or_default();
    el.classes()
        .chain(std::iter::once(id))
        .flat_map(|value| value.split(['-', '_']))
        .any(|token| BOILERPLATE_TOKENS.contains(&token.to_ascii_lowercase().as_str()))
}

/// Whether a URL attribute value would execute script or load a document.
///
/// ASCII tab and newlines are ignored anywhere in the value and leading
/// control chars or spaces are skipped, as browsers do before reading the
/// scheme. `data:` is only accepted for images on `src`.
pub fn is_unsafe_url(attribute: &str, value: &str) -> bool {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .skip_while(|c| *c <= ' ')
        .collect::<String>()
        .to_ascii_lowercase();

    if UNSAFE_SCHEMES.iter().any(|scheme| cleaned.starts_with(scheme)) {
        return true;
    }
    cleaned.starts_with("data:") && !(attribute == "src" && cleaned.starts_with("data:image/"))
}

pub fn is_external_link(href: &str) -> bool {
    let href = href.trim().to_ascii_lowercase();
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

/// Whether a link points at, or is labelled as, an image
pub fn is_image_link(href: &str, text: &str) -> bool {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let file = path.rsplit('/').next().unwrap_or_default();
    let by_extension = file
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && IMAGE_EXTENSIONS.contains(&ext));

    let text = text.to_lowercase();
    by_extension || IMAGE_LINK_WORDS.iter().any(|word| text.contains(word))
}

/// Alt text derived from an image URL's file stem, e.g. `sunset-beach.jpg`
/// gives "sunset beach"
pub fn alt_from_src(src: &str) -> Option<String> {
    let path = src.split(['?', '#']).next()?;
    let file = path.rsplit('/').next()?;
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    let words: Vec<&str> = stem
        .split(['-', '_', '+', ' '])
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() || words.iter().all(|w| w.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    Some(words.join(" "))
}

/// Parse a markdown ATX heading line such as `## Section`
pub fn parse_heading_line(line: &str) -> Option<(u8, String)> {
    let line = line.trim();
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim().trim_end_matches('#').trim_end();
    if title.is_empty() {
        return None;
    }
    Some((u8::try_from(hashes).ok()?, title.to_string()))
}
