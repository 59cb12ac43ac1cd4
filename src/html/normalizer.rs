//! Story content normalization
//!
//! Turns raw story markup into display-ready HTML. The passes run in a fixed
//! order over one typed tree:
//!
//! 1. Main-content selection for full documents
//! 2. Removal of disallowed elements and boilerplate regions
//! 3. Tag and attribute allow-listing
//! 4. Paragraph and line-break structure for minimally tagged input
//! 5. Markdown heading lines
//! 6. Image links promoted to figures
//! 7. Image enhancement (alt text, lazy loading, figure wrapping)
//! 8. Semantic classes, empty paragraph removal, safe external links

use std::mem::take;

use super::rules::{
    alt_from_src, is_allowed_attribute, is_boilerplate_region, is_external_link, is_image_link,
    is_unsafe_url, parse_heading_line, ALLOWED_TAGS, BLOCK_TAGS, DISALLOWED_TAGS,
    MAIN_CONTENT_SELECTORS, MEDIA_TAGS, PHRASING_TAGS, UNWRAPPED_TAGS,
};
use super::HighlightConfig;
use crate::config::NormalizerConfig;
use crate::dom::{visit, Element, Fragment, Node};
use crate::error::Result;
use crate::story::{ContentType, Story};

/// Elements never treated as boilerplate regardless of class names
const STRUCTURAL_TAGS: &[&str] = &["html", "body", "article", "main"];

/// Content normalizer; stateless apart from its configuration
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: NormalizerConfig,
    /// Attribute the renderer identifies markers by; never kept from input
    marker_attribute: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config,
            marker_attribute: HighlightConfig::default().id_attribute,
        }
    }

    /// Strip the marker id attribute the renderer is configured with
    pub fn with_markers(mut self, markers: &HighlightConfig) -> Self {
        self.marker_attribute = markers.id_attribute.clone();
        self
    }

    /// Normalize raw content into display-ready HTML.
    ///
    /// Never fails. A non-blank input that normalizes to nothing is rendered
    /// as escaped plain text. Markup that cannot be parsed is returned as is.
    pub fn normalize(&self, raw: &str, content_type: ContentType) -> String {
        match self.try_normalize(raw, content_type) {
            Ok(html) if !html.trim().is_empty() || raw.trim().is_empty() => html,
            Ok(_) => {
                tracing::warn!("Normalization produced no content, escaping raw content");
                self.try_normalize(raw, ContentType::PlainText)
                    .unwrap_or_else(|_| html_escape::encode_text(raw).into_owned())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Normalization failed, returning raw content");
                raw.to_string()
            }
        }
    }

    pub fn normalize_story(&self, story: &Story) -> String {
        tracing::debug!(
            story_id = %story.id,
            content_type = ?story.content_type,
            "Normalizing story"
        );
        self.normalize(story.raw_content(), story.content_type)
    }

    fn try_normalize(&self, raw: &str, content_type: ContentType) -> Result<String> {
        let nodes = match content_type {
            ContentType::PlainText => vec![Node::text(raw)],
            ContentType::Html => {
                let fragment = Fragment::parse(raw)?;
                if is_full_document(raw) {
                    self.select_main_content(fragment.children)
                } else {
                    fragment.children
                }
            }
        };

        let nodes = remove_disallowed(nodes);
        let nodes = sanitize(nodes, &self.marker_attribute, false);
        let nodes = if content_type == ContentType::PlainText || !has_block_structure(&nodes) {
            paragraphize(nodes)
        } else {
            nodes
        };
        let nodes = convert_heading_lines(nodes);
        let nodes = promote_image_links(nodes);
        let nodes = enhance_images(nodes, false);
        let nodes = hoist_lone_figures(nodes);
        let nodes = tag_semantics(nodes, false);

        Ok(Fragment::new(nodes).to_html())
    }

    /// Pick the subtree most likely to hold the article body
    fn select_main_content(&self, nodes: Vec<Node>) -> Vec<Node> {
        let mut best: Option<(usize, Element)> = None;

        for selector in MAIN_CONTENT_SELECTORS {
            for (_, el) in visit::collect_elements(&nodes, &|el| selector.matches(el)) {
                let text_len = visit::char_len(el.text().trim());
                if text_len >= self.config.min_main_text {
                    tracing::debug!(selector = ?selector, text_len, "Selected main content");
                    return vec![el.clone().into()];
                }
                if text_len > 0 && best.as_ref().map_or(true, |(len, _)| text_len > *len) {
                    best = Some((text_len, el.clone()));
                }
            }
        }

        if let Some((text_len, el)) = best {
            tracing::debug!(tag = %el.name, text_len, "Selected largest main-content candidate");
            return vec![el.into()];
        }

        match visit::find_element(&nodes, &|el| el.name == "body") {
            Some((_, body)) => body.children.clone(),
            None => nodes,
        }
    }
}

/// Whether the raw input is a complete HTML document rather than a fragment
pub fn is_full_document(raw: &str) -> bool {
    let head: String = raw
        .trim_start_matches('\u{feff}')
        .trim_start()
        .chars()
        .take(9)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

fn remove_disallowed(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(mut el) => {
                let structural = STRUCTURAL_TAGS.contains(&el.name.as_str());
                if DISALLOWED_TAGS.contains(&el.name.as_str())
                    || (!structural && is_boilerplate_region(&el))
                {
                    tracing::debug!(tag = %el.name, "Dropping disallowed element");
                    return None;
                }
                el.children = remove_disallowed(take(&mut el.children));
                Some(Node::Element(el))
            }
            text => Some(text),
        })
        .collect()
}

/// Reduce tags and attributes to the allow-lists. `in_phrasing` is set below
/// elements that only take inline content.
fn sanitize(nodes: Vec<Node>, marker_attribute: &str, in_phrasing: bool) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let mut el = match node {
            Node::Element(el) => el,
            text => {
                out.push(text);
                continue;
            }
        };

        let unwrapped = UNWRAPPED_TAGS.contains(&el.name.as_str());
        let phrasing = if unwrapped || !ALLOWED_TAGS.contains(&el.name.as_str()) {
            in_phrasing
        } else {
            PHRASING_TAGS.contains(&el.name.as_str())
        };
        let children = sanitize(take(&mut el.children), marker_attribute, phrasing);
        if unwrapped {
            out.extend(children);
            continue;
        }
        if !ALLOWED_TAGS.contains(&el.name.as_str()) {
            if visit::flatten(&children).trim().is_empty() {
                tracing::debug!(tag = %el.name, "Removing unknown element without text");
                continue;
            }
            let demoted = if !in_phrasing && has_block_structure(&children) {
                "div"
            } else {
                "span"
            };
            tracing::debug!(tag = %el.name, demoted, "Demoting unknown element");
            el.name = demoted.to_string();
        }

        el.attrs.retain(|(name, value)| {
            is_allowed_attribute(name)
                && !name.eq_ignore_ascii_case(marker_attribute)
                && !(matches!(name.as_str(), "href" | "src") && is_unsafe_url(name, value))
        });
        el.children = children;
        out.push(el.into());
    }
    out
}

fn has_block_structure(nodes: &[Node]) -> bool {
    visit::contains_element(nodes, &|el| BLOCK_TAGS.contains(&el.name.as_str()))
}

/// Accumulates inline content into paragraphs
#[derive(Default)]
struct Paragraphs {
    done: Vec<Node>,
    current: Vec<Node>,
    newline_pending: bool,
}

impl Paragraphs {
    fn push_text(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let multiline = text.contains('\n');
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                self.newline();
            }
            if line.is_empty() || (multiline && line.trim().is_empty()) {
                continue;
            }
            self.push_inline(Node::text(line));
        }
    }

    /// A second newline without content in between ends the paragraph
    fn newline(&mut self) {
        if self.newline_pending {
            self.end_paragraph();
        } else {
            self.newline_pending = true;
        }
    }

    fn push_inline(&mut self, node: Node) {
        let after_break = self.current.last().is_some_and(|n| n.is_element("br"));
        if self.newline_pending
            && !self.current.is_empty()
            && !after_break
            && !node.is_element("br")
        {
            self.current.push(Element::new("br").into());
        }
        self.newline_pending = false;
        self.current.push(node);
    }

    fn push_block(&mut self, node: Node) {
        self.end_paragraph();
        self.done.push(node);
    }

    fn end_paragraph(&mut self) {
        self.newline_pending = false;
        let children = take(&mut self.current);
        if children.iter().all(Node::is_blank_text) {
            return;
        }
        self.done.push(Element::new("p").with_children(children).into());
    }

    fn finish(mut self) -> Vec<Node> {
        self.end_paragraph();
        self.done
    }
}

/// Give plain or minimally tagged content paragraph and line-break structure.
/// Only top-level text is split, so text inside inline code keeps its
/// whitespace.
fn paragraphize(nodes: Vec<Node>) -> Vec<Node> {
    let mut paragraphs = Paragraphs::default();
    for node in nodes {
        match node {
            Node::Text(text) => paragraphs.push_text(&text),
            Node::Element(el) if BLOCK_TAGS.contains(&el.name.as_str()) => {
                paragraphs.push_block(el.into())
            }
            inline => paragraphs.push_inline(inline),
        }
    }
    paragraphs.finish()
}

fn convert_heading_lines(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(el) if el.name == "p" => out.extend(split_heading_paragraph(el)),
            Node::Element(mut el) if !matches!(el.name.as_str(), "pre" | "code") => {
                el.children = convert_heading_lines(take(&mut el.children));
                out.push(el.into());
            }
            other => out.push(other),
        }
    }
    out
}

/// Split a paragraph around any line that is a markdown heading
fn split_heading_paragraph(mut paragraph: Element) -> Vec<Node> {
    let lines = split_on_breaks(take(&mut paragraph.children));
    if !lines.iter().any(|line| heading_in_line(line).is_some()) {
        paragraph.children = join_with_breaks(lines);
        return vec![paragraph.into()];
    }

    let mut out = Vec::new();
    let mut pending: Vec<Vec<Node>> = Vec::new();
    for line in lines {
        match heading_in_line(&line) {
            Some((level, title)) => {
                flush_lines(&paragraph, &mut pending, &mut out);
                tracing::debug!(level, "Converted markdown heading line");
                let heading = Element::new(&format!("h{}", level)).with_child(Node::text(title));
                out.push(heading.into());
            }
            None => pending.push(line),
        }
    }
    flush_lines(&paragraph, &mut pending, &mut out);
    out
}

fn heading_in_line(line: &[Node]) -> Option<(u8, String)> {
    let mut meaningful = line.iter().filter(|node| !node.is_blank_text());
    match (meaningful.next(), meaningful.next()) {
        (Some(Node::Text(text)), None) => parse_heading_line(text),
        _ => None,
    }
}

fn flush_lines(template: &Element, pending: &mut Vec<Vec<Node>>, out: &mut Vec<Node>) {
    let lines = take(pending);
    if lines.iter().flatten().all(Node::is_blank_text) {
        return;
    }
    let paragraph = Element {
        name: template.name.clone(),
        attrs: template.attrs.clone(),
        children: join_with_breaks(lines),
    };
    out.push(paragraph.into());
}

fn split_on_breaks(children: Vec<Node>) -> Vec<Vec<Node>> {
    let mut lines = vec![Vec::new()];
    for node in children {
        if node.is_element("br") {
            lines.push(Vec::new());
        } else if let Some(line) = lines.last_mut() {
            line.push(node);
        }
    }
    lines
}

fn join_with_breaks(lines: Vec<Vec<Node>>) -> Vec<Node> {
    let mut children = Vec::new();
    for (index, line) in lines.into_iter().enumerate() {
        if index > 0 {
            children.push(Element::new("br").into());
        }
        children.extend(line);
    }
    children
}

fn promote_image_links(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(el) if el.name == "a" => promote_anchor(el),
            Node::Element(mut el) => {
                el.children = promote_image_links(take(&mut el.children));
                el.into()
            }
            text => text,
        })
        .collect()
}

/// Turn a link to an image into a figure with the image and a caption
fn promote_anchor(mut anchor: Element) -> Node {
    let href = anchor.attr("href").unwrap_or_default().trim().to_string();
    let text = anchor.text().trim().to_string();
    let wraps_image = visit::contains_element(&anchor.children, &|el| el.name == "img");

    if href.is_empty() || wraps_image || !is_image_link(&href, &text) {
        anchor.children = promote_image_links(take(&mut anchor.children));
        return anchor.into();
    }

    tracing::debug!(href = %href, "Promoting image link to figure");
    let alt = if text.is_empty() {
        alt_from_src(&href).unwrap_or_else(|| "Image".to_string())
    } else {
        text.clone()
    };
    let image = Element::new("img")
        .with_attr("src", &href)
        .with_attr("alt", &alt)
        .with_attr("loading", "lazy");

    let mut figure = Element::new("figure").with_child(image);
    if !text.is_empty() && text != href {
        figure = figure.with_child(Element::new("figcaption").with_child(Node::text(text)));
    }
    figure.into()
}

fn enhance_images(nodes: Vec<Node>, in_figure: bool) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(mut el) if el.name == "img" => {
                let missing_alt = el.attr("alt").map_or(true, |alt| alt.trim().is_empty());
                if missing_alt {
                    let alt = el
                        .attr("src")
                        .and_then(alt_from_src)
                        .unwrap_or_else(|| "Image".to_string());
                    el.set_attr("alt", &alt);
                }
                el.set_attr("loading", "lazy");
                if in_figure {
                    el.into()
                } else {
                    Element::new("figure").with_child(el).into()
                }
            }
            Node::Element(mut el) => {
                let inside = in_figure || matches!(el.name.as_str(), "figure" | "picture");
                el.children = enhance_images(take(&mut el.children), inside);
                el.into()
            }
            text => text,
        })
        .collect()
}

/// Replace paragraphs whose only content is a figure by the figure itself
fn hoist_lone_figures(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(mut el) => {
                el.children = hoist_lone_figures(take(&mut el.children));
                if el.name == "p" {
                    if let Some(index) = lone_figure_index(&el.children) {
                        return el.children.swap_remove(index);
                    }
                }
                el.into()
            }
            text => text,
        })
        .collect()
}

fn lone_figure_index(children: &[Node]) -> Option<usize> {
    let mut meaningful = children
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.is_blank_text());
    let (index, node) = meaningful.next()?;
    if meaningful.next().is_some() || !node.is_element("figure") {
        return None;
    }
    Some(index)
}

fn tag_semantics(nodes: Vec<Node>, in_pre: bool) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(mut el) => {
                let inside_pre = in_pre || el.name == "pre";
                el.children = tag_semantics(take(&mut el.children), inside_pre);
                if el.name == "p" && is_empty_paragraph(&el) {
                    tracing::debug!("Removing empty paragraph");
                    return None;
                }
                apply_semantic_classes(&mut el, in_pre);
                Some(el.into())
            }
            text => Some(text),
        })
        .collect()
}

fn is_empty_paragraph(paragraph: &Element) -> bool {
    paragraph.text().trim().is_empty()
        && !visit::contains_element(&paragraph.children, &|el| {
            MEDIA_TAGS.contains(&el.name.as_str())
        })
}

fn apply_semantic_classes(el: &mut Element, in_pre: bool) {
    let class = match el.name.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level_class = format!("content-heading-{}", &el.name[1..]);
            el.add_class("content-heading");
            el.add_class(&level_class);
            return;
        }
        "p" => "content-paragraph",
        "ul" | "ol" => "content-list",
        "li" => "content-list-item",
        "blockquote" => "content-quote",
        "pre" => "content-code-block",
        "code" if !in_pre => "content-code",
        "em" | "i" => "content-emphasis",
        "strong" | "b" => "content-strong",
        "figure" => "content-figure",
        "img" => "content-image",
        "figcaption" => "content-caption",
        "a" => {
            el.add_class("content-link");
            if el.attr("href").is_some_and(is_external_link) {
                el.set_attr("target", "_blank");
                el.set_attr("rel", "noopener noreferrer");
            }
            return;
        }
        _ => return,
    };
    el.add_class(class);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        Normalizer::default().normalize(raw, ContentType::Html)
    }

    #[test]
    fn test_markdown_heading_then_body() {
        let html = normalize("## Section\nBody text");
        assert_eq!(
            html,
            "<h2 class=\"content-heading content-heading-2\">Section</h2>\
             <p class=\"content-paragraph\">Body text</p>"
        );
    }

    #[test]
    fn test_image_link_becomes_figure() {
        let html = normalize(r#"<a href="https://x.com/img.png">photo</a>"#);
        assert_eq!(
            html,
            "<figure class=\"content-figure\">\
             <img src=\"https://x.com/img.png\" alt=\"photo\" loading=\"lazy\" class=\"content-image\">\
             <figcaption class=\"content-caption\">photo</figcaption>\
             </figure>"
        );
    }

    #[test]
    fn test_image_link_without_caption_when_text_is_url() {
        let url = "https://x.com/pics/red-fox.jpg";
        let html = normalize(&format!(r#"<p><a href="{url}">{url}</a></p>"#));
        assert!(html.contains(&format!(r#"<img src="{url}" alt="{url}""#)));
        assert!(!html.contains("figcaption"));
        assert!(!html.contains("<p"));
    }

    #[test]
    fn test_plain_text_paragraphs_and_breaks() {
        let html = Normalizer::default().normalize(
            "First line\nsecond line\n\nSecond paragraph",
            ContentType::PlainText,
        );
        assert_eq!(
            html,
            "<p class=\"content-paragraph\">First line<br>second line</p>\
             <p class=\"content-paragraph\">Second paragraph</p>"
        );
    }

    #[test]
    fn test_plain_text_is_not_parsed_as_markup() {
        let html = Normalizer::default().normalize("a <b>bold</b> claim", ContentType::PlainText);
        assert_eq!(
            html,
            "<p class=\"content-paragraph\">a &lt;b&gt;bold&lt;/b&gt; claim</p>"
        );
    }

    #[test]
    fn test_preformatted_whitespace_preserved() {
        let raw = "<p>Intro</p><pre><code>fn main() {\n    let x = 1;\n\n}</code></pre>";
        let html = normalize(raw);
        assert!(html.contains(
            "<pre class=\"content-code-block\"><code>fn main() {\n    let x = 1;\n\n}</code></pre>"
        ));
    }

    #[test]
    fn test_inline_code_keeps_whitespace_in_minimal_markup() {
        let html = normalize("Run <code>a\n\nb</code> now");
        assert!(html.contains("<code class=\"content-code\">a\n\nb</code>"));
    }

    #[test]
    fn test_disallowed_elements_removed() {
        let raw = r#"<div><p>Keep</p><script>alert(1)</script><form><input name="q"></form>
            <div class="social-share">Share this</div><nav>Menu</nav><style>p{}</style></div>"#;
        let html = normalize(raw);
        assert!(html.contains("Keep"));
        for gone in ["script", "alert", "form", "input", "Share this", "Menu", "style"] {
            assert!(!html.contains(gone), "{gone} should be removed: {html}");
        }
    }

    #[test]
    fn test_attributes_allow_listed() {
        let raw = r#"<p onclick="x()" style="color:red" data-x="1" aria-label="l" lang="en">Hi <a href="javascript:alert(1)">there</a></p>"#;
        let html = normalize(raw);
        assert!(!html.contains("onclick"));
        assert!(!html.contains("style"));
        assert!(!html.contains("javascript"));
        assert!(html.contains(r#"data-x="1""#));
        assert!(html.contains(r#"aria-label="l""#));
        assert!(html.contains(r#"lang="en""#));
    }

    #[test]
    fn test_unknown_elements_demoted_or_removed() {
        let html = normalize(
            "<p>Intro</p><custom-box><p>Boxed text</p></custom-box><custom-tag>Loose</custom-tag>\
             <blink></blink>",
        );
        assert!(html.contains("<div><p class=\"content-paragraph\">Boxed text</p></div>"));
        assert!(html.contains("<span>Loose</span>"));
        assert!(!html.contains("blink"));
        assert!(!html.contains("custom-"));
    }

    #[test]
    fn test_unknown_inline_element_stays_inline() {
        let html = normalize(r#"<p>Hello <font color="red">red</font> text</p>"#);
        assert_eq!(
            html,
            "<p class=\"content-paragraph\">Hello <span>red</span> text</p>"
        );
    }

    #[test]
    fn test_unknown_inline_element_keeps_paragraph_splitting() {
        let html = normalize("First line\n\nHello <font>red</font> text");
        assert_eq!(
            html,
            "<p class=\"content-paragraph\">First line</p>\
             <p class=\"content-paragraph\">Hello <span>red</span> text</p>"
        );
    }

    #[test]
    fn test_obfuscated_script_urls_removed() {
        for href in [
            "java&#x09;script:alert(1)",
            "java&#x0A;script:alert(1)",
            " \n JavaScript:alert(1)",
            "vbscript:msgbox(1)",
            "data:text/html,&lt;script&gt;alert(1)&lt;/script&gt;",
        ] {
            let html = normalize(&format!(r#"<p>Go <a href="{href}">here</a></p>"#));
            assert!(!html.contains("href="), "{href} should be removed: {html}");
            assert!(!html.contains("script:"), "{href} should be removed: {html}");
            assert!(html.contains(">here</a>"));
        }

        let html = normalize(r#"<p>Pic <img src="data:image/png;base64,AAAA" alt="dot"></p>"#);
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
    }

    #[test]
    fn test_marker_id_attribute_stripped() {
        let raw = r#"<p>Quote <mark data-highlight-id="h9">the author marked</mark> end</p>"#;
        assert_eq!(
            normalize(raw),
            "<p class=\"content-paragraph\">Quote <mark>the author marked</mark> end</p>"
        );

        let markers = HighlightConfig {
            class_prefix: "hl".to_string(),
            id_attribute: "data-hl".to_string(),
        };
        let raw = r#"<p><mark data-hl="x" data-highlight-id="y">t</mark></p>"#;
        let html = Normalizer::default()
            .with_markers(&markers)
            .normalize(raw, ContentType::Html);
        assert!(!html.contains("data-hl="));
        assert!(html.contains(r#"data-highlight-id="y""#));
    }

    #[test]
    fn test_full_document_selects_article() {
        let body = "Meaningful article text. ".repeat(10);
        let raw = format!(
            "<!DOCTYPE html><html><head><title>T</title><script>x()</script></head>\
             <body><nav>Site menu</nav><header>Masthead</header>\
             <article><h1>Title</h1><p>{body}</p><div class=\"comments\">Nice post</div></article>\
             <footer>Footer links</footer></body></html>"
        );
        let html = normalize(&raw);
        assert!(html.starts_with("<article>"));
        assert!(html.contains("<h1 class=\"content-heading content-heading-1\">Title</h1>"));
        assert!(html.contains("Meaningful article text."));
        for gone in ["Site menu", "Masthead", "Nice post", "Footer links", "x()", "<title>"] {
            assert!(!html.contains(gone), "{gone} should be dropped: {html}");
        }
    }

    #[test]
    fn test_full_document_prefers_largest_candidate() {
        let raw = "<html><body><main><p>short</p></main>\
                   <div class=\"content\"><p>a much longer block of text here</p></div></body></html>";
        let html = normalize(raw);
        assert!(html.contains("a much longer block"));
        assert!(!html.contains("short"));
    }

    #[test]
    fn test_full_document_falls_back_to_body() {
        let raw = "<html><head><title>T</title></head><body><p>Only body text</p></body></html>";
        assert_eq!(
            normalize(raw),
            "<p class=\"content-paragraph\">Only body text</p>"
        );
    }

    #[test]
    fn test_images_enhanced_and_wrapped() {
        let html = normalize(r#"<p>Look</p><p><img src="/media/sunset-beach.jpg"></p>"#);
        assert!(html.contains(
            "<figure class=\"content-figure\"><img src=\"/media/sunset-beach.jpg\" alt=\"sunset beach\" loading=\"lazy\" class=\"content-image\"></figure>"
        ));
        assert!(!html.contains("<p class=\"content-paragraph\"><figure"));
    }

    #[test]
    fn test_image_in_figure_not_rewrapped() {
        let html = normalize(r#"<figure><img src="a.png" alt="A"><figcaption>Cap</figcaption></figure>"#);
        assert_eq!(html.matches("<figure").count(), 1);
        assert!(html.contains(r#"alt="A""#));
    }

    #[test]
    fn test_semantic_classes_and_external_links() {
        let raw = r#"<ul><li><em>one</em></li></ul><blockquote><p>q <strong>s</strong> <code>c</code></p></blockquote><p><a href="https://example.com">ext</a> <a href="/local">local</a></p>"#;
        let html = normalize(raw);
        assert!(html.contains(r#"<ul class="content-list"><li class="content-list-item"><em class="content-emphasis">one</em>"#));
        assert!(html.contains(r#"<blockquote class="content-quote">"#));
        assert!(html.contains(r#"<strong class="content-strong">s</strong>"#));
        assert!(html.contains(r#"<code class="content-code">c</code>"#));
        assert!(html.contains(r#"<a href="https://example.com" class="content-link" target="_blank" rel="noopener noreferrer">ext</a>"#));
        assert!(html.contains(r#"<a href="/local" class="content-link">local</a>"#));
    }

    #[test]
    fn test_empty_paragraphs_removed() {
        let html = normalize("<p>Text</p><p>  </p><p><br></p><p><img src=\"a.png\" alt=\"a\"></p>");
        assert_eq!(html.matches("<p").count(), 1);
        assert!(html.contains("<img"));
    }

    #[test]
    fn test_heading_paragraph_in_structured_html() {
        let html = normalize("<p>### Notes</p><p>Body</p>");
        assert!(html.starts_with("<h3 class=\"content-heading content-heading-3\">Notes</h3>"));
    }

    #[test]
    fn test_existing_class_kept() {
        let html = normalize(r#"<p class="lead">Intro</p>"#);
        assert_eq!(html, r#"<p class="lead content-paragraph">Intro</p>"#);
    }

    #[test]
    fn test_deterministic() {
        let raw = "## A\nb\n\n<a href=\"x.gif\">image</a>";
        assert_eq!(normalize(raw), normalize(raw));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_all_removed_falls_back_to_escaped_text() {
        assert_eq!(
            normalize("<script>track()</script>"),
            "<p class=\"content-paragraph\">&lt;script&gt;track()&lt;/script&gt;</p>"
        );

        let raw = r#"<!DOCTYPE html><html><head><script>steal()</script></head><body><nav>Menu</nav><div class="ad"><img src=x onerror="steal()"></div></body></html>"#;
        let html = normalize(raw);
        assert!(html.starts_with("<p class=\"content-paragraph\">&lt;!DOCTYPE html&gt;"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<nav"));
    }

    #[test]
    fn test_is_full_document() {
        assert!(is_full_document("  <!DOCTYPE html><html></html>"));
        assert!(is_full_document("<HTML lang=\"en\">"));
        assert!(!is_full_document("<p>fragment</p>"));
    }
}
