//! Tree construction on top of lol_html
//!
//! lol_html is a streaming rewriter and never builds a DOM, so the tree is
//! assembled from its element, end-tag and text callbacks. The output of this
//! builder is the only tree representation used anywhere in the crate.

use std::cell::RefCell;
use std::error::Error as StdError;
use std::rc::Rc;

use html_escape::decode_html_entities;
use lol_html::html_content::EndTag;
use lol_html::{doc_text, element, rewrite_str, EndTagHandler, RewriteStrSettings};

use super::node::{is_void, Element, Fragment, Node, RAW_TEXT_ELEMENTS};
use crate::error::{Error, Result};

/// Elements implicitly closed when another element of the same name opens
const SELF_CLOSING_SIBLINGS: &[&str] = &["p", "li", "dt", "dd", "tr", "td", "th", "option"];

#[derive(Debug, Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Element>,
    pending_text: String,
}

impl TreeBuilder {
    fn in_raw_text(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|el| RAW_TEXT_ELEMENTS.contains(&el.name.as_str()))
    }

    fn push_text(&mut self, chunk: &str) {
        self.pending_text.push_str(chunk);
    }

    /// Entities are decoded once the whole text node is known, so a chunk
    /// boundary inside an entity cannot corrupt it.
    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.pending_text);
        let text = if self.in_raw_text() {
            raw
        } else {
            decode_html_entities(&raw).into_owned()
        };
        self.append(Node::Text(text));
    }

    fn append(&mut self, node: Node) {
        let siblings = match self.stack.last_mut() {
            Some(el) => &mut el.children,
            None => &mut self.root,
        };
        if let Node::Text(text) = &node {
            if let Some(Node::Text(previous)) = siblings.last_mut() {
                previous.push_str(text);
                return;
            }
        }
        siblings.push(node);
    }

    fn open(&mut self, element: Element, leaf: bool) {
        self.flush_text();
        let closes_sibling = SELF_CLOSING_SIBLINGS.contains(&element.name.as_str())
            && self.stack.last().is_some_and(|top| top.name == element.name);
        if closes_sibling {
            self.close_top();
        }
        if leaf {
            self.append(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    /// Close the nearest open element named `name`, along with anything
    /// still open inside it. Unmatched end tags are ignored.
    fn close(&mut self, name: &str) {
        self.flush_text();
        if let Some(position) = self.stack.iter().rposition(|el| el.name == name) {
            while self.stack.len() > position {
                self.close_top();
            }
        }
    }

    fn close_top(&mut self) {
        if let Some(el) = self.stack.pop() {
            self.append(Node::Element(el));
        }
    }

    fn finish(&mut self) -> Vec<Node> {
        self.flush_text();
        while !self.stack.is_empty() {
            self.close_top();
        }
        std::mem::take(&mut self.root)
    }
}

type EndTagResult = std::result::Result<(), Box<dyn StdError + Send + Sync>>;

impl Fragment {
    /// Parse an HTML string (document or fragment) into a tree.
    ///
    /// Comments and doctypes are dropped. Fails only when the underlying
    /// rewriter rejects the input.
    pub fn parse(html: &str) -> Result<Fragment> {
        let builder = Rc::new(RefCell::new(TreeBuilder::default()));
        let on_element = Rc::clone(&builder);
        let on_text = Rc::clone(&builder);

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![element!("*", move |el| {
                    let name = el.tag_name();
                    let mut element = Element::new(&name);
                    for attr in el.attributes() {
                        let value = decode_html_entities(&attr.value()).into_owned();
                        element.attrs.push((attr.name(), value));
                    }
                    let leaf = is_void(&element.name) || el.is_self_closing();
                    on_element.borrow_mut().open(element, leaf);

                    if !leaf {
                        if let Some(handlers) = el.end_tag_handlers() {
                            let builder = Rc::clone(&on_element);
                            let name = name.to_ascii_lowercase();
                            let handler: EndTagHandler<'static> =
                                Box::new(move |_end: &mut EndTag<'_>| -> EndTagResult {
                                    builder.borrow_mut().close(&name);
                                    Ok(())
                                });
                            handlers.push(handler);
                        }
                    }
                    Ok(())
                })],
                document_content_handlers: vec![doc_text!(move |chunk| {
                    let mut builder = on_text.borrow_mut();
                    builder.push_text(chunk.as_str());
                    if chunk.last_in_text_node() {
                        builder.flush_text();
                    }
                    Ok(())
                })],
                strict: false,
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| Error::Parse(e.to_string()))?;

        let children = builder.borrow_mut().finish();
        Ok(Fragment::new(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let fragment = Fragment::parse(r#"<div class="a"><p>Hi <em>there</em></p></div>"#).unwrap();
        assert_eq!(fragment.children.len(), 1);

        let div = fragment.children[0].as_element().unwrap();
        assert_eq!(div.name, "div");
        assert_eq!(div.attr("class"), Some("a"));

        let p = div.children[0].as_element().unwrap();
        assert_eq!(p.name, "p");
        assert_eq!(p.children.len(), 2);
        assert!(p.children[1].is_element("em"));
    }

    #[test]
    fn test_parse_void_elements_are_leaves() {
        let fragment = Fragment::parse("<p>one<br>two<img src=\"a.png\">three</p>").unwrap();
        let p = fragment.children[0].as_element().unwrap();
        assert_eq!(p.children.len(), 5);
        assert!(p.children[1].is_element("br"));
        assert!(p.children[3].is_element("img"));
        assert_eq!(p.text(), "onetwothree");
    }

    #[test]
    fn test_parse_decodes_entities() {
        let fragment = Fragment::parse("<p>Fish &amp; chips &lt;3</p>").unwrap();
        assert_eq!(fragment.text(), "Fish & chips <3");
    }

    #[test]
    fn test_parse_keeps_raw_text_verbatim() {
        let fragment = Fragment::parse("<script>if (a &amp;&amp; b) {}</script>").unwrap();
        let script = fragment.children[0].as_element().unwrap();
        assert_eq!(script.text(), "if (a &amp;&amp; b) {}");
    }

    #[test]
    fn test_parse_closes_unclosed_elements() {
        let fragment = Fragment::parse("<div><p>open").unwrap();
        assert_eq!(fragment.text(), "open");
        let div = fragment.children[0].as_element().unwrap();
        assert!(div.children[0].is_element("p"));
    }

    #[test]
    fn test_parse_implicit_paragraph_close() {
        let fragment = Fragment::parse("<p>one<p>two").unwrap();
        assert_eq!(fragment.children.len(), 2);
        assert!(fragment.children.iter().all(|n| n.is_element("p")));
    }

    #[test]
    fn test_parse_drops_comments() {
        let fragment = Fragment::parse("<p>a<!-- hidden -->b</p>").unwrap();
        assert_eq!(fragment.text(), "ab");
    }

    #[test]
    fn test_parse_plain_text() {
        let fragment = Fragment::parse("Hello world, this is a test.").unwrap();
        assert_eq!(
            fragment.children,
            vec![Node::text("Hello world, this is a test.")]
        );
    }
}
