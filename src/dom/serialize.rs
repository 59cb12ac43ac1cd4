//! HTML serialization

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::node::{Element, Fragment, Node, RAW_TEXT_ELEMENTS};

impl Fragment {
    /// Serialize the fragment back to HTML.
    ///
    /// Parsing the output again yields an identical tree, so serializer
    /// output is a fixed point of parse-then-serialize.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_nodes(&self.children, false, &mut out);
        out
    }
}

impl Element {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

fn write_nodes(nodes: &[Node], raw_text: bool, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) if raw_text => out.push_str(text),
            Node::Text(text) => out.push_str(&encode_text(text)),
            Node::Element(el) => write_element(el, out),
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');

    if el.is_void() {
        return;
    }

    write_nodes(
        &el.children,
        RAW_TEXT_ELEMENTS.contains(&el.name.as_str()),
        out,
    );
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}
