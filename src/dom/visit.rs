//! Shared document-order traversal
//!
//! Every component that computes or consumes character offsets goes through
//! these functions: the normalizer, the selection extractor, the highlight
//! injector and the navigator. Offsets are counted in `char`s over the
//! concatenation of all text nodes, in depth-first document order.

use super::node::{Element, Node, NodePath};

/// A text node located in the flattened coordinate space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan<'a> {
    /// Path of the text node, relative to the walked node list
    pub path: NodePath,
    /// Flattened offset of the first char
    pub start: usize,
    /// Length in chars
    pub len: usize,
    pub text: &'a str,
}

impl TextSpan<'_> {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Whether this span shares at least one char with `[start, end)`
    pub fn intersects(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end()
    }
}

/// A point inside the tree using DOM range semantics: for a text node the
/// offset counts chars, for an element it counts children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Boundary {
    pub path: NodePath,
    pub offset: usize,
}

impl Boundary {
    pub fn new(path: NodePath, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// Visit every text node in document order
pub fn walk_text<'a, F>(nodes: &'a [Node], visit: &mut F)
where
    F: FnMut(&NodePath, &'a str),
{
    let mut path = Vec::new();
    walk_text_inner(nodes, &mut path, visit);
}

fn walk_text_inner<'a, F>(nodes: &'a [Node], path: &mut NodePath, visit: &mut F)
where
    F: FnMut(&NodePath, &'a str),
{
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        match node {
            Node::Text(text) => visit(path, text.as_str()),
            Node::Element(el) => walk_text_inner(&el.children, path, visit),
        }
        path.pop();
    }
}

/// Concatenated text of all text nodes
pub fn flatten(nodes: &[Node]) -> String {
    let mut out = String::new();
    walk_text(nodes, &mut |_, text| out.push_str(text));
    out
}

/// All text nodes with their flattened positions
pub fn text_spans(nodes: &[Node]) -> Vec<TextSpan<'_>> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    walk_text(nodes, &mut |path, text| {
        let len = char_len(text);
        spans.push(TextSpan {
            path: path.clone(),
            start: cursor,
            len,
            text,
        });
        cursor += len;
    });
    spans
}

/// Flattened offset of a boundary point, or `None` if its path does not
/// resolve inside `nodes`
pub fn offset_at(nodes: &[Node], boundary: &Boundary) -> Option<usize> {
    let target = resolve(nodes, &boundary.path)?;
    let spans = text_spans(nodes);

    match target {
        Resolved::Text(text) => {
            let preceding: usize = spans
                .iter()
                .take_while(|span| span.path < boundary.path)
                .map(|span| span.len)
                .sum();
            Some(preceding + boundary.offset.min(char_len(text)))
        }
        Resolved::Container(child_count) => {
            let mut cut = boundary.path.clone();
            cut.push(boundary.offset.min(child_count));
            Some(
                spans
                    .iter()
                    .take_while(|span| span.path < cut)
                    .map(|span| span.len)
                    .sum(),
            )
        }
    }
}

enum Resolved<'a> {
    Text(&'a str),
    Container(usize),
}

fn resolve<'a>(nodes: &'a [Node], path: &[usize]) -> Option<Resolved<'a>> {
    let Some((first, rest)) = path.split_first() else {
        return Some(Resolved::Container(nodes.len()));
    };
    let mut node = nodes.get(*first)?;
    for index in rest {
        node = node.as_element()?.children.get(*index)?;
    }
    Some(match node {
        Node::Text(text) => Resolved::Text(text),
        Node::Element(el) => Resolved::Container(el.children.len()),
    })
}

/// First element in document order matching `predicate`
pub fn find_element<'a, P>(nodes: &'a [Node], predicate: &P) -> Option<(NodePath, &'a Element)>
where
    P: Fn(&Element) -> bool,
{
    collect_elements(nodes, predicate).into_iter().next()
}

/// All elements matching `predicate`, in document order (pre-order)
pub fn collect_elements<'a, P>(nodes: &'a [Node], predicate: &P) -> Vec<(NodePath, &'a Element)>
where
    P: Fn(&Element) -> bool,
{
    let mut found = Vec::new();
    let mut path = Vec::new();
    collect_inner(nodes, predicate, &mut path, &mut found);
    found
}

fn collect_inner<'a, P>(
    nodes: &'a [Node],
    predicate: &P,
    path: &mut NodePath,
    found: &mut Vec<(NodePath, &'a Element)>,
) where
    P: Fn(&Element) -> bool,
{
    for (index, node) in nodes.iter().enumerate() {
        if let Node::Element(el) = node {
            path.push(index);
            if predicate(el) {
                found.push((path.clone(), el));
            }
            collect_inner(&el.children, predicate, path, found);
            path.pop();
        }
    }
}

/// Elements enclosing the node at `path`, outermost first
pub fn ancestors<'a>(nodes: &'a [Node], path: &[usize]) -> Vec<&'a Element> {
    let mut chain = Vec::new();
    let mut children = nodes;
    for index in path {
        match children.get(*index) {
            Some(Node::Element(el)) => {
                chain.push(el);
                children = &el.children;
            }
            _ => break,
        }
    }
    // The last path element is the node itself when it is an element.
    if chain.len() == path.len() {
        chain.pop();
    }
    chain
}

/// Whether any element in the subtree satisfies `predicate`
pub fn contains_element<P>(nodes: &[Node], predicate: &P) -> bool
where
    P: Fn(&Element) -> bool,
{
    nodes.iter().any(|node| match node {
        Node::Element(el) => predicate(el) || contains_element(&el.children, predicate),
        Node::Text(_) => false,
    })
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the char at `char_index`, clamped to the end of `text`
pub fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Substring by char range; `None` if the range is inverted or out of bounds
pub fn slice_chars(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end || end > char_len(text) {
        return None;
    }
    Some(&text[byte_index(text, start)..byte_index(text, end)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Fragment;

    fn sample() -> Fragment {
        Fragment::parse("<p>Hello <b>big</b> world</p><p>Again</p>").unwrap()
    }

    #[test]
    fn test_flatten_document_order() {
        assert_eq!(sample().text(), "Hello big worldAgain");
    }

    #[test]
    fn test_text_spans_positions() {
        let fragment = sample();
        let spans = text_spans(&fragment.children);
        let summary: Vec<_> = spans.iter().map(|s| (s.path.clone(), s.start, s.len)).collect();
        assert_eq!(
            summary,
            vec![
                (vec![0, 0], 0, 6),
                (vec![0, 1, 0], 6, 3),
                (vec![0, 2], 9, 6),
                (vec![1, 0], 15, 5),
            ]
        );
    }

    #[test]
    fn test_offset_at_text_boundary() {
        let fragment = sample();
        let offset = offset_at(&fragment.children, &Boundary::new(vec![0, 2], 1));
        assert_eq!(offset, Some(10));
    }

    #[test]
    fn test_offset_at_element_boundary() {
        let fragment = sample();
        // Before the second child of the first paragraph (the <b>)
        assert_eq!(offset_at(&fragment.children, &Boundary::new(vec![0], 1)), Some(6));
        // Before the second paragraph
        assert_eq!(offset_at(&fragment.children, &Boundary::new(vec![], 1)), Some(15));
    }

    #[test]
    fn test_offset_at_invalid_path() {
        let fragment = sample();
        assert_eq!(offset_at(&fragment.children, &Boundary::new(vec![5, 0], 0)), None);
    }

    #[test]
    fn test_offsets_count_chars_not_bytes() {
        let fragment = Fragment::parse("<p>café <i>olé</i></p>").unwrap();
        let offset = offset_at(&fragment.children, &Boundary::new(vec![0, 1, 0], 0));
        assert_eq!(offset, Some(5));
        assert_eq!(slice_chars(&fragment.text(), 5, 8), Some("olé"));
    }

    #[test]
    fn test_ancestors_excludes_self() {
        let fragment = sample();
        let names: Vec<_> = ancestors(&fragment.children, &[0, 1, 0])
            .iter()
            .map(|el| el.name.as_str())
            .collect();
        assert_eq!(names, vec!["p", "b"]);

        let names: Vec<_> = ancestors(&fragment.children, &[0, 1])
            .iter()
            .map(|el| el.name.as_str())
            .collect();
        assert_eq!(names, vec!["p"]);
    }

    #[test]
    fn test_slice_chars_bounds() {
        assert_eq!(slice_chars("abc", 1, 3), Some("bc"));
        assert_eq!(slice_chars("abc", 2, 4), None);
        assert_eq!(slice_chars("abc", 2, 1), None);
    }
}
