//! Owned, mutable HTML tree.
//!
//! html5ever parses (through scraper's tree sink, scripting disabled so
//! `<noscript>` children stay markup); the result is copied once into plain
//! owned nodes so the assembler can rewrite attributes, replace and remove
//! elements, and hold the document across `.await` points. Node ids stay
//! stable for the whole pass. Output goes back through html5ever's serializer.

use std::io;

use ego_tree::iter::Edge;
use ego_tree::{NodeId, NodeRef, Tree};
use html5ever::driver::ParseOpts;
use html5ever::serialize::{serialize, Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ns, LocalName, QualName};
use scraper::node::Node;
use scraper::{Html, HtmlTreeSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Document,
    Doctype(Doctype),
    Comment(String),
    Text(String),
    Element(ElementData),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

impl Doctype {
    /// Text between `<!DOCTYPE ` and `>`. Public and system identifiers are
    /// kept since they decide the quirks mode a browser renders in.
    pub fn declaration(&self) -> String {
        match (self.public_id.is_empty(), self.system_id.is_empty()) {
            (true, true) => self.name.clone(),
            (true, false) => format!("{} SYSTEM \"{}\"", self.name, self.system_id),
            (false, true) => format!("{} PUBLIC \"{}\"", self.name, self.public_id),
            (false, false) => format!(
                "{} PUBLIC \"{}\" \"{}\"",
                self.name, self.public_id, self.system_id
            ),
        }
    }
}

/// Element with namespaced name and attributes.
///
/// The string accessors only see attributes without a namespace, so
/// `xlink:href` is never mistaken for `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: QualName,
    pub attrs: Vec<(QualName, String)>,
}

impl ElementData {
    /// New HTML element.
    pub fn new(name: &str) -> Self {
        Self {
            name: QualName::new(None, ns!(html), LocalName::from(name)),
            attrs: Vec::new(),
        }
    }

    /// Local name, e.g. `img`.
    pub fn name(&self) -> &str {
        &self.name.local
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| is_plain(k, name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| is_plain(k, name)) {
            Some((_, existing)) => *existing = value,
            None => self
                .attrs
                .push((QualName::new(None, ns!(), LocalName::from(name)), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|(k, _)| is_plain(k, name))?;
        Some(self.attrs.remove(index).1)
    }

    /// Appends every attribute of `other` except the plain ones in `skip`.
    pub fn copy_attrs_except(&mut self, other: &ElementData, skip: &[&str]) {
        for (name, value) in &other.attrs {
            if skip.iter().any(|s| is_plain(name, s)) {
                continue;
            }
            self.attrs.push((name.clone(), value.clone()));
        }
    }
}

fn is_plain(name: &QualName, local: &str) -> bool {
    name.ns == ns!() && &*name.local == local
}

#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree<DomNode>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let parsed =
            html5ever::parse_document(HtmlTreeSink::new(Html::new_document()), opts).one(html);

        let mut tree = Tree::new(DomNode::Document);
        let mut stack: Vec<(NodeRef<'_, Node>, NodeId)> =
            vec![(parsed.tree.root(), tree.root().id())];

        while let Some((source, target)) = stack.pop() {
            for child in source.children() {
                let Some(value) = convert_node(child.value()) else {
                    continue;
                };
                let Some(mut parent) = tree.get_mut(target) else {
                    continue;
                };
                let id = parent.append(value).id();
                stack.push((child, id));
            }
        }

        Self { tree }
    }

    /// Element ids in document (pre-)order, as the tree looks right now.
    pub fn element_ids(&self) -> Vec<NodeId> {
        self.tree
            .root()
            .descendants()
            .filter(|node| matches!(node.value(), DomNode::Element(_)))
            .map(|node| node.id())
            .collect()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.tree.get(id)?.value() {
            DomNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Runs `f` on the element at `id`; `None` if `id` is not an element.
    pub fn update_element<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut ElementData) -> R,
    ) -> Option<R> {
        let mut node = self.tree.get_mut(id)?;
        match node.value() {
            DomNode::Element(element) => Some(f(element)),
            _ => None,
        }
    }

    /// False once the node or one of its ancestors was detached.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let root = self.tree.root().id();
        match self.tree.get(id) {
            Some(node) => node.ancestors().any(|a| a.id() == root) || id == root,
            None => false,
        }
    }

    /// First element with the given local name in document order.
    pub fn find_first(&self, name: &str) -> Option<NodeId> {
        self.tree
            .root()
            .descendants()
            .find(|node| matches!(node.value(), DomNode::Element(e) if e.name() == name))
            .map(|node| node.id())
    }

    /// Trimmed text of the first `<title>`, empty when the page has none.
    pub fn title(&self) -> String {
        self.find_first("title")
            .map(|id| self.text_content(id).trim().to_string())
            .unwrap_or_default()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.tree.get(id) else {
            return String::new();
        };
        node.descendants()
            .filter_map(|n| match n.value() {
                DomNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replaces all children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.clear_children(id);
        if let Some(mut node) = self.tree.get_mut(id) {
            node.append(DomNode::Text(text.into()));
        }
    }

    /// Inserts `replacement` where `id` sits and detaches `id`.
    pub fn replace(&mut self, id: NodeId, replacement: DomNode) -> Option<NodeId> {
        let mut node = self.tree.get_mut(id)?;
        let new_id = node.insert_before(replacement).id();
        node.detach();
        Some(new_id)
    }

    pub fn remove(&mut self, id: NodeId) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Inserts `child` as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: DomNode) -> Option<NodeId> {
        let mut node = self.tree.get_mut(parent)?;
        Some(node.prepend(child).id())
    }

    fn clear_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = match self.tree.get(id) {
            Some(node) => node.children().map(|c| c.id()).collect(),
            None => return,
        };
        for child in children {
            self.remove(child);
        }
    }

    pub fn to_html(&self) -> io::Result<String> {
        let opts = SerializeOpts {
            scripting_enabled: false,
            traversal_scope: TraversalScope::IncludeNode,
            create_missing_parent: false,
        };
        let mut buf = Vec::new();
        serialize(&mut buf, self, opts)?;
        String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        _traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        for edge in self.tree.root().traverse() {
            match edge {
                Edge::Open(node) => match node.value() {
                    DomNode::Document => {}
                    DomNode::Doctype(doctype) => serializer.write_doctype(&doctype.declaration())?,
                    DomNode::Comment(text) => serializer.write_comment(text)?,
                    DomNode::Text(text) => serializer.write_text(text)?,
                    DomNode::Element(element) => serializer.start_elem(
                        element.name.clone(),
                        element.attrs.iter().map(|(k, v)| (k, v.as_str())),
                    )?,
                },
                Edge::Close(node) => {
                    if let DomNode::Element(element) = node.value() {
                        serializer.end_elem(element.name.clone())?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn convert_node(node: &Node) -> Option<DomNode> {
    match node {
        Node::Doctype(doctype) => Some(DomNode::Doctype(Doctype {
            name: doctype.name().to_string(),
            public_id: doctype.public_id().to_string(),
            system_id: doctype.system_id().to_string(),
        })),
        Node::Comment(comment) => Some(DomNode::Comment(String::from(&**comment))),
        Node::Text(text) => Some(DomNode::Text(String::from(&**text))),
        Node::Element(element) => Some(DomNode::Element(ElementData {
            name: element.name.clone(),
            attrs: element
                .attrs
                .iter()
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
        })),
        _ => None,
    }
}
