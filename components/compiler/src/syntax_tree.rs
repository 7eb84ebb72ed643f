//! Concrete syntax tree built by the parser
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]; the parent
//! link is a plain index used only for ascent, so no node owns its parent.

use crate::lexer::Token;
use std::fmt;

/// Index of a node in its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// Grammar rule a branch node was derived by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// `Block EndOfProgram`
    Program,
    /// `'{' StatementList '}'`
    Block,
    /// Statements of one block, in order
    StatementList,
    /// One statement of any form
    Statement,
    /// `'print' '(' Expression ')'`
    PrintStatement,
    /// `Identifier '=' Expression`
    AssignmentStatement,
    /// `Type Identifier`
    VarDecl,
    /// `'while' Condition Statement`
    WhileStatement,
    /// `'if' Condition Statement`
    IfStatement,
    /// `'(' Expression [BoolOp Expression] ')'`
    Condition,
    /// `Identifier | IntExpr | StringExpr | BooleanExpr`
    Expression,
    /// `Digit ['+' Expression]`
    IntExpr,
    /// `StringLiteral`
    StringExpr,
    /// `'(' Expression BoolOp Expression ')' | BoolVal [BoolOp Expression]`
    BooleanExpr,
    /// `'==' | '!='`
    BoolOp,
    /// `'int' | 'string' | 'boolean'`
    Type,
    /// A single identifier token
    Identifier,
}

impl Rule {
    /// Rule name as shown in tree dumps
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Program => "Program",
            Rule::Block => "Block",
            Rule::StatementList => "Statement List",
            Rule::Statement => "Statement",
            Rule::PrintStatement => "Print Statement",
            Rule::AssignmentStatement => "Assignment Statement",
            Rule::VarDecl => "Variable Declaration",
            Rule::WhileStatement => "While Statement",
            Rule::IfStatement => "If Statement",
            Rule::Condition => "Condition",
            Rule::Expression => "Expression",
            Rule::IntExpr => "Int Expression",
            Rule::StringExpr => "String Expression",
            Rule::BooleanExpr => "Boolean Expression",
            Rule::BoolOp => "Boolean Operator",
            Rule::Type => "Type",
            Rule::Identifier => "Identifier",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Branch (grammar rule) or leaf (matched token)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Interior node for a grammar rule
    Branch(Rule),
    /// Matched token
    Leaf(Token),
}

/// A node of the syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Branch or leaf payload
    pub kind: NodeKind,
    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,
    /// Children in left-to-right derivation order
    pub children: Vec<NodeId>,
}

impl SyntaxNode {
    /// The rule of a branch node
    pub fn rule(&self) -> Option<Rule> {
        match &self.kind {
            NodeKind::Branch(rule) => Some(*rule),
            NodeKind::Leaf(_) => None,
        }
    }

    /// The token of a leaf node
    pub fn token(&self) -> Option<&Token> {
        match &self.kind {
            NodeKind::Leaf(token) => Some(token),
            NodeKind::Branch(_) => None,
        }
    }

    /// True for leaf nodes
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }
}

/// Arena-backed syntax tree with a single root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// The root node, if any node was added
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Node by id.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    /// Node by id, if it exists
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in creation order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Children of a node
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Rule of a branch node
    pub fn rule(&self, id: NodeId) -> Option<Rule> {
        self.get(id).and_then(SyntaxNode::rule)
    }

    /// Token of a leaf node
    pub fn token(&self, id: NodeId) -> Option<&Token> {
        self.get(id).and_then(SyntaxNode::token)
    }

    /// The `index`th child of a node
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// First child branch derived by `rule`
    pub fn child_with_rule(&self, id: NodeId, rule: Rule) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.rule(c) == Some(rule))
    }

    /// Every child branch derived by `rule`
    pub fn children_with_rule(&self, id: NodeId, rule: Rule) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.rule(c) == Some(rule))
            .collect()
    }

    /// First child leaf token
    pub fn child_token(&self, id: NodeId) -> Option<&Token> {
        self.children(id).iter().find_map(|&c| self.token(c))
    }

    /// Leftmost token in the subtree rooted at `id`
    pub fn first_token(&self, id: NodeId) -> Option<&Token> {
        if let Some(token) = self.token(id) {
            return Some(token);
        }
        self.children(id).iter().find_map(|&c| self.first_token(c))
    }

    /// Every leaf token in left-to-right order
    pub fn leaves(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaves(root, &mut out);
        }
        out
    }

    fn collect_leaves<'t>(&'t self, id: NodeId, out: &mut Vec<&'t Token>) {
        match self.token(id) {
            Some(token) => out.push(token),
            None => {
                for &child in self.children(id) {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    /// Number of ancestors of a node
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Render the tree, one node per line, depth shown by leading dashes.
    /// Branches print as `<Rule>`, leaves as `[text]`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.render_node(root, 0, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        out.push_str(&"-".repeat(depth));
        match &self.node(id).kind {
            NodeKind::Branch(rule) => out.push_str(&format!("<{}>\n", rule)),
            NodeKind::Leaf(token) => out.push_str(&format!("[{}]\n", token.text)),
        }
        for &child in self.children(id) {
            self.render_node(child, depth + 1, out);
        }
    }
}

/// Builds a [`SyntaxTree`] top-down, tracking the current branch
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: SyntaxTree,
    current: Option<NodeId>,
}

impl TreeBuilder {
    /// Create a builder for an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.tree.nodes.len());
        self.tree.nodes.push(SyntaxNode {
            kind,
            parent: self.current,
            children: Vec::new(),
        });
        match self.current {
            Some(parent) => self.tree.nodes[parent.0].children.push(id),
            None => {
                if self.tree.root.is_none() {
                    self.tree.root = Some(id);
                }
            }
        }
        id
    }

    /// Add a branch under the current node and make it current
    pub fn add_branch(&mut self, rule: Rule) -> NodeId {
        let id = self.push(NodeKind::Branch(rule));
        self.current = Some(id);
        id
    }

    /// Add a leaf under the current node
    pub fn add_leaf(&mut self, token: Token) -> NodeId {
        self.push(NodeKind::Leaf(token))
    }

    /// Move the current node back up to its parent
    pub fn ascend(&mut self) {
        if let Some(current) = self.current {
            self.current = self.tree.nodes[current.0].parent;
        }
    }

    /// The branch new nodes are added under
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Finish building
    pub fn finish(self) -> SyntaxTree {
        self.tree
    }
}
