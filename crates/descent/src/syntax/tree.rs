use crate::lexer::{Token, TokenKind};
use compact_str::CompactString;
use std::fmt;

/// A concrete syntax tree produced by the engine.
///
/// Every node exclusively owns its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxTree<K> {
    /// One matched token
    Leaf(SyntaxLeaf<K>),
    /// A matched rule
    Node(SyntaxNode<K>),
    /// The matches of a `*` or `+` clause
    Many(ManyNode<K>),
    /// The match of a `?` clause, or its absence
    Option(OptionNode<K>),
    /// The matches of a `( ... )` clause
    Group(GroupNode<K>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxLeaf<K> {
    pub token: Token<K>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode<K> {
    pub(crate) name: CompactString,
    pub(crate) non_terminal: CompactString,
    pub(crate) rule: usize,
    pub(crate) children: Vec<SyntaxTree<K>>,
    pub(crate) operator: Option<K>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManyNode<K> {
    pub children: Vec<SyntaxTree<K>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionNode<K> {
    pub child: Option<Box<SyntaxTree<K>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode<K> {
    pub children: Vec<SyntaxTree<K>>,
}

impl<K: TokenKind> SyntaxNode<K> {
    pub(crate) fn new(
        non_terminal: &str,
        rule: usize,
        key: &str,
        children: Vec<SyntaxTree<K>>,
    ) -> Self {
        Self {
            name: compact_str::format_compact!("{non_terminal}__{key}"),
            non_terminal: non_terminal.into(),
            rule,
            children,
            operator: None,
        }
    }

    /// `<non-terminal>__<rule key>`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn non_terminal(&self) -> &str {
        &self.non_terminal
    }

    /// Index of the matched rule within its non-terminal.
    #[must_use]
    pub const fn rule_index(&self) -> usize {
        self.rule
    }

    #[must_use]
    pub fn children(&self) -> &[SyntaxTree<K>] {
        &self.children
    }

    /// The operator token kind whose resolver reduces this node, if any.
    #[must_use]
    pub const fn operator(&self) -> Option<K> {
        self.operator
    }
}

impl<K: TokenKind> SyntaxTree<K> {
    #[must_use]
    pub const fn as_node(&self) -> Option<&SyntaxNode<K>> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_token(&self) -> Option<&Token<K>> {
        match self {
            Self::Leaf(leaf) => Some(&leaf.token),
            _ => None,
        }
    }

    pub(crate) const fn kind_name(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "token",
            Self::Node(_) => "node",
            Self::Many(_) => "repetition",
            Self::Option(_) => "option",
            Self::Group(_) => "group",
        }
    }

    /// Every token under this tree, in source order.
    #[must_use]
    pub fn tokens(&self) -> Vec<&Token<K>> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens<'a>(&'a self, tokens: &mut Vec<&'a Token<K>>) {
        match self {
            Self::Leaf(leaf) => tokens.push(&leaf.token),
            Self::Node(SyntaxNode { children, .. })
            | Self::Many(ManyNode { children })
            | Self::Group(GroupNode { children }) => {
                for child in children {
                    child.collect_tokens(tokens);
                }
            }
            Self::Option(OptionNode { child }) => {
                if let Some(child) = child {
                    child.collect_tokens(tokens);
                }
            }
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Self::Leaf(leaf) => writeln!(f, "{indent}{:?} {:?}", leaf.token.kind, leaf.token.text),
            Self::Node(node) => {
                match node.operator {
                    Some(operator) => writeln!(f, "{indent}{} [{operator:?}]", node.name)?,
                    None => writeln!(f, "{indent}{}", node.name)?,
                }
                node.children
                    .iter()
                    .try_for_each(|child| child.write_indented(f, depth + 1))
            }
            Self::Many(many) => {
                writeln!(f, "{indent}*")?;
                many.children
                    .iter()
                    .try_for_each(|child| child.write_indented(f, depth + 1))
            }
            Self::Option(option) => match &option.child {
                Some(child) => {
                    writeln!(f, "{indent}?")?;
                    child.write_indented(f, depth + 1)
                }
                None => writeln!(f, "{indent}? <none>"),
            },
            Self::Group(group) => {
                writeln!(f, "{indent}()")?;
                group
                    .children
                    .iter()
                    .try_for_each(|child| child.write_indented(f, depth + 1))
            }
        }
    }
}

/// Indented outline, one element per line.
impl<K: TokenKind> fmt::Display for SyntaxTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
