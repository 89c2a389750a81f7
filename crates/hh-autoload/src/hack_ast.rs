//! Syntax tree for the subset of Hack emitted by the writer
//!
//! Generated modules are assembled as values of these types and rendered by
//! [`crate::codegen::Generator`], which owns all quoting and layout. Nothing
//! in this tree is ever parsed from source.

/// A generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Emit a `<?hh` opening tag (required for `.php`/`.hh` files, not `.hack`)
    pub opening_tag: bool,
    /// Documentation lines rendered as `/// ... ///` comments at the top
    pub header: Vec<String>,
    pub body: Vec<Item>,
}

/// A top-level element of a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// `namespace Name { ... }`
    Namespace(Namespace),
    /// Statement executed when the file is included
    Stmt(Stmt),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Backslash-separated name without a leading backslash
    pub name: String,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Function(Function),
    Class(Class),
}

/// `function name(): return_type { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub return_type: String,
    pub body: Vec<Stmt>,
}

/// Class with static properties only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub is_final: bool,
    pub properties: Vec<StaticProperty>,
}

/// `public static type $name = default;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticProperty {
    pub name: String,
    pub type_hint: String,
    pub default: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(Expr),
    Return(Option<Expr>),
    Assign {
        target: Expr,
        value: Expr,
    },
    If {
        test: Expr,
        body: Vec<Stmt>,
    },
    Foreach {
        iterable: Expr,
        binding: String,
        body: Vec<Stmt>,
    },
    RequireOnce(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Single-quoted string; escaping is applied at render time
    String(String),
    Bool(bool),
    /// Constant or function name, emitted verbatim (`__DIR__`, `\HH\foo`)
    Name(String),
    /// Local variable, stored without the `$`
    Variable(String),
    /// `left.right`
    Concat(Box<Expr>, Box<Expr>),
    /// `left ?: right`
    Elvis(Box<Expr>, Box<Expr>),
    /// `dict[key => value, ...]`
    Dict(Vec<(Expr, Expr)>),
    /// `vec[item, ...]`
    Vec(Vec<Expr>),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    StaticCall {
        class: String,
        method: String,
        args: Vec<Expr>,
    },
    /// `Class::$name`
    StaticProperty {
        class: String,
        name: String,
    },
    New {
        class: String,
        args: Vec<Expr>,
    },
    /// `object[key]`
    Index {
        object: Box<Expr>,
        key: Box<Expr>,
    },
}

impl Expr {
    /// Whether the expression must be parenthesized when used as an operand
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Concat(..) | Self::Elvis(..))
    }
}
