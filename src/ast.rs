use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    String(String),
    Null,
    Identifier(String),
    Binary {
        left: Box<Expr>,
        op: BinaryOpKind,
        right: Box<Expr>,
    },
    Comparison {
        left: Box<Expr>,
        op: CompareOpKind,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        op: LogicalOpKind,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    Minus(Box<Expr>),
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    CompoundAssign {
        target: Box<Expr>,
        op: BinaryOpKind,
        value: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOpKind {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOpKind {
    And,
    Or,
}

/// A statement together with the line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: usize) -> Self {
        Self { kind, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expr(Expr),
    VarDecl {
        name: String,
        constant: bool,
        value: Option<Expr>,
    },
    ArrayDecl {
        name: String,
        size: Expr,
        values: Vec<Expr>,
    },
    If(IfStmt),
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    /// `wakandaForEach (i in start to end step s)`
    RangeFor {
        iterator: String,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },
    /// `wakandaFor (init; condition; modification)`
    CFor {
        init: Box<Stmt>,
        condition: Expr,
        modification: Expr,
        body: Vec<Stmt>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
        default: Vec<Stmt>,
    },
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    If(Box<IfStmt>),
    Else(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Expr,
    pub consequent: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl BinaryOpKind {
    /// Maps an arithmetic operator or the stem of a compound operator (`+=` -> `+`).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOpKind::Add),
            "-" => Some(BinaryOpKind::Sub),
            "*" => Some(BinaryOpKind::Mul),
            "/" => Some(BinaryOpKind::Div),
            "%" => Some(BinaryOpKind::Mod),
            "^" => Some(BinaryOpKind::Pow),
            _ => None,
        }
    }
}

impl CompareOpKind {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" => Some(CompareOpKind::Eq),
            "!=" => Some(CompareOpKind::Ne),
            "<" => Some(CompareOpKind::Lt),
            "<=" => Some(CompareOpKind::Le),
            ">" => Some(CompareOpKind::Gt),
            ">=" => Some(CompareOpKind::Ge),
            _ => None,
        }
    }
}

impl LogicalOpKind {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "&&" | "and" => Some(LogicalOpKind::And),
            "||" | "or" => Some(LogicalOpKind::Or),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOpKind::Add => write!(f, "+"),
            BinaryOpKind::Sub => write!(f, "-"),
            BinaryOpKind::Mul => write!(f, "*"),
            BinaryOpKind::Div => write!(f, "/"),
            BinaryOpKind::Mod => write!(f, "%"),
            BinaryOpKind::Pow => write!(f, "^"),
        }
    }
}

impl fmt::Display for CompareOpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompareOpKind::Eq => write!(f, "=="),
            CompareOpKind::Ne => write!(f, "!="),
            CompareOpKind::Lt => write!(f, "<"),
            CompareOpKind::Le => write!(f, "<="),
            CompareOpKind::Gt => write!(f, ">"),
            CompareOpKind::Ge => write!(f, ">="),
        }
    }
}

impl fmt::Display for LogicalOpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogicalOpKind::And => write!(f, "&&"),
            LogicalOpKind::Or => write!(f, "||"),
        }
    }
}
