#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Numeric literal with its source spelling
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 1e-5
    /// 0x1f
    /// ```
    Number { value: f64, raw: String },

    /// String literal with its source spelling (quotes included)
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// ```
    String { value: String, raw: String },

    /// Template literal, split into raw text chunks and interpolated sources
    ///
    /// `quasis` always holds one more element than `exprs`. Each interpolated
    /// source is paired with its offset in the enclosing text.
    ///
    /// # Examples
    /// ```text
    /// `${d.x} + ${d.y}`
    /// ```
    Template {
        quasis: Vec<String>,
        exprs: Vec<(String, usize)>,
    },

    /// Boolean values
    Boolean(bool),

    /// Null value
    Null,

    // Identifiers
    /// Name that is not a reserved word
    ///
    /// # Examples
    /// ```text
    /// d
    /// op
    /// $value
    /// ```
    Identifier(String),

    /// Reserved word
    Keyword(Keyword),

    // Punctuation
    /// `=>`
    Arrow,
    Dot,
    Comma,
    Semicolon,
    Colon,
    Question,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `**`
    StarStar,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,

    // Comparison
    /// `==`
    EqEq,
    /// `===`
    EqEqEq,
    /// `!=`
    NotEq,
    /// `!==`
    NotEqEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Logical and bitwise
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `??`
    QuestionQuestion,
    Amp,
    Pipe,
    Caret,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,

    // Assignment
    /// `=`
    Assign,
    /// `+=`, `-=`, `*=`, `/=`, `%=`, `**=`
    CompoundAssign(CompoundOp),

    /// End of input
    Eof,
}

/// Reserved words recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Const,
    Let,
    Var,
    If,
    Else,
    Switch,
    Case,
    Default,
    Return,
    Break,
    Continue,
    For,
    While,
    Do,
    New,
    This,
    Function,
    Typeof,
    Void,
    Delete,
    In,
    Instanceof,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "const" => Keyword::Const,
            "let" => Keyword::Let,
            "var" => Keyword::Var,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "switch" => Keyword::Switch,
            "case" => Keyword::Case,
            "default" => Keyword::Default,
            "return" => Keyword::Return,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            "for" => Keyword::For,
            "while" => Keyword::While,
            "do" => Keyword::Do,
            "new" => Keyword::New,
            "this" => Keyword::This,
            "function" => Keyword::Function,
            "typeof" => Keyword::Typeof,
            "void" => Keyword::Void,
            "delete" => Keyword::Delete,
            "in" => Keyword::In,
            "instanceof" => Keyword::Instanceof,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Const => "const",
            Keyword::Let => "let",
            Keyword::Var => "var",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::Switch => "switch",
            Keyword::Case => "case",
            Keyword::Default => "default",
            Keyword::Return => "return",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
            Keyword::For => "for",
            Keyword::While => "while",
            Keyword::Do => "do",
            Keyword::New => "new",
            Keyword::This => "this",
            Keyword::Function => "function",
            Keyword::Typeof => "typeof",
            Keyword::Void => "void",
            Keyword::Delete => "delete",
            Keyword::In => "in",
            Keyword::Instanceof => "instanceof",
        }
    }
}

/// Arithmetic operator carried by a compound assignment token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}
