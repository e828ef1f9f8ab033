//! Binary and unary operators, and the quantifiers of `ANY`/`ALL`.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // String
    Concat,

    // Relational
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,

    // Logical
    And,
    Or,

    // Null-safe identity
    Is,
    IsNot,
}

impl BinaryOp {
    /// Returns the SQL spelling of this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Concat => "||",
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
        }
    }

    /// Binding strength; higher binds tighter.
    ///
    /// - 6: `*` `/` `%`
    /// - 5: `+` `-` `||`
    /// - 4: relational operators, `IS`, `IS NOT`
    /// - 2: `AND`
    /// - 1: `OR`
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Multiply | Self::Divide | Self::Modulo => 6,
            Self::Add | Self::Subtract | Self::Concat => 5,
            Self::Equal
            | Self::NotEqual
            | Self::Less
            | Self::LessOrEqual
            | Self::Greater
            | Self::GreaterOrEqual
            | Self::Is
            | Self::IsNot => 4,
            Self::And => 2,
            Self::Or => 1,
        }
    }

    /// `true` for the six comparison operators usable in `ANY`/`ALL`.
    pub const fn is_relational(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessOrEqual
                | Self::Greater
                | Self::GreaterOrEqual
        )
    }

    /// `true` for operators whose result is always boolean.
    pub const fn is_boolean(self) -> bool {
        self.is_relational() || matches!(self, Self::And | Self::Or | Self::Is | Self::IsNot)
    }

    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo
        )
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Not => "NOT ",
            Self::Negate => "-",
            Self::Plus => "+",
        }
    }
}

/// Quantifier of a quantified comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantifier {
    Any,
    All,
}

impl Quantifier {
    pub const fn as_keyword(self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::All => "ALL",
        }
    }
}
