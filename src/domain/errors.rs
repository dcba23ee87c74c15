/// Failure raised while lexing, parsing, or evaluating a formula body.
///
/// These never cross the engine boundary: every failure collapses into the
/// `ERR` marker for the one cell being computed.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    Syntax(String),
    UnknownFunction(String),
    BadArity {
        function: &'static str,
        expected: &'static str,
        got: usize,
    },
    TypeMismatch(String),
    DivisionByZero,
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::Syntax(msg) => write!(f, "Syntax error: {}", msg),
            EvalError::UnknownFunction(name) => write!(f, "Unknown function: {}", name),
            EvalError::BadArity { function, expected, got } => {
                write!(f, "{} expects {} argument(s), got {}", function, expected, got)
            }
            EvalError::TypeMismatch(msg) => write!(f, "Type mismatch: {}", msg),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
        }
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult<T> = Result<T, EvalError>;
