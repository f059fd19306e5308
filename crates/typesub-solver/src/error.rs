use thiserror::Error;

/// Invalid caller input: the only failure the engine surfaces.
///
/// Unsupported constructs never produce this error; they normalize to a
/// best-effort `Plain` node instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeExprError {
    #[error("parse error at offset {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("`{0}` is a value, not a type")]
    NotAType(String),

    #[error("`...` is only valid inside Tuple[...] or as the parameters of Callable[..., R]")]
    MisplacedEllipsis,

    #[error("`{origin}` expects {expected} type argument(s), got {found}")]
    ArgumentCount {
        origin: String,
        expected: usize,
        found: usize,
    },

    #[error("malformed Callable: {0}")]
    InvalidCallable(String),

    #[error("malformed TypeVar: {0}")]
    InvalidTypeVar(String),

    #[error("type expression nested deeper than {0} levels")]
    TooDeep(u32),
}

impl TypeExprError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        TypeExprError::Parse {
            position,
            message: message.into(),
        }
    }
}
