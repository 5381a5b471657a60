use thiserror::Error;

/// Errors raised while setting up transforms and linear maps.
///
/// These only occur during scene construction, never inside the trace loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("matrix is singular (determinant {0:e})")]
    SingularMatrix(f64),
}

pub type MathResult<T> = Result<T, MathError>;
