use crate::Point;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    #[error("shape center {0:?} lies outside of the tree bounds")]
    OutOfBounds(Point),
    #[error("invalid tree configuration: {0}")]
    InvalidConfig(&'static str),
}
