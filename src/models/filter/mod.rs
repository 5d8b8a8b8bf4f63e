use serde::{Deserialize, Serialize};

use crate::database::schema::asset::AssetKind;

pub mod generator;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Expression {
    Or(Vec<Expression>),
    And(Vec<Expression>),
    Not(Box<Expression>),
    /// Exact tag match
    Tag(String),
    /// Exact category match
    Category(String),
    Kind(AssetKind),
    /// Case-insensitive substring of name, description or any tag
    Any(String),
}
