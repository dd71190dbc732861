use crate::ast::{Identifier, Statement};
use serde::{Deserialize, Serialize};

/// A formal parameter, identified by its 0-indexed position and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub position: u32,
    pub name: Identifier,
}

/// A function definition: the unit the core analyzes one at a time.
///
/// `qualified_name` is what a `Callable` is built from (see
/// [`crate::Callable`]); `name` is the bare identifier used for call-site
/// resolution within a single file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Define {
    pub name: Identifier,
    pub qualified_name: String,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Statement>,
}

impl Define {
    pub fn new(name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
            parameters: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_body(mut self, body: Vec<Statement>) -> Self {
        self.body = body;
        self
    }
}
