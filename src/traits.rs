use std::collections::HashMap;
use std::fmt::Display;

use crate::function::Function;
use crate::token::Token;

/// A named bundle of methods, composed into classes (and other traits) by
/// flattening. Traits are not callable and hold no state; a method name
/// supplied by two composed traits is a conflict.
#[derive(Debug, Clone)]
pub struct Trait {
    pub name: Token,
    pub methods: HashMap<String, Function>,
}

impl Trait {
    pub fn new(name: Token, methods: HashMap<String, Function>) -> Self {
        Trait { name, methods }
    }
}

impl Display for Trait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<trait {}>", self.name.lexeme)
    }
}
