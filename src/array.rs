use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::NativeFunction;
use crate::literal::Literal;
use crate::object::Object;
use crate::token::Token;

/// A fixed-size indexable sequence of values, created by the `Array(n)`
/// native. Elements start out as `nil`.
#[derive(Debug)]
pub struct Array {
    pub elements: Vec<Object>,
}

impl Array {
    pub fn new(size: usize) -> Self {
        Array {
            elements: vec![Object::Literal(Literal::Nil); size],
        }
    }

    /// Property lookup on an array. `get` and `set` are callables backed by
    /// the array's storage and `length` is a number; arrays have no other
    /// properties.
    pub fn get(array: &Rc<RefCell<Array>>, name: &Token) -> Result<Object, RuntimeError> {
        match name.lexeme.as_str() {
            "get" => {
                let array = Rc::clone(array);
                Ok(Object::from(NativeFunction::new("get", 1, move |_, arguments| {
                    let index = index_arg("get", &array.borrow(), &arguments)?;
                    Ok(array.borrow().elements[index].clone())
                })))
            },
            "set" => {
                let array = Rc::clone(array);
                Ok(Object::from(NativeFunction::new("set", 2, move |_, arguments| {
                    let index = index_arg("set", &array.borrow(), &arguments)?;
                    let value = arguments[1].clone();
                    array.borrow_mut().elements[index] = value.clone();
                    Ok(value)
                })))
            },
            "length" => Ok(Object::from(array.borrow().elements.len() as f64)),
            _ => Err(RuntimeError {
                token: name.clone(),
                message: format!("Undefined property '{}'.", name.lexeme),
            }),
        }
    }
}

/// Extracts and bounds-checks the index argument of the array callables.
fn index_arg(name: &'static str, array: &Array, arguments: &[Object]) -> Result<usize, RuntimeError> {
    let number = arguments[0].as_number().ok_or_else(|| RuntimeError {
        token: Token::from(name),
        message: "Array index must be a number.".to_string(),
    })?;

    if number < 0.0 || (number as usize) >= array.elements.len() {
        return Err(RuntimeError {
            token: Token::from(name),
            message: "Array index out of range.".to_string(),
        });
    }

    Ok(number as usize)
}

impl Display for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let elements: Vec<String> = self.elements.iter().map(Object::to_string).collect();
        write!(f, "[{}]", elements.join(", "))
    }
}
