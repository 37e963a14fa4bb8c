use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::array::Array;
use crate::environment::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::FunctionData;
use crate::token::Token;

/// Represents a user-defined function or method, paired with the environment
/// it closed over.
#[derive(Debug, Clone)]
pub struct Function {
    pub declaration: Rc<FunctionData>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(
        declaration: &FunctionData,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        Function {
            declaration: Rc::new(declaration.clone()),
            closure,
            is_initializer,
        }
    }

    /// Returns if this is a getter method, declared without a parameter list
    /// and invoked on property access.
    pub fn is_getter(&self) -> bool {
        self.declaration.params.is_none()
    }

    /// Returns a copy of this function whose closure has `this` bound to the
    /// given receiver. Methods are bound at lookup time.
    pub fn bind(&self, instance: Object) -> Function {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));
        environment.define("this", instance);

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Unwind> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        if let Some(params) = &self.declaration.params {
            params.iter().zip(arguments.iter()).for_each(|(param, argument)| {
                environment.define(&param.lexeme, argument.to_owned());
            });
        }

        let body = interpreter.execute_block(
            &self.declaration.body,
            Rc::new(RefCell::new(environment)),
        );

        let value = match body {
            Ok(()) => Object::from(Literal::Nil),
            Err(Unwind::Return(value)) => value,
            Err(unwind) => return Err(unwind),
        };

        // An initializer always returns the receiver, even on a bare return.
        if self.is_initializer {
            return Ok(self.closure.borrow().get_at(0, &Token::from("this"))?);
        }

        Ok(value)
    }

    fn arity(&self) -> usize {
        match &self.declaration.params {
            Some(params) => params.len(),
            None => 0,
        }
    }
}

// Two function values are equal only if they are the same declaration closed
// over the same environment.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration)
            && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

pub type NativeFn = Rc<dyn Fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>>;

/// Represents a function implemented by the host.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub function: NativeFn,
}

impl NativeFunction {
    pub fn new(
        name: &str,
        arity: usize,
        function: impl Fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError> + 'static,
    ) -> Self {
        NativeFunction {
            name: name.to_string(),
            arity,
            function: Rc::new(function),
        }
    }

    /// Returns the native functions pre-defined in the global environment.
    pub fn get_globals() -> Vec<NativeFunction> {
        let mut globals = vec![
            NativeFunction::new("clock", 0, |_, _| {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .expect("system clock to be after the epoch");
                Ok(Object::from(now.as_secs_f64()))
            }),
            NativeFunction::new("Array", 1, |_, arguments| {
                let size = number_arg("Array", &arguments, 0)?;
                if size < 0.0 {
                    return Err(RuntimeError {
                        token: Token::from("Array"),
                        message: "Array size must be a non-negative number.".to_string(),
                    });
                }
                Ok(Object::from(Array::new(size as usize)))
            }),
            NativeFunction::new("max", 2, |_, arguments| {
                let left = number_arg("max", &arguments, 0)?;
                let right = number_arg("max", &arguments, 1)?;
                Ok(Object::from(left.max(right)))
            }),
            NativeFunction::new("min", 2, |_, arguments| {
                let left = number_arg("min", &arguments, 0)?;
                let right = number_arg("min", &arguments, 1)?;
                Ok(Object::from(left.min(right)))
            }),
            NativeFunction::new("sum", 1, |_, arguments| {
                let Object::Array(array) = &arguments[0] else {
                    return Err(RuntimeError {
                        token: Token::from("sum"),
                        message: "Expected an array of numbers.".to_string(),
                    });
                };

                let mut total = 0.0;
                for element in &array.borrow().elements {
                    total += element.as_number().ok_or_else(|| RuntimeError {
                        token: Token::from("sum"),
                        message: "Expected an array of numbers.".to_string(),
                    })?;
                }

                Ok(Object::from(total))
            }),
            NativeFunction::new("random", 0, |_, _| {
                Ok(Object::from(rand::thread_rng().gen::<f64>()))
            }),
            NativeFunction::new("randomrange", 2, |_, arguments| {
                let low = number_arg("randomrange", &arguments, 0)?;
                let high = number_arg("randomrange", &arguments, 1)?;
                Ok(Object::from(low + rand::thread_rng().gen::<f64>() * (high - low)))
            }),
        ];

        let math: [(&str, fn(f64) -> f64); 9] = [
            ("abs", f64::abs),
            ("exp", f64::exp),
            ("log", f64::ln),
            ("sqrt", f64::sqrt),
            ("floor", f64::floor),
            ("ceil", f64::ceil),
            ("sin", f64::sin),
            ("cos", f64::cos),
            ("tanh", f64::tanh),
        ];

        for (name, function) in math {
            globals.push(NativeFunction::new(name, 1, move |_, arguments| {
                let operand = number_arg(name, &arguments, 0)?;
                Ok(Object::from(function(operand)))
            }));
        }

        globals
    }
}

/// Extracts a numeric argument to a native function or errors.
fn number_arg(name: &'static str, arguments: &[Object], index: usize) -> Result<f64, RuntimeError> {
    arguments[index].as_number().ok_or_else(|| RuntimeError {
        token: Token::from(name),
        message: format!("Expected a number but got {}.", arguments[index].type_str()),
    })
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Unwind> {
        Ok((self.function)(interpreter, arguments)?)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.function, &other.function)
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
