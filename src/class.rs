use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::error::{RuntimeError, Unwind};
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::token::Token;

/// Represents a class in the language. A class is callable; calling it
/// constructs an instance and runs its `init` method, if any.
#[derive(Clone)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<RefCell<Class>>>,
    pub methods: HashMap<String, Function>,
    /// Every class is an instance of a synthesised metaclass whose methods
    /// are the class-level methods. Metaclasses have no metaclass of their own.
    pub metaclass: Option<Rc<RefCell<Class>>>,
}

impl Class {
    pub fn new(
        metaclass: Option<Rc<RefCell<Class>>>,
        name: String,
        superclass: Option<Rc<RefCell<Class>>>,
        methods: HashMap<String, Function>,
    ) -> Self {
        Class { name, superclass, methods, metaclass }
    }

    /// Looks up a method by name, searching this class first and then the
    /// superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Function> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        match &self.superclass {
            Some(superclass) => superclass.borrow().find_method(name),
            None => None,
        }
    }

    /// Property read on a class value. This dispatches to the metaclass's
    /// methods with `this` bound to the class itself, which is what makes
    /// `Name.classMethod()` work through the ordinary instance machinery.
    pub fn get(class: &Rc<RefCell<Class>>, name: &Token) -> Result<Object, RuntimeError> {
        let metaclass = class.borrow().metaclass.clone();

        if let Some(metaclass) = metaclass {
            if let Some(method) = metaclass.borrow().find_method(&name.lexeme) {
                return Ok(Object::from(method.bind(Object::Class(Rc::clone(class)))));
            }
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined property '{}'.", name.lexeme),
        })
    }
}

impl Callable for Rc<RefCell<Class>> {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Unwind> {
        let instance = Object::from(Instance::from(self));

        let initializer = self.borrow().find_method("init");
        if let Some(initializer) = initializer {
            initializer.bind(instance.clone()).call(interpreter, arguments)?;
        }

        Ok(instance)
    }

    fn arity(&self) -> usize {
        match self.borrow().find_method("init") {
            Some(initializer) => initializer.arity(),
            None => 0,
        }
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

/// Represents an instance of a class, holding its fields and delegating
/// method lookup to the class.
#[derive(Clone)]
pub struct Instance {
    pub class: Rc<RefCell<Class>>,
    pub fields: HashMap<String, Object>,
}

impl Instance {
    /// Property lookup: own fields shadow methods. A method is bound to the
    /// receiver (`instance`) at lookup time.
    pub fn get(&self, name: &Token, instance: &Object) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            Ok(field.clone())
        } else if let Some(method) = self.class.borrow().find_method(&name.lexeme) {
            Ok(Object::from(method.bind(instance.clone())))
        } else {
            Err(RuntimeError {
                token: name.clone(),
                message: format!("Undefined property '{}'.", name.lexeme),
            })
        }
    }

    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl From<&Rc<RefCell<Class>>> for Instance {
    fn from(value: &Rc<RefCell<Class>>) -> Self {
        Instance { class: Rc::clone(value), fields: HashMap::new() }
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}
