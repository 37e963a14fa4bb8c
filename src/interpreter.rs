use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;

use crate::array::Array;
use crate::class::Class;
use crate::environment::Environment;
use crate::error::{Error, RuntimeError, Unwind};
use crate::expr::*;
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::*;
use crate::token::{Token, Type};
use crate::traits::Trait;

/// Builds a runtime error on the unwind channel.
fn error(token: &Token, message: &str) -> Unwind {
    Unwind::Error(RuntimeError {
        token: token.clone(),
        message: message.to_string(),
    })
}

/// Walks the resolved tree and evaluates it.
///
/// The interpreter owns the global environment (pre-loaded with the native
/// functions), the chain of lexical environments of the running program and
/// the depth table filled in by the resolver. Program output goes to the
/// writer supplied at construction, which is what the REPL, the file runner
/// and the test harness each capture in their own way.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<Token, usize>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let mut globals = Environment::default();
        for native in NativeFunction::get_globals() {
            let name = native.name.clone();
            globals.define(&name, Object::from(native));
        }

        let globals = Rc::new(RefCell::new(globals));

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Executes the program. A runtime error aborts the run and is reported;
    /// the resolver guarantees no `return` or `break` reaches the top level.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                match unwind {
                    Unwind::Error(runtime_error) => runtime_error.throw(),
                    _ => unreachable!("return and break cannot unwind past a function or loop"),
                }
                return;
            }
        }
    }

    /// Records the lexical depth of a variable reference. Called by the resolver.
    pub fn resolve(&mut self, name: &Token, depth: usize) {
        self.locals.insert(name.clone(), depth);
    }

    /// Writes a line to the program output.
    pub fn println(&mut self, text: &str) {
        writeln!(self.output, "{text}").expect("output to be writable");
    }

    /// Executes statements in the given environment, restoring the previous
    /// environment on every exit path including unwinds.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<(), Unwind> {
        let previous = mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        expr.accept(self)
    }

    /// Reads a variable: at the resolved depth when the resolver recorded
    /// one, otherwise from the globals.
    fn lookup_variable(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(name) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Evaluates the `with` clause of a class or trait declaration into one
    /// flat method map. A method name supplied twice is a conflict.
    fn apply_traits(&mut self, traits: &[Expr]) -> Result<HashMap<String, Function>, Unwind> {
        let mut methods: HashMap<String, Function> = HashMap::new();

        for expr in traits {
            let Expr::Variable(variable) = expr else { unreachable!() };

            let Object::Trait(r#trait) = self.evaluate(expr)? else {
                return Err(error(&variable.name, "Can only compose traits in a 'with' clause."));
            };

            for (name, method) in &r#trait.methods {
                if methods.insert(name.clone(), method.clone()).is_some() {
                    return Err(error(&variable.name, &format!("Duplicate method '{name}'.")));
                }
            }
        }

        Ok(methods)
    }
}

impl<'a> ExprVisitor<Result<Object, Unwind>> for Interpreter<'a> {
    fn visit_literal_expr(&mut self, literal: &Literal) -> Result<Object, Unwind> {
        Ok(Object::from(literal.clone()))
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> Result<Object, Unwind> {
        let left = self.evaluate(&logical.left)?;

        // Short-circuit, returning the deciding operand itself.
        match logical.operator.r#type {
            Type::Or if left.as_bool() => Ok(left),
            Type::And if !left.as_bool() => Ok(left),
            _ => self.evaluate(&logical.right),
        }
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> Result<Object, Unwind> {
        let right = self.evaluate(&unary.expr)?;

        match unary.operator.r#type {
            Type::Minus => (-right).ok_or_else(|| error(&unary.operator, "Operand must be a number.")),
            Type::Bang => Ok(!right),
            _ => unreachable!(),
        }
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> Result<Object, Unwind> {
        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;

        let operator = &binary.operator;
        match operator.r#type {
            Type::Greater | Type::GreaterEqual | Type::Less | Type::LessEqual => {
                let (Some(left), Some(right)) = (left.as_number(), right.as_number()) else {
                    return Err(error(operator, "Operands must be numbers."));
                };

                Ok(Object::from(match operator.r#type {
                    Type::Greater => left > right,
                    Type::GreaterEqual => left >= right,
                    Type::Less => left < right,
                    Type::LessEqual => left <= right,
                    _ => unreachable!(),
                }))
            },
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),
            Type::Minus => (left - right)
                .ok_or_else(|| error(operator, "Operands must be numbers.")),
            Type::Slash => {
                let (Some(left), Some(right)) = (left.as_number(), right.as_number()) else {
                    return Err(error(operator, "Operands must be numbers."));
                };

                if right == 0.0 {
                    return Err(error(operator, "Division by zero."));
                }

                Ok(Object::from(left / right))
            },
            Type::Percent => {
                let (Some(left), Some(right)) = (left.as_number(), right.as_number()) else {
                    return Err(error(operator, "Operands must be numbers."));
                };

                if right == 0.0 {
                    return Err(error(operator, "Division by zero."));
                }

                Ok(Object::from(left % right))
            },
            Type::Star => (left * right)
                .ok_or_else(|| error(operator, "Operands must be numbers or a string and a number.")),
            Type::Plus => (left + right)
                .ok_or_else(|| error(operator, "Operands must be two numbers or two strings.")),
            _ => unreachable!(),
        }
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> Result<Object, Unwind> {
        self.evaluate(&grouping.expr)
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> Result<Object, Unwind> {
        Ok(self.lookup_variable(&variable.name)?)
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> Result<Object, Unwind> {
        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.name) {
            Some(distance) => {
                self.environment.borrow_mut().assign_at(*distance, &assign.name, value.clone());
            },
            None => {
                self.globals.borrow_mut().assign(&assign.name, value.clone())?;
            },
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> Result<Object, Unwind> {
        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let callable: &dyn Callable = match &callee {
            Object::Function(function) => function,
            Object::NativeFunction(function) => function,
            Object::Class(class) => class,
            _ => return Err(error(&call.paren, "Can only call functions and classes.")),
        };

        if arguments.len() != callable.arity() {
            return Err(error(
                &call.paren,
                &format!("Expected {} arguments but got {}.", callable.arity(), arguments.len()),
            ));
        }

        callable.call(self, arguments)
    }

    fn visit_get_expr(&mut self, get: &GetData) -> Result<Object, Unwind> {
        let object = self.evaluate(&get.object)?;

        let result = match &object {
            Object::Instance(instance) => instance.borrow().get(&get.name, &object)?,
            // Property reads on a class dispatch to its metaclass.
            Object::Class(class) => Class::get(class, &get.name)?,
            Object::Array(array) => Array::get(array, &get.name)?,
            _ => return Err(error(&get.name, "Only instances have properties.")),
        };

        // A getter method runs immediately on access.
        if let Object::Function(function) = &result {
            if function.is_getter() {
                return function.call(self, vec![]);
            }
        }

        Ok(result)
    }

    fn visit_set_expr(&mut self, set: &SetData) -> Result<Object, Unwind> {
        let object = self.evaluate(&set.object)?;

        match &object {
            Object::Instance(instance) => {
                let value = self.evaluate(&set.value)?;
                instance.borrow_mut().set(&set.name, value.clone());
                Ok(value)
            },
            Object::Array(_) => Err(error(&set.name, "Can't add properties to arrays.")),
            _ => Err(error(&set.name, "Only instances have fields.")),
        }
    }

    fn visit_this_expr(&mut self, this: &ThisData) -> Result<Object, Unwind> {
        Ok(self.lookup_variable(&this.keyword)?)
    }

    fn visit_super_expr(&mut self, super_expr: &SuperData) -> Result<Object, Unwind> {
        let distance = *self.locals.get(&super_expr.keyword)
            .expect("'super' to have a resolved depth");

        // `super` lives in its own environment, with the receiver one scope
        // closer.
        let superclass = self.environment.borrow().get_at(distance, &Token::from("super"))?;
        let instance = self.environment.borrow().get_at(distance - 1, &Token::from("this"))?;

        let Object::Class(superclass) = superclass else { unreachable!() };

        let method = superclass.borrow().find_method(&super_expr.method.lexeme);
        match method {
            Some(method) => Ok(Object::from(method.bind(instance))),
            None => Err(error(
                &super_expr.method,
                &format!("Undefined property '{}'.", super_expr.method.lexeme),
            )),
        }
    }

    fn visit_conditional_expr(&mut self, conditional: &ConditionalData) -> Result<Object, Unwind> {
        // Only the chosen branch is evaluated.
        if self.evaluate(&conditional.condition)?.as_bool() {
            self.evaluate(&conditional.then_branch)
        } else {
            self.evaluate(&conditional.else_branch)
        }
    }
}

impl<'a> StmtVisitor<Result<(), Unwind>> for Interpreter<'a> {
    fn visit_expression_stmt(&mut self, expression: &ExpressionData) -> Result<(), Unwind> {
        self.evaluate(&expression.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, print: &PrintData) -> Result<(), Unwind> {
        let value = self.evaluate(&print.expr)?;
        self.println(&value.to_string());
        Ok(())
    }

    fn visit_var_stmt(&mut self, var: &VarData) -> Result<(), Unwind> {
        let value = match &var.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&var.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, block: &BlockData) -> Result<(), Unwind> {
        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&block.statements, Rc::new(RefCell::new(environment)))
    }

    fn visit_if_stmt(&mut self, if_stmt: &IfData) -> Result<(), Unwind> {
        if self.evaluate(&if_stmt.condition)?.as_bool() {
            self.execute(&if_stmt.then_branch)
        } else if let Some(else_branch) = &if_stmt.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, while_stmt: &WhileData) -> Result<(), Unwind> {
        while self.evaluate(&while_stmt.condition)?.as_bool() {
            match self.execute(&while_stmt.body) {
                Ok(()) => (),
                Err(Unwind::Break) => break,
                Err(unwind) => return Err(unwind),
            }
        }

        Ok(())
    }

    fn visit_break_stmt(&mut self, _break_stmt: &BreakData) -> Result<(), Unwind> {
        Err(Unwind::Break)
    }

    fn visit_function_stmt(&mut self, function: &FunctionData) -> Result<(), Unwind> {
        let value = Function::new(function, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&function.name.lexeme, Object::from(value));
        Ok(())
    }

    fn visit_return_stmt(&mut self, return_stmt: &ReturnData) -> Result<(), Unwind> {
        let value = match &return_stmt.value {
            Some(value) => self.evaluate(value)?,
            None => Object::from(Literal::Nil),
        };

        Err(Unwind::Return(value))
    }

    fn visit_class_stmt(&mut self, class: &ClassData) -> Result<(), Unwind> {
        let superclass = match &class.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Object::Class(superclass) => Some(superclass),
                _ => {
                    let Expr::Variable(variable) = expr else { unreachable!() };
                    return Err(error(&variable.name, "Superclass must be a class."));
                },
            },
            None => None,
        };

        // Defining the name up front enables self-reference in method bodies.
        self.environment.borrow_mut().define(&class.name.lexeme, Object::from(Literal::Nil));

        if let Some(superclass) = &superclass {
            let mut environment = Environment::new(Some(Rc::clone(&self.environment)));
            environment.define("super", Object::Class(Rc::clone(superclass)));
            self.environment = Rc::new(RefCell::new(environment));
        }

        let class_methods: HashMap<String, Function> = class.class_methods.iter()
            .map(|method| {
                (method.name.lexeme.clone(), Function::new(method, Rc::clone(&self.environment), false))
            })
            .collect();

        // The metaclass carries the class-level methods and inherits from the
        // superclass's metaclass, so statics follow the same chain as
        // instance methods.
        let metaclass = Class::new(
            None,
            format!("{} metaclass", class.name.lexeme),
            superclass.as_ref().and_then(|superclass| superclass.borrow().metaclass.clone()),
            class_methods,
        );

        let mut methods = self.apply_traits(&class.traits)?;

        // Methods declared on the class shadow trait methods.
        for method in &class.methods {
            let function = Function::new(
                method,
                Rc::clone(&self.environment),
                method.name.lexeme.eq("init"),
            );
            methods.insert(method.name.lexeme.clone(), function);
        }

        let class_value = Class::new(
            Some(Rc::new(RefCell::new(metaclass))),
            class.name.lexeme.clone(),
            superclass.clone(),
            methods,
        );

        if superclass.is_some() {
            let enclosing = self.environment.borrow().enclosing.clone()
                .expect("'super' environment to have an enclosing environment");
            self.environment = enclosing;
        }

        self.environment.borrow_mut().assign(&class.name, Object::from(class_value))?;
        Ok(())
    }

    fn visit_trait_stmt(&mut self, trait_stmt: &TraitData) -> Result<(), Unwind> {
        self.environment.borrow_mut().define(&trait_stmt.name.lexeme, Object::from(Literal::Nil));

        let mut methods = self.apply_traits(&trait_stmt.traits)?;

        // Unlike a class, a trait may not silently override the methods it
        // composes.
        for method in &trait_stmt.methods {
            let function = Function::new(method, Rc::clone(&self.environment), false);
            if methods.insert(method.name.lexeme.clone(), function).is_some() {
                return Err(error(
                    &method.name,
                    &format!("Duplicate method '{}'.", method.name.lexeme),
                ));
            }
        }

        let value = Object::from(Trait::new(trait_stmt.name.clone(), methods));
        self.environment.borrow_mut().assign(&trait_stmt.name, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    /// Runs a program and returns everything it printed.
    fn run(source: &str) -> String {
        let mut output = Vec::new();

        {
            let mut interpreter = Interpreter::new(&mut output);
            let tokens = Scanner::new(source).scan_tokens();
            let statements = Parser::new(tokens).parse();

            let mut resolver = Resolver::new(&mut interpreter);
            resolver.resolve(&statements);

            interpreter.interpret(&statements);
        }

        String::from_utf8(output).expect("output to be valid utf-8")
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run("print 1 + 2 * 3; print (1 + 2) * 3;"), "7\n9\n");
    }

    #[test]
    fn modulo_and_repetition() {
        assert_eq!(run("print 7 % 3; print \"ab\" * 3;"), "1\nababab\n");
    }

    #[test]
    fn string_number_concat() {
        assert_eq!(run("print \"n=\" + 3;"), "n=3\n");
        assert_eq!(run("print 1.5 + \"s\";"), "1.5s\n");
    }

    #[test]
    fn logical_returns_operand() {
        assert_eq!(run("print nil or \"fallback\"; print 0 and 1;"), "fallback\n1\n");
    }

    #[test]
    fn conditional_picks_branch() {
        assert_eq!(run("print 1 < 2 ? \"yes\" : \"no\";"), "yes\n");
        assert_eq!(run("var picked = false ? unbound : 9; print picked;"), "9\n");
    }

    #[test]
    fn closure_captures_definition_site() {
        let source = "\
            var a = \"g\";
            {
                fun f() { print a; }
                var a = \"l\";
                f();
            }";
        assert_eq!(run(source), "g\n");
    }

    #[test]
    fn closure_sees_later_assignment() {
        let source = "\
            var counter = 0;
            fun bump() { counter = counter + 1; return counter; }
            bump();
            print bump();";
        assert_eq!(run(source), "2\n");
    }

    #[test]
    fn class_fields_and_init() {
        let source = "\
            class P { init(x) { this.x = x; } }
            var p = P(42);
            print p.x;";
        assert_eq!(run(source), "42\n");
    }

    #[test]
    fn inheritance_and_super() {
        let source = "\
            class A { greet() { print \"A\"; } }
            class B < A { greet() { super.greet(); print \"B\"; } }
            B().greet();";
        assert_eq!(run(source), "A\nB\n");
    }

    #[test]
    fn static_method_through_metaclass() {
        let source = "\
            class M { class ping() { print \"pong\"; } }
            M.ping();";
        assert_eq!(run(source), "pong\n");
    }

    #[test]
    fn static_methods_are_inherited() {
        let source = "\
            class A { class make() { print \"made\"; } }
            class B < A {}
            B.make();";
        assert_eq!(run(source), "made\n");
    }

    #[test]
    fn getter_runs_on_access() {
        let source = "\
            class C { area { return 42; } }
            print C().area;";
        assert_eq!(run(source), "42\n");
    }

    #[test]
    fn trait_methods_flatten_into_class() {
        let source = "\
            trait Greeter { hello() { print \"hi \" + this.name; } }
            class Person with Greeter { init(name) { this.name = name; } }
            Person(\"ada\").hello();";
        assert_eq!(run(source), "hi ada\n");
    }

    #[test]
    fn class_method_shadows_trait_method() {
        let source = "\
            trait T { m() { print \"trait\"; } }
            class C with T { m() { print \"class\"; } }
            C().m();";
        assert_eq!(run(source), "class\n");
    }

    #[test]
    fn break_leaves_for_loop() {
        let source = "for (var i = 0; i < 5; i = i + 1) { if (i == 2) break; print i; }";
        assert_eq!(run(source), "0\n1\n");
    }

    #[test]
    fn arrays_store_and_report_length() {
        let source = "\
            var a = Array(3);
            a.set(0, 5);
            a.set(1, 7);
            print a.get(0) + a.get(1);
            print a.length;
            print a;";
        assert_eq!(run(source), "12\n3\n[5, 7, nil]\n");
    }

    #[test]
    fn native_math() {
        let source = "\
            print max(2, 9);
            print min(2, 9);
            print abs(0 - 4);
            print floor(2.7) + ceil(2.2);
            print sqrt(81);";
        assert_eq!(run(source), "9\n2\n4\n5\n9\n");
    }

    #[test]
    fn native_sum_over_array() {
        let source = "\
            var a = Array(3);
            a.set(0, 1); a.set(1, 2); a.set(2, 3);
            print sum(a);";
        assert_eq!(run(source), "6\n");
    }

    #[test]
    fn random_stays_in_range() {
        let source = "\
            var r = random();
            print 0 <= r and r < 1;
            var s = randomrange(5, 6);
            print 5 <= s and s < 6;";
        assert_eq!(run(source), "true\ntrue\n");
    }

    #[test]
    fn equality_is_reference_for_instances() {
        let source = "\
            class C {}
            var a = C();
            var b = C();
            print a == a;
            print a == b;
            print 1 == 1;
            print 1 == true;";
        assert_eq!(run(source), "true\nfalse\ntrue\nfalse\n");
    }

    #[test]
    fn value_display() {
        let source = "\
            class Foo {}
            trait T {}
            fun f() {}
            print Foo;
            print Foo();
            print T;
            print f;
            print clock;";
        assert_eq!(run(source), "<class Foo>\n<instance Foo>\n<trait T>\n<fn f>\n<native fn clock>\n");
    }
}
