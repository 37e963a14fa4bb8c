use std::collections::HashMap;
use std::mem;

use crate::error::{Error, ResolveError};
use crate::expr::*;
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::Token;

#[derive(Clone, Copy)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy)]
enum ClassType {
    None,
    Class,
    Subclass,
    Trait,
}

#[derive(Clone, Copy)]
enum LoopType {
    None,
    While,
}

/// Statically resolves variable references to lexical depths.
///
/// The resolver walks the tree once, keeping a stack of block scopes, and
/// records into the interpreter how many environments away each local
/// reference lives. References it leaves unrecorded are globals. It also
/// rejects the statically detectable misuses: reading a local in its own
/// initializer, duplicate declarations in one scope, stray `return`, `break`,
/// `this` and `super`, and a class inheriting from itself.
pub struct Resolver<'i, 'a> {
    interpreter: &'i mut Interpreter<'a>,
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionType,
    current_class: ClassType,
    current_loop: LoopType,
}

impl<'i, 'a> Resolver<'i, 'a> {
    pub fn new(interpreter: &'i mut Interpreter<'a>) -> Self {
        Resolver {
            interpreter,
            scopes: vec![],
            current_function: FunctionType::None,
            current_class: ClassType::None,
            current_loop: LoopType::None,
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement)
        }
    }

    fn resolve_function(&mut self, function: &FunctionData, r#type: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, r#type);
        // A function body starts a fresh loop context; a `break` inside it
        // cannot target a loop outside of it.
        let enclosing_loop = mem::replace(&mut self.current_loop, LoopType::None);

        self.begin_scope();
        for param in function.params.iter().flatten() {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&function.body);
        self.end_scope();

        self.current_function = enclosing_function;
        self.current_loop = enclosing_loop;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if self.scopes.is_empty() {
            return;
        }

        let scope = self.scopes.last_mut().expect("stack to be not empty");
        if scope.contains_key(&name.lexeme) {
            ResolveError {
                token: name.clone(),
                message: "Variable with this name already declared in this scope.".to_string(),
            }.throw();
        }
        scope.insert(name.lexeme.to_owned(), false);
    }

    fn define(&mut self, name: &Token) {
        if self.scopes.is_empty() {
            return;
        }

        self.scopes
            .last_mut()
            .expect("stack to be not empty")
            .insert(name.lexeme.to_owned(), true);
    }

    fn resolve_local(&mut self, name: &Token) {
        for (i, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.interpreter.resolve(name, i);
                return;
            }
        }
    }
}

impl<'i, 'a> ExprVisitor<()> for Resolver<'i, 'a> {
    fn visit_literal_expr(&mut self, _literal: &Literal) {}

    fn visit_logical_expr(&mut self, logical: &LogicalData) {
        self.resolve_expr(&logical.left);
        self.resolve_expr(&logical.right);
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) {
        self.resolve_expr(&unary.expr);
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) {
        self.resolve_expr(&binary.left);
        self.resolve_expr(&binary.right);
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) {
        self.resolve_expr(&grouping.expr);
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) {
        if let Some(scope) = self.scopes.last() {
            if let Some(defined) = scope.get(&variable.name.lexeme) {
                if !defined {
                    ResolveError {
                        token: variable.name.to_owned(),
                        message: "Cannot read local variable in its own initializer.".to_string(),
                    }.throw();
                }
            }
        }

        self.resolve_local(&variable.name);
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) {
        self.resolve_expr(&assign.value);
        self.resolve_local(&assign.name);
    }

    fn visit_call_expr(&mut self, call: &CallData) {
        self.resolve_expr(&call.callee);

        for argument in &call.arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get_expr(&mut self, get: &GetData) {
        self.resolve_expr(&get.object);
    }

    fn visit_set_expr(&mut self, set: &SetData) {
        self.resolve_expr(&set.value);
        self.resolve_expr(&set.object);
    }

    fn visit_this_expr(&mut self, this: &ThisData) {
        if let ClassType::None = self.current_class {
            ResolveError {
                token: this.keyword.clone(),
                message: "Cannot use 'this' outside of a class.".to_string(),
            }.throw();

            return;
        }

        self.resolve_local(&this.keyword);
    }

    fn visit_super_expr(&mut self, super_expr: &SuperData) {
        match self.current_class {
            ClassType::Subclass => (),
            ClassType::None => ResolveError {
                token: super_expr.keyword.clone(),
                message: "Cannot use 'super' outside of a class.".to_string()
            }.throw(),
            ClassType::Trait => ResolveError {
                token: super_expr.keyword.clone(),
                message: "Cannot use 'super' in a trait.".to_string()
            }.throw(),
            ClassType::Class => ResolveError {
                token: super_expr.keyword.clone(),
                message: "Cannot use 'super' in a class with no superclass.".to_string(),
            }.throw(),
        }

        self.resolve_local(&super_expr.keyword);
    }

    fn visit_conditional_expr(&mut self, conditional: &ConditionalData) {
        self.resolve_expr(&conditional.condition);
        self.resolve_expr(&conditional.then_branch);
        self.resolve_expr(&conditional.else_branch);
    }
}

impl<'i, 'a> StmtVisitor<()> for Resolver<'i, 'a> {
    fn visit_block_stmt(&mut self, block: &BlockData) {
        self.begin_scope();
        self.resolve(&block.statements);
        self.end_scope();
    }

    fn visit_var_stmt(&mut self, var: &VarData) {
        self.declare(&var.name);
        if let Some(initializer) = &var.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&var.name);
    }

    fn visit_function_stmt(&mut self, function: &FunctionData) {
        self.declare(&function.name);
        self.define(&function.name);

        self.resolve_function(function, FunctionType::Function);
    }

    fn visit_expression_stmt(&mut self, expression: &ExpressionData) {
        self.resolve_expr(&expression.expr);
    }

    fn visit_if_stmt(&mut self, if_stmt: &IfData) {
        self.resolve_expr(&if_stmt.condition);
        self.resolve_stmt(&if_stmt.then_branch);
        if let Some(else_branch) = &if_stmt.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_print_stmt(&mut self, print: &PrintData) {
        self.resolve_expr(&print.expr);
    }

    fn visit_return_stmt(&mut self, return_stmt: &ReturnData) {
        if let FunctionType::None = self.current_function {
            ResolveError {
                token: return_stmt.keyword.clone(),
                message: "Cannot return from top-level code.".to_string(),
            }.throw();
        }

        if let Some(value) = &return_stmt.value {
            if let FunctionType::Initializer = self.current_function {
                ResolveError {
                    token: return_stmt.keyword.clone(),
                    message: "Cannot return a value from an initializer.".to_string(),
                }.throw();
                return;
            }

            self.resolve_expr(value);
        }
    }

    fn visit_while_stmt(&mut self, while_stmt: &WhileData) {
        self.resolve_expr(&while_stmt.condition);

        let enclosing_loop = mem::replace(&mut self.current_loop, LoopType::While);
        self.resolve_stmt(&while_stmt.body);
        self.current_loop = enclosing_loop;
    }

    fn visit_break_stmt(&mut self, break_stmt: &BreakData) {
        if let LoopType::None = self.current_loop {
            ResolveError {
                token: break_stmt.keyword.clone(),
                message: "Cannot break outside of a loop.".to_string(),
            }.throw();
        }
    }

    fn visit_class_stmt(&mut self, class: &ClassData) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(&class.name);
        self.define(&class.name);

        if let Some(superclass) = &class.superclass {
            if let Expr::Variable(variable) = superclass {
                if class.name.lexeme == variable.name.lexeme {
                    ResolveError {
                        token: variable.name.clone(),
                        message: "A class cannot inherit from itself.".to_string(),
                    }.throw();
                }
            } else {
                unreachable!();
            }

            self.current_class = ClassType::Subclass;

            self.resolve_expr(superclass);

            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("stack to be not empty")
                .insert("super".to_string(), true);
        }

        for r#trait in &class.traits {
            self.resolve_expr(r#trait);
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("stack to be not empty")
            .insert("this".to_string(), true);

        for method in &class.methods {
            let declaration = if method.name.lexeme.eq("init") {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, declaration);
        }

        self.end_scope();

        // Class-level methods get their own scope where `this` is the class.
        // The scope sits directly inside the `super` scope, mirroring the
        // environment their closure sees at runtime.
        for method in &class.class_methods {
            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("stack to be not empty")
                .insert("this".to_string(), true);
            self.resolve_function(method, FunctionType::Method);
            self.end_scope();
        }

        if class.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn visit_trait_stmt(&mut self, trait_stmt: &TraitData) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Trait);

        self.declare(&trait_stmt.name);
        self.define(&trait_stmt.name);

        for r#trait in &trait_stmt.traits {
            self.resolve_expr(r#trait);
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("stack to be not empty")
            .insert("this".to_string(), true);

        for method in &trait_stmt.methods {
            self.resolve_function(method, FunctionType::Method);
        }

        self.end_scope();

        self.current_class = enclosing_class;
    }
}
