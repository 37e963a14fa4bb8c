//! Basalt is a small dynamically typed scripting language with C-like
//! syntax, first-class functions with lexical closures, single-inheritance
//! classes and trait composition. It is implemented as a tree-walk
//! interpreter with a hand-written recursive descent parser.
//!
//! Running a program is a pipeline of four phases sharing the same token and
//! tree types:
//!
//! ## Scanning
//! The [`scanner`](scanner) turns the source text into a flat list of
//! [`tokens`](token::Token). Trivial problems like an unterminated string or
//! an unexpected character are reported as a [`ScanError`](error::ScanError)
//! and scanning continues, so several syntax mistakes can be fixed at once.
//!
//! ## Parsing
//! The [`parser`](parser) is a recursive descent parser that turns the token
//! list into [`expressions`](expr::Expr) and [`statements`](stmt::Stmt). On a
//! [`ParseError`](error::ParseError) it synchronises at the next statement
//! boundary and keeps going. `for` loops are desugared into `while` loops
//! here, so later phases never see them.
//!
//! ## Resolving
//! The [`resolver`](resolver) is a static pass over the finished tree. It
//! computes the lexical depth of every local variable reference and records
//! it in the interpreter, which is what makes closures capture the bindings
//! at their definition site. It also rejects the statically detectable
//! misuses (a `return` outside a function, `this` outside a class, a class
//! inheriting from itself, ...) as [`ResolveError`](error::ResolveError)s.
//!
//! ## Interpreting
//! The [`interpreter`](interpreter) walks the resolved tree and evaluates
//! it: environments chain lexically, classes are built with their metaclass
//! and flattened traits, and `return`/`break` unwind through a dedicated
//! channel that is separate from [`RuntimeError`](error::RuntimeError)
//! diagnostics. Program output goes to the writer the driver was constructed
//! with.

use std::io::Write;
use std::{fs, mem, process};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod array;
pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod traits;

use ast::ASTPrinter;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// The driver: wires scanning, parsing, resolving and interpreting together
/// over a shared output writer.
#[allow(non_camel_case_types)]
pub struct basalt<'a> {
    interpreter: Interpreter<'a>,
    ast_enabled: bool,
}

impl<'a> basalt<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        basalt {
            interpreter: Interpreter::new(output),
            ast_enabled: false,
        }
    }

    /// Prints the AST of every top-level statement before execution.
    pub fn enable_ast(&mut self) {
        self.ast_enabled = true;
    }

    /// Runs a script file. Exits with 66 if the file does not exist, 65
    /// after static errors and 70 after a runtime error.
    pub fn run_file(&mut self, path: &str) {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => {
                eprintln!("Error: File '{path}' not found.");
                process::exit(66);
            },
        };

        self.run(contents);

        if error::did_runtime_error() {
            process::exit(70);
        }
        if error::did_error() {
            process::exit(65);
        }
    }

    /// Runs an interactive prompt. Input accumulates until every brace and
    /// parenthesis outside a string literal is balanced, so blocks can be
    /// typed across several lines.
    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("terminal to support line editing");

        let history = home::home_dir().map(|dir| dir.join(".basalt_history"));
        if let Some(path) = &history {
            let _ = editor.load_history(path);
        }

        let mut buffer = String::new();
        loop {
            let prompt = if buffer.is_empty() { "> " } else { ". " };

            match editor.readline(prompt) {
                Ok(line) => {
                    buffer.push_str(&line);
                    buffer.push('\n');

                    if !is_balanced(&buffer) {
                        continue;
                    }

                    let source = mem::take(&mut buffer);
                    if !source.trim().is_empty() {
                        let _ = editor.add_history_entry(source.trim());
                        self.run(source);
                    }

                    error::reset_error();
                },
                Err(ReadlineError::Interrupted) => buffer.clear(),
                Err(_) => break,
            }
        }

        if let Some(path) = &history {
            let _ = editor.save_history(path);
        }
    }

    /// Runs a source string through the pipeline. Each phase is skipped when
    /// an earlier one reported an error.
    fn run(&mut self, source: String) {
        let mut scanner = Scanner::new(&source);
        let tokens = scanner.scan_tokens();

        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::did_error() {
            return;
        }

        if self.ast_enabled {
            let mut printer = ASTPrinter;
            for statement in &statements {
                let line = printer.print(statement);
                self.interpreter.println(&line);
            }
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}

/// Returns if every brace and parenthesis outside a string literal is
/// closed, meaning the accumulated prompt input forms a complete unit.
fn is_balanced(source: &str) -> bool {
    let mut braces = 0usize;
    let mut parens = 0usize;
    let mut in_string = false;

    for c in source.chars() {
        match c {
            '"' => in_string = !in_string,
            '{' if !in_string => braces += 1,
            '}' if !in_string => braces = braces.saturating_sub(1),
            '(' if !in_string => parens += 1,
            ')' if !in_string => parens = parens.saturating_sub(1),
            _ => (),
        }
    }

    braces == 0 && parens == 0 && !in_string
}
