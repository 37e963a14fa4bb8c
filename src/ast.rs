use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;

/// Returns a string representation of the expression in parenthesis.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";

            string
        }
    };
}

/// Prints statements as parenthesised trees, one line per top-level
/// statement. Used by the driver behind the `-ast` flag.
pub struct ASTPrinter;

impl ASTPrinter {
    /// Prints the statement using visitor pattern.
    pub fn print(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }

    fn function_string(&mut self, function: &FunctionData) -> String {
        let mut string = String::new();
        string += &function.name.lexeme;

        if let Some(params) = &function.params {
            string += "(";
            for param in params {
                string += &param.lexeme;
                string += " ";
            }
            string = string.trim_end().to_string();
            string += ")";
        }

        string += " { ";
        string += &function.body.iter()
            .map(|stmt| stmt.accept(self))
            .collect::<Vec<String>>()
            .join(" ");
        string += " }";

        string
    }
}

impl ExprVisitor<String> for ASTPrinter {
    fn visit_literal_expr(&mut self, literal: &Literal) -> String {
        match literal {
            Literal::String(s) => format!("\"{s}\""),
            _ => literal.to_string(),
        }
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> String {
        parenthesize!(self, &logical.operator.lexeme, &logical.left, &logical.right)
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> String {
        parenthesize!(self, &unary.operator.lexeme, &unary.expr)
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> String {
        parenthesize!(self, &binary.operator.lexeme, &binary.left, &binary.right)
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> String {
        parenthesize!(self, "group", grouping.expr)
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> String {
        variable.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> String {
        parenthesize!(self, format!("= {}", &assign.name.lexeme).as_str(), assign.value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> String {
        let mut string = String::new();
        string += &call.callee.accept(self);
        string += "(";
        for argument in &call.arguments {
            string += &argument.accept(self);
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ")";
        string
    }

    fn visit_get_expr(&mut self, get: &GetData) -> String {
        parenthesize!(self, format!(". {}", &get.name.lexeme).as_str(), get.object)
    }

    fn visit_set_expr(&mut self, set: &SetData) -> String {
        parenthesize!(self, format!("= . {}", &set.name.lexeme).as_str(), set.object, set.value)
    }

    fn visit_this_expr(&mut self, _this: &ThisData) -> String {
        String::from("this")
    }

    fn visit_super_expr(&mut self, super_expr: &SuperData) -> String {
        format!("(super {})", super_expr.method.lexeme)
    }

    fn visit_conditional_expr(&mut self, conditional: &ConditionalData) -> String {
        parenthesize!(
            self,
            "?:",
            conditional.condition,
            conditional.then_branch,
            conditional.else_branch
        )
    }
}

impl StmtVisitor<String> for ASTPrinter {
    fn visit_expression_stmt(&mut self, expression: &ExpressionData) -> String {
        parenthesize!(self, "expr", expression.expr)
    }

    fn visit_print_stmt(&mut self, print: &PrintData) -> String {
        parenthesize!(self, "print", print.expr)
    }

    fn visit_var_stmt(&mut self, var: &VarData) -> String {
        let mut string = String::new();
        string += "(var ";
        string += &var.name.lexeme;
        if let Some(initializer) = &var.initializer {
            string += " = ";
            string += &initializer.accept(self);
        }
        string += ")";

        string
    }

    fn visit_block_stmt(&mut self, block: &BlockData) -> String {
        let mut string = String::new();
        string += "{";
        for stmt in &block.statements {
            string += " ";
            string += &stmt.accept(self);
        }
        string += " }";

        string
    }

    fn visit_if_stmt(&mut self, if_stmt: &IfData) -> String {
        let mut string = String::new();
        string += "(if ";
        string += &if_stmt.condition.accept(self);
        string += " ";
        string += &if_stmt.then_branch.accept(self);
        if let Some(else_branch) = &if_stmt.else_branch {
            string += " else ";
            string += &else_branch.accept(self);
        }
        string += ")";

        string
    }

    fn visit_while_stmt(&mut self, while_stmt: &WhileData) -> String {
        parenthesize!(self, "while", while_stmt.condition, while_stmt.body)
    }

    fn visit_break_stmt(&mut self, _break_stmt: &BreakData) -> String {
        String::from("break")
    }

    fn visit_function_stmt(&mut self, function: &FunctionData) -> String {
        format!("(fun {})", self.function_string(function))
    }

    fn visit_return_stmt(&mut self, return_stmt: &ReturnData) -> String {
        match &return_stmt.value {
            Some(value) => parenthesize!(self, "return", value),
            None => String::from("(return)"),
        }
    }

    fn visit_class_stmt(&mut self, class: &ClassData) -> String {
        let mut string = String::new();
        string += "(class ";
        string += &class.name.lexeme;

        if let Some(Expr::Variable(superclass)) = &class.superclass {
            string += " < ";
            string += &superclass.name.lexeme;
        }

        for (i, r#trait) in class.traits.iter().enumerate() {
            string += if i == 0 { " with " } else { ", " };
            string += &r#trait.accept(self);
        }

        string += " {";
        for method in &class.class_methods {
            string += " class ";
            string += &self.function_string(method);
        }
        for method in &class.methods {
            string += " ";
            string += &self.function_string(method);
        }
        string += " })";

        string
    }

    fn visit_trait_stmt(&mut self, trait_stmt: &TraitData) -> String {
        let mut string = String::new();
        string += "(trait ";
        string += &trait_stmt.name.lexeme;

        for (i, r#trait) in trait_stmt.traits.iter().enumerate() {
            string += if i == 0 { " with " } else { ", " };
            string += &r#trait.accept(self);
        }

        string += " {";
        for method in &trait_stmt.methods {
            string += " ";
            string += &self.function_string(method);
        }
        string += " })";

        string
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn print(source: &str) -> Vec<String> {
        let tokens = Scanner::new(source).scan_tokens();
        let statements = Parser::new(tokens).parse();

        let mut printer = ASTPrinter;
        statements.iter().map(|stmt| printer.print(stmt)).collect()
    }

    #[test]
    fn prints_expression_tree() {
        assert_eq!(print("print 1 + 2 * 3;"), vec!["(print (+ 1 (* 2 3)))"]);
    }

    #[test]
    fn prints_conditional() {
        assert_eq!(print("1 ? 2 : 3;"), vec!["(expr (?: 1 2 3))"]);
    }

    #[test]
    fn prints_class_with_traits() {
        assert_eq!(
            print("class C < B with T { m() { return; } }"),
            vec!["(class C < B with T { m() { (return) } })"],
        );
    }
}
