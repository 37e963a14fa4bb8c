#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        precedence in operator is OK
        "7"
        "9"
        "8"
        "2"
        "2"
    }

    tests! {
        comparison in operator is OK
        "true"
        "true"
        "false"
        "true"
        "true"
        "false"
        "true"
        "false"
    }

    tests! {
        string_ops in operator is OK
        "foobar"
        "n=3"
        "2x"
        "ababab"
    }

    tests! {
        ternary in operator is OK
        "t"
        "f"
        "gt"
    }

    tests! {
        truthiness in operator is OK
        "true"
        "true"
        "false"
        "false"
    }

    tests! {
        divide_by_zero in operator is ERR
        "[line 1:8] Error at '/': Division by zero."
    }

    tests! {
        modulo_by_zero in operator is ERR
        "[line 1:8] Error at '%': Division by zero."
    }

    // A non-number operand is a type error even when the divisor is zero.
    tests! {
        divide_type_mismatch in operator is ERR
        "[line 1:12] Error at '/': Operands must be numbers."
    }

    tests! {
        modulo_type_mismatch in operator is ERR
        "[line 1:11] Error at '%': Operands must be numbers."
    }

    tests! {
        add_bool in operator is ERR
        "[line 1:11] Error at '+': Operands must be two numbers or two strings."
    }

    tests! {
        negate_string in operator is ERR
        "[line 1:6] Error at '-': Operand must be a number."
    }

    tests! {
        compare_mixed in operator is ERR
        "[line 1:8] Error at '<': Operands must be numbers."
    }
}
