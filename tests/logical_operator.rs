#[macro_use]
mod common;

#[cfg(test)]
mod logical_operator {
    tests! {
        short_circuit in logical_operator is OK
        "false"
        "true"
    }

    tests! {
        returns_operand in logical_operator is OK
        "default"
        "first"
        "nil"
        "2"
    }
}
