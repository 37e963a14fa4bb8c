#[macro_use]
mod common;

#[cfg(test)]
mod _if {
    tests! {
        with_else in if is OK
        "else"
        "then"
    }

    tests! {
        truthy_condition in if is OK
        "zero is truthy"
        "empty is truthy"
        "nil is falsey"
    }
}
