#[macro_use]
mod common;

#[cfg(test)]
mod comment {
    tests! {
        line in comment is OK
        "1"
    }

    tests! {
        block in comment is OK
        "2"
    }

    tests! {
        nested in comment is OK
        "3"
    }

    tests! {
        unterminated in comment is ERR
        "[line 1:0] Error: Unterminated block comment."
    }
}
