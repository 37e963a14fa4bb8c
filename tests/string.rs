#[macro_use]
mod common;

#[cfg(test)]
mod string {
    tests! {
        multiline in string is OK
        "line one"
        "line two"
    }

    tests! {
        unterminated in string is ERR
        "[line 1:6] Error: Unterminated string."
    }
}
