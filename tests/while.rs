#[macro_use]
mod common;

#[cfg(test)]
mod _while {
    tests! {
        basic in while is OK
        "0"
        "1"
        "2"
    }

    tests! {
        condition_false in while is OK
        "done"
    }
}
