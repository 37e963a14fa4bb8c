#[macro_use]
mod common;

#[cfg(test)]
mod closure {
    tests! {
        capture in closure is OK
        "g"
    }

    tests! {
        counter in closure is OK
        "2"
    }

    tests! {
        shared_env in closure is OK
        "7"
    }
}
