#[macro_use]
mod common;

#[cfg(test)]
mod native {
    tests! {
        math in native is OK
        "7"
        "3"
        "5"
        "1"
        "2"
        "7"
        "1"
        "0"
        "0"
        "1"
        "0"
    }

    tests! {
        sum in native is OK
        "10"
    }

    tests! {
        random_range in native is OK
        "true"
        "true"
    }

    tests! {
        clock_is_number in native is OK
        "true"
    }

    tests! {
        display in native is OK
        "<native fn clock>"
        "<native fn Array>"
    }

    tests! {
        sum_wrong_type in native is ERR
        "[line 0:0] Error at 'sum': Expected an array of numbers."
    }

    tests! {
        array_negative_size in native is ERR
        "[line 0:0] Error at 'Array': Array size must be a non-negative number."
    }
}
