#[macro_use]
mod common;

#[cfg(test)]
mod array {
    tests! {
        basic in array is OK
        "3"
        "30"
        "[10, 20, 30]"
    }

    tests! {
        of_nil in array is OK
        "[nil, nil]"
    }

    tests! {
        set_property in array is ERR
        "[line 2:2] Error at 'size': Can't add properties to arrays."
    }

    tests! {
        out_of_range in array is ERR
        "[line 0:0] Error at 'get': Array index out of range."
    }

    tests! {
        undefined_property in array is ERR
        "[line 2:8] Error at 'pop': Undefined property 'pop'."
    }
}
