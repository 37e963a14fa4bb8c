#[macro_use]
mod common;

#[cfg(test)]
mod class {
    tests! {
        empty in class is OK
        "<class Foo>"
    }

    tests! {
        fields in class is OK
        "42"
    }

    tests! {
        methods in class is OK
        "hello world"
    }

    tests! {
        getter in class is OK
        "42"
    }

    tests! {
        getter_uses_this in class is OK
        "25"
    }

    tests! {
        static_method in class is OK
        "pong"
    }

    tests! {
        static_uses_this in class is OK
        "<class M>"
    }

    tests! {
        reference_self in class is OK
        "<class Foo>"
    }

    tests! {
        init_returns_receiver in class is OK
        "1"
    }

    tests! {
        undefined_property in class is ERR
        "[line 2:12] Error at 'bar': Undefined property 'bar'."
    }

    tests! {
        property_on_number in class is ERR
        "[line 1:8] Error at 'x': Only instances have properties."
    }

    tests! {
        set_on_non_instance in class is ERR
        "[line 2:2] Error at 'field': Only instances have fields."
    }

    tests! {
        init_value_return in class is ERR
        "[line 3:4] Error at 'return': Cannot return a value from an initializer."
    }
}
