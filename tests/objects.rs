mod common;

use common::{assert_compile_error, assert_output, assert_value};
use kvantum::interpreter::Value;

#[test]
fn constructors_set_fields() {
    let source = "
        type Point { x: Int; y: Int; }
        fn Point.new(x: Int, y: Int) {
            self.x = x;
            self.y = y;
        }
        let p = Point.new(3, 4);
        ret p.x * p.y;
    ";
    assert_value(source, Value::Int(12));
}

#[test]
fn unset_fields_start_at_their_default() {
    let source = "
        type Counter { count: Int; label: Char; }
        fn Counter.new() { }
        let c = Counter.new();
        printf(c.label + \"|\");
        ret c.count;
    ";
    assert_value(source, Value::Int(0));
    assert_output(source, "|");
}

#[test]
fn methods_see_their_receiver() {
    let source = "
        type Counter { count: Int; }
        fn Counter.new() { self.count = 0; }
        fn Counter.bump(by: Int) { self.count = self.count + by; }
        fn Counter.get() -> Int => self.count;

        let c = Counter.new();
        c.bump(2);
        c.bump(5);
        ret c.get();
    ";
    assert_value(source, Value::Int(7));
}

#[test]
fn objects_are_shared_between_names() {
    let source = "
        type Box { value: Int; }
        fn Box.new(value: Int) { self.value = value; }
        fn reset(b: Box) { b.value = 0; }

        let a = Box.new(9);
        let b = a;
        b.value = 5;
        printf(a.value as Char);
        reset(a);
        ret b.value;
    ";
    assert_value(source, Value::Int(0));
    assert_output(source, "5");
}

#[test]
fn nested_objects() {
    let source = "
        type Inner { n: Int; }
        type Outer { inner: Inner; }
        fn Inner.new(n: Int) { self.n = n; }
        fn Outer.new() { self.inner = Inner.new(41); }

        let o = Outer.new();
        o.inner.n = o.inner.n + 1;
        ret o.inner.n;
    ";
    assert_value(source, Value::Int(42));
}

#[test]
fn derived_types_inherit_fields_and_methods() {
    let source = "
        type Animal { name: Char; legs: Int; }
        fn Animal.describe() -> Char => self.name;

        type Bird <- Animal { wings: Int; }
        fn Bird.new() {
            self.name = \"bird\";
            self.legs = 2;
            self.wings = 2;
        }

        let b = Bird.new();
        printf(b.describe());
        ret b.legs + b.wings;
    ";
    assert_value(source, Value::Int(4));
    assert_output(source, "bird");
}

#[test]
fn virtual_methods_dispatch_on_the_runtime_type() {
    let source = "
        type Animal { name: Char; }
        fn Animal.sound() [virtual] -> Char => \"...\";
        fn Animal.speak() -> Char => self.name + (\": \" + self.sound());

        type Dog <- Animal { }
        fn Dog.new() { self.name = \"Rex\"; }
        fn Dog.sound() [override] -> Char => \"woof\";

        type Fish <- Animal { }
        fn Fish.new() { self.name = \"Nemo\"; }

        printf(Dog.new().speak() + \"\\n\");
        printf(Fish.new().speak() + \"\\n\");
    ";
    assert_output(source, "Rex: woof\nNemo: ...\n");
}

#[test]
fn static_methods_are_called_on_the_type() {
    let source = "
        type Math { unused: Int; }
        fn Math.square(x: Int) [static] -> Int => x * x;
        ret Math.square(9);
    ";
    assert_value(source, Value::Int(81));
}

#[test]
fn functions_return_objects() {
    let source = "
        type Pair { a: Int; b: Int; }
        fn Pair.new(a: Int, b: Int) { self.a = a; self.b = b; }
        fn swap(p: Pair) -> Pair => Pair.new(p.b, p.a);

        let p = swap(Pair.new(1, 2));
        ret (p.a * 10) + p.b;
    ";
    assert_value(source, Value::Int(21));
}

#[test]
fn overriding_needs_a_virtual_parent() {
    let source = "
        type A { x: Int; }
        fn A.f() -> Int => 1;
        type B <- A { }
        fn B.f() [override] -> Int => 2;
    ";
    assert_compile_error(source, "B.f does not override a virtual method with a matching signature");
}

#[test]
fn unknown_fields_and_methods_are_errors() {
    let source = "
        type P { x: Int; }
        fn P.new() { self.x = 1; }
        let p = P.new();
        ret p.y;
    ";
    assert_compile_error(source, "P has no field named y");

    let source = "
        type P { x: Int; }
        fn P.new() { self.x = 1; }
        P.new().missing();
    ";
    assert_compile_error(source, "P has no method named missing");
}
