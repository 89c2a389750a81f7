//! AST builder module for creating synthetic Hack nodes
//!
//! Factory functions for the nodes the writer assembles. Keeping construction
//! here lets the emitter read as a description of the generated program rather
//! than a pile of struct literals.

use crate::hack_ast::{Class, Decl, Expr, Function, Namespace, StaticProperty, Stmt};

/// Create a string literal: `'value'`
pub fn string(value: impl Into<String>) -> Expr {
    Expr::String(value.into())
}

/// Create a boolean literal: `true` / `false`
pub fn bool_literal(value: bool) -> Expr {
    Expr::Bool(value)
}

/// Create a name expression: `__DIR__`, `\HH\autoload_set_paths`
pub fn name(name: impl Into<String>) -> Expr {
    Expr::Name(name.into())
}

/// Create a variable reference: `$name`
pub fn var(name: impl Into<String>) -> Expr {
    Expr::Variable(name.into())
}

/// Create a concatenation: `left.right`
pub fn concat(left: Expr, right: Expr) -> Expr {
    Expr::Concat(Box::new(left), Box::new(right))
}

/// Create a fallback expression: `left ?: right`
pub fn elvis(left: Expr, right: Expr) -> Expr {
    Expr::Elvis(Box::new(left), Box::new(right))
}

/// Create a dict literal: `dict[k => v, ...]`
pub fn dict(entries: Vec<(Expr, Expr)>) -> Expr {
    Expr::Dict(entries)
}

/// Create a vec literal: `vec[a, b, ...]`
pub fn vec_literal(items: Vec<Expr>) -> Expr {
    Expr::Vec(items)
}

/// Create a function call: `func()`
pub fn call(func: &str) -> Expr {
    call_with_args(func, vec![])
}

/// Create a function call with arguments: `func(arg1, arg2, ...)`
pub fn call_with_args(func: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        func: Box::new(name(func)),
        args,
    }
}

/// Create a method call: `$object->method(args)`
pub fn method_call(object: Expr, method: &str, args: Vec<Expr>) -> Expr {
    Expr::MethodCall {
        object: Box::new(object),
        method: method.to_owned(),
        args,
    }
}

/// Create a static method call: `Class::method(args)`
pub fn static_call(class: &str, method: &str, args: Vec<Expr>) -> Expr {
    Expr::StaticCall {
        class: class.to_owned(),
        method: method.to_owned(),
        args,
    }
}

/// Create a static property access: `Class::$name`
pub fn static_property(class: &str, name: &str) -> Expr {
    Expr::StaticProperty {
        class: class.to_owned(),
        name: name.to_owned(),
    }
}

/// Create an instantiation: `new Class(args)`
pub fn new_instance(class: &str, args: Vec<Expr>) -> Expr {
    Expr::New {
        class: class.to_owned(),
        args,
    }
}

/// Create an index expression: `object[key]`
pub fn index(object: Expr, key: Expr) -> Expr {
    Expr::Index {
        object: Box::new(object),
        key: Box::new(key),
    }
}

/// Create an expression statement: `expr;`
pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

/// Create an assignment: `target = value;`
pub fn assign(target: Expr, value: Expr) -> Stmt {
    Stmt::Assign { target, value }
}

/// Create a return statement: `return value;`
pub fn return_value(value: Expr) -> Stmt {
    Stmt::Return(Some(value))
}

/// Create a bare `return;`
pub fn return_void() -> Stmt {
    Stmt::Return(None)
}

/// Create a conditional: `if (test) { body }`
pub fn if_stmt(test: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::If { test, body }
}

/// Create a loop: `foreach (iterable as $binding) { body }`
pub fn foreach(iterable: Expr, binding: &str, body: Vec<Stmt>) -> Stmt {
    Stmt::Foreach {
        iterable,
        binding: binding.to_owned(),
        body,
    }
}

/// Create an include: `require_once(path);`
pub fn require_once(path: Expr) -> Stmt {
    Stmt::RequireOnce(path)
}

/// Create a function declaration
pub fn function(name: &str, return_type: &str, body: Vec<Stmt>) -> Decl {
    Decl::Function(Function {
        name: name.to_owned(),
        return_type: return_type.to_owned(),
        body,
    })
}

/// Create a function whose body is a single `return value;`
pub fn returning_function(name: &str, return_type: &str, value: Expr) -> Decl {
    function(name, return_type, vec![return_value(value)])
}

/// Create a final class holding a single static property
pub fn final_class_with_static(name: &str, property: StaticProperty) -> Decl {
    Decl::Class(Class {
        name: name.to_owned(),
        is_final: true,
        properties: vec![property],
    })
}

/// Create a static property declaration: `public static type $name = default;`
pub fn static_property_decl(name: &str, type_hint: &str, default: Expr) -> StaticProperty {
    StaticProperty {
        name: name.to_owned(),
        type_hint: type_hint.to_owned(),
        default,
    }
}

/// Create a namespace block
pub fn namespace(name: &str, decls: Vec<Decl>) -> Namespace {
    Namespace {
        name: name.to_owned(),
        decls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_with_args() {
        let expr = call_with_args("\\HH\\autoload_set_paths", vec![var("map")]);
        match expr {
            Expr::Call { func, args } => {
                assert_eq!(*func, Expr::Name("\\HH\\autoload_set_paths".to_owned()));
                assert_eq!(args, vec![Expr::Variable("map".to_owned())]);
            }
            _ => panic!("Expected Call expression"),
        }
    }

    #[test]
    fn test_returning_function() {
        let decl = returning_function("is_dev", "bool", bool_literal(true));
        match decl {
            Decl::Function(function) => {
                assert_eq!(function.name, "is_dev");
                assert_eq!(function.return_type, "bool");
                assert_eq!(function.body, vec![Stmt::Return(Some(Expr::Bool(true)))]);
            }
            Decl::Class(_) => panic!("Expected Function declaration"),
        }
    }
}
