//! Pretty-printer for generated Hack modules
//!
//! All quoting lives here: string values stay raw in the syntax tree and are
//! escaped exactly once, when rendered. Layout is fixed (two-space indent,
//! one entry per line in dict literals, trailing commas) so that identical
//! trees always print identically.

use cow_utils::CowUtils;

use crate::hack_ast::{Class, Decl, Expr, Function, Item, Module, Namespace, Stmt};

const INDENT: &str = "  ";

/// Render `value` as a single-quoted Hack string literal.
///
/// Inside single quotes only `\` and `'` are special, so escaping both is
/// sufficient for the literal to evaluate back to `value`.
pub fn quote(value: &str) -> String {
    let escaped = value.cow_replace('\\', "\\\\");
    let escaped = escaped.cow_replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Renders syntax trees to source text
#[derive(Debug, Default)]
pub struct Generator {
    buffer: String,
    indent: usize,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a complete module, ending with a newline
    pub fn module(mut self, module: &Module) -> String {
        if module.opening_tag {
            self.buffer.push_str("<?hh\n");
        }
        for line in &module.header {
            self.line(&format!("/// {line} ///"));
        }

        let mut previous_was_namespace = false;
        for (i, item) in module.body.iter().enumerate() {
            match item {
                Item::Namespace(namespace) => {
                    if i > 0 || !module.header.is_empty() {
                        self.buffer.push('\n');
                    }
                    self.namespace(namespace);
                    previous_was_namespace = true;
                }
                Item::Stmt(stmt) => {
                    if previous_was_namespace || (i == 0 && !module.header.is_empty()) {
                        self.buffer.push('\n');
                    }
                    self.stmt(stmt);
                    previous_was_namespace = false;
                }
            }
        }
        self.buffer
    }

    /// Render a single statement at the top level, including its newline
    pub fn statement(mut self, stmt: &Stmt) -> String {
        self.stmt(stmt);
        self.buffer
    }

    /// Render a single expression
    pub fn expression(mut self, expr: &Expr) -> String {
        self.expr(expr);
        self.buffer
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.buffer.push_str(INDENT);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn start_line(&mut self) {
        for _ in 0..self.indent {
            self.buffer.push_str(INDENT);
        }
    }

    fn namespace(&mut self, namespace: &Namespace) {
        self.line(&format!("namespace {} {{", namespace.name));
        for decl in &namespace.decls {
            self.buffer.push('\n');
            match decl {
                Decl::Function(function) => self.function(function),
                Decl::Class(class) => self.class(class),
            }
        }
        self.buffer.push('\n');
        self.line(&format!("}} // namespace {}", namespace.name));
    }

    fn function(&mut self, function: &Function) {
        self.line(&format!(
            "function {}(): {} {{",
            function.name, function.return_type
        ));
        self.block(&function.body);
        self.line("}");
    }

    fn class(&mut self, class: &Class) {
        let modifier = if class.is_final { "final " } else { "" };
        self.line(&format!("{modifier}class {} {{", class.name));
        self.indent += 1;
        for property in &class.properties {
            self.start_line();
            self.buffer.push_str(&format!(
                "public static {} ${} = ",
                property.type_hint, property.name
            ));
            self.expr(&property.default);
            self.buffer.push_str(";\n");
        }
        self.indent -= 1;
        self.line("}");
    }

    fn block(&mut self, body: &[Stmt]) {
        self.indent += 1;
        for stmt in body {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        self.start_line();
        match stmt {
            Stmt::Expr(expr) => {
                self.expr(expr);
                self.buffer.push_str(";\n");
            }
            Stmt::Return(None) => self.buffer.push_str("return;\n"),
            Stmt::Return(Some(value)) => {
                self.buffer.push_str("return ");
                self.expr(value);
                self.buffer.push_str(";\n");
            }
            Stmt::Assign { target, value } => {
                self.expr(target);
                self.buffer.push_str(" = ");
                self.expr(value);
                self.buffer.push_str(";\n");
            }
            Stmt::If { test, body } => {
                self.buffer.push_str("if (");
                self.expr(test);
                self.buffer.push_str(") {\n");
                self.block(body);
                self.line("}");
            }
            Stmt::Foreach {
                iterable,
                binding,
                body,
            } => {
                self.buffer.push_str("foreach (");
                self.expr(iterable);
                self.buffer.push_str(&format!(" as ${binding}) {{\n"));
                self.block(body);
                self.line("}");
            }
            Stmt::RequireOnce(path) => {
                self.buffer.push_str("require_once(");
                self.expr(path);
                self.buffer.push_str(");\n");
            }
        }
    }

    fn operand(&mut self, expr: &Expr) {
        if expr.is_compound() {
            self.buffer.push('(');
            self.expr(expr);
            self.buffer.push(')');
        } else {
            self.expr(expr);
        }
    }

    fn args(&mut self, args: &[Expr]) {
        self.buffer.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.buffer.push_str(", ");
            }
            self.expr(arg);
        }
        self.buffer.push(')');
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::String(value) => self.buffer.push_str(&quote(value)),
            Expr::Bool(value) => self.buffer.push_str(if *value { "true" } else { "false" }),
            Expr::Name(name) => self.buffer.push_str(name),
            Expr::Variable(name) => {
                self.buffer.push('$');
                self.buffer.push_str(name);
            }
            Expr::Concat(left, right) => {
                // `.` is left-associative, so a nested left concat needs no parens
                if matches!(**left, Expr::Concat(..)) {
                    self.expr(left);
                } else {
                    self.operand(left);
                }
                self.buffer.push('.');
                self.operand(right);
            }
            Expr::Elvis(left, right) => {
                self.operand(left);
                self.buffer.push_str(" ?: ");
                self.operand(right);
            }
            Expr::Dict(entries) => self.dict(entries),
            Expr::Vec(items) => {
                self.buffer.push_str("vec[");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.buffer.push_str(", ");
                    }
                    self.expr(item);
                }
                self.buffer.push(']');
            }
            Expr::Call { func, args } => {
                self.operand(func);
                self.args(args);
            }
            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                self.operand(object);
                self.buffer.push_str("->");
                self.buffer.push_str(method);
                self.args(args);
            }
            Expr::StaticCall {
                class,
                method,
                args,
            } => {
                self.buffer.push_str(&format!("{class}::{method}"));
                self.args(args);
            }
            Expr::StaticProperty { class, name } => {
                self.buffer.push_str(&format!("{class}::${name}"));
            }
            Expr::New { class, args } => {
                self.buffer.push_str("new ");
                self.buffer.push_str(class);
                self.args(args);
            }
            Expr::Index { object, key } => {
                self.operand(object);
                self.buffer.push('[');
                self.expr(key);
                self.buffer.push(']');
            }
        }
    }

    fn dict(&mut self, entries: &[(Expr, Expr)]) {
        if entries.is_empty() {
            self.buffer.push_str("dict[]");
            return;
        }
        self.buffer.push_str("dict[\n");
        self.indent += 1;
        for (key, value) in entries {
            self.start_line();
            self.expr(key);
            self.buffer.push_str(" => ");
            self.expr(value);
            self.buffer.push_str(",\n");
        }
        self.indent -= 1;
        self.start_line();
        self.buffer.push(']');
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast_builder::{
        assign, bool_literal, call_with_args, concat, dict, elvis, final_class_with_static,
        foreach, if_stmt, index, name, namespace, require_once, return_void,
        returning_function, static_property, static_property_decl, string, var, vec_literal,
    };

    #[test]
    fn test_quote_escapes_backslash_and_quote() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("it's"), r"'it\'s'");
        assert_eq!(quote(r"C:\path\"), r"'C:\\path\\'");
        assert_eq!(quote(r"\'"), r"'\\\''");
    }

    #[test]
    fn test_quote_leaves_double_quote_syntax_alone() {
        assert_eq!(quote("$var {x} \"q\" \n"), "'$var {x} \"q\" \n'");
    }

    #[test]
    fn test_concat_and_elvis() {
        let expr = concat(name("__DIR__"), string("/../"));
        assert_eq!(Generator::new().expression(&expr), "__DIR__.'/../'");

        let expr = concat(concat(name("a"), name("b")), name("c"));
        assert_eq!(Generator::new().expression(&expr), "a.b.c");

        let expr = elvis(
            call_with_args("\\spl_autoload_functions", vec![]),
            vec_literal(vec![]),
        );
        assert_eq!(
            Generator::new().expression(&expr),
            "\\spl_autoload_functions() ?: vec[]"
        );
    }

    #[test]
    fn test_nested_dict_layout() {
        let expr = dict(vec![
            (
                string("class"),
                dict(vec![(string("foo"), string("src/Foo.hack"))]),
            ),
            (string("type"), dict(vec![])),
        ]);
        let expected = "dict[
  'class' => dict[
    'foo' => 'src/Foo.hack',
  ],
  'type' => dict[],
]";
        assert_eq!(Generator::new().expression(&expr), expected);
    }

    #[test]
    fn test_statements() {
        let stmt = if_stmt(
            static_property("GlobalState", "initialized"),
            vec![return_void()],
        );
        assert_eq!(
            Generator::new().statement(&stmt),
            "if (GlobalState::$initialized) {\n  return;\n}\n"
        );

        let stmt = assign(
            index(var("map"), string("failure")),
            bool_literal(false),
        );
        assert_eq!(
            Generator::new().statement(&stmt),
            "$map['failure'] = false;\n"
        );

        let stmt = foreach(var("items"), "item", vec![require_once(var("item"))]);
        assert_eq!(
            Generator::new().statement(&stmt),
            "foreach ($items as $item) {\n  require_once($item);\n}\n"
        );
    }

    #[test]
    fn test_module_layout() {
        let module = Module {
            opening_tag: false,
            header: vec!["Generated".to_owned()],
            body: vec![Item::Namespace(namespace(
                "A\\B",
                vec![
                    final_class_with_static(
                        "State",
                        static_property_decl("done", "bool", bool_literal(false)),
                    ),
                    returning_function("f", "bool", bool_literal(true)),
                ],
            ))],
        };
        let expected = "/// Generated ///

namespace A\\B {

final class State {
  public static bool $done = false;
}

function f(): bool {
  return true;
}

} // namespace A\\B
";
        assert_eq!(Generator::new().module(&module), expected);
    }

    #[test]
    fn test_module_with_opening_tag_and_statements() {
        let module = Module {
            opening_tag: true,
            header: vec![],
            body: vec![
                Item::Stmt(require_once(string("a.hack"))),
                Item::Stmt(crate::ast_builder::expr_stmt(call_with_args("f", vec![]))),
            ],
        };
        assert_eq!(
            Generator::new().module(&module),
            "<?hh\nrequire_once('a.hack');\nf();\n"
        );
    }
}
