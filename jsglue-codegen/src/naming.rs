// Identifier checks for names interpolated into the generated JS.

const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "eval", "export",
    "extends", "false", "finally", "for", "function", "if", "implements", "import",
    "in", "instanceof", "interface", "let", "new", "null", "package", "private",
    "protected", "public", "return", "static", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Locals declared by every ordinary glue function. A parameter with one of
/// these names would be clobbered before it is forwarded.
pub const METHOD_LOCALS: &[&str] = &[
    "context", "ret", "returnStr", "bufferSize", "strBuffer",
    "error", "errString", "strRet", "innerError",
];

/// Locals declared by the initialize glue function.
pub const INITIALIZE_LOCALS: &[&str] = &["arrayBuilder", "ch", "oac", "orc", "ctr"];

/// Host globals the glue reads. Parameters must not shadow them.
pub const HOST_GLOBALS: &[&str] = &[
    "Module", "Runtime", "buffer", "setValue", "console", "String",
    "_malloc", "lengthBytesUTF8", "stringToUTF8",
];

/// Check if a name is a JS reserved word (strict mode).
pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Check if a name is a plain ASCII JS identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Why `name` cannot be used as a binding in generated code, if it cannot.
pub fn identifier_problem(name: &str) -> Option<&'static str> {
    if !is_identifier(name) {
        Some("not a JS identifier")
    } else if is_reserved(name) {
        Some("JS reserved word")
    } else if HOST_GLOBALS.contains(&name) {
        Some("shadows a host global")
    } else {
        None
    }
}

/// Check a dotted path such as `Runtime.dynCall`.
pub fn is_dotted_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(is_identifier)
}

/// First segment of a dotted path: the binding a call through it resolves first.
pub fn root_segment(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Escape a value for use inside a single-quoted JS string literal.
pub fn quote_js(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("status"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("$el"));
        assert!(is_identifier("K2_GetActor"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("with-dash"));
        assert!(!is_identifier("a.b"));
    }

    #[test]
    fn test_identifier_problem() {
        assert_eq!(identifier_problem("value"), None);
        assert_eq!(identifier_problem("new"), Some("JS reserved word"));
        assert_eq!(identifier_problem("x y"), Some("not a JS identifier"));
        assert_eq!(identifier_problem("buffer"), Some("shadows a host global"));
    }

    #[test]
    fn test_is_dotted_path() {
        assert!(is_dotted_path("Runtime.dynCall"));
        assert!(is_dotted_path("UTF8ToString"));
        assert!(!is_dotted_path("Runtime..dynCall"));
        assert!(!is_dotted_path(""));
        assert!(!is_dotted_path("f()"));
    }

    #[test]
    fn test_root_segment() {
        assert_eq!(root_segment("Runtime.dynCall"), "Runtime");
        assert_eq!(root_segment("Pointer_stringify"), "Pointer_stringify");
    }

    #[test]
    fn test_quote_js() {
        assert_eq!(quote_js("glueRuntimeInstance"), "'glueRuntimeInstance'");
        assert_eq!(quote_js("it's"), "'it\\'s'");
        assert_eq!(quote_js("a\\b"), "'a\\\\b'");
    }
}
