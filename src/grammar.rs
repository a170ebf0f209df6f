/// UnrealScript grammar facts: the patterns shared by the detection rules.
///
/// UnrealScript is case-insensitive, so every keyword pattern carries `(?i)`.
/// Line-anchored patterns use `[ \t]*` rather than `\s*` so a match start is
/// always on the line that holds the keyword.
use regex::Regex;

/// Match a simple identifier assignment head, excluding `==` comparisons.
///
/// # Panics
///
/// Panics if the hardcoded pattern is invalid (caught by tests).
pub fn assignment_head() -> Regex {
    return Regex::new(r"^[A-Za-z_]\w*\s*=\s*[^=\s]").expect("valid regex");
}

/// Match a single-line `if`/`while`/`for`/`switch` header.
///
/// # Panics
///
/// Panics if the hardcoded pattern is invalid (caught by tests).
pub fn control_header() -> Regex {
    return Regex::new(r"(?i)^[ \t]*(if|while|for|switch)\b[ \t]*\(").expect("valid regex");
}

/// Match a `cpptext` keyword.
///
/// # Panics
///
/// Panics if the hardcoded pattern is invalid (caught by tests).
pub fn cpptext() -> Regex {
    return Regex::new(r"(?i)\bcpptext\b").expect("valid regex");
}

/// Match a `defaultproperties` keyword.
///
/// # Panics
///
/// Panics if the hardcoded pattern is invalid (caught by tests).
pub fn defaultproperties() -> Regex {
    return Regex::new(r"(?i)\bdefaultproperties\b").expect("valid regex");
}

/// Match a `struct` or `enum` header line that opens its block on the
/// same line.
///
/// # Panics
///
/// Panics if the hardcoded pattern is invalid (caught by tests).
pub fn struct_enum_header() -> Regex {
    return Regex::new(r"(?im)^[ \t]*(struct|enum)\b[^\n]*\{").expect("valid regex");
}

/// Match the start of a top-level declaration line.
///
/// # Panics
///
/// Panics if the hardcoded pattern is invalid (caught by tests).
pub fn top_level_decl() -> Regex {
    return Regex::new(
        r"(?im)^[ \t]*(class|function|event|state|defaultproperties|var|struct|enum|cpptext|replication)\b",
    )
    .expect("valid regex");
}

/// Match a `var` or `local` declaration head.
///
/// # Panics
///
/// Panics if the hardcoded pattern is invalid (caught by tests).
pub fn var_decl_head() -> Regex {
    return Regex::new(r"(?i)^(var|local)\b").expect("valid regex");
}
