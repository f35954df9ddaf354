// Copyright © tabula 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

/// A parsed expression of the rule language.
///
/// Game documents embed expressions as strings; each distinct string is
/// parsed once into this tree and cached, and evaluation walks the tree
/// against a context.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),

    /// A name resolved against the evaluation context.
    Ident(String),

    /// `obj[key]`: mapping, list or board lookup.
    Index { obj: Box<Expr>, key: Box<Expr> },

    /// `name(arg, …)`: a builtin function call.
    Call { name: String, args: Vec<Expr> },

    /// `head.a.b`: attribute walk from a recursively evaluated head.
    Property { head: Box<Expr>, path: Vec<String> },
}

static CACHE: Lazy<Mutex<HashMap<String, Arc<Expr>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Parses an expression string, memoizing the result per distinct source.
pub fn parse(source: &str) -> Arc<Expr> {
    let mut cache = CACHE.lock().expect("expression cache poisoned");
    if let Some(found) = cache.get(source) {
        return Arc::clone(found);
    }
    let parsed = Arc::new(build(source));
    cache.insert(source.to_string(), Arc::clone(&parsed));
    parsed
}

/// Recognition order is part of the language contract: indexing, then
/// function call, then numeric literal, then keyword literal, then property
/// chain, then identifier. Wholly quoted strings are literals outright.
/// Nothing here can fail; unrecognizable text becomes an identifier, which
/// resolves to null when the context lacks it.
fn build(source: &str) -> Expr {
    let expr = source.trim();
    if expr.is_empty() {
        return Expr::Ident(String::new());
    }

    if let Some(text) = quoted(expr) {
        return Expr::Str(text.to_string());
    }

    // Indexing: split at the first `[` and the last `]`, provided the
    // prefix is not itself a call. A remaining `.path` after the closing
    // bracket is a property walk on the lookup result
    // (`board[mid_pos(start, target)].owner`).
    if !expr.starts_with('\'') {
        if let (Some(open), Some(close)) = (expr.find('['), expr.rfind(']')) {
            if close > open && !expr[..open].contains('(') {
                let index = Expr::Index {
                    obj: Box::new(build(&expr[..open])),
                    key: Box::new(build(&expr[open + 1..close])),
                };
                let rest = &expr[close + 1..];
                if let Some(path) = rest.strip_prefix('.') {
                    return Expr::Property {
                        head: Box::new(index),
                        path: path.split('.').map(|s| s.trim().to_string()).collect(),
                    };
                }
                return index;
            }
        }
    }

    // Function call: the first `.`, if any, must come after the first `(`,
    // and the argument list's closing paren must end the expression
    // (otherwise this is a property chain off a call result).
    if let Some(open) = expr.find('(') {
        let head_dot = expr.find('.').map(|d| d < open).unwrap_or(false);
        if !head_dot && expr.ends_with(')') {
            if let Some(close) = closing_paren(expr, open) {
                return Expr::Call {
                    name: expr[..open].trim().to_string(),
                    args: split_args(&expr[open + 1..close]).into_iter().map(build).collect(),
                };
            }
        }
    }

    // Numeric literals come before the property split: identifiers never
    // start with a digit, so `3.5` can only be a float.
    if let Some(number) = numeric(expr) {
        return number;
    }

    match expr {
        "null" => return Expr::Null,
        "true" => return Expr::Bool(true),
        "false" => return Expr::Bool(false),
        _ => {}
    }

    // Property chain: split at the first top-level dot; the remaining
    // segments are plain attribute names.
    if let Some(dot) = top_level_dot(expr) {
        return Expr::Property {
            head: Box::new(build(&expr[..dot])),
            path: expr[dot + 1..].split('.').map(|s| s.trim().to_string()).collect(),
        };
    }

    Expr::Ident(expr.to_string())
}

fn quoted(expr: &str) -> Option<&str> {
    for quote in ['\'', '"'] {
        if expr.len() >= 2 && expr.starts_with(quote) && expr.ends_with(quote) {
            return Some(&expr[1..expr.len() - 1]);
        }
    }
    None
}

fn numeric(expr: &str) -> Option<Expr> {
    let body = expr.strip_prefix('-').unwrap_or(expr);
    if !body.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    if expr.contains('.') {
        expr.parse::<f64>().ok().map(Expr::Float)
    } else {
        expr.parse::<i64>().ok().map(Expr::Int)
    }
}

/// Index of the `)` that closes the paren group opening at `open`.
fn closing_paren(expr: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in expr.char_indices() {
        if i < open {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits an argument list at top-level commas, respecting `()` and `[]`
/// nesting.
fn split_args(args: &str) -> Vec<&str> {
    if args.trim().is_empty() {
        return Vec::new();
    }
    let mut pieces = Vec::new();
    let mut depth = 0i64;
    let mut start = 0usize;
    for (i, c) in args.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&args[start..]);
    pieces
}

/// First `.` outside any paren or bracket nesting.
fn top_level_dot(expr: &str) -> Option<usize> {
    let mut depth = 0i64;
    for (i, c) in expr.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '.' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}
