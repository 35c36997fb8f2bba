//! Call-site capture
//!
//! A [`FrameResolver`] turns a stack depth into a raw [`Frame`]; the
//! [`Capturer`] derives the function, method and module identities from the
//! frame's symbol name.

use std::sync::Arc;

use contracts::{CallSite, UNRESOLVED};

/// Raw stack frame data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    /// Demangled symbol name without hash suffix
    pub function: String,
}

/// Source of stack frames.
///
/// `skip == 0` is the function that called `resolve`, `1` its caller, and so
/// on. `None` when the stack is shallower or cannot be symbolized.
pub trait FrameResolver: Send + Sync {
    fn resolve(&self, skip: usize) -> Option<Frame>;
}

impl<F> FrameResolver for F
where
    F: Fn(usize) -> Option<Frame> + Send + Sync,
{
    fn resolve(&self, skip: usize) -> Option<Frame> {
        self(skip)
    }
}

/// Marker shared by every symbol belonging to the resolver itself
const ANCHOR: &str = "BacktraceResolver";

/// Resolver walking the live stack with the `backtrace` crate.
///
/// Needs debug info for file and line; without symbols every lookup
/// resolves to `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceResolver;

impl FrameResolver for BacktraceResolver {
    #[inline(never)]
    fn resolve(&self, skip: usize) -> Option<Frame> {
        let mut anchored = false;
        let mut remaining = skip;
        let mut found: Option<Frame> = None;

        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                if found.is_some() {
                    return;
                }
                let name = symbol.name().map(|name| format!("{name:#}"));
                let is_own = name.as_deref().is_some_and(|n| n.contains(ANCHOR));

                // Everything up to and including our own frames is walker internals
                if !anchored || is_own {
                    anchored |= is_own;
                    return;
                }
                if remaining > 0 {
                    remaining -= 1;
                    return;
                }

                found = Some(Frame {
                    file: symbol
                        .filename()
                        .map(|path| path.display().to_string())
                        .unwrap_or_else(|| UNRESOLVED.to_string()),
                    line: symbol.lineno().unwrap_or(0),
                    function: name.unwrap_or_else(|| UNRESOLVED.to_string()),
                });
            });
            found.is_none()
        });

        found
    }
}

/// Builds [`CallSite`]s from an injected resolver
#[derive(Clone)]
pub struct Capturer {
    resolver: Arc<dyn FrameResolver>,
}

impl Capturer {
    pub fn new(resolver: Arc<dyn FrameResolver>) -> Self {
        Self { resolver }
    }

    /// Call site `skip` frames above the caller of this method.
    ///
    /// Never fails: unresolvable parts come back as `"_"` (line 0).
    #[inline(never)]
    pub fn capture(&self, skip: usize) -> CallSite {
        let Some(frame) = self.resolver.resolve(skip + 1) else {
            return CallSite::unresolved();
        };

        let (package_path, method_path) = match parse_function_path(&frame.function) {
            Some((package, method)) => (package, method.unwrap_or_default()),
            None => (UNRESOLVED.to_string(), UNRESOLVED.to_string()),
        };

        CallSite {
            file: frame.file,
            line: frame.line,
            func_path: frame.function,
            method_path,
            package_path,
        }
    }
}

impl Default for Capturer {
    fn default() -> Self {
        Self::new(Arc::new(BacktraceResolver))
    }
}

/// Split a Rust function path into its module path and, for methods, the
/// type-qualified method path.
///
/// ```text
/// app::net::connect                         -> ("app::net", None)
/// app::net::Conn::send                      -> ("app::net", Some("app::net::Conn"))
/// app::net::<impl Drop for Conn>::drop      -> ("app::net", Some("app::net::<impl Drop for Conn>"))
/// <app::net::Conn as Write>::write          -> ("app::net", Some("<app::net::Conn as Write>"))
/// ```
///
/// Trailing `{{closure}}` segments are ignored. Returns `None` for a name
/// without any path separator.
pub fn parse_function_path(function: &str) -> Option<(String, Option<String>)> {
    let mut name = function;
    while let Some(stripped) = name.strip_suffix("::{{closure}}") {
        name = stripped;
    }

    let split = last_separator(name)?;
    let package = &name[..split];

    let last_segment = match last_separator(package) {
        Some(at) => &package[at + 2..],
        None => package,
    };
    let is_type = last_segment.ends_with('>')
        || last_segment.starts_with(|c: char| c.is_ascii_uppercase());
    if !is_type {
        return Some((package.to_string(), None));
    }

    let method = package;
    let module = match last_separator(method) {
        Some(at) => &method[..at],
        None => qualified_self_module(method).unwrap_or(method),
    };
    Some((module.to_string(), Some(method.to_string())))
}

/// Module of the self type in `<path::Type as Trait>`
fn qualified_self_module(method: &str) -> Option<&str> {
    let inner = method.strip_prefix('<')?.strip_suffix('>')?;
    let self_type = inner.split(" as ").next()?;
    last_separator(self_type).map(|at| &self_type[..at])
}

/// Byte offset of the last `::` not nested inside `<...>`
fn last_separator(path: &str) -> Option<usize> {
    let bytes = path.as_bytes();
    let mut depth = 0usize;
    let mut i = bytes.len();

    while i > 0 {
        i -= 1;
        match bytes[i] {
            // `->` inside fn pointer types is not a closing bracket
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth += 1,
            b'<' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && i > 0 && bytes[i - 1] == b':' => return Some(i - 1),
            _ => {}
        }
    }
    None
}
