//! Confirmation of destructive CLI actions (e.g. resetting settings).

/// Callback type for confirming a destructive action.
/// Receives the question, returns true to proceed, false to cancel.
pub type Confirm = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Default implementation: prompt on stderr, read y/N from stdin.
pub fn default_confirm() -> Confirm {
    Box::new(|question: &str| {
        eprint!("{} [y/N] ", question);
        let _ = std::io::Write::flush(&mut std::io::stderr());
        let mut s = String::new();
        let _ = std::io::stdin().read_line(&mut s);
        is_yes(&s)
    })
}

/// Confirmation that always proceeds (`--yes`).
pub fn assume_yes() -> Confirm {
    Box::new(|_| true)
}

fn is_yes(answer: &str) -> bool {
    let t = answer.trim();
    t.eq_ignore_ascii_case("y") || t.eq_ignore_ascii_case("yes")
}
