type Predicate = fn(&str) -> bool;
type Action = fn(&str) -> String;

struct Rule {
    name: &'static str,
    matches: Predicate,
    rewrite: Action,
}

// First match wins. The listing rule fires on any text containing "list",
// even without "files"; existing clients rely on that.
const RULES: &[Rule] = &[
    Rule {
        name: "make-directory",
        matches: wants_directory,
        rewrite: make_directory,
    },
    Rule {
        name: "list-files",
        matches: wants_listing,
        rewrite: list_files,
    },
    Rule {
        name: "current-path",
        matches: wants_location,
        rewrite: print_directory,
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Translator;

impl Translator {
    pub fn new() -> Self {
        Self
    }
    pub fn translate(&self, input: &str) -> String {
        let lowered = input.to_lowercase();
        for rule in RULES {
            if (rule.matches)(&lowered) {
                let rewritten = (rule.rewrite)(input);
                tracing::debug!(rule = rule.name, from = input, to = %rewritten, "translated");
                return rewritten;
            }
        }
        input.to_string()
    }
}

fn wants_directory(lowered: &str) -> bool {
    (lowered.contains("create") || lowered.contains("make"))
        && (lowered.contains("folder") || lowered.contains("directory"))
}

// "list" alone is enough; "show" needs "files" too.
fn wants_listing(lowered: &str) -> bool {
    lowered.contains("list") || (lowered.contains("show") && lowered.contains("files"))
}

fn wants_location(lowered: &str) -> bool {
    lowered.contains("where am i") || lowered.contains("current path")
}

// The folder name keeps the caller's casing.
fn make_directory(input: &str) -> String {
    let name = input.split_whitespace().last().unwrap_or_default();
    format!("mkdir {}", name)
}

fn list_files(_: &str) -> String {
    "ls -l".to_string()
}

fn print_directory(_: &str) -> String {
    "pwd".to_string()
}
