/// Outcome of completing a prefix against the command table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<'a> {
    None,
    Unique(&'a str),
    Multiple(Vec<&'a str>),
}

/// Matches `prefix` (lower-cased) against `table`, keeping table order.
pub fn complete<'a>(prefix: &str, table: &[&'a str]) -> Completion<'a> {
    let lower = prefix.to_lowercase();
    let mut matches: Vec<&'a str> = table
        .iter()
        .copied()
        .filter(|name| name.starts_with(&lower))
        .collect();
    match matches.len() {
        0 => Completion::None,
        1 => Completion::Unique(matches.remove(0)),
        _ => Completion::Multiple(matches),
    }
}
