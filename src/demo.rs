//! A guided tour of the engine: whole-subject matching, reusable patterns,
//! capture groups, back-references and find-all scanning.

use crate::error::Error;
use crate::pattern::{Pattern, matches};

/// Run the tour and return its transcript, one entry per output line.
pub fn run() -> Result<Vec<String>, Error> {
    let mut out = Vec::new();

    out.push(matches(r"(Hello)\w.*(1)\2", "Hello_World11")?.to_string());

    // Whole-subject matching is implicitly anchored at both ends.
    out.push(matches("a*b", "aaaaab")?.to_string());
    out.push(matches("a*b", "baaaaab")?.to_string());
    out.push(String::new());

    let p = Pattern::new("CSC[0-9][0-9][0-9]H1([FS])")?;
    for (subject, trailer) in [("CSC207H1S", false), ("CSC199H1Y", true)] {
        out.push(format!("Does {subject} match {p} ?"));
        out.push(p.matches_full(subject).to_string());
        if trailer {
            out.push(String::new());
        }
    }

    let p = Pattern::new("CSC([0-9][0-9][0-9])H1([FS])")?;
    match p.full_match("CSC207H1S") {
        Some(m) => {
            out.push(format!("Groups for pattern {p} and input CSC207H1S"));
            for index in 0..=m.group_count() {
                out.push(format!("group {index}: {}", m.group(index).unwrap_or_default()));
            }
        }
        None => out.push("group example failed".to_string()),
    }

    let p = Pattern::new(r"(\d\d\d)ABC\1")?;
    out.push("Example using a back reference to match group later".to_string());
    for subject in ["123ABC123", "123ABC456"] {
        out.push(format!("{subject} matches {} ...", p.as_str()));
        out.push(p.matches_full(subject).to_string());
    }

    let p = Pattern::new(r#"[a-c]\+{5}""#)?;
    let subject = r#"a1bb\\c2a4\\b+++++"6c89\\c+++++""#;
    out.extend(p.find_all(subject).map(|m| m.as_str().to_string()));

    Ok(out)
}
