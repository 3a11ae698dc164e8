//! Entry Formatting
//!
//! Turns lookup results into a marked-up text block. Colors are expressed as
//! inline tokens (`<red>..</red>`, `<green>..</green>`, `<yellow>..</yellow>`)
//! that the terminal side parses into styled spans; meaning text keeps the
//! resolver's own `<b>..</b>` keyword markers.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::entry::DictEntry;

/// Space between the headword and its phonetic
const PHONETIC_GAP: &str = "        ";

/// Meaning count shown when results are limited
pub const FIRST_MEANINGS: usize = 5;

/// What to include in formatted output
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Also show examples and related word groups
    pub verbose: bool,
    /// Show at most this many meanings per entry
    pub max_meanings: Option<usize>,
}

impl DisplayOptions {
    /// Options with the meaning count limited to [`FIRST_MEANINGS`]
    #[must_use]
    pub fn first_five(mut self) -> Self {
        self.max_meanings = Some(FIRST_MEANINGS);
        self
    }
}

/// Format entries as a marked-up text block, one line per `\n`
#[must_use]
pub fn format_entries(entries: &[DictEntry], options: &DisplayOptions) -> String {
    let mut out = String::new();

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        format_entry(&mut out, entry, options);
    }

    out.trim_end_matches('\n').to_string()
}

fn format_entry(out: &mut String, entry: &DictEntry, options: &DisplayOptions) {
    let _ = write!(out, "<red>{}</red>", entry.word);
    if !entry.phonetic.is_empty() {
        out.push_str(PHONETIC_GAP);
        out.push_str(&entry.phonetic);
    }
    if let Some(stars) = entry.frequency.stars() {
        let _ = write!(
            out,
            "  <yellow>{}{}</yellow>",
            "★".repeat(stars as usize),
            "☆".repeat((crate::Frequency::MAX - stars) as usize)
        );
    }
    out.push('\n');

    let limit = options.max_meanings.unwrap_or(usize::MAX);
    for (n, meaning) in entry.meanings.iter().take(limit).enumerate() {
        let _ = writeln!(out, "{}. ({}) {}", n + 1, meaning.category, meaning.text.trim());

        if options.verbose {
            for example in &meaning.examples {
                let _ = writeln!(out, "    - {}", example.text);
                if !example.translation.is_empty() {
                    let _ = writeln!(out, "      {}", example.translation);
                }
            }
        }
    }

    if options.verbose && !entry.word_groups.is_empty() {
        out.push_str("<yellow>Word groups</yellow>\n");
        for group in &entry.word_groups {
            let _ = writeln!(out, "  <green>{}</green>  {}", group.text, group.meaning);
        }
    }
}
