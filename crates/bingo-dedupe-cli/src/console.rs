use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use bingo_dedupe_core::{
    Adjudicator, MatchDecision, MatchPrompt, OverlapDecision, OverlapPrompt, Result,
};

/// Asks a human on a terminal. End of input counts as "save and exit".
pub struct ConsoleAdjudicator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleAdjudicator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one trimmed line, or `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Collect removal indices until `d`. Stops early once one candidate would remain.
    fn ask_removals(&mut self, count: usize) -> Result<Option<BTreeSet<usize>>> {
        let mut removed = BTreeSet::new();
        while count - removed.len() > 1 {
            let Some(answer) = self.ask("Match to remove ([d] for done): ")? else {
                return Ok(None);
            };
            if answer == "d" {
                break;
            }
            match answer.parse::<usize>() {
                Ok(idx) if idx < count => {
                    removed.insert(idx);
                }
                _ => writeln!(self.output, "Invalid selection: {answer}")?,
            }
        }
        Ok(Some(removed))
    }
}

impl<R: BufRead, W: Write> Adjudicator for ConsoleAdjudicator<R, W> {
    fn choose_match(&mut self, prompt: &MatchPrompt<'_>) -> Result<MatchDecision> {
        loop {
            writeln!(self.output, "\nMatching {}:", prompt.item)?;
            writeln!(self.output, "Choose the best version:")?;
            for (idx, candidate) in prompt.candidates.iter().enumerate() {
                if candidate.canonical_key {
                    writeln!(self.output, "[{idx}] {} {{CK}}", candidate.text)?;
                } else {
                    writeln!(self.output, "[{idx}] {}", candidate.text)?;
                }
            }
            writeln!(self.output)?;
            writeln!(self.output, "[r] Remove one or more matches")?;
            writeln!(self.output, "[c] Enter a better version of all")?;
            writeln!(self.output, "[i] Ignore all")?;
            writeln!(self.output, "[e] Save and exit")?;

            let Some(choice) = self.ask("Selection: ")? else {
                return Ok(MatchDecision::Exit);
            };
            match choice.as_str() {
                "r" => {
                    return Ok(match self.ask_removals(prompt.candidates.len())? {
                        Some(removed) if removed.is_empty() => continue,
                        Some(removed) => MatchDecision::Remove(removed),
                        None => MatchDecision::Exit,
                    });
                }
                "c" => {
                    let Some(text) = self
                        .ask("Enter a better version, being sure to use the proper format:\n")?
                    else {
                        return Ok(MatchDecision::Exit);
                    };
                    if !text.is_empty() {
                        return Ok(MatchDecision::Retype(text));
                    }
                }
                "i" => return Ok(MatchDecision::IgnoreAll),
                "e" => return Ok(MatchDecision::Exit),
                other => match other.parse::<usize>() {
                    Ok(idx) if idx < prompt.candidates.len() => {
                        return Ok(MatchDecision::Select(idx));
                    }
                    _ => writeln!(self.output, "Invalid selection: {other}")?,
                },
            }
        }
    }

    fn choose_overlap(&mut self, prompt: &OverlapPrompt<'_>) -> Result<OverlapDecision> {
        loop {
            writeln!(self.output, "\n{}", prompt.describe())?;
            writeln!(self.output, "Choose the best version:")?;
            writeln!(self.output, "[1] {}", prompt.first)?;
            writeln!(self.output, "[2] {}", prompt.second)?;
            writeln!(self.output, "[e] Save and exit")?;

            let Some(choice) = self.ask("Selection: ")? else {
                return Ok(OverlapDecision::Exit);
            };
            match choice.as_str() {
                "1" => return Ok(OverlapDecision::First),
                "2" => return Ok(OverlapDecision::Second),
                "e" => return Ok(OverlapDecision::Exit),
                other => writeln!(self.output, "Invalid selection: {other}")?,
            }
        }
    }
}
