use std::io::{self, BufRead, Write};

/// Ask a yes/no question on the terminal.
pub fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    confirm_with(&mut stdin.lock(), &mut stdout, prompt, default)
}

/// Print `prompt` and return the line typed, without its line ending.
pub fn prompt_line(prompt: &str) -> io::Result<String> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    line_with(&mut stdin.lock(), &mut stdout, prompt)
}

/// Ask for a value, keeping `current` when the answer is empty.
pub fn prompt_with_default(label: &str, current: &str) -> io::Result<String> {
    let answer = prompt_line(&format!("{} [{}]: ", label, current))?;
    let answer = answer.trim();
    if answer.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(answer.to_string())
    }
}

pub fn confirm_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    default: Option<bool>,
) -> io::Result<bool> {
    let mut line = String::new();

    loop {
        line.clear();

        match default {
            Some(true) => write!(output, "{} (Y/n): ", prompt)?,
            Some(false) | None => write!(output, "{} (y/N): ", prompt)?,
        }
        output.flush()?; // Make sure the prompt is immediately displayed

        if input.read_line(&mut line)? == 0 {
            return Err(closed_input());
        }

        match line.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}

pub fn line_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(closed_input());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

// A closed input is never an answer.
fn closed_input() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "input closed before an answer was given")
}
